//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Per-server accept loop
//!
//! A `Server` owns one bound listener and the protocol/handler factory
//! handles it was started with. Each accepted socket gets an optional
//! TLS handshake, a fresh id, a fresh protocol + handler pair, and its
//! own spawned read loop. Transient accept failures are retried;
//! anything else ends the loop.

use crate::connection::{Connection, SessionStream};
use crate::manager::{HandlerCtor, ProtocolCtor, Shared};
use crate::types::ConnectionInfo;
use metrics::{counter, gauge};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info, warn};

pub(crate) struct Server {
    pub(crate) name: String,
    pub(crate) listener: TcpListener,
    pub(crate) tls: Option<TlsAcceptor>,
    pub(crate) protocol_ctor: ProtocolCtor,
    pub(crate) handler_ctor: HandlerCtor,
    pub(crate) shared: Arc<Shared>,
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
    )
}

impl Server {
    pub(crate) async fn run(self) {
        info!(server = %self.name, "accept loop started");
        loop {
            match self.listener.accept().await {
                Ok((socket, peer_addr)) => {
                    if self.shared.connections.len() >= self.shared.config.max_connections {
                        warn!(
                            server = %self.name,
                            peer = %peer_addr,
                            limit = self.shared.config.max_connections,
                            "connection limit reached, rejecting"
                        );
                        drop(socket);
                        continue;
                    }

                    let stream: Box<dyn SessionStream> = if let Some(acceptor) = &self.tls {
                        match acceptor.accept(socket).await {
                            Ok(tls) => Box::new(tls),
                            Err(error) => {
                                // Bad handshakes cost the peer its socket, nothing more.
                                warn!(server = %self.name, peer = %peer_addr, %error, "TLS handshake failed");
                                continue;
                            }
                        }
                    } else {
                        Box::new(socket)
                    };

                    let id = self.shared.generate_id();
                    let handler = (self.handler_ctor)();
                    let protocol = (self.protocol_ctor)(handler);
                    let connection = Connection::new(
                        id,
                        self.name.clone(),
                        peer_addr,
                        stream,
                        protocol,
                        self.shared.config.read_chunk_size,
                    );

                    self.shared.connections.insert(
                        id,
                        ConnectionInfo {
                            id,
                            server: self.name.clone(),
                            peer_addr,
                        },
                    );
                    counter!("telmux_connections_opened").increment(1);
                    gauge!("telmux_connections_active").increment(1.0);
                    info!(server = %self.name, %id, peer = %peer_addr, "connection accepted");

                    let shared = Arc::clone(&self.shared);
                    tokio::spawn(async move {
                        connection.run().await;
                        shared.connections.remove(&id);
                        gauge!("telmux_connections_active").decrement(1.0);
                    });
                }
                Err(error) if is_transient(&error) => {
                    debug!(server = %self.name, %error, "transient accept failure");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                Err(error) => {
                    warn!(server = %self.name, %error, "accept loop terminating");
                    break;
                }
            }
        }
        info!(server = %self.name, "accept loop stopped");
    }
}
