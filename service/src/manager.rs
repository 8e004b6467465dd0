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

//! Network manager implementation
//!
//! The NetworkManager is the supervisor: it holds the protocol and
//! handler factory registries, allocates connection ids, starts and
//! stops named servers, and tracks live connections. Registration is
//! configuration-time-only; duplicate names are rejected rather than
//! silently overwritten.
//!
//! # Example
//!
//! ```no_run
//! use telmux_service::{EchoHandler, ManagerConfig, NetworkManager, TelnetProtocol};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = NetworkManager::new(ManagerConfig::default());
//!     manager.register_protocol("telnet", Arc::new(|handler| {
//!         Box::new(TelnetProtocol::new(handler))
//!     }))?;
//!     manager.register_handler("echo", Arc::new(|| Box::new(EchoHandler)))?;
//!
//!     let addr = manager
//!         .start_server("main", "0.0.0.0", 4000, "telnet", "echo", false)
//!         .await?;
//!     println!("listening on {addr}");
//!
//!     tokio::signal::ctrl_c().await?;
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```

use crate::config::{ManagerConfig, TlsIdentity};
use crate::error::{NetError, NetResult};
use crate::handler::SessionHandler;
use crate::protocol::Protocol;
use crate::server::Server;
use crate::types::{ConnectionId, ConnectionInfo};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls;
use tracing::{debug, info};

/// Factory producing one protocol instance per connection. Receives the
/// freshly constructed session handler to own.
pub type ProtocolCtor =
    Arc<dyn Fn(Box<dyn SessionHandler>) -> Box<dyn Protocol> + Send + Sync + 'static>;

/// Factory producing one session handler per connection.
pub type HandlerCtor = Arc<dyn Fn() -> Box<dyn SessionHandler> + Send + Sync + 'static>;

/// State shared between the manager and its accept loops.
pub(crate) struct Shared {
    pub(crate) config: ManagerConfig,
    next_id: AtomicU64,
    pub(crate) connections: DashMap<ConnectionId, ConnectionInfo>,
}

impl Shared {
    /// Strictly increasing, linearizable under concurrent accept loops.
    pub(crate) fn generate_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// A running server tracked by the manager
struct ServerHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

/// The supervisor: registries, id allocation, server lifecycle.
pub struct NetworkManager {
    shared: Arc<Shared>,
    protocols: DashMap<String, ProtocolCtor>,
    handlers: DashMap<String, HandlerCtor>,
    servers: DashMap<String, ServerHandle>,
}

impl NetworkManager {
    /// Create a manager with the given configuration.
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                next_id: AtomicU64::new(0),
                connections: DashMap::new(),
            }),
            protocols: DashMap::new(),
            handlers: DashMap::new(),
            servers: DashMap::new(),
        }
    }

    /// Register a protocol factory under `name`. Duplicate names are
    /// rejected.
    pub fn register_protocol(&self, name: &str, ctor: ProtocolCtor) -> NetResult<()> {
        match self.protocols.entry(name.to_string()) {
            Entry::Occupied(_) => Err(NetError::DuplicateProtocol(name.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(ctor);
                debug!(protocol = name, "protocol registered");
                Ok(())
            }
        }
    }

    /// Register a handler factory under `name`. Duplicate names are
    /// rejected.
    pub fn register_handler(&self, name: &str, ctor: HandlerCtor) -> NetResult<()> {
        match self.handlers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(NetError::DuplicateHandler(name.to_string())),
            Entry::Vacant(vacant) => {
                vacant.insert(ctor);
                debug!(handler = name, "handler registered");
                Ok(())
            }
        }
    }

    /// Start a named server. Binds `address:port` (port 0 allocates) and
    /// spawns its accept loop; returns the actually bound address.
    pub async fn start_server(
        &self,
        name: &str,
        address: &str,
        port: u16,
        protocol_name: &str,
        handler_name: &str,
        tls: bool,
    ) -> NetResult<SocketAddr> {
        if self.servers.contains_key(name) {
            return Err(NetError::DuplicateServer(name.to_string()));
        }
        let protocol_ctor = self
            .protocols
            .get(protocol_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| NetError::UnknownProtocol(protocol_name.to_string()))?;
        let handler_ctor = self
            .handlers
            .get(handler_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| NetError::UnknownHandler(handler_name.to_string()))?;
        let acceptor = if tls {
            let identity = self.shared.config.tls_identity.as_ref().ok_or_else(|| {
                NetError::UnsupportedTls("no certificate material configured".to_string())
            })?;
            Some(build_acceptor(identity)?)
        } else {
            None
        };

        let bind_addr = format!("{address}:{port}");
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| NetError::Bind {
                addr: bind_addr,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let server = Server {
            name: name.to_string(),
            listener,
            tls: acceptor,
            protocol_ctor,
            handler_ctor,
            shared: Arc::clone(&self.shared),
        };
        let task = tokio::spawn(server.run());

        match self.servers.entry(name.to_string()) {
            Entry::Occupied(_) => {
                task.abort();
                Err(NetError::DuplicateServer(name.to_string()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ServerHandle { local_addr, task });
                info!(server = name, %local_addr, tls, "server started");
                Ok(local_addr)
            }
        }
    }

    /// Stop a named server. The listener closes; running connections are
    /// unaffected.
    pub fn stop_server(&self, name: &str) -> NetResult<()> {
        match self.servers.remove(name) {
            Some((_, handle)) => {
                handle.task.abort();
                info!(server = name, "server stopped");
                Ok(())
            }
            None => Err(NetError::ServerNotFound(name.to_string())),
        }
    }

    /// Bound address of a running server.
    pub fn server_addr(&self, name: &str) -> Option<SocketAddr> {
        self.servers.get(name).map(|entry| entry.local_addr)
    }

    /// Allocate the next connection id. Safe under concurrent invocation.
    pub fn generate_id(&self) -> ConnectionId {
        self.shared.generate_id()
    }

    /// Number of live connections across all servers.
    pub fn connection_count(&self) -> usize {
        self.shared.connections.len()
    }

    /// Snapshot of the live connections.
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.shared
            .connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Stop every server. Connections already established drain on their
    /// own as peers disconnect.
    pub fn shutdown(&self) {
        let stopped = self.servers.len();
        for entry in self.servers.iter() {
            entry.value().task.abort();
        }
        self.servers.clear();
        info!(
            stopped,
            remaining_connections = self.connection_count(),
            "manager shut down"
        );
    }
}

impl Default for NetworkManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

/// Build a TLS acceptor from PEM certificate material. Any problem with
/// the material is a configuration error, reported as `UnsupportedTls`.
fn build_acceptor(identity: &TlsIdentity) -> NetResult<TlsAcceptor> {
    let mut cert_reader = BufReader::new(File::open(&identity.cert_file).map_err(|err| {
        NetError::UnsupportedTls(format!(
            "cannot open certificate {}: {err}",
            identity.cert_file.display()
        ))
    })?);
    let certs = rustls_pemfile::certs(&mut cert_reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| NetError::UnsupportedTls(format!("bad certificate: {err}")))?;

    let mut key_reader = BufReader::new(File::open(&identity.key_file).map_err(|err| {
        NetError::UnsupportedTls(format!(
            "cannot open key {}: {err}",
            identity.key_file.display()
        ))
    })?);
    let key = rustls_pemfile::private_key(&mut key_reader)
        .map_err(|err| NetError::UnsupportedTls(format!("bad private key: {err}")))?
        .ok_or_else(|| {
            NetError::UnsupportedTls(format!(
                "no private key found in {}",
                identity.key_file.display()
            ))
        })?;

    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|err| NetError::UnsupportedTls(format!("invalid identity: {err}")))?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}
