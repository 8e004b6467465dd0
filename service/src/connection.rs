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

//! Connection lifecycle and the outbound link
//!
//! A `Connection` owns one accepted socket end to end: it splits the
//! stream, wraps the write half in a [`Link`], and pumps the read half
//! into the connection's protocol instance until EOF or an I/O error.
//! Transport failures are fatal to the one connection and nothing else.

use crate::error::NetResult;
use crate::protocol::Protocol;
use crate::types::ConnectionId;
use bytes::BytesMut;
use metrics::counter;
use std::net::SocketAddr;
use telmux_compress::{Passthrough, Transform};
use telmux_telnetcodec::encode_line;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf};
use tracing::{debug, warn};

/// A duplex byte stream a connection can own: plain TCP or TLS, the
/// supervisor does not care which.
pub trait SessionStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> SessionStream for T {}

/// The outbound half of a connection.
///
/// Owns the write half of the stream and the outbound [`Transform`].
/// Writes happen in invocation order and are flushed per call, so a
/// sync-flushing compressor downstream always yields decodable output.
pub struct Link {
    writer: WriteHalf<Box<dyn SessionStream>>,
    outbound: Box<dyn Transform>,
    scratch: BytesMut,
}

impl Link {
    pub(crate) fn new(writer: WriteHalf<Box<dyn SessionStream>>) -> Self {
        Self {
            writer,
            outbound: Box::new(Passthrough),
            scratch: BytesMut::new(),
        }
    }

    /// Send raw bytes through the outbound transform. The caller is
    /// responsible for protocol framing (IAC escaping) of the payload.
    pub async fn send(&mut self, bytes: &[u8]) -> NetResult<()> {
        if self.outbound.active() {
            self.scratch.clear();
            self.outbound.apply(bytes, &mut self.scratch)?;
            self.writer.write_all(&self.scratch).await?;
        } else {
            self.writer.write_all(bytes).await?;
        }
        self.writer.flush().await?;
        counter!("telmux_bytes_sent").increment(bytes.len() as u64);
        Ok(())
    }

    /// Send a line of text: IAC bytes doubled, CR LF appended.
    pub async fn send_line(&mut self, text: &[u8]) -> NetResult<()> {
        let mut encoded = BytesMut::with_capacity(text.len() + 2);
        encode_line(text, &mut encoded);
        self.send(&encoded).await
    }

    /// Replace the outbound transform. Takes effect on the next `send`;
    /// anything already written stays in the old encoding.
    pub fn set_outbound(&mut self, transform: Box<dyn Transform>) {
        self.outbound = transform;
    }
}

/// One accepted connection: socket, protocol instance, identity.
pub struct Connection {
    id: ConnectionId,
    server: String,
    peer_addr: SocketAddr,
    stream: Box<dyn SessionStream>,
    protocol: Box<dyn Protocol>,
    read_chunk_size: usize,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        server: String,
        peer_addr: SocketAddr,
        stream: Box<dyn SessionStream>,
        protocol: Box<dyn Protocol>,
        read_chunk_size: usize,
    ) -> Self {
        Self {
            id,
            server,
            peer_addr,
            stream,
            protocol,
            read_chunk_size,
        }
    }

    /// Connection ID
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Drive the connection until the peer hangs up or the transport
    /// fails. Consumes the connection; the socket closes on return.
    pub async fn run(mut self) {
        let (mut reader, writer) = tokio::io::split(self.stream);
        let mut link = Link::new(writer);
        let mut buffer = vec![0u8; self.read_chunk_size];

        debug!(id = %self.id, server = %self.server, peer = %self.peer_addr, "connection started");

        if let Err(error) = self.protocol.on_connect(&mut link).await {
            warn!(id = %self.id, %error, "connection setup failed");
            self.protocol.on_disconnect().await;
            return;
        }

        loop {
            match reader.read(&mut buffer).await {
                Ok(0) => {
                    debug!(id = %self.id, "peer closed connection");
                    break;
                }
                Ok(n) => {
                    counter!("telmux_bytes_received").increment(n as u64);
                    if let Err(error) = self.protocol.data_in(&buffer[..n], &mut link).await {
                        warn!(id = %self.id, %error, "connection terminated by error");
                        break;
                    }
                }
                Err(error) => {
                    warn!(id = %self.id, %error, "read failed");
                    break;
                }
            }
        }

        self.protocol.on_disconnect().await;
        debug!(id = %self.id, "connection finished");
    }
}
