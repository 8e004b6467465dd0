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

//! Error types for the supervisor

use thiserror::Error;

/// Result type for supervisor operations
pub type NetResult<T> = std::result::Result<T, NetError>;

/// Supervisor error types
///
/// Configuration errors surface synchronously from `register_*` and
/// `start_server`; transport errors stay confined to the connection that
/// hit them.
#[derive(Debug, Error)]
pub enum NetError {
    /// I/O error from the underlying TCP stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to bind a listening socket
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound
        addr: String,
        /// The underlying bind failure
        source: std::io::Error,
    },

    /// Protocol error from the codec layer
    #[error("protocol error: {0}")]
    Codec(#[from] telmux_telnetcodec::CodecError),

    /// No protocol registered under the given name
    #[error("unknown protocol {0:?}")]
    UnknownProtocol(String),

    /// No handler registered under the given name
    #[error("unknown handler {0:?}")]
    UnknownHandler(String),

    /// A protocol is already registered under the given name
    #[error("protocol {0:?} already registered")]
    DuplicateProtocol(String),

    /// A handler is already registered under the given name
    #[error("handler {0:?} already registered")]
    DuplicateHandler(String),

    /// A server is already running under the given name
    #[error("server {0:?} already running")]
    DuplicateServer(String),

    /// No server running under the given name
    #[error("server {0:?} not found")]
    ServerNotFound(String),

    /// TLS was requested but cannot be provided
    #[error("TLS unavailable: {0}")]
    UnsupportedTls(String),

    /// Connection has been closed
    #[error("connection closed")]
    ConnectionClosed,
}

impl NetError {
    /// True for errors raised by misconfiguration rather than the network.
    /// These never terminate a running server.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NetError::UnknownProtocol(_)
                | NetError::UnknownHandler(_)
                | NetError::DuplicateProtocol(_)
                | NetError::DuplicateHandler(_)
                | NetError::DuplicateServer(_)
                | NetError::ServerNotFound(_)
                | NetError::UnsupportedTls(_)
        )
    }

    /// True for errors scoped to a single connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            NetError::Io(_) | NetError::Codec(_) | NetError::ConnectionClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(NetError::UnknownProtocol("x".into()).is_config_error());
        assert!(NetError::DuplicateServer("main".into()).is_config_error());
        assert!(!NetError::ConnectionClosed.is_config_error());
        assert!(NetError::ConnectionClosed.is_connection_error());
        assert!(!NetError::UnsupportedTls("no identity".into()).is_connection_error());
    }

    #[test]
    fn display() {
        let err = NetError::UnknownProtocol("ws".into());
        assert_eq!(err.to_string(), "unknown protocol \"ws\"");
        let err = NetError::UnsupportedTls("no certificate material configured".into());
        assert_eq!(
            err.to_string(),
            "TLS unavailable: no certificate material configured"
        );
    }
}
