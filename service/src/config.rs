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

//! Supervisor configuration
//!
//! # Example
//!
//! ```
//! use telmux_service::{ManagerConfig, TlsIdentity};
//!
//! let config = ManagerConfig::default()
//!     .with_read_chunk_size(8192)
//!     .with_max_connections(500)
//!     .with_tls_identity(TlsIdentity::new("server.pem", "server.key"));
//! ```

use std::path::PathBuf;

/// PEM certificate material for TLS servers
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    /// Path to the PEM certificate chain
    pub cert_file: PathBuf,
    /// Path to the PEM private key
    pub key_file: PathBuf,
}

impl TlsIdentity {
    /// Create an identity from certificate and key paths
    pub fn new(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
        Self {
            cert_file: cert_file.into(),
            key_file: key_file.into(),
        }
    }
}

/// Configuration shared by every server a manager starts
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Largest single read handed to a protocol instance
    pub read_chunk_size: usize,

    /// Accept-time ceiling on simultaneous connections
    pub max_connections: usize,

    /// Certificate material for TLS servers (None disables TLS)
    pub tls_identity: Option<TlsIdentity>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 4096,
            max_connections: 1000,
            tls_identity: None,
        }
    }
}

impl ManagerConfig {
    /// Set the read chunk size
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Set the connection ceiling
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Provide certificate material for TLS servers
    pub fn with_tls_identity(mut self, identity: TlsIdentity) -> Self {
        self.tls_identity = Some(identity);
        self
    }
}
