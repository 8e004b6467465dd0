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

//! Telmux Connection and Server Supervisor
//!
//! The supervisor layer of the telmux framework: it owns sockets and
//! lifecycles so protocol and application code never touch a listener.
//!
//! - One [`NetworkManager`] per process: registries of protocol and
//!   handler factories, atomic connection id allocation, named servers.
//! - One [`Server`](NetworkManager::start_server) accept loop per bound
//!   listener, plain TCP or TLS.
//! - One [`Connection`] read loop per accepted socket, feeding a fresh
//!   [`Protocol`] instance; the stock [`TelnetProtocol`] bridges the
//!   Telnet state machine, the MCCP compression transforms, and the
//!   application's [`SessionHandler`].
//!
//! # Architecture
//!
//! ```text
//! NetworkManager
//!     ↓ start_server
//! Server (accept loop)
//!     ↓ per socket
//! Connection (read loop) → Protocol → SessionHandler
//!                        ← Link (writes, outbound transform)
//! ```
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
//!     manager
//!         .start_server("main", "127.0.0.1", 4000, "telnet", "echo", false)
//!         .await?;
//!     tokio::signal::ctrl_c().await?;
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod manager;
mod protocol;
mod server;
mod types;

pub use config::{ManagerConfig, TlsIdentity};
pub use connection::{Connection, Link, SessionStream};
pub use error::{NetError, NetResult};
pub use handler::{EchoHandler, SessionHandler};
pub use manager::{HandlerCtor, NetworkManager, ProtocolCtor};
pub use protocol::{Protocol, TelnetProtocol};
pub use types::{ConnectionId, ConnectionInfo};
