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

//! Minimal echo server: `cargo run --example echo_server`, then
//! `telnet 127.0.0.1 4000` and type a line.

use std::sync::Arc;
use telmux_service::{EchoHandler, ManagerConfig, NetworkManager, TelnetProtocol};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let manager = NetworkManager::new(ManagerConfig::default());
    manager.register_protocol(
        "telnet",
        Arc::new(|handler| Box::new(TelnetProtocol::new(handler))),
    )?;
    manager.register_handler("echo", Arc::new(|| Box::new(EchoHandler)))?;

    let addr = manager
        .start_server("main", "127.0.0.1", 4000, "telnet", "echo", false)
        .await?;
    tracing::info!("echo server listening on {addr}");

    tokio::signal::ctrl_c().await?;
    manager.shutdown();
    Ok(())
}
