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

//! Session handler trait and stock implementations

use crate::connection::Link;
use crate::error::NetResult;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use telmux_telnetcodec::TelnetOption;
use tracing::debug;

/// Application-level session callbacks.
///
/// One handler instance exists per connection, constructed by the
/// handler factory registered with the manager, so implementations may
/// keep per-session state without synchronization. All methods have
/// default no-op implementations.
///
/// # Example
///
/// ```no_run
/// use telmux_service::{Link, NetResult, SessionHandler};
/// use async_trait::async_trait;
/// use bytes::Bytes;
///
/// struct Greeter;
///
/// #[async_trait]
/// impl SessionHandler for Greeter {
///     async fn on_connect(&mut self, link: &mut Link) -> NetResult<()> {
///         link.send_line(b"Welcome, traveler.").await
///     }
///
///     async fn on_line(&mut self, link: &mut Link, line: Bytes) -> NetResult<()> {
///         let _ = line;
///         link.send_line(b"I only greet.").await
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHandler: Send {
    /// Called once when the session is established, before any input.
    async fn on_connect(&mut self, _link: &mut Link) -> NetResult<()> {
        Ok(())
    }

    /// Called for every completed line of user input.
    async fn on_line(&mut self, _link: &mut Link, _line: Bytes) -> NetResult<()> {
        Ok(())
    }

    /// Called when a Telnet option changes state on either side.
    async fn on_capability_change(
        &mut self,
        _link: &mut Link,
        _option: TelnetOption,
        _enabled: bool,
    ) -> NetResult<()> {
        Ok(())
    }

    /// Called for each subnegotiation payload of an enabled option.
    async fn on_subnegotiation(
        &mut self,
        _link: &mut Link,
        _option: TelnetOption,
        _payload: Bytes,
    ) -> NetResult<()> {
        Ok(())
    }

    /// Called once when the session ends. The link is already gone.
    async fn on_disconnect(&mut self) {}
}

/// Stock handler that echoes every line back prefixed with `ECHO: `.
#[derive(Debug, Default)]
pub struct EchoHandler;

#[async_trait]
impl SessionHandler for EchoHandler {
    async fn on_line(&mut self, link: &mut Link, line: Bytes) -> NetResult<()> {
        let mut reply = BytesMut::with_capacity(6 + line.len());
        reply.extend_from_slice(b"ECHO: ");
        reply.extend_from_slice(&line);
        link.send_line(&reply).await
    }

    async fn on_capability_change(
        &mut self,
        _link: &mut Link,
        option: TelnetOption,
        enabled: bool,
    ) -> NetResult<()> {
        debug!(%option, enabled, "capability changed");
        Ok(())
    }
}
