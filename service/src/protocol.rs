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

//! Wire protocol trait and the stock Telnet implementation
//!
//! A `Protocol` turns raw socket bytes into application callbacks. The
//! stock [`TelnetProtocol`] wires a [`TelnetMachine`] to a
//! [`SessionHandler`] and manages the MCCP2/MCCP3 transform swaps; other
//! wire protocols register with the manager under their own names.

use crate::connection::Link;
use crate::error::NetResult;
use crate::handler::SessionHandler;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use telmux_compress::{Deflater, Inflater, Passthrough, Transform};
use telmux_telnetcodec::{TelnetEvent, TelnetFrame, TelnetMachine, TelnetOption};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// A per-connection wire protocol instance.
///
/// Constructed by the protocol factory registered with the manager, one
/// instance per connection, owning whatever parser state the protocol
/// needs.
#[async_trait]
pub trait Protocol: Send {
    /// Called once before any bytes arrive.
    async fn on_connect(&mut self, _link: &mut Link) -> NetResult<()> {
        Ok(())
    }

    /// Called with each chunk read from the socket. Errors terminate the
    /// connection.
    async fn data_in(&mut self, input: &[u8], link: &mut Link) -> NetResult<()>;

    /// Called once after the read loop ends.
    async fn on_disconnect(&mut self) {}
}

/// The stock Telnet protocol: state machine, negotiation, MCCP wiring.
///
/// Inbound bytes pass through the inbound transform (identity until
/// MCCP3 turns on), accumulate in a carry buffer, and are decoded into
/// events for the handler. Negotiation replies the machine queues are
/// flushed to the peer before the event that produced them is handed to
/// the handler, so protocol answers never trail application output.
pub struct TelnetProtocol {
    machine: TelnetMachine,
    inbound: Box<dyn Transform>,
    carry: BytesMut,
    handler: Box<dyn SessionHandler>,
}

impl TelnetProtocol {
    /// Wrap a session handler in a fresh Telnet engine.
    pub fn new(handler: Box<dyn SessionHandler>) -> Self {
        Self {
            machine: TelnetMachine::new(),
            inbound: Box::new(Passthrough),
            carry: BytesMut::new(),
            handler,
        }
    }

    async fn flush_replies(&mut self, link: &mut Link) -> NetResult<()> {
        if let Some(replies) = self.machine.take_replies() {
            link.send(&replies).await?;
        }
        Ok(())
    }

    /// MCCP2: announce the switch with an empty Compress2 subnegotiation,
    /// then compress everything after it.
    async fn begin_outbound_compression(&mut self, link: &mut Link) -> NetResult<()> {
        let mut marker = BytesMut::new();
        TelnetFrame::Subnegotiate(TelnetOption::Compress2, Bytes::new()).encode(&mut marker);
        link.send(&marker).await?;
        link.set_outbound(Box::new(Deflater::new()));
        debug!("outbound compression enabled (MCCP2)");
        Ok(())
    }

    /// MCCP3: everything after the peer's empty Compress3 subnegotiation
    /// is compressed, including bytes already sitting in the carry
    /// buffer, so those are re-routed through the new inflater.
    fn begin_inbound_decompression(&mut self) -> NetResult<()> {
        let mut inflater = Inflater::new();
        let residue = self.carry.split();
        if !residue.is_empty() {
            let mut plain = BytesMut::new();
            inflater.apply(&residue, &mut plain)?;
            self.carry = plain;
        }
        self.inbound = Box::new(inflater);
        debug!("inbound decompression enabled (MCCP3)");
        Ok(())
    }
}

#[async_trait]
impl Protocol for TelnetProtocol {
    async fn on_connect(&mut self, link: &mut Link) -> NetResult<()> {
        self.handler.on_connect(link).await?;
        self.flush_replies(link).await
    }

    async fn data_in(&mut self, input: &[u8], link: &mut Link) -> NetResult<()> {
        if self.inbound.active() {
            let mut plain = BytesMut::new();
            self.inbound.apply(input, &mut plain)?;
            self.carry.extend_from_slice(&plain);
        } else {
            self.carry.extend_from_slice(input);
        }
        trace!(len = input.len(), carried = self.carry.len(), "data in");

        while let Some(event) = self.machine.decode(&mut self.carry)? {
            self.flush_replies(link).await?;
            match event {
                TelnetEvent::Line(line) => {
                    self.handler.on_line(link, line).await?;
                }
                TelnetEvent::Capability(TelnetOption::Compress2, true) => {
                    self.begin_outbound_compression(link).await?;
                    self.handler
                        .on_capability_change(link, TelnetOption::Compress2, true)
                        .await?;
                }
                TelnetEvent::Capability(option, enabled) => {
                    self.handler
                        .on_capability_change(link, option, enabled)
                        .await?;
                }
                TelnetEvent::Subnegotiation(TelnetOption::Compress3, payload) => {
                    self.begin_inbound_decompression()?;
                    self.handler
                        .on_subnegotiation(link, TelnetOption::Compress3, payload)
                        .await?;
                }
                TelnetEvent::Subnegotiation(option, payload) => {
                    self.handler
                        .on_subnegotiation(link, option, payload)
                        .await?;
                }
            }
        }
        self.flush_replies(link).await
    }

    async fn on_disconnect(&mut self) {
        self.handler.on_disconnect().await;
    }
}
