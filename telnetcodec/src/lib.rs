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

//! # Telmux Telnet Protocol Codec
//!
//! A line-oriented Telnet protocol engine for text-game and chat servers,
//! built on `tokio_util::codec`. Each connection owns one
//! [`TelnetMachine`]; raw inbound bytes go in, semantic [`TelnetEvent`]s
//! come out, and the protocol chatter the engine owes the peer is queued
//! internally.
//!
//! ## Overview
//!
//! The Telnet protocol (RFC 854) multiplexes user data and control
//! sequences over one TCP stream, escaped by the IAC byte (0xFF). This
//! engine handles:
//!
//! - **Line assembly**: CR LF terminated lines, with bare-CR tolerance
//!   for clients that never send the LF
//! - **IAC escaping**: `IAC IAC` is a literal 0xFF in both directions
//! - **Option negotiation**: DO, DONT, WILL, WONT with per-option state,
//!   answered idempotently and automatically
//! - **Subnegotiation**: `IAC SB <option> ... IAC SE` payload capture
//!   with escaped-IAC unstuffing
//!
//! ## Core Components
//!
//! ### [`TelnetMachine`]
//!
//! The per-connection state machine. Implements [`Decoder`] yielding
//! [`TelnetEvent`]s and [`Encoder`] for [`TelnetFrame`]s and `&str`
//! lines. Negotiation replies accumulate inside the machine; drain them
//! with [`TelnetMachine::take_replies`] before writing application data
//! so protocol answers never trail user output.
//!
//! ### [`TelnetEvent`]
//!
//! What the application sees: complete [`Line`](TelnetEvent::Line)s,
//! [`Capability`](TelnetEvent::Capability) changes when an option
//! toggles, and [`Subnegotiation`](TelnetEvent::Subnegotiation) payloads
//! for options that are actually enabled.
//!
//! ### [`TelnetFrame`]
//!
//! Outbound control frames with stateless wire encoding, plus
//! [`encode_line`] for IAC-safe CRLF lines.
//!
//! ## Usage Example
//!
//! ```rust
//! use telmux_telnetcodec::{TelnetEvent, TelnetMachine};
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! # fn example() -> Result<(), telmux_telnetcodec::CodecError> {
//! let mut machine = TelnetMachine::new();
//! let mut input = BytesMut::from(&b"look north\r\n"[..]);
//! while let Some(event) = machine.decode(&mut input)? {
//!     if let TelnetEvent::Line(line) = event {
//!         println!("command: {}", String::from_utf8_lossy(&line));
//!     }
//! }
//! if let Some(replies) = machine.take_replies() {
//!     // write these to the peer before any application output
//!     let _ = replies;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Robustness
//!
//! Malformed peer input is never fatal. An unterminated or misterminated
//! subnegotiation is discarded with a warning and the machine resumes
//! parsing at the data state; oversized line or subnegotiation buffers
//! are capped at [`MAX_BUFFER`] and shed rather than growing without
//! bound. Only transport level failures surface as [`CodecError`].
//!
//! ## Supported Options
//!
//! Suppress Go Ahead, Terminal Type, MSDP, MCCP2/MCCP3 (Compress2 and
//! Compress3), MXP and GMCP. Requests for anything else are refused
//! with WONT/DONT. See [`TelnetOption`].
//!
//! ## Thread Safety
//!
//! `TelnetMachine` is not thread-safe; each connection owns its own
//! instance.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod event;
mod frame;
mod options;
mod result;

pub use self::codec::{MAX_BUFFER, TelnetMachine};
pub use self::event::TelnetEvent;
pub use self::frame::{TelnetFrame, encode_line};
pub use self::options::{NegotiationVerb, TelnetOption};
pub use self::result::{CodecError, CodecResult};
