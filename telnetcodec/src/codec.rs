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

//! The Telnet byte-stream state machine, exposed as a [`tokio_util`]
//! [`Decoder`]/[`Encoder`] pair.

use crate::consts;
use crate::event::TelnetEvent;
use crate::frame::{encode_line, TelnetFrame};
use crate::options::{NegotiationVerb, OptionTable, TelnetOption};
use crate::result::CodecError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// Ceiling for the line buffer and the subnegotiation buffer. A peer
/// that exceeds it loses the oversized payload, not the connection.
pub const MAX_BUFFER: usize = 64 * 1024;

/// Parser state. Each variant carries exactly the context it needs, so
/// an invalid combination of sub-state and buffer is unrepresentable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum MachineState {
    /// Plain data bytes accumulate into the line buffer.
    Data,
    /// An IAC was seen; the next byte selects a command.
    Escaped,
    /// A negotiation verb was seen; the next byte is the option code.
    Command(NegotiationVerb),
    /// A CR was seen; LF completes the line.
    NewLine,
    /// `IAC SB` was seen; the next byte is the subnegotiation option.
    SubNegotiation,
    /// Payload bytes accumulate for the given option code.
    InSubNegotiation(u8),
    /// An IAC inside a subnegotiation; SE ends it, IAC is a literal 255.
    SubEscaped(u8),
}

/// A per-connection Telnet protocol engine.
///
/// The machine consumes raw inbound bytes and yields [`TelnetEvent`]s:
/// completed lines, option capability changes, and subnegotiation
/// payloads. Negotiation replies it owes the peer accumulate internally;
/// the connection drains them with [`take_replies`](Self::take_replies)
/// and writes them ahead of application data. Malformed input never
/// fails the stream - the machine logs, discards, and resynchronizes
/// at [`MachineState::Data`].
#[derive(Debug)]
pub struct TelnetMachine {
    state: MachineState,
    line: BytesMut,
    sub: BytesMut,
    sub_overflow: bool,
    line_overflow: bool,
    replies: BytesMut,
    options: OptionTable,
}

impl TelnetMachine {
    /// Create a machine in its initial state with no options enabled.
    pub fn new() -> Self {
        TelnetMachine {
            state: MachineState::Data,
            line: BytesMut::new(),
            sub: BytesMut::new(),
            sub_overflow: false,
            line_overflow: false,
            replies: BytesMut::new(),
            options: OptionTable::new(),
        }
    }

    /// True if `option` has been negotiated on.
    pub fn is_enabled(&self, option: TelnetOption) -> bool {
        self.options.is_enabled(option)
    }

    /// Drain any pending negotiation replies. Returns `None` when the
    /// machine owes the peer nothing.
    pub fn take_replies(&mut self) -> Option<Bytes> {
        if self.replies.is_empty() {
            None
        } else {
            Some(self.replies.split().freeze())
        }
    }

    /// Proactively offer `verb` for `option`: the frame is queued behind
    /// [`take_replies`](Self::take_replies) and the send is recorded so
    /// the peer's acknowledgement does not trigger a redundant reply.
    pub fn offer(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        self.options.record_sent(verb, option);
        self.replies.put_u8(consts::IAC);
        self.replies.put_u8(verb.code());
        self.replies.put_u8(option.code());
    }

    fn push_line_byte(&mut self, byte: u8) {
        if self.line.len() >= MAX_BUFFER {
            if !self.line_overflow {
                warn!(limit = MAX_BUFFER, "line buffer overflow, discarding line");
                self.line_overflow = true;
            }
            self.line.clear();
        }
        self.line.put_u8(byte);
    }

    fn push_sub_byte(&mut self, byte: u8) {
        if self.sub.len() >= MAX_BUFFER {
            if !self.sub_overflow {
                warn!(
                    limit = MAX_BUFFER,
                    "subnegotiation buffer overflow, payload will be discarded"
                );
                self.sub_overflow = true;
            }
            self.sub.clear();
            return;
        }
        self.sub.put_u8(byte);
    }

    /// Finish the accumulated line. An overflowed line is a protocol
    /// violation; its remainder is discarded with no event.
    fn finish_line(&mut self) -> Option<TelnetEvent> {
        let line = self.line.split().freeze();
        if self.line_overflow {
            self.line_overflow = false;
            warn!(tail = line.len(), "dropping remainder of oversized line");
            return None;
        }
        Some(TelnetEvent::Line(line))
    }

    /// Finish a subnegotiation for `code`. Returns an event only when the
    /// option is enabled and the payload survived intact.
    fn finish_subnegotiation(&mut self, code: u8) -> Option<TelnetEvent> {
        let payload = self.sub.split().freeze();
        let option = TelnetOption::from(code);
        if self.sub_overflow {
            self.sub_overflow = false;
            warn!(%option, "dropping oversized subnegotiation payload");
            return None;
        }
        if !self.options.is_enabled(option) {
            warn!(%option, len = payload.len(), "subnegotiation for disabled option discarded");
            return None;
        }
        Some(TelnetEvent::Subnegotiation(option, payload))
    }
}

impl Default for TelnetMachine {
    fn default() -> Self {
        TelnetMachine::new()
    }
}

impl Decoder for TelnetMachine {
    type Item = TelnetEvent;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match (self.state, byte) {
                // Data
                (MachineState::Data, consts::IAC) => {
                    self.state = MachineState::Escaped;
                }
                (MachineState::Data, consts::CR) => {
                    self.state = MachineState::NewLine;
                }
                (MachineState::Data, byte) => {
                    self.push_line_byte(byte);
                }
                // Escaped
                (MachineState::Escaped, consts::IAC) => {
                    self.state = MachineState::Data;
                    self.push_line_byte(consts::IAC);
                }
                (MachineState::Escaped, consts::SB) => {
                    self.state = MachineState::SubNegotiation;
                }
                (MachineState::Escaped, byte) => {
                    if let Some(verb) = NegotiationVerb::from_code(byte) {
                        self.state = MachineState::Command(verb);
                    } else {
                        // NOP, GA, AYT and friends carry no payload.
                        trace!(command = byte, "single byte command ignored");
                        self.state = MachineState::Data;
                    }
                }
                // Command
                (MachineState::Command(verb), code) => {
                    self.state = MachineState::Data;
                    if let Some((option, enabled)) =
                        self.options.receive(verb, code, &mut self.replies)
                    {
                        trace!(%verb, %option, enabled, "option state changed");
                        return Ok(Some(TelnetEvent::Capability(option, enabled)));
                    }
                }
                // NewLine
                (MachineState::NewLine, consts::LF) => {
                    self.state = MachineState::Data;
                    if let Some(event) = self.finish_line() {
                        return Ok(Some(event));
                    }
                }
                (MachineState::NewLine, byte) => {
                    // Bare CR terminates the line; this byte opens the next.
                    self.state = MachineState::Data;
                    let event = self.finish_line();
                    self.push_line_byte(byte);
                    if let Some(event) = event {
                        return Ok(Some(event));
                    }
                }
                // SubNegotiation
                (MachineState::SubNegotiation, code) => {
                    self.sub.clear();
                    self.sub_overflow = false;
                    self.state = MachineState::InSubNegotiation(code);
                }
                // InSubNegotiation
                (MachineState::InSubNegotiation(code), consts::IAC) => {
                    self.state = MachineState::SubEscaped(code);
                }
                (MachineState::InSubNegotiation(_), byte) => {
                    self.push_sub_byte(byte);
                }
                // SubEscaped
                (MachineState::SubEscaped(code), consts::SE) => {
                    self.state = MachineState::Data;
                    if let Some(event) = self.finish_subnegotiation(code) {
                        return Ok(Some(event));
                    }
                }
                (MachineState::SubEscaped(code), consts::IAC) => {
                    self.state = MachineState::InSubNegotiation(code);
                    self.push_sub_byte(consts::IAC);
                }
                (MachineState::SubEscaped(code), byte) => {
                    warn!(
                        option = code,
                        byte, "malformed subnegotiation terminator, discarding sequence"
                    );
                    self.sub.clear();
                    self.sub_overflow = false;
                    self.state = MachineState::Data;
                }
            }
        }
        Ok(None)
    }
}

impl Encoder<TelnetFrame> for TelnetMachine {
    type Error = CodecError;

    fn encode(&mut self, frame: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.encode(dst);
        Ok(())
    }
}

impl Encoder<&str> for TelnetMachine {
    type Error = CodecError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_line(line.as_bytes(), dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(machine: &mut TelnetMachine, input: &[u8]) -> Vec<TelnetEvent> {
        let mut src = BytesMut::from(input);
        let mut events = Vec::new();
        while let Some(event) = machine.decode(&mut src).unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn crlf_terminates_line() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, b"hello\r\n");
        assert_eq!(events, vec![TelnetEvent::Line(Bytes::from_static(b"hello"))]);
    }

    #[test]
    fn bare_cr_terminates_line_and_byte_opens_next() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, b"one\rtwo\r\n");
        assert_eq!(
            events,
            vec![
                TelnetEvent::Line(Bytes::from_static(b"one")),
                TelnetEvent::Line(Bytes::from_static(b"two")),
            ]
        );
    }

    #[test]
    fn doubled_iac_is_literal_data() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, &[b'a', consts::IAC, consts::IAC, b'b', consts::CR, consts::LF]);
        assert_eq!(
            events,
            vec![TelnetEvent::Line(Bytes::from(vec![b'a', 0xFF, b'b']))]
        );
    }

    #[test]
    fn line_split_across_feeds() {
        let mut machine = TelnetMachine::new();
        assert!(drain(&mut machine, b"hel").is_empty());
        assert!(drain(&mut machine, b"lo\r").is_empty());
        let events = drain(&mut machine, b"\n");
        assert_eq!(events, vec![TelnetEvent::Line(Bytes::from_static(b"hello"))]);
    }

    #[test]
    fn do_supported_option_enables_and_replies_will() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, &[consts::IAC, consts::DO, consts::option::SGA]);
        assert_eq!(
            events,
            vec![TelnetEvent::Capability(TelnetOption::SuppressGoAhead, true)]
        );
        assert!(machine.is_enabled(TelnetOption::SuppressGoAhead));
        let replies = machine.take_replies().unwrap();
        assert_eq!(&replies[..], &[consts::IAC, consts::WILL, consts::option::SGA]);
    }

    #[test]
    fn repeated_do_replies_once() {
        let mut machine = TelnetMachine::new();
        drain(&mut machine, &[consts::IAC, consts::DO, consts::option::SGA]);
        machine.take_replies();
        let events = drain(&mut machine, &[consts::IAC, consts::DO, consts::option::SGA]);
        assert!(events.is_empty());
        assert!(machine.take_replies().is_none());
    }

    #[test]
    fn do_unknown_option_refused() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, &[consts::IAC, consts::DO, 123]);
        assert!(events.is_empty());
        let replies = machine.take_replies().unwrap();
        assert_eq!(&replies[..], &[consts::IAC, consts::WONT, 123]);
    }

    #[test]
    fn will_unknown_option_refused() {
        let mut machine = TelnetMachine::new();
        let events = drain(&mut machine, &[consts::IAC, consts::WILL, 200]);
        assert!(events.is_empty());
        let replies = machine.take_replies().unwrap();
        assert_eq!(&replies[..], &[consts::IAC, consts::DONT, 200]);
    }

    #[test]
    fn dont_disables_enabled_option() {
        let mut machine = TelnetMachine::new();
        drain(&mut machine, &[consts::IAC, consts::DO, consts::option::GMCP]);
        machine.take_replies();
        let events = drain(&mut machine, &[consts::IAC, consts::DONT, consts::option::GMCP]);
        assert_eq!(events, vec![TelnetEvent::Capability(TelnetOption::Gmcp, false)]);
        assert!(!machine.is_enabled(TelnetOption::Gmcp));
        let replies = machine.take_replies().unwrap();
        assert_eq!(&replies[..], &[consts::IAC, consts::WONT, consts::option::GMCP]);
    }

    #[test]
    fn acknowledgement_of_offer_does_not_reecho() {
        let mut machine = TelnetMachine::new();
        machine.offer(NegotiationVerb::Will, TelnetOption::Compress2);
        let offered = machine.take_replies().unwrap();
        assert_eq!(
            &offered[..],
            &[consts::IAC, consts::WILL, consts::option::COMPRESS2]
        );
        let events = drain(&mut machine, &[consts::IAC, consts::DO, consts::option::COMPRESS2]);
        assert_eq!(
            events,
            vec![TelnetEvent::Capability(TelnetOption::Compress2, true)]
        );
        assert!(machine.take_replies().is_none());
    }

    #[test]
    fn subnegotiation_dispatched_when_enabled() {
        let mut machine = TelnetMachine::new();
        drain(&mut machine, &[consts::IAC, consts::DO, consts::option::GMCP]);
        machine.take_replies();
        let mut input = vec![consts::IAC, consts::SB, consts::option::GMCP];
        input.extend_from_slice(b"Core.Hello");
        input.extend_from_slice(&[consts::IAC, consts::SE]);
        let events = drain(&mut machine, &input);
        assert_eq!(
            events,
            vec![TelnetEvent::Subnegotiation(
                TelnetOption::Gmcp,
                Bytes::from_static(b"Core.Hello")
            )]
        );
    }

    #[test]
    fn subnegotiation_payload_iac_undoubled() {
        let mut machine = TelnetMachine::new();
        drain(&mut machine, &[consts::IAC, consts::DO, consts::option::MSDP]);
        machine.take_replies();
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::MSDP,
            1,
            consts::IAC,
            consts::IAC,
            2,
            consts::IAC,
            consts::SE,
        ];
        let events = drain(&mut machine, &input);
        assert_eq!(
            events,
            vec![TelnetEvent::Subnegotiation(
                TelnetOption::Msdp,
                Bytes::from(vec![1, 0xFF, 2])
            )]
        );
    }

    #[test]
    fn subnegotiation_for_disabled_option_discarded() {
        let mut machine = TelnetMachine::new();
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::GMCP,
            b'x',
            consts::IAC,
            consts::SE,
        ];
        assert!(drain(&mut machine, &input).is_empty());
    }

    #[test]
    fn malformed_subnegotiation_recovers() {
        let mut machine = TelnetMachine::new();
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::GMCP,
            b'x',
            consts::IAC,
            b'q', // not SE, not IAC
        ];
        assert!(drain(&mut machine, &input).is_empty());
        let events = drain(&mut machine, b"still here\r\n");
        assert_eq!(
            events,
            vec![TelnetEvent::Line(Bytes::from_static(b"still here"))]
        );
    }

    #[tracing_test::traced_test]
    #[test]
    fn malformed_subnegotiation_warns() {
        let mut machine = TelnetMachine::new();
        let input = [
            consts::IAC,
            consts::SB,
            consts::option::MSDP,
            b'a',
            consts::IAC,
            b'!',
        ];
        assert!(drain(&mut machine, &input).is_empty());
        assert!(logs_contain("malformed subnegotiation"));
    }

    #[test]
    fn single_byte_commands_are_transparent() {
        let mut machine = TelnetMachine::new();
        let input = [
            b'a',
            consts::IAC,
            consts::NOP,
            b'b',
            consts::IAC,
            consts::GA,
            consts::CR,
            consts::LF,
        ];
        let events = drain(&mut machine, &input);
        assert_eq!(events, vec![TelnetEvent::Line(Bytes::from_static(b"ab"))]);
    }

    #[test]
    fn oversized_line_is_discarded() {
        let mut machine = TelnetMachine::new();
        let big = vec![b'x'; MAX_BUFFER + 10];
        assert!(drain(&mut machine, &big).is_empty());
        // the terminator drops the oversized line, no fragment escapes
        assert!(drain(&mut machine, b"\r\n").is_empty());
        let events = drain(&mut machine, b"next\r\n");
        assert_eq!(events, vec![TelnetEvent::Line(Bytes::from_static(b"next"))]);
    }

    #[test]
    fn oversized_line_before_bare_cr_is_discarded() {
        let mut machine = TelnetMachine::new();
        let big = vec![b'y'; MAX_BUFFER + 1];
        assert!(drain(&mut machine, &big).is_empty());
        // bare CR boundary drops the oversized line; the new line after
        // it assembles normally
        let events = drain(&mut machine, b"\rclean\r\n");
        assert_eq!(
            events,
            vec![TelnetEvent::Line(Bytes::from_static(b"clean"))]
        );
    }

    #[test]
    fn encode_line_doubles_iac_and_appends_crlf() {
        let mut machine = TelnetMachine::new();
        let mut dst = BytesMut::new();
        Encoder::<&str>::encode(&mut machine, "ok", &mut dst).unwrap();
        assert_eq!(&dst[..], b"ok\r\n");
        dst.clear();
        encode_line(&[b'a', 0xFF, b'b'], &mut dst);
        assert_eq!(&dst[..], &[b'a', 0xFF, 0xFF, b'b', consts::CR, consts::LF]);
    }

    #[test]
    fn encode_subnegotiate_frame() {
        let mut machine = TelnetMachine::new();
        let mut dst = BytesMut::new();
        let frame = TelnetFrame::Subnegotiate(TelnetOption::Msdp, Bytes::from(vec![1, 0xFF, 2]));
        Encoder::<TelnetFrame>::encode(&mut machine, frame, &mut dst).unwrap();
        assert_eq!(
            &dst[..],
            &[
                consts::IAC,
                consts::SB,
                consts::option::MSDP,
                1,
                consts::IAC,
                consts::IAC,
                2,
                consts::IAC,
                consts::SE,
            ]
        );
    }
}
