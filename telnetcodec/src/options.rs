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

//! Telnet option identities and per-option negotiation state.

use crate::consts;
use bytes::{BufMut, BytesMut};
use std::collections::HashMap;
use std::fmt;

/// Options this engine is willing to negotiate. Everything else is refused.
const SUPPORTED: [u8; 7] = [
    consts::option::SGA,
    consts::option::TTYPE,
    consts::option::MSDP,
    consts::option::COMPRESS2,
    consts::option::COMPRESS3,
    consts::option::MXP,
    consts::option::GMCP,
];

/// A negotiable Telnet option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// Suppress Go Ahead
    SuppressGoAhead,
    /// Terminal Type
    TerminalType,
    /// Mud Server Data Protocol
    Msdp,
    /// Mud Client Compression Protocol v2 (server to client)
    Compress2,
    /// Mud Client Compression Protocol v3 (client to server)
    Compress3,
    /// Mud eXtension Protocol
    Mxp,
    /// Generic Mud Communication Protocol
    Gmcp,
    /// Any option code this engine does not recognize
    Unknown(u8),
}

impl TelnetOption {
    /// Wire code for this option.
    pub fn code(&self) -> u8 {
        match self {
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::Msdp => consts::option::MSDP,
            TelnetOption::Compress2 => consts::option::COMPRESS2,
            TelnetOption::Compress3 => consts::option::COMPRESS3,
            TelnetOption::Mxp => consts::option::MXP,
            TelnetOption::Gmcp => consts::option::GMCP,
            TelnetOption::Unknown(code) => *code,
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(code: u8) -> Self {
        match code {
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::MSDP => TelnetOption::Msdp,
            consts::option::COMPRESS2 => TelnetOption::Compress2,
            consts::option::COMPRESS3 => TelnetOption::Compress3,
            consts::option::MXP => TelnetOption::Mxp,
            consts::option::GMCP => TelnetOption::Gmcp,
            code => TelnetOption::Unknown(code),
        }
    }
}

impl fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::TerminalType => write!(f, "TerminalType"),
            TelnetOption::Msdp => write!(f, "MSDP"),
            TelnetOption::Compress2 => write!(f, "Compress2"),
            TelnetOption::Compress3 => write!(f, "Compress3"),
            TelnetOption::Mxp => write!(f, "MXP"),
            TelnetOption::Gmcp => write!(f, "GMCP"),
            TelnetOption::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

/// One of the four negotiation verbs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// Sender wants to enable an option on its side
    Will,
    /// Sender refuses or disables an option on its side
    Wont,
    /// Sender asks the peer to enable an option
    Do,
    /// Sender asks the peer to disable an option
    Dont,
}

impl NegotiationVerb {
    /// Wire byte for this verb.
    pub fn code(&self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }

    /// Map a wire byte back to a verb, if it is one.
    pub fn from_code(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(NegotiationVerb::Will),
            consts::WONT => Some(NegotiationVerb::Wont),
            consts::DO => Some(NegotiationVerb::Do),
            consts::DONT => Some(NegotiationVerb::Dont),
            _ => None,
        }
    }
}

impl fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// Negotiation state tracked per supported option.
#[derive(Clone, Copy, Debug, Default)]
struct OptionState {
    enabled: bool,
    last_sent: Option<NegotiationVerb>,
    last_received: Option<NegotiationVerb>,
}

/// Tracks negotiation state for every supported option and answers
/// incoming verbs. Replies are appended to the caller's buffer rather
/// than written directly; the owner decides when they hit the wire.
#[derive(Debug)]
pub(crate) struct OptionTable {
    states: HashMap<u8, OptionState>,
}

impl OptionTable {
    pub(crate) fn new() -> Self {
        OptionTable {
            states: SUPPORTED
                .iter()
                .map(|code| (*code, OptionState::default()))
                .collect(),
        }
    }

    /// True if the option has been negotiated on.
    pub(crate) fn is_enabled(&self, option: TelnetOption) -> bool {
        self.states
            .get(&option.code())
            .map(|state| state.enabled)
            .unwrap_or(false)
    }

    /// Record that we proactively sent `verb` for `option`, so the peer's
    /// eventual acknowledgement does not trigger a redundant reply.
    pub(crate) fn record_sent(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        if let Some(state) = self.states.get_mut(&option.code()) {
            state.last_sent = Some(verb);
        }
    }

    /// Process a received negotiation verb for `code`. Any reply bytes are
    /// appended to `replies`. Returns the option and its new enabled flag
    /// when the verb actually changed state.
    pub(crate) fn receive(
        &mut self,
        verb: NegotiationVerb,
        code: u8,
        replies: &mut BytesMut,
    ) -> Option<(TelnetOption, bool)> {
        let option = TelnetOption::from(code);
        let Some(state) = self.states.get_mut(&code) else {
            // Unsupported option, refuse requests to enable and stay quiet
            // on requests to disable what was never on.
            match verb {
                NegotiationVerb::Do => {
                    replies.put_u8(consts::IAC);
                    replies.put_u8(consts::WONT);
                    replies.put_u8(code);
                }
                NegotiationVerb::Will => {
                    replies.put_u8(consts::IAC);
                    replies.put_u8(consts::DONT);
                    replies.put_u8(code);
                }
                NegotiationVerb::Dont | NegotiationVerb::Wont => {}
            }
            return None;
        };
        state.last_received = Some(verb);
        match verb {
            NegotiationVerb::Do => {
                if state.enabled {
                    return None;
                }
                state.enabled = true;
                if state.last_sent != Some(NegotiationVerb::Will) {
                    state.last_sent = Some(NegotiationVerb::Will);
                    replies.put_u8(consts::IAC);
                    replies.put_u8(consts::WILL);
                    replies.put_u8(code);
                }
                Some((option, true))
            }
            NegotiationVerb::Will => {
                if state.enabled {
                    return None;
                }
                state.enabled = true;
                if state.last_sent != Some(NegotiationVerb::Do) {
                    state.last_sent = Some(NegotiationVerb::Do);
                    replies.put_u8(consts::IAC);
                    replies.put_u8(consts::DO);
                    replies.put_u8(code);
                }
                Some((option, true))
            }
            NegotiationVerb::Dont => {
                if !state.enabled {
                    return None;
                }
                state.enabled = false;
                state.last_sent = Some(NegotiationVerb::Wont);
                replies.put_u8(consts::IAC);
                replies.put_u8(consts::WONT);
                replies.put_u8(code);
                Some((option, false))
            }
            NegotiationVerb::Wont => {
                if !state.enabled {
                    return None;
                }
                state.enabled = false;
                state.last_sent = Some(NegotiationVerb::Dont);
                replies.put_u8(consts::IAC);
                replies.put_u8(consts::DONT);
                replies.put_u8(code);
                Some((option, false))
            }
        }
    }
}
