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

//! Outbound Telnet frames and their wire encoding.

use crate::consts;
use crate::options::TelnetOption;
use bytes::{BufMut, Bytes, BytesMut};

/// An outbound protocol frame. Encoding is stateless; option bookkeeping
/// lives in the machine, which records what it sends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TelnetFrame {
    /// A single data byte, doubled on the wire if it is IAC.
    Data(u8),
    /// `IAC WILL <option>`
    Will(TelnetOption),
    /// `IAC WONT <option>`
    Wont(TelnetOption),
    /// `IAC DO <option>`
    Do(TelnetOption),
    /// `IAC DONT <option>`
    Dont(TelnetOption),
    /// `IAC SB <option> <payload> IAC SE`, payload IAC bytes doubled.
    Subnegotiate(TelnetOption, Bytes),
}

impl TelnetFrame {
    /// Append this frame's wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            TelnetFrame::Data(byte) => {
                if *byte == consts::IAC {
                    dst.put_u8(consts::IAC);
                }
                dst.put_u8(*byte);
            }
            TelnetFrame::Will(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WILL);
                dst.put_u8(option.code());
            }
            TelnetFrame::Wont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WONT);
                dst.put_u8(option.code());
            }
            TelnetFrame::Do(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DO);
                dst.put_u8(option.code());
            }
            TelnetFrame::Dont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DONT);
                dst.put_u8(option.code());
            }
            TelnetFrame::Subnegotiate(option, payload) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SB);
                dst.put_u8(option.code());
                for byte in payload.iter() {
                    if *byte == consts::IAC {
                        dst.put_u8(consts::IAC);
                    }
                    dst.put_u8(*byte);
                }
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::SE);
            }
        }
    }
}

/// Append `text` to `dst` with IAC bytes doubled and a CRLF terminator.
pub fn encode_line(text: &[u8], dst: &mut BytesMut) {
    dst.reserve(text.len() + 2);
    for byte in text {
        if *byte == consts::IAC {
            dst.put_u8(consts::IAC);
        }
        dst.put_u8(*byte);
    }
    dst.put_u8(consts::CR);
    dst.put_u8(consts::LF);
}
