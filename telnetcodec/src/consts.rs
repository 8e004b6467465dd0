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

//! Telnet control byte values per [RFC 854](https://tools.ietf.org/html/rfc854)
//! and [RFC 855](https://tools.ietf.org/html/rfc855).

/// Carriage Return
pub const CR: u8 = 13;
/// Line Feed
pub const LF: u8 = 10;

/// End of subnegotiation parameters
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark - end of urgent data stream
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Option negotiation: sender wants to enable an option locally
pub const WILL: u8 = 251;
/// Option negotiation: sender refuses or disables an option locally
pub const WONT: u8 = 252;
/// Option negotiation: sender asks the peer to enable an option
pub const DO: u8 = 253;
/// Option negotiation: sender asks the peer to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command - escape byte introducing every control sequence
pub const IAC: u8 = 255;

/// Negotiable option codes supported by this engine.
pub mod option {
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 3;
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    pub const TTYPE: u8 = 24;
    /// Mud Server Data Protocol [MSDP](https://tintin.sourceforge.io/protocols/msdp/)
    pub const MSDP: u8 = 69;
    /// Mud Client Compression Protocol v2, server to client [MCCP](https://tintin.sourceforge.io/protocols/mccp/)
    pub const COMPRESS2: u8 = 86;
    /// Mud Client Compression Protocol v3, client to server
    pub const COMPRESS3: u8 = 87;
    /// Mud eXtension Protocol [MXP](https://www.zuggsoft.com/zmud/mxp.htm)
    pub const MXP: u8 = 91;
    /// Generic Mud Communication Protocol [GMCP](https://www.gammon.com.au/gmcp)
    pub const GMCP: u8 = 201;
}
