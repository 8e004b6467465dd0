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

//! Decoded events delivered to the session layer.

use crate::options::TelnetOption;
use bytes::Bytes;

/// An application-visible event produced by the decoder. Protocol
/// bookkeeping (negotiation replies, malformed sequence recovery) is
/// handled inside the machine and never surfaces here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TelnetEvent {
    /// A complete line of user data, terminator stripped.
    Line(Bytes),
    /// An option changed state on either side; `true` means enabled.
    Capability(TelnetOption, bool),
    /// A subnegotiation payload for an enabled option, IAC unescaping
    /// already applied.
    Subnegotiation(TelnetOption, Bytes),
}
