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

//! Property tests for the Telnet machine
//!
//! Exhaustive randomized checks of the parsing invariants: line fidelity
//! for control-free input, subnegotiation round trips, and crash freedom
//! on arbitrary byte garbage.

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use telmux_telnetcodec::{
    TelnetEvent, TelnetFrame, TelnetMachine, TelnetOption, consts,
};
use tokio_util::codec::{Decoder, Encoder};

fn decode_all(machine: &mut TelnetMachine, input: &[u8]) -> Vec<TelnetEvent> {
    let mut buffer = BytesMut::from(input);
    let mut events = Vec::new();
    while let Some(event) = machine.decode(&mut buffer).unwrap() {
        events.push(event);
    }
    events
}

/// A line body free of CR, LF and IAC, short enough to never overflow.
fn plain_line() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        (0u8..=254).prop_filter("no CR/LF", |b| *b != consts::CR && *b != consts::LF),
        0..256,
    )
}

proptest! {
    /// CRLF-delimited, IAC-free input reproduces every line exactly.
    #[test]
    fn control_free_lines_reproduce_exactly(lines in proptest::collection::vec(plain_line(), 1..8)) {
        let mut wire = Vec::new();
        for line in &lines {
            wire.extend_from_slice(line);
            wire.push(consts::CR);
            wire.push(consts::LF);
        }
        let mut machine = TelnetMachine::new();
        let events = decode_all(&mut machine, &wire);
        let expected: Vec<TelnetEvent> = lines
            .iter()
            .map(|line| TelnetEvent::Line(Bytes::from(line.clone())))
            .collect();
        prop_assert_eq!(events, expected);
        prop_assert!(machine.take_replies().is_none());
    }

    /// Encoded subnegotiation payloads survive the wire, IAC bytes included.
    #[test]
    fn subnegotiation_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut sender = TelnetMachine::new();
        let mut wire = BytesMut::new();
        Encoder::<TelnetFrame>::encode(
            &mut sender,
            TelnetFrame::Subnegotiate(TelnetOption::Gmcp, Bytes::from(payload.clone())),
            &mut wire,
        )
        .unwrap();

        let mut receiver = TelnetMachine::new();
        decode_all(&mut receiver, &[consts::IAC, consts::DO, consts::option::GMCP]);
        receiver.take_replies();
        let events = decode_all(&mut receiver, &wire);
        prop_assert_eq!(
            events,
            vec![TelnetEvent::Subnegotiation(TelnetOption::Gmcp, Bytes::from(payload))]
        );
    }

    /// Arbitrary garbage never panics and never wedges the parser.
    #[test]
    fn arbitrary_bytes_never_wedge_the_machine(garbage in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut machine = TelnetMachine::new();
        let _ = decode_all(&mut machine, &garbage);
        machine.take_replies();

        // A fresh, well-formed exchange still parses. IAC SE twice lands
        // the machine back in the data state from any parser state, and
        // the CRLF flushes whatever half-line the garbage left behind.
        let mut tail = vec![
            consts::IAC,
            consts::SE,
            consts::IAC,
            consts::SE,
            consts::CR,
            consts::LF,
        ];
        tail.extend_from_slice(b"probe\r\n");
        let events = decode_all(&mut machine, &tail);
        let last = events.last().expect("probe line must decode");
        prop_assert_eq!(last, &TelnetEvent::Line(Bytes::from_static(b"probe")));
    }
}
