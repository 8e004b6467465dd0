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

//! # Telmux Stream Transforms
//!
//! Pluggable byte-stream transforms for the MUD Client Compression
//! Protocol (MCCP2 server-to-client, MCCP3 client-to-server). A
//! connection starts with [`Passthrough`] on both directions and swaps
//! in a [`Deflater`] or [`Inflater`] when compression is negotiated;
//! the protocol engine never knows which is installed.
//!
//! Transforms are synchronous and incremental: each [`Transform::apply`]
//! call consumes one chunk and appends whatever output the underlying
//! zlib stream can produce, flushed so the peer can decode it without
//! waiting for more input.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

use bytes::BytesMut;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};
use std::io;

/// Output scratch growth, matching the zlib recommended window.
const CHUNK: usize = 8 * 1024;

/// One direction of a connection's byte pipeline.
///
/// Implementations are stateful streams: bytes fed across successive
/// `apply` calls form one logical stream, so a chunk boundary may fall
/// anywhere.
pub trait Transform: Send {
    /// False for the identity transform, true once a codec is installed.
    /// Lets callers skip buffer shuffling on the common uncompressed path.
    fn active(&self) -> bool;

    /// Consume `input` and append the transformed bytes to `dst`.
    fn apply(&mut self, input: &[u8], dst: &mut BytesMut) -> io::Result<()>;
}

/// The identity transform. Every connection starts with one in each
/// direction.
#[derive(Debug, Default)]
pub struct Passthrough;

impl Transform for Passthrough {
    fn active(&self) -> bool {
        false
    }

    fn apply(&mut self, input: &[u8], dst: &mut BytesMut) -> io::Result<()> {
        dst.extend_from_slice(input);
        Ok(())
    }
}

/// Outbound zlib compressor for MCCP2. Each chunk is sync-flushed so the
/// client can decompress it immediately.
pub struct Deflater {
    inner: Compress,
    scratch: Vec<u8>,
}

impl Deflater {
    /// Create a compressor with the default level and a zlib header,
    /// which is what MCCP2 clients expect.
    #[must_use]
    pub fn new() -> Self {
        Deflater {
            inner: Compress::new(Compression::default(), true),
            scratch: Vec::with_capacity(CHUNK),
        }
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Deflater::new()
    }
}

impl Transform for Deflater {
    fn active(&self) -> bool {
        true
    }

    fn apply(&mut self, input: &[u8], dst: &mut BytesMut) -> io::Result<()> {
        self.scratch.clear();
        let mut offset = 0;
        loop {
            if self.scratch.len() == self.scratch.capacity() {
                self.scratch.reserve(CHUNK);
            }
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .compress_vec(&input[offset..], &mut self.scratch, FlushCompress::Sync)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            offset += (self.inner.total_in() - before_in) as usize;
            let produced = self.inner.total_out() - before_out;
            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    if offset >= input.len() && produced == 0 {
                        break;
                    }
                }
            }
        }
        dst.extend_from_slice(&self.scratch);
        Ok(())
    }
}

/// Inbound zlib decompressor for MCCP3. Tolerates payloads split at
/// arbitrary boundaries; corrupt streams surface as `InvalidData`.
pub struct Inflater {
    inner: Decompress,
    scratch: Vec<u8>,
}

impl Inflater {
    /// Create a decompressor expecting a zlib header.
    #[must_use]
    pub fn new() -> Self {
        Inflater {
            inner: Decompress::new(true),
            scratch: Vec::with_capacity(CHUNK),
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Inflater::new()
    }
}

impl Transform for Inflater {
    fn active(&self) -> bool {
        true
    }

    fn apply(&mut self, input: &[u8], dst: &mut BytesMut) -> io::Result<()> {
        self.scratch.clear();
        let mut offset = 0;
        loop {
            if self.scratch.len() == self.scratch.capacity() {
                self.scratch.reserve(CHUNK);
            }
            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();
            let status = self
                .inner
                .decompress_vec(&input[offset..], &mut self.scratch, FlushDecompress::None)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            offset += (self.inner.total_in() - before_in) as usize;
            let produced = self.inner.total_out() - before_out;
            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    if offset >= input.len() && produced == 0 {
                        break;
                    }
                }
            }
        }
        dst.extend_from_slice(&self.scratch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_copies_and_reports_inactive() {
        let mut transform = Passthrough;
        assert!(!transform.active());
        let mut dst = BytesMut::new();
        transform.apply(b"unchanged", &mut dst).unwrap();
        assert_eq!(&dst[..], b"unchanged");
    }

    #[test]
    fn deflate_then_inflate_round_trips() {
        let mut deflater = Deflater::new();
        let mut inflater = Inflater::new();
        assert!(deflater.active());
        assert!(inflater.active());

        let original = b"You see a small wooden door to the north.\r\n".repeat(32);
        let mut compressed = BytesMut::new();
        deflater.apply(&original, &mut compressed).unwrap();
        assert!(!compressed.is_empty());
        assert!(compressed.len() < original.len());

        let mut recovered = BytesMut::new();
        inflater.apply(&compressed, &mut recovered).unwrap();
        assert_eq!(&recovered[..], &original[..]);
    }

    #[test]
    fn chunked_stream_round_trips() {
        let mut deflater = Deflater::new();
        let mut inflater = Inflater::new();
        let mut recovered = BytesMut::new();

        // each chunk is sync flushed, so it must decode as it arrives,
        // even split at awkward boundaries
        for chunk in [&b"first "[..], b"second ", b"", b"third"] {
            let mut compressed = BytesMut::new();
            deflater.apply(chunk, &mut compressed).unwrap();
            for byte in &compressed {
                inflater.apply(&[*byte], &mut recovered).unwrap();
            }
        }
        assert_eq!(&recovered[..], b"first second third");
    }

    #[test]
    fn corrupt_stream_is_an_error() {
        let mut inflater = Inflater::new();
        let mut dst = BytesMut::new();
        let err = inflater
            .apply(&[0x00, 0x01, 0x02, 0x03, 0xFF, 0xFE], &mut dst)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
