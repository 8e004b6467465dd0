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

//! Codec error and result types.

use std::io;

/// Convenience alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors surfaced through the codec traits. Malformed input from the
/// peer is never an error; the machine recovers in place. Only transport
/// failures propagate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Underlying transport failure.
    #[error("io error during {operation}: {kind}")]
    Io {
        /// Error kind reported by the transport.
        kind: io::ErrorKind,
        /// What the codec was doing at the time.
        operation: String,
    },
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        CodecError::Io {
            kind: err.kind(),
            operation: "framed stream".to_string(),
        }
    }
}
