//! # Length-Prefixed JSON Framing
//!
//! Wire format of the gateway's TCP microservice transport:
//!
//! ```text
//! <len>#<json><len>#<json>...
//! ```
//!
//! `len` is decimal and counts UTF-16 code units of the JSON text, not bytes.
//! `"cédula"` is 6 units (8 bytes); a character outside the BMP is 2 units.

use thiserror::Error;

/// Largest frame accepted, in UTF-16 units.
pub const MAX_FRAME_UNITS: usize = 1 << 20;

/// Longest length prefix accepted before the `#`.
const MAX_PREFIX_DIGITS: usize = 10;

const DELIMITER: u8 = b'#';

/// Framing violations. The connection cannot be resynchronised after one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("corrupted length value {0:?}")]
    CorruptedLength(String),

    #[error("frame of {0} units exceeds the {MAX_FRAME_UNITS} unit limit")]
    TooLarge(usize),

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("frame length ends inside a surrogate pair")]
    SplitCharacter,
}

/// Incremental decoder over a byte stream.
///
/// Progress through a partial frame is kept between reads, so each byte is
/// validated and counted once however the frame is split.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Body offset and declared length of the frame being assembled.
    header: Option<(usize, usize)>,
    /// Body bytes already counted, always on a character boundary.
    scanned: usize,
    /// UTF-16 units in the counted bytes.
    units: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the socket.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Result<Option<String>, FrameError> {
        let (start, len) = match self.header {
            Some(header) => header,
            None => {
                let prefix_window = self.buffer.len().min(MAX_PREFIX_DIGITS + 1);
                let Some(hash) = self.buffer[..prefix_window]
                    .iter()
                    .position(|b| *b == DELIMITER)
                else {
                    if self.buffer.len() > MAX_PREFIX_DIGITS
                        || !self.buffer.iter().all(u8::is_ascii_digit)
                    {
                        return Err(corrupted(&self.buffer));
                    }
                    return Ok(None);
                };
                let header = (hash + 1, parse_length(&self.buffer[..hash])?);
                self.header = Some(header);
                header
            }
        };

        let unscanned = &self.buffer[start + self.scanned..];

        // A read can stop in the middle of a multi-byte character.
        let (valid, invalid_tail) = match std::str::from_utf8(unscanned) {
            Ok(text) => (text, false),
            Err(e) => (
                std::str::from_utf8(&unscanned[..e.valid_up_to()])
                    .map_err(|_| FrameError::InvalidUtf8)?,
                e.error_len().is_some(),
            ),
        };

        let (bytes, units) = advance(valid, len - self.units)?;
        self.scanned += bytes;
        self.units += units;

        if self.units < len {
            if invalid_tail {
                return Err(FrameError::InvalidUtf8);
            }
            return Ok(None);
        }

        let end = start + self.scanned;
        let frame = String::from_utf8(self.buffer[start..end].to_vec())
            .map_err(|_| FrameError::InvalidUtf8)?;
        self.buffer.drain(..end);
        self.header = None;
        self.scanned = 0;
        self.units = 0;
        Ok(Some(frame))
    }
}

/// Frame one message.
pub fn encode_frame(message: &str) -> String {
    format!("{}#{}", message.encode_utf16().count(), message)
}

fn parse_length(prefix: &[u8]) -> Result<usize, FrameError> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_DIGITS || !prefix.iter().all(u8::is_ascii_digit)
    {
        return Err(corrupted(prefix));
    }
    let len: usize = std::str::from_utf8(prefix)
        .ok()
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| corrupted(prefix))?;

    if len > MAX_FRAME_UNITS {
        return Err(FrameError::TooLarge(len));
    }
    Ok(len)
}

/// Walk `text` until `wanted` UTF-16 units are counted or the text ends.
/// Returns the byte offset reached and the units counted up to it.
fn advance(text: &str, wanted: usize) -> Result<(usize, usize), FrameError> {
    let mut counted = 0;
    for (offset, ch) in text.char_indices() {
        if counted == wanted {
            return Ok((offset, counted));
        }
        counted += ch.len_utf16();
        if counted > wanted {
            return Err(FrameError::SplitCharacter);
        }
    }
    Ok((text.len(), counted))
}

fn corrupted(prefix: &[u8]) -> FrameError {
    FrameError::CorruptedLength(String::from_utf8_lossy(prefix).into_owned())
}
