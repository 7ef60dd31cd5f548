//! Message framing for NETCONF over SSH, [RFC 6242](https://www.rfc-editor.org/rfc/rfc6242).

use core::fmt;
use std::string::FromUtf8Error;

//
pub const END_OF_MESSAGE: &[u8] = b"]]>]]>";
pub const END_OF_CHUNKS: &[u8] = b"\n##\n";

pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;
/// Largest chunk written by the encoder.
pub const MAX_ENCODE_CHUNK_SIZE: usize = 64 * 1024;
/// Largest chunk-size the decoder accepts.
pub const MAX_CHUNK_SIZE: u64 = 4_294_967_295;

// "\n#" + 10 digits + "\n"
const MAX_CHUNK_HEADER_LEN: usize = 13;

//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `]]>]]>` delimited, used by base:1.0 and for the hello exchange.
    #[default]
    EndOfMessage,
    /// Chunked framing, used once both peers advertise base:1.1.
    Chunked,
}

//
#[derive(Debug)]
pub enum FramingError {
    InvalidChunkHeader(Vec<u8>),
    ChunkSizeOutOfRange(u64),
    EmptyChunkedMessage,
    MessageTooLarge { size: usize, max: usize },
    Utf8(FromUtf8Error),
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for FramingError {}

//
#[derive(Debug, Clone)]
pub struct FramingCodec {
    framing: Framing,
    max_message_size: usize,
    // chunk data of a message whose end-of-chunks marker has not arrived yet
    pending: Vec<u8>,
    // bytes at the front of src already searched for END_OF_MESSAGE
    scanned: usize,
}

impl Default for FramingCodec {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

impl FramingCodec {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            pending: Vec::new(),
            scanned: 0,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
        self.pending.clear();
        self.scanned = 0;
    }

    /// Forgets how far `src` was searched, for callers that removed bytes from its front.
    pub fn reset_scan(&mut self) {
        self.scanned = 0;
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn set_max_message_size(&mut self, max_message_size: usize) {
        self.max_message_size = max_message_size;
    }

    pub fn encode(&self, msg: &[u8], dst: &mut Vec<u8>) {
        match self.framing {
            Framing::EndOfMessage => {
                dst.reserve(msg.len() + END_OF_MESSAGE.len());
                dst.extend_from_slice(msg);
                dst.extend_from_slice(END_OF_MESSAGE);
            }
            Framing::Chunked => {
                for chunk in msg.chunks(MAX_ENCODE_CHUNK_SIZE) {
                    dst.extend_from_slice(format!("\n#{}\n", chunk.len()).as_bytes());
                    dst.extend_from_slice(chunk);
                }
                dst.extend_from_slice(END_OF_CHUNKS);
            }
        }
    }

    /// Takes one complete message off the front of `src`.
    ///
    /// Returns `Ok(None)` when `src` does not hold a complete message yet; the
    /// bytes already consumed are remembered, so call again once more data
    /// has been appended. Between calls `src` may only grow at the back.
    pub fn decode(&mut self, src: &mut Vec<u8>) -> Result<Option<String>, FramingError> {
        let msg = match self.framing {
            Framing::EndOfMessage => self.decode_end_of_message(src)?,
            Framing::Chunked => self.decode_chunked(src)?,
        };

        match msg {
            Some(msg) => String::from_utf8(msg).map(Some).map_err(FramingError::Utf8),
            None => Ok(None),
        }
    }

    fn decode_end_of_message(&mut self, src: &mut Vec<u8>) -> Result<Option<Vec<u8>>, FramingError> {
        if self.scanned == 0 {
            let leading_whitespace = src
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            src.drain(..leading_whitespace);
        }

        // the delimiter may straddle the previous search boundary
        let start = self
            .scanned
            .min(src.len())
            .saturating_sub(END_OF_MESSAGE.len() - 1);

        match find(&src[start..], END_OF_MESSAGE).map(|i| start + i) {
            Some(n) => {
                self.scanned = 0;
                if n > self.max_message_size {
                    return Err(FramingError::MessageTooLarge {
                        size: n,
                        max: self.max_message_size,
                    });
                }

                let msg = src[..n].to_vec();
                src.drain(..n + END_OF_MESSAGE.len());
                Ok(Some(msg))
            }
            None => {
                self.scanned = src.len();
                if src.len() > self.max_message_size + END_OF_MESSAGE.len() {
                    return Err(FramingError::MessageTooLarge {
                        size: src.len(),
                        max: self.max_message_size,
                    });
                }
                Ok(None)
            }
        }
    }

    fn decode_chunked(&mut self, src: &mut Vec<u8>) -> Result<Option<Vec<u8>>, FramingError> {
        loop {
            if src.len() < 3 {
                check_header_prefix(src)?;
                return Ok(None);
            }
            check_header_prefix(src)?;

            if src[2] == b'#' {
                if src.len() < END_OF_CHUNKS.len() {
                    return Ok(None);
                }
                if src[3] != b'\n' {
                    return Err(FramingError::InvalidChunkHeader(src[..4].to_vec()));
                }
                src.drain(..END_OF_CHUNKS.len());

                if self.pending.is_empty() {
                    return Err(FramingError::EmptyChunkedMessage);
                }
                return Ok(Some(core::mem::take(&mut self.pending)));
            }

            let search_end = src.len().min(MAX_CHUNK_HEADER_LEN);
            let lf = match src[2..search_end].iter().position(|b| *b == b'\n') {
                Some(i) => i + 2,
                None => {
                    if src.len() >= MAX_CHUNK_HEADER_LEN {
                        return Err(FramingError::InvalidChunkHeader(
                            src[..MAX_CHUNK_HEADER_LEN].to_vec(),
                        ));
                    }
                    return Ok(None);
                }
            };

            let size = parse_chunk_size(&src[2..lf])
                .ok_or_else(|| FramingError::InvalidChunkHeader(src[..=lf].to_vec()))?;
            if size == 0 || size > MAX_CHUNK_SIZE {
                return Err(FramingError::ChunkSizeOutOfRange(size));
            }
            let size = size as usize;

            let total = self.pending.len().saturating_add(size);
            if total > self.max_message_size {
                return Err(FramingError::MessageTooLarge {
                    size: total,
                    max: self.max_message_size,
                });
            }

            let header_len = lf + 1;
            if src.len() < header_len + size {
                return Ok(None);
            }

            self.pending
                .extend_from_slice(&src[header_len..header_len + size]);
            src.drain(..header_len + size);
        }
    }
}

fn check_header_prefix(src: &[u8]) -> Result<(), FramingError> {
    let expected = b"\n#";
    let n = src.len().min(expected.len());
    if src[..n] != expected[..n] {
        return Err(FramingError::InvalidChunkHeader(src[..n].to_vec()));
    }
    Ok(())
}

// chunk-size = [1-9] *DIGIT
fn parse_chunk_size(digits: &[u8]) -> Option<u64> {
    match digits.first() {
        Some(b'1'..=b'9') => {}
        Some(b'0') => return Some(0),
        _ => return None,
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    core::str::from_utf8(digits).ok()?.parse().ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
