//! Container compression.

use std::collections::HashMap;

use crate::token::{
    CHUNK_SIZE, CopyTokenLayout, MAX_COMPRESSED_CHUNK_SIZE, SIGNATURE_BYTE, pack_header,
};

/// Bytes available for token sequences inside one chunk.
const BODY_LIMIT: usize = MAX_COMPRESSED_CHUNK_SIZE - 2;

/// Compress `data` into an MS-OVBA compressed container.
///
/// Empty input yields a container holding only the signature byte.
/// Chunks that do not shrink are stored raw; a raw final chunk is
/// zero-padded to 4096 bytes as the format requires.
#[must_use]
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    out.push(SIGNATURE_BYTE);
    for chunk in data.chunks(CHUNK_SIZE) {
        compress_chunk(chunk, &mut out);
    }
    out
}

fn compress_chunk(chunk: &[u8], out: &mut Vec<u8>) {
    let mut body = Vec::with_capacity(BODY_LIMIT);
    let mut finder = MatchFinder::new(chunk);
    let mut pos = 0usize;

    while pos < chunk.len() && body.len() < BODY_LIMIT {
        if !compress_token_sequence(&mut finder, &mut pos, &mut body) {
            break;
        }
    }

    if pos < chunk.len() {
        out.extend_from_slice(&pack_header(MAX_COMPRESSED_CHUNK_SIZE, false).to_le_bytes());
        out.extend_from_slice(chunk);
        out.resize(out.len() + (CHUNK_SIZE - chunk.len()), 0);
    } else {
        out.extend_from_slice(&pack_header(body.len() + 2, true).to_le_bytes());
        out.extend_from_slice(&body);
    }
}

/// Emit one flag byte and up to eight tokens.
///
/// Returns false once the body has no room left for the next token.
fn compress_token_sequence(finder: &mut MatchFinder<'_>, pos: &mut usize, body: &mut Vec<u8>) -> bool {
    let chunk = finder.chunk;
    let flag_index = body.len();
    body.push(0);
    let mut flags = 0u8;
    let mut room = true;

    for bit in 0..8 {
        if *pos >= chunk.len() || body.len() >= BODY_LIMIT {
            break;
        }
        match finder.longest_match(*pos) {
            Some((offset, length)) => {
                if body.len() + 1 < BODY_LIMIT {
                    let token = CopyTokenLayout::at(*pos).pack(offset, length);
                    body.extend_from_slice(&token.to_le_bytes());
                    flags |= 1 << bit;
                    *pos += length;
                } else {
                    room = false;
                    break;
                }
            }
            None => {
                body.push(chunk[*pos]);
                *pos += 1;
            }
        }
    }

    body[flag_index] = flags;
    room
}

/// Earlier positions of each three-byte prefix in a chunk.
///
/// A match shorter than three bytes is never used, so only positions that
/// share the prefix at `pos` can be candidates. Positions must be queried
/// in increasing order.
struct MatchFinder<'a> {
    chunk: &'a [u8],
    /// Most recent position of each prefix.
    head: HashMap<[u8; 3], usize>,
    /// Previous position with the same prefix as the index.
    previous: Vec<Option<usize>>,
    indexed: usize,
}

impl<'a> MatchFinder<'a> {
    fn new(chunk: &'a [u8]) -> Self {
        Self {
            chunk,
            head: HashMap::new(),
            previous: vec![None; chunk.len()],
            indexed: 0,
        }
    }

    fn prefix(&self, pos: usize) -> Option<[u8; 3]> {
        match self.chunk.get(pos..pos + 3) {
            Some(&[a, b, c]) => Some([a, b, c]),
            _ => None,
        }
    }

    fn index_to(&mut self, pos: usize) {
        while self.indexed < pos {
            let at = self.indexed;
            if let Some(prefix) = self.prefix(at) {
                self.previous[at] = self.head.insert(prefix, at);
            }
            self.indexed += 1;
        }
    }

    /// Find the closest longest earlier occurrence of the bytes at `pos`.
    ///
    /// Matches may overlap `pos` and are compared up to the longest length
    /// a copy token at `pos` can encode. Returns `(offset, length)`, or
    /// `None` when the best match is shorter than three bytes.
    fn longest_match(&mut self, pos: usize) -> Option<(usize, usize)> {
        self.index_to(pos);
        let prefix = self.prefix(pos)?;
        let max_length = CopyTokenLayout::at(pos).max_length;
        let ahead = &self.chunk[pos..];

        let mut best_length = 0usize;
        let mut best_candidate = 0usize;
        let mut next = self.head.get(&prefix).copied();
        while let Some(candidate) = next {
            let length = ahead
                .iter()
                .zip(&self.chunk[candidate..])
                .take(max_length)
                .take_while(|(a, b)| a == b)
                .count();
            if length > best_length {
                best_length = length;
                best_candidate = candidate;
                if length == max_length {
                    break;
                }
            }
            next = self.previous[candidate];
        }

        (best_length >= 3).then_some((pos - best_candidate, best_length))
    }
}
