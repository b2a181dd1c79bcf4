//! Splitting a serialized result into bounded chunks and putting it back
//! together.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, TransportError};

pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// One piece of a serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub total: usize,
    pub chunk: String,
}

/// Splits `text` into pieces of at most `chunk_size` bytes without cutting a
/// UTF-8 character. A character wider than `chunk_size` gets its own piece.
pub fn split_text(text: &str, chunk_size: usize) -> Result<Vec<String>, TransportError> {
    if chunk_size == 0 {
        return Err(TransportError::ZeroChunkSize);
    }

    let mut pieces = Vec::with_capacity(text.len().div_ceil(chunk_size));
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = chunk_size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece.to_string());
        rest = tail;
    }
    Ok(pieces)
}

/// Serializes `payload` to JSON and splits it into numbered chunks.
pub fn chunk_payload<T: Serialize>(payload: &T, chunk_size: usize) -> Result<Vec<Chunk>, Error> {
    let text = serde_json::to_string(payload)?;
    let pieces = split_text(&text, chunk_size)?;
    let total = pieces.len();
    debug!("Split {} bytes into {} chunks", text.len(), total);

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| Chunk {
            index,
            total,
            chunk,
        })
        .collect())
}

/// Reorders chunks by index, checks none is missing or repeated, and parses
/// the joined text.
pub fn reassemble<T: DeserializeOwned>(mut chunks: Vec<Chunk>) -> Result<T, Error> {
    let total = chunks.first().ok_or(TransportError::Empty)?.total;
    chunks.sort_by_key(|chunk| chunk.index);

    let mut text = String::new();
    let mut expected = 0;
    for chunk in &chunks {
        if chunk.total != total {
            return Err(TransportError::TotalMismatch {
                index: chunk.index,
                expected: total,
                found: chunk.total,
            }
            .into());
        }
        if chunk.index >= total {
            return Err(TransportError::OutOfRange {
                index: chunk.index,
                total,
            }
            .into());
        }
        if chunk.index < expected {
            return Err(TransportError::DuplicateChunk(chunk.index).into());
        }
        if chunk.index > expected {
            return Err(TransportError::MissingChunk {
                index: expected,
                total,
            }
            .into());
        }
        text.push_str(&chunk.chunk);
        expected += 1;
    }
    if expected < total {
        return Err(TransportError::MissingChunk {
            index: expected,
            total,
        }
        .into());
    }

    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn pieces_respect_char_boundaries() {
        let text = "aé€b";
        let pieces = split_text(text, 2).unwrap();
        assert!(pieces.iter().all(|p| p.len() <= 3));
        assert_eq!(pieces.concat(), text);
        assert_eq!(split_text("abcdef", 4).unwrap(), vec!["abcd", "ef"]);
        assert!(split_text("", 4).unwrap().is_empty());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            split_text("abc", 0),
            Err(TransportError::ZeroChunkSize)
        ));
    }

    #[test]
    fn reassembles_out_of_order() {
        let payload = json!({"courses": ["Algorithms", "Linear Algebra", "Ética"], "fitness": 0.5});
        let mut chunks = chunk_payload(&payload, 7).unwrap();
        assert!(chunks.len() > 3);
        assert!(chunks.iter().all(|c| c.total == chunks.len()));
        chunks.reverse();
        let back: Value = reassemble(chunks).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn detects_missing_and_repeated_chunks() {
        let payload = json!(["Monday", "Tuesday", "Wednesday"]);
        let chunks = chunk_payload(&payload, 5).unwrap();

        let mut missing = chunks.clone();
        missing.remove(1);
        assert!(matches!(
            reassemble::<Value>(missing),
            Err(Error::Transport(TransportError::MissingChunk { index: 1, .. }))
        ));

        let mut repeated = chunks.clone();
        repeated.push(chunks[0].clone());
        assert!(matches!(
            reassemble::<Value>(repeated),
            Err(Error::Transport(TransportError::DuplicateChunk(0)))
        ));

        let mut truncated = chunks.clone();
        truncated.pop();
        assert!(matches!(
            reassemble::<Value>(truncated),
            Err(Error::Transport(TransportError::MissingChunk { .. }))
        ));

        assert!(matches!(
            reassemble::<Value>(Vec::new()),
            Err(Error::Transport(TransportError::Empty))
        ));
    }
}
