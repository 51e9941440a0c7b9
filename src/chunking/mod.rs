
use tracing::debug;

use crate::config::ChunkingConfig;
use crate::{AgentError, Result};

/// A contiguous slice of a document's text, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub document_name: String,
    pub chunk_index: usize,
    pub text: String,
}

/// Split `text` into overlapping fixed-size windows.
///
/// Windows are `chunk_size` characters long and consecutive windows share
/// exactly `overlap` characters, so the window stride is
/// `chunk_size - overlap`. Boundaries always fall on `char` boundaries.
/// Text that fits in a single window (including empty text) yields exactly
/// one chunk containing the whole input.
///
/// Pure function of its inputs; parameters are validated before any text is
/// touched and `overlap >= chunk_size` fails with `InvalidConfiguration`.
pub fn chunk_text(document_name: &str, text: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config
        .validate()
        .map_err(|e| AgentError::InvalidConfiguration(e.to_string()))?;

    // Byte offset of every char boundary; index i is the start of char i.
    let boundaries: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    let total_chars = boundaries.len();

    if total_chars <= config.chunk_size {
        return Ok(vec![Chunk {
            document_name: document_name.to_string(),
            chunk_index: 0,
            text: text.to_string(),
        }]);
    }

    let stride = config.chunk_size - config.overlap;
    let mut chunks = Vec::with_capacity(total_chars.div_ceil(stride));
    let mut start = 0usize;
    let mut chunk_index = 0usize;

    loop {
        let end = (start + config.chunk_size).min(total_chars);
        let byte_start = boundaries[start];
        let byte_end = if end == total_chars {
            text.len()
        } else {
            boundaries[end]
        };

        chunks.push(Chunk {
            document_name: document_name.to_string(),
            chunk_index,
            text: text[byte_start..byte_end].to_string(),
        });

        if end == total_chars {
            break;
        }

        start += stride;
        chunk_index += 1;
    }

    debug!(
        "Chunked '{}' into {} chunks ({} chars, window {}, overlap {})",
        document_name,
        chunks.len(),
        total_chars,
        config.chunk_size,
        config.overlap
    );

    Ok(chunks)
}
