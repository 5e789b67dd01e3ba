
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::table::Table;

/// A contiguous span of the serialized table, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// The chunk text
    pub content: String,
    /// Position of this chunk in the corpus
    pub chunk_index: usize,
    /// Byte offset of the chunk start in the source text
    pub start: usize,
    /// Byte offset one past the chunk end in the source text
    pub end: usize,
    /// Bytes at the start of `content` repeated from the previous chunk
    pub overlap: usize,
    /// Length of `content` in characters
    pub char_count: usize,
}

impl ContentChunk {
    /// The part of this chunk not shared with the previous one
    #[inline]
    pub fn fresh_content(&self) -> &str {
        &self.content[self.overlap..]
    }
}

/// Configuration for splitting text into chunks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Maximum number of characters shared by consecutive chunks
    pub chunk_overlap: usize,
    /// Preferred split point; kept at the end of each piece
    pub separator: String,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separator: "\n".to_string(),
        }
    }
}

/// Serialize a table and chunk the resulting text
#[inline]
pub fn chunk_table(table: &Table, config: &ChunkingConfig) -> Vec<ContentChunk> {
    let text = table.to_text();
    debug!(
        "Serialized table of {} rows into {} characters",
        table.row_count(),
        text.chars().count()
    );
    chunk_text(&text, config)
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// The text is cut after every separator, and pieces still longer than
/// `chunk_size` are cut at character boundaries. Pieces are then packed
/// greedily into windows. When a window is full it is emitted, and its
/// leading pieces are dropped until what remains fits within
/// `chunk_overlap` and leaves room for the next piece. The remainder starts
/// the next chunk.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<ContentChunk> {
    let chunk_size = config.chunk_size.max(1);
    let pieces = split_pieces(text, &config.separator, chunk_size);

    let mut chunks: Vec<ContentChunk> = Vec::new();
    let mut window: VecDeque<Piece> = VecDeque::new();
    let mut window_chars = 0;

    for piece in pieces {
        if window_chars + piece.chars > chunk_size && !window.is_empty() {
            push_chunk(&mut chunks, text, &window, window_chars);

            while window_chars > config.chunk_overlap
                || (window_chars + piece.chars > chunk_size && window_chars > 0)
            {
                let Some(dropped) = window.pop_front() else {
                    break;
                };
                window_chars -= dropped.chars;
            }
        }

        window_chars += piece.chars;
        window.push_back(piece);
    }

    if !window.is_empty() {
        push_chunk(&mut chunks, text, &window, window_chars);
    }

    debug!(
        "Split {} characters into {} chunks (avg {} characters)",
        text.chars().count(),
        chunks.len(),
        chunks.iter().map(|c| c.char_count).sum::<usize>() / chunks.len().max(1)
    );

    chunks
}

/// Rebuild the source text from its chunks by dropping every overlap
#[inline]
pub fn reassemble(chunks: &[ContentChunk]) -> String {
    chunks.iter().map(ContentChunk::fresh_content).collect()
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

fn split_pieces(text: &str, separator: &str, chunk_size: usize) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut offset = 0;

    let segments: Box<dyn Iterator<Item = &str>> = if separator.is_empty() {
        Box::new(std::iter::once(text).filter(|t| !t.is_empty()))
    } else {
        Box::new(text.split_inclusive(separator))
    };

    for segment in segments {
        let chars = segment.chars().count();
        if chars <= chunk_size {
            pieces.push(Piece {
                start: offset,
                end: offset + segment.len(),
                chars,
            });
        } else {
            hard_split(segment, offset, chunk_size, &mut pieces);
        }
        offset += segment.len();
    }

    pieces
}

/// Cut an oversized segment every `chunk_size` characters
fn hard_split(segment: &str, offset: usize, chunk_size: usize, pieces: &mut Vec<Piece>) {
    let mut start = 0;
    let mut chars = 0;
    for (index, _) in segment.char_indices() {
        if chars == chunk_size {
            pieces.push(Piece {
                start: offset + start,
                end: offset + index,
                chars,
            });
            start = index;
            chars = 0;
        }
        chars += 1;
    }
    if chars > 0 {
        pieces.push(Piece {
            start: offset + start,
            end: offset + segment.len(),
            chars,
        });
    }
}

fn push_chunk(
    chunks: &mut Vec<ContentChunk>,
    text: &str,
    window: &VecDeque<Piece>,
    char_count: usize,
) {
    let (Some(first), Some(last)) = (window.front(), window.back()) else {
        return;
    };

    let overlap = chunks
        .last()
        .map_or(0, |previous| previous.end.saturating_sub(first.start));

    chunks.push(ContentChunk {
        content: text[first.start..last.end].to_string(),
        chunk_index: chunks.len(),
        start: first.start,
        end: last.end,
        overlap,
        char_count,
    });
}
