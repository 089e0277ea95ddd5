//! Overlapping text chunking for indexing
//!
//! Chunks are exact substrings of the source. Each split point is the latest
//! position inside the size budget that ends a separator of the
//! highest-priority kind available: paragraph break, line break, sentence
//! end, word boundary, and finally a raw character position.

use crate::errors::BikeHeroError;
use crate::errors::Result;

/// Default maximum chunk length, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks, in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Separator groups in priority order
const SEPARATORS: &[&[&str]] = &[&["\n\n"], &["\n"], &[". ", "! ", "? "], &[" "]];

/// A chunk and where it starts in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub content: String,
    /// Character (not byte) offset of the first character in the source
    pub offset: usize,
}

impl TextChunk {
    /// Character offset one past the last character
    pub fn end(&self) -> usize {
        self.offset + self.content.chars().count()
    }
}

/// Splits text into bounded, overlapping chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextChunker {
    /// Create a chunker; the overlap must be smaller than the chunk size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(BikeHeroError::InvalidChunkConfig {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into ordered chunks. Empty input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let limit = (start + self.chunk_size).min(total);
            let end = if limit == total {
                total
            } else {
                self.split_point(&chars, start, limit)
            };

            chunks.push(TextChunk {
                content: chars[start..end].iter().collect(),
                offset: start,
            });

            if end == total {
                break;
            }
            start = self.next_start(&chars, start, end);
        }

        chunks
    }

    /// End of the chunk starting at `start`, never beyond `limit`.
    ///
    /// The end must lie past `start + overlap` so the following chunk makes
    /// progress.
    fn split_point(&self, chars: &[char], start: usize, limit: usize) -> usize {
        let floor = start + self.chunk_overlap;

        for group in SEPARATORS {
            let mut end = limit;
            while end > floor {
                if group.iter().any(|separator| ends_with(chars, end, separator)) {
                    return end;
                }
                end -= 1;
            }
        }

        limit
    }

    /// Start of the chunk following `[start, end)`.
    ///
    /// Backs up from `end - overlap` to the beginning of a word when one is
    /// close, so the overlap never starts mid-word unless it has to.
    fn next_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        let target = end - self.chunk_overlap;
        let window_floor = (start + 1).max(target.saturating_sub(self.chunk_overlap / 2));

        let mut candidate = target;
        while candidate > window_floor {
            if chars[candidate - 1].is_whitespace() {
                return candidate;
            }
            candidate -= 1;
        }

        target
    }
}

fn ends_with(chars: &[char], end: usize, separator: &str) -> bool {
    let len = separator.chars().count();
    end >= len && chars[end - len..end].iter().copied().eq(separator.chars())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the source by dropping each chunk's overlap with its predecessor
    fn reassemble(chunks: &[TextChunk]) -> String {
        let mut text = String::new();
        let mut covered = 0;
        for chunk in chunks {
            let skip = covered - chunk.offset;
            text.extend(chunk.content.chars().skip(skip));
            covered = chunk.end();
        }
        text
    }

    fn sample_text() -> String {
        let mut text = String::new();
        for paragraph in 0..12 {
            for sentence in 0..6 {
                text.push_str(&format!(
                    "Paragraph {paragraph} sentence {sentence} covers brake tuning and gear indexing. "
                ));
            }
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(TextChunker::default().split("").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = TextChunker::default().split("Essential Package: SGD 59");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Essential Package: SGD 59");
        assert_eq!(chunks[0].offset, 0);
    }

    #[test]
    fn test_chunks_bounded_overlapping_and_reconstructable() {
        let text = sample_text();
        let chunker = TextChunker::new(300, 60).unwrap();
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.content.is_empty());
            assert!(chunk.content.chars().count() <= 300);
        }
        for pair in chunks.windows(2) {
            let shared = pair[0].end() - pair[1].offset;
            assert!(shared >= 60, "overlap {shared} below configured 60");
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = format!("{}\n\n{}", "a".repeat(600), "b".repeat(600));
        let chunks = TextChunker::new(1000, 100).unwrap().split(&text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.ends_with("\n\n"));
        assert_eq!(chunks[0].content.chars().count(), 602);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_prefers_line_break_over_sentence_end() {
        let text = format!("{}. {}\n{}", "a".repeat(100), "b".repeat(40), "c".repeat(200));
        let chunks = TextChunker::new(200, 20).unwrap().split(&text);

        assert!(chunks[0].content.ends_with('\n'));
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_falls_back_to_word_boundary() {
        let text = "spoke ".repeat(100);
        let chunks = TextChunker::new(100, 20).unwrap().split(&text);

        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.ends_with(' '));
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_falls_back_to_character_split() {
        let text = "x".repeat(2500);
        let chunks = TextChunker::new(1000, 200).unwrap().split(&text);

        let offsets: Vec<usize> = chunks.iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0, 800, 1600]);
        assert_eq!(chunks[2].content.len(), 900);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let text = "単車の整備 ".repeat(200);
        let chunks = TextChunker::new(50, 10).unwrap().split(&text);

        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 50);
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_zero_overlap_partitions_text() {
        let text = sample_text();
        let chunks = TextChunker::new(250, 0).unwrap().split(&text);

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end(), pair[1].offset);
        }
        assert_eq!(chunks.iter().map(|c| c.content.as_str()).collect::<String>(), text);
    }
}
