use unicode_segmentation::UnicodeSegmentation;

use crate::config::ProcessingConfig;

/// A chunk of extracted text before it is persisted.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub content: String,
    pub token_count: i32,
}

/// Fixed-window chunker: windows of `chunk_size` words, consecutive windows
/// sharing `chunk_overlap` words. Each chunk is a contiguous slice of the
/// original text, so the chunk set covers the input end to end.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(config: &ProcessingConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        // Overlap must leave the window moving forward.
        let chunk_overlap = config.chunk_overlap.min(chunk_size - 1);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let words: Vec<(usize, &str)> = text.unicode_word_indices().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(words.len());

            let (byte_start, _) = words[start];
            let (last_start, last_word) = words[end - 1];
            let byte_end = last_start + last_word.len();

            chunks.push(TextChunk {
                content: text[byte_start..byte_end].to_string(),
                token_count: (end - start) as i32,
            });

            if end == words.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            chunk_overlap: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(&ProcessingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            max_file_size: 1024,
        })
    }

    fn numbered_words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input_produces_no_chunks() {
        assert!(chunker(8, 2).chunk("").is_empty());
        assert!(chunker(8, 2).chunk("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_input_is_a_single_chunk() {
        let chunks = chunker(16, 4).chunk("Only a few words here.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Only a few words here");
        assert_eq!(chunks[0].token_count, 5);
    }

    #[test]
    fn test_windows_respect_chunk_size() {
        let text = numbered_words(100);
        let chunks = chunker(10, 2).chunk(&text);
        for chunk in &chunks {
            assert!(chunk.token_count <= 10);
        }
    }

    #[test]
    fn test_consecutive_windows_overlap() {
        let text = numbered_words(30);
        let chunks = chunker(10, 3).chunk(&text);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let first_words: Vec<&str> = pair[0].content.unicode_words().collect();
            let second_words: Vec<&str> = pair[1].content.unicode_words().collect();
            // The last `overlap` words of one window open the next.
            assert_eq!(
                &first_words[first_words.len() - 3..],
                &second_words[..3]
            );
        }
    }

    #[test]
    fn test_chunks_cover_every_word() {
        let text = numbered_words(47);
        let chunks = chunker(10, 2).chunk(&text);

        let mut covered: Vec<&str> = Vec::new();
        for chunk in &chunks {
            for word in chunk.content.unicode_words() {
                if covered.last() != Some(&word) && !covered.contains(&word) {
                    covered.push(word);
                }
            }
        }
        assert_eq!(covered.len(), 47, "every word appears in some chunk");
    }

    #[test]
    fn test_overlap_larger_than_window_is_clamped() {
        let text = numbered_words(20);
        // Degenerate config must still terminate and cover the input.
        let chunks = chunker(4, 10).chunk(&text);
        assert!(!chunks.is_empty());
        let last = chunks.last().unwrap();
        assert!(last.content.contains("word19"));
    }

    #[test]
    fn test_unicode_words_are_kept_intact() {
        let chunks = chunker(3, 1).chunk("Crédit agricole für naïve café owners everywhere");
        for chunk in &chunks {
            assert!(!chunk.content.is_empty());
        }
        let all: String = chunks.iter().map(|c| c.content.as_str()).collect::<Vec<_>>().join(" ");
        assert!(all.contains("Crédit"));
        assert!(all.contains("naïve"));
    }
}
