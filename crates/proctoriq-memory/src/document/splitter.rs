use super::types::{Chunk, Document};

/// Break points tried in order when a window has to end before the text does.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "? ", "! ", " "];

#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Prefer paragraph, line, sentence and word boundaries over hard cuts.
    pub sentence_aware: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            sentence_aware: true,
        }
    }
}

pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split every document, keeping each document's chunks in order.
    #[must_use]
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|d| self.split_document(d))
            .collect();
        tracing::info!(
            "split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    #[must_use]
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        split_windows(
            &document.content,
            self.config.chunk_size,
            self.config.chunk_overlap,
            self.config.sentence_aware,
        )
        .into_iter()
        .enumerate()
        .map(|(i, content)| Chunk {
            content,
            metadata: document.metadata.clone(),
            chunk_index: i,
        })
        .collect()
    }
}

/// Slide a window of at most `chunk_size` characters over `text`.
///
/// Each window after the first starts exactly `overlap` characters before the
/// previous one ended. Overlap is clamped below `chunk_size` so every step
/// makes progress.
fn split_windows(text: &str, chunk_size: usize, overlap: usize, boundary_aware: bool) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let hard_end = start + chunk_size;
        if hard_end >= chars.len() {
            chunks.push(chars[start..].iter().collect());
            break;
        }
        // Never end a window inside the overlap, and never shrink it below half size.
        let min_end = (start + overlap.max(chunk_size / 2) + 1).min(hard_end);
        let end = if boundary_aware {
            find_boundary(&chars, min_end, hard_end).unwrap_or(hard_end)
        } else {
            hard_end
        };
        chunks.push(chars[start..end].iter().collect());
        start = end - overlap;
    }
    chunks
}

/// Latest position in `min_end..=max_end` directly after the highest-priority separator.
fn find_boundary(chars: &[char], min_end: usize, max_end: usize) -> Option<usize> {
    SEPARATORS.iter().find_map(|sep| {
        let sep: Vec<char> = sep.chars().collect();
        (min_end..=max_end)
            .rev()
            .find(|&end| end >= sep.len() && chars[end - sep.len()..end] == sep[..])
    })
}
