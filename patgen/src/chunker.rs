//! Enumeration of the n-grams that can vote for a hyphen position.
use crate::common::WORD_BOUNDARY;
use crate::params::Margins;

/// A word padded with a boundary marker on both sides.
///
/// Keeps the byte offsets of every character so that n-grams can be borrowed
/// as `&str` without allocating.
pub struct PaddedWord {
    text: String,
    bounds: Vec<usize>,
}

impl PaddedWord {
    /// Pads `word` as `.word.`.
    pub fn new(word: &str) -> Self {
        let mut text = String::with_capacity(word.len() + 2);
        text.push(WORD_BOUNDARY);
        text.push_str(word);
        text.push(WORD_BOUNDARY);
        let bounds = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, bounds }
    }

    /// Number of characters including both boundary markers.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Always false since a padded word has at least its two boundaries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of characters of the original word.
    #[inline(always)]
    pub fn word_len(&self) -> usize {
        self.len() - 2
    }

    /// Returns `len` characters starting from the character `start`.
    #[inline(always)]
    pub fn slice(&self, start: usize, len: usize) -> &str {
        &self.text[self.bounds[start]..self.bounds[start + len]]
    }

    /// Returns the padded text.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Cuts words into n-grams of a fixed length around a hyphen position.
#[derive(Clone, Copy, Debug)]
pub struct Chunker {
    chunk_len: usize,
    margins: Margins,
}

impl Chunker {
    /// Creates a chunker producing n-grams of `chunk_len` characters.
    pub const fn new(chunk_len: usize, margins: Margins) -> Self {
        Self { chunk_len, margins }
    }

    /// Enumerates `(start, n-gram)` pairs of the padded word such that the
    /// position `hyphen_pos` inside the n-gram falls on a word position where
    /// the margins allow a hyphen.
    ///
    /// `start` is an offset into the padded word, so the hyphen position in
    /// the original word is `start + hyphen_pos - 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use patgen::chunker::{Chunker, PaddedWord};
    /// use patgen::Margins;
    ///
    /// let word = PaddedWord::new("mike");
    /// let chunks: Vec<_> = Chunker::new(2, Margins::new(1, 1))
    ///     .chunks(&word, 1)
    ///     .map(|(_, chunk)| chunk)
    ///     .collect();
    /// assert_eq!(vec!["mi", "ik", "ke"], chunks);
    /// ```
    pub fn chunks<'a>(
        &self,
        word: &'a PaddedWord,
        hyphen_pos: usize,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let padded_len = word.len();
        let chunk_len = self.chunk_len;
        let range = if hyphen_pos > word.word_len() || chunk_len > padded_len {
            0..0
        } else {
            let start = (self.margins.left + 1).saturating_sub(hyphen_pos);
            let end = (padded_len - chunk_len + 1).min(
                padded_len
                    .saturating_sub(self.margins.right)
                    .saturating_sub(hyphen_pos),
            );
            start..end.max(start)
        };
        range.map(move |start| (start, word.slice(start, chunk_len)))
    }
}
