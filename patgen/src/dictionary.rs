//! Hyphenation dictionary.
//!
//! A dictionary holds the set of allowed hyphen positions for each word.
//! Additionally, it stores the current hyphenation errors (missed and false
//! hyphens) and per-position weights.
//!
//! # Format
//!
//! One word per line. `-` marks a true hyphen, `.` a true hyphen that is not
//! predicted yet (missed), `*` a predicted hyphen that is wrong (false). A
//! marker belongs to the position right before it. A digit sets the weight
//! of the position it appears at, and a leading digit sets the default weight
//! of the whole word. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! hy-phen-a-tion
//! 3ex-am.ple
//! ```
use std::collections::BTreeSet;
use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};

use hashbrown::HashMap;

use crate::chunker::{Chunker, PaddedWord};
use crate::common::{FALSE_HYPHEN, MISSED_HYPHEN, TRUE_HYPHEN};
use crate::errors::{PatgenError, Result};
use crate::layer::LayerKind;
use crate::params::Margins;

/// A word with its true hyphens and the current hyphenation errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    text: String,
    len: usize,
    hyphens: BTreeSet<usize>,
    missed: BTreeSet<usize>,
    false_hyphens: BTreeSet<usize>,
    weights: Vec<u32>,
}

impl Word {
    /// Parses a word written in the dictionary format.
    ///
    /// Parsing never fails: any character that is neither a marker nor a digit
    /// is taken as a letter. Letters are lowercased. When several markers
    /// appear at one position, the last one wins.
    pub fn parse(line: &str) -> Self {
        let mut text = String::with_capacity(line.len());
        let mut len = 0;
        let mut markers = vec![None];
        let mut weights = vec![None];

        let default_weight = line
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(1);

        for c in line.chars() {
            match c {
                TRUE_HYPHEN | MISSED_HYPHEN | FALSE_HYPHEN => markers[len] = Some(c),
                _ => {
                    if let Some(d) = c.to_digit(10) {
                        weights[len] = Some(d);
                        continue;
                    }
                    for lc in c.to_lowercase() {
                        text.push(lc);
                        len += 1;
                        markers.push(None);
                        weights.push(None);
                    }
                }
            }
        }

        let mut hyphens = BTreeSet::new();
        let mut missed = BTreeSet::new();
        let mut false_hyphens = BTreeSet::new();
        for (i, marker) in markers.into_iter().enumerate() {
            match marker {
                Some(TRUE_HYPHEN) => {
                    hyphens.insert(i);
                }
                Some(MISSED_HYPHEN) => {
                    hyphens.insert(i);
                    missed.insert(i);
                }
                Some(FALSE_HYPHEN) => {
                    false_hyphens.insert(i);
                }
                _ => {}
            }
        }
        let weights = weights
            .into_iter()
            .map(|w| w.unwrap_or(default_weight))
            .collect();

        Self {
            text,
            len,
            hyphens,
            missed,
            false_hyphens,
            weights,
        }
    }

    /// Creates a word from its raw parts.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when a position is beyond the word, when
    /// the number of weights is not `len + 1`, when missed hyphens are not
    /// true hyphens, or when false hyphens are true hyphens.
    pub fn from_parts(
        text: String,
        hyphens: BTreeSet<usize>,
        missed: BTreeSet<usize>,
        false_hyphens: BTreeSet<usize>,
        weights: Vec<u32>,
    ) -> Result<Self> {
        let len = text.chars().count();
        if weights.len() != len + 1 {
            return Err(PatgenError::invalid_argument(
                "weights",
                format!("{text}: expected {} weights, got {}", len + 1, weights.len()),
            ));
        }
        let beyond = |set: &BTreeSet<usize>| set.iter().next_back().map_or(false, |&i| i > len);
        if beyond(&hyphens) || beyond(&missed) || beyond(&false_hyphens) {
            return Err(PatgenError::invalid_argument(
                "hyphens",
                format!("{text}: position beyond the word"),
            ));
        }
        if !missed.is_subset(&hyphens) {
            return Err(PatgenError::invalid_argument(
                "missed",
                format!("{text}: missed hyphens must be true hyphens"),
            ));
        }
        if !false_hyphens.is_disjoint(&hyphens) {
            return Err(PatgenError::invalid_argument(
                "false_hyphens",
                format!("{text}: false hyphens must not be true hyphens"),
            ));
        }
        Ok(Self {
            text,
            len,
            hyphens,
            missed,
            false_hyphens,
            weights,
        })
    }

    /// Returns the lowercased text.
    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the number of characters.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the word has no characters.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the true hyphen positions.
    #[inline(always)]
    pub const fn hyphens(&self) -> &BTreeSet<usize> {
        &self.hyphens
    }

    /// Returns the true hyphens that the patterns do not predict yet.
    #[inline(always)]
    pub const fn missed(&self) -> &BTreeSet<usize> {
        &self.missed
    }

    /// Returns the predicted positions that are not true hyphens.
    #[inline(always)]
    pub const fn false_hyphens(&self) -> &BTreeSet<usize> {
        &self.false_hyphens
    }

    /// Returns the weights of positions `0..=len`.
    #[inline(always)]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Sums the weights of the given positions.
    pub fn weighted<'a, I>(&self, positions: I) -> u64
    where
        I: IntoIterator<Item = &'a usize>,
    {
        positions
            .into_iter()
            .map(|&i| u64::from(self.weights[i]))
            .sum()
    }

    /// Marks every true hyphen as missed and forgets false hyphens.
    pub fn make_all_missed(&mut self) {
        self.missed.clone_from(&self.hyphens);
        self.false_hyphens.clear();
    }

    pub(crate) fn missed_mut(&mut self) -> &mut BTreeSet<usize> {
        &mut self.missed
    }

    pub(crate) fn false_hyphens_mut(&mut self) -> &mut BTreeSet<usize> {
        &mut self.false_hyphens
    }

    pub(crate) fn reset_weights(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 1);
    }

    /// Formats the word as a line of the dictionary format, such that
    /// [`Word::parse()`] gives back the same word.
    pub fn format(&self) -> String {
        let default_weight = self.weights[0];
        let mut out = String::with_capacity(self.text.len() * 2);
        if default_weight != 1 {
            out.push_str(&default_weight.to_string());
        }
        for (i, c) in std::iter::once(None)
            .chain(self.text.chars().map(Some))
            .enumerate()
        {
            if let Some(c) = c {
                out.push(c);
            }
            if self.false_hyphens.contains(&i) {
                out.push(FALSE_HYPHEN);
            } else if self.missed.contains(&i) {
                out.push(MISSED_HYPHEN);
            } else if self.hyphens.contains(&i) {
                out.push(TRUE_HYPHEN);
            }
            if i != 0 && self.weights[i] != default_weight {
                out.push_str(&self.weights[i].to_string());
            }
        }
        out
    }

    /// Formats the word with the given predicted hyphens compared with the
    /// true ones: `-` for correct, `.` for missed, `*` for false.
    pub fn format_prediction(&self, predicted: &BTreeSet<usize>) -> String {
        let mut out = String::with_capacity(self.text.len() * 2);
        for (i, c) in std::iter::once(None)
            .chain(self.text.chars().map(Some))
            .enumerate()
        {
            if let Some(c) = c {
                out.push(c);
            }
            match (self.hyphens.contains(&i), predicted.contains(&i)) {
                (true, true) => out.push(TRUE_HYPHEN),
                (true, false) => out.push(MISSED_HYPHEN),
                (false, true) => out.push(FALSE_HYPHEN),
                (false, false) => {}
            }
        }
        out
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Lowercases a word one character at a time, as [`Word::parse()`] does.
pub fn lowercase(word: &str) -> String {
    word.chars().flat_map(char::to_lowercase).collect()
}

/// Writes `-` at the given positions of a word.
pub fn format_hyphenation(word: &str, hyphens: &BTreeSet<usize>) -> String {
    let mut out = String::with_capacity(word.len() + hyphens.len());
    for (i, c) in word.chars().enumerate() {
        if hyphens.contains(&i) {
            out.push(TRUE_HYPHEN);
        }
        out.push(c);
    }
    if hyphens.contains(&word.chars().count()) {
        out.push(TRUE_HYPHEN);
    }
    out
}

/// Weighted hit counts of one candidate pattern.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
pub struct Votes {
    /// Weighted number of positions where firing is correct.
    pub good: u64,
    /// Weighted number of positions where firing is wrong.
    pub bad: u64,
}

/// Hyphenation dictionary.
///
/// Words are kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    words: Vec<Word>,
    index: HashMap<String, usize>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a dictionary from the given sink.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A reader of the dictionary.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when reading fails or the input is not
    /// valid UTF-8.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let buf = BufReader::new(rdr);
        let mut dict = Self::new();
        for line in buf.lines() {
            let line = line?;
            dict.push_line(&line);
        }
        Ok(dict)
    }

    /// Parses a dictionary from a string.
    pub fn parse(text: &str) -> Self {
        let mut dict = Self::new();
        for line in text.lines() {
            dict.push_line(line);
        }
        dict
    }

    fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        self.insert(Word::parse(line));
    }

    /// Inserts a word. A word with the same text is overwritten in place.
    pub fn insert(&mut self, word: Word) {
        if let Some(&idx) = self.index.get(word.text()) {
            self.words[idx] = word;
        } else {
            self.index.insert(word.text().to_string(), self.words.len());
            self.words.push(word);
        }
    }

    /// Gets a word by its text.
    pub fn get(&self, text: &str) -> Option<&Word> {
        self.index.get(text).map(|&idx| &self.words[idx])
    }

    /// Returns the words in insertion order.
    #[inline(always)]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline(always)]
    pub(crate) fn words_mut(&mut self) -> &mut [Word] {
        &mut self.words
    }

    /// Returns an iterator over the words in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    /// Returns the number of words.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Checks if the dictionary is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Computes the margins observed in the dictionary: the shortest distance
    /// of any true hyphen from the word start, and from the word end.
    ///
    /// Returns `None` when no word has a true hyphen.
    pub fn margins(&self) -> Option<Margins> {
        let mut margins: Option<Margins> = None;
        for word in &self.words {
            if let (Some(&first), Some(&last)) =
                (word.hyphens.iter().next(), word.hyphens.iter().next_back())
            {
                let right = word.len - last;
                margins = Some(match margins {
                    Some(m) => Margins::new(m.left.min(first), m.right.min(right)),
                    None => Margins::new(first, right),
                });
            }
        }
        margins
    }

    /// Marks every true hyphen as missed and forgets false hyphens. This is
    /// the state before any pattern is applied.
    pub fn make_all_missed(&mut self) {
        self.words.iter_mut().for_each(Word::make_all_missed);
    }

    /// Sets all weights to 1.
    pub fn ignore_weights(&mut self) {
        self.words.iter_mut().for_each(Word::reset_weights);
    }

    /// Weighted number of true hyphens.
    pub fn total_hyphens(&self) -> u64 {
        self.words.iter().map(|w| w.weighted(&w.hyphens)).sum()
    }

    /// Weighted number of missed hyphens.
    pub fn total_missed(&self) -> u64 {
        self.words.iter().map(|w| w.weighted(&w.missed)).sum()
    }

    /// Weighted number of false hyphens.
    pub fn total_false(&self) -> u64 {
        self.words.iter().map(|w| w.weighted(&w.false_hyphens)).sum()
    }

    /// Exports the dictionary in its text format.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when writing fails.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        for word in &self.words {
            writeln!(wtr, "{}", word.format())?;
        }
        Ok(())
    }

    /// Collects the weighted votes of every n-gram of length `chunk_len` for
    /// firing at offset `hyphen_pos`, given the current missed and false
    /// hyphens.
    ///
    /// For hyphenating layers, a vote is good when the position is missed,
    /// and bad when it is not a true hyphen. For inhibiting layers, a vote is
    /// good when the position is a false hyphen, and bad when it is a
    /// correctly predicted true hyphen.
    pub fn pattern_statistics(
        &self,
        kind: LayerKind,
        chunk_len: usize,
        hyphen_pos: usize,
        margins: Margins,
    ) -> HashMap<String, Votes> {
        let chunker = Chunker::new(chunk_len, margins);
        let mut stats: HashMap<String, Votes> = HashMap::new();

        for word in &self.words {
            let padded = PaddedWord::new(&word.text);
            for (start, chunk) in chunker.chunks(&padded, hyphen_pos) {
                let pos = start + hyphen_pos - 1;
                let weight = u64::from(word.weights[pos]);
                let (good, bad) = match kind {
                    LayerKind::Hyphenating => {
                        let good = word.missed.contains(&pos);
                        (good, !good && !word.hyphens.contains(&pos))
                    }
                    LayerKind::Inhibiting => {
                        let good = word.false_hyphens.contains(&pos);
                        (
                            good,
                            !good && word.hyphens.contains(&pos) && !word.missed.contains(&pos),
                        )
                    }
                };
                if !good && !bad {
                    continue;
                }
                let votes = stats
                    .raw_entry_mut()
                    .from_key(chunk)
                    .or_insert_with(|| (chunk.to_string(), Votes::default()))
                    .1;
                if good {
                    votes.good += weight;
                } else {
                    votes.bad += weight;
                }
            }
        }

        stats
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = &'a Word;
    type IntoIter = std::slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.words.iter()
    }
}
