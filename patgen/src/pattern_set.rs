//! Ordered levels of hyphenation patterns.
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader, Read, Write};

use hashbrown::HashSet;
use log::debug;

use crate::chunker::PaddedWord;
use crate::dictionary::{format_hyphenation, Dictionary};
use crate::errors::{PatgenError, Result};
use crate::layer::{Layer, LayerKind};
use crate::params::Margins;
use crate::suffix_array::SuffixArray;

/// Maps offsets inside an n-gram to the level controlling them.
pub type Controls = BTreeMap<usize, usize>;

/// A dictionary word whose predicted hyphens differ from the true ones.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
    /// Text of the word.
    pub word: String,
    /// True hyphens.
    pub truth: BTreeSet<usize>,
    /// True hyphens that are not predicted.
    pub missed: BTreeSet<usize>,
    /// Predicted hyphens that are not true.
    pub false_hyphens: BTreeSet<usize>,
}

impl Mismatch {
    /// Returns the predicted hyphens.
    pub fn predicted(&self) -> BTreeSet<usize> {
        self.truth
            .difference(&self.missed)
            .chain(&self.false_hyphens)
            .cloned()
            .collect()
    }
}

/// Weighted performance of patterns on a dictionary.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
pub struct Evaluation {
    /// Weighted number of true hyphens.
    pub total: u64,
    /// Weighted number of true hyphens that are not predicted.
    pub missed: u64,
    /// Weighted number of predicted hyphens that are not true.
    pub false_hyphens: u64,
}

/// Ordered levels of patterns.
///
/// Even (0-based) levels are hyphenating and odd levels are inhibiting, so
/// the hyphens of a word are decided by the highest level firing at each
/// position.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    layers: Vec<Layer>,
}

impl PatternSet {
    /// Creates an empty pattern set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer as the next level.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when the kind of the layer does not match
    /// the parity of the next level.
    pub fn push(&mut self, layer: Layer) -> Result<()> {
        let expected = LayerKind::from_index(self.layers.len());
        if layer.kind() != expected {
            return Err(PatgenError::invalid_state(
                format!("cannot append a layer at level {}", self.layers.len() + 1),
                format!("expected a {expected:?} layer, got {:?}", layer.kind()),
            ));
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Returns the layers from the lowest level.
    #[inline(always)]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of levels.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if there is no level.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Length of the longest n-gram over all levels.
    pub fn max_chunk(&self) -> usize {
        self.layers.iter().map(Layer::max_chunk).max().unwrap_or(0)
    }

    /// Number of `(n-gram, offset)` pairs over all levels.
    pub fn num_patterns(&self) -> usize {
        self.layers.iter().map(Layer::num_patterns).sum()
    }

    /// Exchanges the layer at `index` with the one of `other`.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned, and nothing is exchanged, when the two
    /// sets have different numbers of levels or `index` is out of range.
    pub fn swap_layer(&mut self, other: &mut Self, index: usize) -> Result<()> {
        if self.len() != other.len() {
            return Err(PatgenError::invalid_state(
                "cannot swap layers".to_string(),
                format!(
                    "the pattern sets have {} and {} levels",
                    self.len(),
                    other.len()
                ),
            ));
        }
        if index >= self.len() {
            return Err(PatgenError::invalid_state(
                "cannot swap layers".to_string(),
                format!("level {} does not exist", index + 1),
            ));
        }
        std::mem::swap(&mut self.layers[index], &mut other.layers[index]);
        Ok(())
    }

    /// Predicts the hyphens of a word by applying the levels in order.
    pub fn hyphenate(&self, word: &str, margins: Margins) -> BTreeSet<usize> {
        let padded = PaddedWord::new(word);
        let mut prediction = BTreeSet::new();
        for layer in &self.layers {
            let fired = layer.predict_padded(&padded, margins);
            match layer.kind() {
                LayerKind::Hyphenating => prediction.extend(fired),
                LayerKind::Inhibiting => prediction.retain(|pos| !fired.contains(pos)),
            }
        }
        prediction
    }

    /// Compares the predictions with the true hyphens of the dictionary.
    ///
    /// Returns the words with at least one missed or false hyphen, sorted by
    /// their text.
    pub fn errors(&self, dictionary: &Dictionary, margins: Margins) -> Vec<Mismatch> {
        let mut errors: Vec<_> = dictionary
            .iter()
            .filter_map(|word| {
                let predicted = self.hyphenate(word.text(), margins);
                let missed: BTreeSet<_> =
                    word.hyphens().difference(&predicted).cloned().collect();
                let false_hyphens: BTreeSet<_> =
                    predicted.difference(word.hyphens()).cloned().collect();
                if missed.is_empty() && false_hyphens.is_empty() {
                    return None;
                }
                Some(Mismatch {
                    word: word.text().to_string(),
                    truth: word.hyphens().clone(),
                    missed,
                    false_hyphens,
                })
            })
            .collect();
        errors.sort_unstable_by(|a, b| a.word.cmp(&b.word));
        errors
    }

    /// Computes the weighted numbers of missed and false hyphens.
    pub fn evaluate(&self, dictionary: &Dictionary, margins: Margins) -> Evaluation {
        let mut evaluation = Evaluation {
            total: dictionary.total_hyphens(),
            ..Evaluation::default()
        };
        for error in self.errors(dictionary, margins) {
            if let Some(word) = dictionary.get(&error.word) {
                evaluation.missed += word.weighted(&error.missed);
                evaluation.false_hyphens += word.weighted(&error.false_hyphens);
            }
        }
        evaluation
    }

    /// Words that the patterns hyphenate wrongly, written with their true
    /// hyphens, for the `\hyphenation` block of a TeX pattern file.
    pub fn exceptions(&self, dictionary: &Dictionary, margins: Margins) -> Vec<String> {
        self.errors(dictionary, margins)
            .into_iter()
            .map(|e| format_hyphenation(&e.word, &e.truth))
            .collect()
    }

    /// Merges the levels into one control map per n-gram.
    ///
    /// When several levels fire at the same offset of an n-gram, the highest
    /// one is kept since it decides the outcome.
    pub fn controls(&self) -> BTreeMap<String, Controls> {
        let mut controls: BTreeMap<String, Controls> = BTreeMap::new();
        for (i, layer) in self.layers.iter().enumerate() {
            for (chunk, offsets) in layer.rules() {
                let entry = controls.entry(chunk.to_string()).or_default();
                for &offset in offsets {
                    entry.insert(offset, i + 1);
                }
            }
        }
        controls.retain(|_, c| !c.is_empty());
        controls
    }

    /// Formats all patterns in the TeX notation, sorted by n-gram.
    pub fn pattern_strings(&self) -> Vec<String> {
        self.controls()
            .iter()
            .map(|(chunk, controls)| Self::format_pattern(chunk, controls))
            .collect()
    }

    /// Formats an n-gram with its control levels, e.g. `he2l1lo`.
    pub fn format_pattern(chunk: &str, controls: &Controls) -> String {
        let mut out = String::with_capacity(chunk.len() + controls.len());
        for (i, c) in std::iter::once(None)
            .chain(chunk.chars().map(Some))
            .enumerate()
        {
            if let Some(c) = c {
                out.push(c);
            }
            if let Some(&level) = controls.get(&i) {
                if level > 0 {
                    out.push_str(&level.to_string());
                }
            }
        }
        out
    }

    /// Parses a pattern in the TeX notation into its n-gram and controls.
    pub fn parse_pattern(text: &str) -> (String, Controls) {
        let mut chunk = String::with_capacity(text.len());
        let mut len = 0;
        let mut controls = Controls::new();
        for c in text.chars() {
            match c.to_digit(10) {
                Some(0) => {
                    controls.remove(&len);
                }
                Some(d) => {
                    controls.insert(len, d as usize);
                }
                None => {
                    chunk.push(c);
                    len += 1;
                }
            }
        }
        (chunk, controls)
    }

    /// Writes a TeX pattern file.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when the set has more than 9 levels, which
    /// the notation cannot express, or when writing fails.
    pub fn write_tex<W>(&self, mut wtr: W, exceptions: &[String]) -> Result<()>
    where
        W: Write,
    {
        if self.len() > 9 {
            return Err(PatgenError::invalid_state(
                "cannot export patterns".to_string(),
                format!("{} levels do not fit in single digits", self.len()),
            ));
        }
        writeln!(wtr, "\\patterns{{")?;
        for pattern in self.pattern_strings() {
            writeln!(wtr, "{pattern}")?;
        }
        writeln!(wtr, "}}")?;
        writeln!(wtr, "\\hyphenation{{")?;
        for exception in exceptions {
            writeln!(wtr, "{exception}")?;
        }
        writeln!(wtr, "}}")?;
        Ok(())
    }

    /// Reads a TeX pattern file.
    ///
    /// `%` starts a comment. Returns the pattern set and the words of the
    /// `\hyphenation` block. When one file assigns different levels to the
    /// same offset of an n-gram, the highest level wins.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when the file is not made of `\patterns{}`
    /// and `\hyphenation{}` blocks, or when reading fails.
    pub fn from_tex<R>(rdr: R) -> Result<(Self, Vec<String>)>
    where
        R: Read,
    {
        #[derive(Clone, Copy, Eq, PartialEq)]
        enum Block {
            Outside,
            Patterns,
            Hyphenation,
        }

        let mut block = Block::Outside;
        let mut levels: BTreeMap<(String, usize), usize> = BTreeMap::new();
        let mut exceptions = vec![];

        for (i, line) in BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            let content = line.split('%').next().unwrap_or_default();
            for token in content.split_whitespace() {
                if block == Block::Outside {
                    block = match token {
                        "\\patterns{" => Block::Patterns,
                        "\\hyphenation{" => Block::Hyphenation,
                        _ => {
                            return Err(PatgenError::invalid_format(
                                "patterns",
                                format!("line {}: unexpected `{token}`", i + 1),
                            ))
                        }
                    };
                    continue;
                }
                let (body, closing) = match token.strip_suffix('}') {
                    Some(body) => (body, true),
                    None => (token, false),
                };
                if !body.is_empty() {
                    if block == Block::Patterns {
                        let (chunk, controls) = Self::parse_pattern(body);
                        for (offset, level) in controls {
                            let entry = levels.entry((chunk.clone(), offset)).or_insert(0);
                            *entry = (*entry).max(level);
                        }
                    } else {
                        exceptions.push(body.to_string());
                    }
                }
                if closing {
                    block = Block::Outside;
                }
            }
        }
        if block != Block::Outside {
            return Err(PatgenError::invalid_format(
                "patterns",
                "unterminated block",
            ));
        }

        let num_levels = levels.values().cloned().max().unwrap_or(0);
        let mut layers: Vec<_> = (0..num_levels)
            .map(|i| Layer::new(LayerKind::from_index(i), None))
            .collect();
        for ((chunk, offset), level) in levels {
            layers[level - 1].insert(&chunk, offset);
        }
        Ok((Self { layers }, exceptions))
    }

    /// Removes the patterns implied by shorter ones.
    ///
    /// When an n-gram `R` occurs inside a longer n-gram `S` at offset `o`, and
    /// `S` controls the offset `o + i` with a level not higher than the one
    /// of `R` at `i`, the assignment of `S` never changes the outcome: `R`
    /// fires whenever `S` does. Such assignments are deleted from every level.
    /// Predictions are unchanged.
    ///
    /// Returns the number of deleted `(n-gram, offset)` pairs over all levels.
    pub fn compact(&mut self) -> usize {
        let controls = self.controls();
        let index = SuffixArray::new(controls.keys().cloned());

        let mut redundant = HashSet::new();
        for (chunk, chunk_controls) in &controls {
            for (superstring, offset) in index.superstrings(chunk) {
                if superstring == chunk {
                    continue;
                }
                let super_controls = &controls[superstring];
                for (&i, &level) in chunk_controls {
                    if let Some(&super_level) = super_controls.get(&(offset + i)) {
                        if super_level != 0 && super_level <= level {
                            redundant.insert((superstring, offset + i));
                        }
                    }
                }
            }
        }

        let mut num_removed = 0;
        for &(chunk, offset) in &redundant {
            for layer in &mut self.layers {
                if layer.remove(chunk, offset) {
                    num_removed += 1;
                }
            }
        }
        debug!(
            "compaction removed {} assignments of {} n-grams",
            num_removed,
            controls.len()
        );
        num_removed
    }
}
