//! A single level of hyphenation patterns.
use std::collections::BTreeSet;

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use log::{debug, info};

use crate::chunker::PaddedWord;
use crate::dictionary::Dictionary;
use crate::params::{LengthRange, Margins, Selector};

/// Whether the patterns of a layer add hyphens or remove them.
///
/// Levels alternate: the first level is hyphenating, the second inhibiting,
/// the third hyphenating again, and so on.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Decode, Encode)]
pub enum LayerKind {
    /// Patterns predict hyphens.
    Hyphenating,
    /// Patterns suppress hyphens predicted by lower levels.
    Inhibiting,
}

impl LayerKind {
    /// Returns the kind of the layer at the 0-based `index`.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        if index & 1 == 0 {
            Self::Hyphenating
        } else {
            Self::Inhibiting
        }
    }
}

/// Parameters a layer was trained with.
#[derive(Clone, Copy, PartialEq, Debug, Decode, Encode)]
pub struct TrainingParams {
    /// Range of pattern lengths.
    pub range: LengthRange,
    /// Pattern selector.
    pub selector: Selector,
}

/// Table of patterns of one level.
///
/// Maps an n-gram of the padded word to the offsets inside the n-gram where
/// the pattern fires.
#[derive(Clone, Debug)]
pub struct Layer {
    kind: LayerKind,
    params: Option<TrainingParams>,
    rules: HashMap<String, BTreeSet<usize>>,
    max_chunk: usize,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(kind: LayerKind, params: Option<TrainingParams>) -> Self {
        Self {
            kind,
            params,
            rules: HashMap::new(),
            max_chunk: 0,
        }
    }

    /// Creates a layer from `(n-gram, offset)` pairs.
    pub fn from_rules<I, S>(kind: LayerKind, rules: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: AsRef<str>,
    {
        let mut layer = Self::new(kind, None);
        for (chunk, offset) in rules {
            layer.insert(chunk.as_ref(), offset);
        }
        layer
    }

    /// Trains a new layer on the current state of the dictionary.
    ///
    /// Pattern lengths are visited in the staggered order of
    /// [`LengthRange::stagger()`]; the patterns selected for all lengths are
    /// accumulated into the layer. Lengths longer than every padded word are
    /// skipped. The dictionary is not modified; call
    /// [`Layer::apply_to_dictionary()`] afterwards.
    pub fn train(
        kind: LayerKind,
        range: LengthRange,
        selector: Selector,
        dictionary: &Dictionary,
        margins: Margins,
    ) -> Self {
        let mut layer = Self::new(kind, Some(TrainingParams { range, selector }));
        let longest = dictionary.iter().map(|w| w.len() + 2).max().unwrap_or(0);
        let Ok(lengths) = LengthRange::new(range.start(), range.end().min(longest)) else {
            debug!("no word is long enough for {range}");
            return layer;
        };
        for chunk_len in lengths.stagger() {
            let num_selected = layer.train_length(chunk_len, selector, dictionary, margins);
            info!(
                "length {}: selected {} patterns, {} in layer",
                chunk_len,
                num_selected,
                layer.len()
            );
        }
        layer
    }

    /// Returns the number of selected `(n-gram, offset)` pairs.
    fn train_length(
        &mut self,
        chunk_len: usize,
        selector: Selector,
        dictionary: &Dictionary,
        margins: Margins,
    ) -> usize {
        let mut num_selected = 0;
        for hyphen_pos in 0..=chunk_len {
            let stats = dictionary.pattern_statistics(self.kind, chunk_len, hyphen_pos, margins);
            debug!(
                "length {}, offset {}: {} candidates",
                chunk_len,
                hyphen_pos,
                stats.len()
            );
            for (chunk, votes) in &stats {
                if selector.select(votes.good, votes.bad) {
                    self.insert(chunk, hyphen_pos);
                    num_selected += 1;
                }
            }
        }
        num_selected
    }

    /// Returns the kind of the layer.
    #[inline(always)]
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Returns the parameters the layer was trained with, or `None` for an
    /// imported layer.
    #[inline(always)]
    pub const fn params(&self) -> Option<TrainingParams> {
        self.params
    }

    /// Number of distinct n-grams.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Checks if the layer has no pattern.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of `(n-gram, offset)` pairs.
    pub fn num_patterns(&self) -> usize {
        self.rules.values().map(BTreeSet::len).sum()
    }

    /// Length of the longest n-gram.
    #[inline(always)]
    pub const fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    /// Gets the offsets at which an n-gram fires.
    pub fn get(&self, chunk: &str) -> Option<&BTreeSet<usize>> {
        self.rules.get(chunk)
    }

    /// Iterates over the n-grams with their offsets in arbitrary order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &BTreeSet<usize>)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Adds a pattern.
    pub fn insert(&mut self, chunk: &str, offset: usize) {
        self.max_chunk = self.max_chunk.max(chunk.chars().count());
        self.rules
            .raw_entry_mut()
            .from_key(chunk)
            .or_insert_with(|| (chunk.to_string(), BTreeSet::new()))
            .1
            .insert(offset);
    }

    /// Removes a pattern. Returns `true` if it was present.
    pub(crate) fn remove(&mut self, chunk: &str, offset: usize) -> bool {
        let Some(offsets) = self.rules.get_mut(chunk) else {
            return false;
        };
        let removed = offsets.remove(&offset);
        if offsets.is_empty() {
            self.rules.remove(chunk);
            self.max_chunk = self.rules.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        }
        removed
    }

    /// Applies the layer to a word.
    ///
    /// Returns the positions where the patterns fire: predicted hyphens for a
    /// hyphenating layer, suppressed hyphens for an inhibiting one. Positions
    /// inside the margins are never returned.
    pub fn predict(&self, word: &str, margins: Margins) -> BTreeSet<usize> {
        self.predict_padded(&PaddedWord::new(word), margins)
    }

    pub(crate) fn predict_padded(&self, word: &PaddedWord, margins: Margins) -> BTreeSet<usize> {
        let padded_len = word.len();
        let mut prediction = BTreeSet::new();

        for chunk_len in 1..=self.max_chunk.min(padded_len) {
            for start in 0..=padded_len - chunk_len {
                let Some(offsets) = self.rules.get(word.slice(start, chunk_len)) else {
                    continue;
                };
                for &offset in offsets {
                    let pos = start + offset;
                    if pos > margins.left && pos + margins.right < padded_len {
                        // -1 for the leading boundary marker
                        prediction.insert(pos - 1);
                    }
                }
            }
        }

        prediction
    }

    /// Applies the layer to every word of the dictionary and updates its
    /// missed and false hyphens.
    ///
    /// A hyphenating layer clears the missed hyphens it predicts and adds the
    /// wrong predictions to the false hyphens. An inhibiting layer clears the
    /// false hyphens it suppresses, and true hyphens it suppresses become
    /// missed again.
    ///
    /// Returns the weighted numbers of missed and false hyphens afterwards.
    pub fn apply_to_dictionary(&self, dictionary: &mut Dictionary, margins: Margins) -> (u64, u64) {
        let mut num_missed = 0;
        let mut num_false = 0;

        for word in dictionary.words_mut() {
            let predicted = self.predict(word.text(), margins);

            match self.kind {
                LayerKind::Hyphenating => {
                    let wrong: Vec<_> = predicted.difference(word.hyphens()).cloned().collect();
                    let missed = word.missed_mut();
                    for pos in &predicted {
                        missed.remove(pos);
                    }
                    word.false_hyphens_mut().extend(wrong);
                }
                LayerKind::Inhibiting => {
                    let false_hyphens = word.false_hyphens_mut();
                    for pos in &predicted {
                        false_hyphens.remove(pos);
                    }
                    let suppressed: Vec<_> = predicted
                        .iter()
                        .filter(|&pos| word.hyphens().contains(pos) && !word.missed().contains(pos))
                        .cloned()
                        .collect();
                    word.missed_mut().extend(suppressed);
                }
            }

            num_missed += word.weighted(word.missed());
            num_false += word.weighted(word.false_hyphens());
        }

        (num_missed, num_false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(positions: &[usize]) -> BTreeSet<usize> {
        positions.iter().cloned().collect()
    }

    #[test]
    fn test_kind_from_index() {
        assert_eq!(LayerKind::Hyphenating, LayerKind::from_index(0));
        assert_eq!(LayerKind::Inhibiting, LayerKind::from_index(1));
        assert_eq!(LayerKind::Hyphenating, LayerKind::from_index(2));
    }

    #[test]
    fn test_predict() {
        let layer = Layer::from_rules(LayerKind::Hyphenating, [("ik", 1), ("e.", 1)]);
        assert_eq!(2, layer.max_chunk());
        // "e." fires at the very end of the word, which only zero margins allow
        assert_eq!(set(&[2]), layer.predict("mike", Margins::new(1, 1)));
        assert_eq!(set(&[2, 4]), layer.predict("mike", Margins::new(0, 0)));
        assert_eq!(set(&[2]), layer.predict("mike", Margins::new(2, 2)));
        assert_eq!(set(&[]), layer.predict("mike", Margins::new(3, 1)));
    }

    #[test]
    fn test_predict_boundary_offsets() {
        let layer = Layer::from_rules(LayerKind::Hyphenating, [(".m", 2), ("ke.", 0)]);
        assert_eq!(set(&[1, 2]), layer.predict("mike", Margins::new(1, 1)));
    }

    #[test]
    fn test_predict_short_word() {
        let layer = Layer::from_rules(LayerKind::Hyphenating, [("abcdef", 3)]);
        assert!(layer.predict("ab", Margins::new(0, 0)).is_empty());
    }

    #[test]
    fn test_insert_remove() {
        let mut layer = Layer::new(LayerKind::Hyphenating, None);
        layer.insert("abc", 1);
        layer.insert("abc", 2);
        layer.insert("d", 0);
        assert_eq!(2, layer.len());
        assert_eq!(3, layer.num_patterns());
        assert_eq!(3, layer.max_chunk());

        assert!(layer.remove("abc", 1));
        assert!(!layer.remove("abc", 1));
        assert_eq!(3, layer.max_chunk());
        assert!(layer.remove("abc", 2));
        assert_eq!(1, layer.max_chunk());
        assert_eq!(1, layer.len());
    }

    #[test]
    fn test_apply_hyphenating() {
        let mut dict = Dictionary::parse("ab-cd\n");
        dict.make_all_missed();
        let layer = Layer::from_rules(LayerKind::Hyphenating, [("b", 1), ("a", 1)]);
        let (missed, false_hyphens) = layer.apply_to_dictionary(&mut dict, Margins::new(1, 1));
        assert_eq!((0, 1), (missed, false_hyphens));
        assert_eq!(&set(&[1]), dict.words()[0].false_hyphens());
        assert!(dict.words()[0].missed().is_empty());
    }

    #[test]
    fn test_apply_inhibiting() {
        let mut dict = Dictionary::parse("ab-cd\n");
        dict.make_all_missed();
        Layer::from_rules(LayerKind::Hyphenating, [("b", 1), ("a", 1)])
            .apply_to_dictionary(&mut dict, Margins::new(1, 1));
        // suppresses the false hyphen at 1 and, wrongly, the true one at 2
        let layer = Layer::from_rules(LayerKind::Inhibiting, [("a", 1), ("c", 0)]);
        let (missed, false_hyphens) = layer.apply_to_dictionary(&mut dict, Margins::new(1, 1));
        assert_eq!((1, 0), (missed, false_hyphens));
        assert_eq!(&set(&[2]), dict.words()[0].missed());
    }

    #[test]
    fn test_train_huge_range() {
        let mut dict = Dictionary::parse("ab-cd\nab-ce\nxb-cy\n");
        dict.make_all_missed();
        let range: LengthRange = "2-18446744073709551615".parse().unwrap();
        let selector = Selector::new(1.0, 1.0, 3.0);
        let layer = Layer::train(LayerKind::Hyphenating, range, selector, &dict, Margins::new(1, 1));
        assert_eq!(Some(&set(&[1])), layer.get("bc"));
        assert_eq!(Some(range), layer.params().map(|p| p.range));

        let range = LengthRange::new(8, 10).unwrap();
        let layer = Layer::train(LayerKind::Hyphenating, range, selector, &dict, Margins::new(1, 1));
        assert!(layer.is_empty());
    }

    #[test]
    fn test_train() {
        let mut dict = Dictionary::parse("ab-cd\nab-ce\nxb-cy\n");
        dict.make_all_missed();
        let range = LengthRange::new(2, 2).unwrap();
        let selector = Selector::new(1.0, 1.0, 3.0);
        let layer = Layer::train(LayerKind::Hyphenating, range, selector, &dict, Margins::new(1, 1));
        assert_eq!(Some(&set(&[1])), layer.get("bc"));
        assert_eq!(1, layer.num_patterns());
        let (missed, false_hyphens) = layer.apply_to_dictionary(&mut dict, Margins::new(1, 1));
        assert_eq!((0, 0), (missed, false_hyphens));
    }
}
