//! Training session persisted between runs.
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bincode::{Decode, Encode};
use log::info;

use crate::common;
use crate::dictionary::{Dictionary, Word};
use crate::errors::{PatgenError, Result};
use crate::layer::{Layer, LayerKind, TrainingParams};
use crate::params::{LengthRange, Margins, Selector};
use crate::pattern_set::{Evaluation, Mismatch, PatternSet};

/// Magic bytes at the head of a project file.
///
/// Bump the version whenever the encoded layout changes.
pub const PROJECT_MAGIC: &[u8] = b"PatgenProject 0.2\n";

/// Outcome of training one layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrainReport {
    /// 1-based level of the new layer.
    pub level: usize,
    /// Kind of the new layer.
    pub kind: LayerKind,
    /// Number of `(n-gram, offset)` pairs in the new layer.
    pub num_patterns: usize,
    /// Weighted number of missed hyphens after applying the layer.
    pub missed: u64,
    /// Weighted number of false hyphens after applying the layer.
    pub false_hyphens: u64,
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A dictionary together with the pattern levels trained on it so far.
///
/// The missed and false hyphens of the dictionary always reflect the
/// application of every level in order.
#[derive(Clone, Debug)]
pub struct Project {
    dictionary: Dictionary,
    margins: Margins,
    total_hyphens: u64,
    pattern_set: PatternSet,
    weights_ignored: bool,
    created: u64,
    modified: u64,
}

impl Project {
    /// Starts a project with no pattern level.
    ///
    /// # Arguments
    ///
    /// * `dictionary` - Hyphenated words to learn from.
    /// * `margins` - Margins to use, or `None` to take the ones observed in
    ///   the dictionary.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when `margins` is `None` and the dictionary
    /// has no true hyphen.
    pub fn new(mut dictionary: Dictionary, margins: Option<Margins>) -> Result<Self> {
        let margins = match margins.or_else(|| dictionary.margins()) {
            Some(margins) => margins,
            None => {
                return Err(PatgenError::invalid_state(
                    "cannot determine the margins",
                    "the dictionary has no hyphen",
                ))
            }
        };
        dictionary.make_all_missed();
        let total_hyphens = dictionary.total_hyphens();
        info!(
            "{} words, {} hyphens, margins {}",
            dictionary.len(),
            total_hyphens,
            margins
        );
        let now = now_epoch();
        Ok(Self {
            dictionary,
            margins,
            total_hyphens,
            pattern_set: PatternSet::new(),
            weights_ignored: false,
            created: now,
            modified: now,
        })
    }

    /// Sets every weight of the dictionary to 1.
    pub fn ignore_weights(&mut self) {
        self.dictionary.ignore_weights();
        self.total_hyphens = self.dictionary.total_hyphens();
        self.weights_ignored = true;
        self.touch();
    }

    /// Checks if the weights of the dictionary were reset by
    /// [`Project::ignore_weights()`].
    #[inline(always)]
    pub const fn weights_ignored(&self) -> bool {
        self.weights_ignored
    }

    /// Creation time in seconds since the Unix epoch.
    #[inline(always)]
    pub const fn created(&self) -> u64 {
        self.created
    }

    /// Time of the last change in seconds since the Unix epoch.
    #[inline(always)]
    pub const fn modified(&self) -> u64 {
        self.modified
    }

    fn touch(&mut self) {
        self.modified = now_epoch();
    }

    /// Returns the dictionary with its current missed and false hyphens.
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Returns the margins.
    #[inline(always)]
    pub const fn margins(&self) -> Margins {
        self.margins
    }

    /// Weighted number of true hyphens.
    #[inline(always)]
    pub const fn total_hyphens(&self) -> u64 {
        self.total_hyphens
    }

    /// Weighted number of missed hyphens.
    pub fn missed(&self) -> u64 {
        self.dictionary.total_missed()
    }

    /// Weighted number of false hyphens.
    pub fn false_hyphens(&self) -> u64 {
        self.dictionary.total_false()
    }

    /// Returns the trained levels.
    #[inline(always)]
    pub fn pattern_set(&self) -> &PatternSet {
        &self.pattern_set
    }

    /// Trains the next level on the current state and applies it.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when the layer cannot be appended.
    pub fn train_new_layer(&mut self, range: LengthRange, selector: Selector) -> Result<TrainReport> {
        let level = self.pattern_set.len() + 1;
        let kind = LayerKind::from_index(level - 1);
        info!("training level {level} ({kind:?}) with range {range} and selector {selector}");

        let layer = Layer::train(kind, range, selector, &self.dictionary, self.margins);
        let (missed, false_hyphens) = layer.apply_to_dictionary(&mut self.dictionary, self.margins);
        let num_patterns = layer.num_patterns();
        self.pattern_set.push(layer)?;
        self.touch();

        info!("level {level}: {num_patterns} patterns, {missed} missed, {false_hyphens} false");
        Ok(TrainReport {
            level,
            kind,
            num_patterns,
            missed,
            false_hyphens,
        })
    }

    /// Evaluates all levels on the dictionary.
    pub fn evaluate(&self) -> Evaluation {
        self.pattern_set.evaluate(&self.dictionary, self.margins)
    }

    /// Lists the words the levels hyphenate wrongly.
    pub fn errors(&self) -> Vec<Mismatch> {
        self.pattern_set.errors(&self.dictionary, self.margins)
    }

    /// Lists the wrongly hyphenated words in the format of the
    /// `\hyphenation` block.
    pub fn exceptions(&self) -> Vec<String> {
        self.pattern_set.exceptions(&self.dictionary, self.margins)
    }

    /// Predicts the hyphens of a word.
    pub fn hyphenate(&self, word: &str) -> BTreeSet<usize> {
        self.pattern_set.hyphenate(word, self.margins)
    }

    /// Removes redundant patterns. Returns the number of removed assignments.
    pub fn compact(&mut self) -> usize {
        let removed = self.pattern_set.compact();
        self.replay();
        self.touch();
        removed
    }

    /// Replaces the levels with the given ones.
    pub fn import_patterns(&mut self, pattern_set: PatternSet) {
        self.pattern_set = pattern_set;
        self.replay();
        self.touch();
    }

    /// Exchanges the level at the 0-based `index` with the one of `other`.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned, and neither project changes, when the
    /// projects have different numbers of levels or `index` is out of range.
    pub fn swap_layer(&mut self, other: &mut Self, index: usize) -> Result<()> {
        self.pattern_set.swap_layer(&mut other.pattern_set, index)?;
        self.replay();
        other.replay();
        self.touch();
        other.touch();
        Ok(())
    }

    /// Recomputes the missed and false hyphens from scratch.
    fn replay(&mut self) {
        self.dictionary.make_all_missed();
        for layer in self.pattern_set.layers() {
            layer.apply_to_dictionary(&mut self.dictionary, self.margins);
        }
    }

    /// Exports the project.
    ///
    /// Returns the number of written bytes.
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<usize>
    where
        W: Write,
    {
        wtr.write_all(PROJECT_MAGIC)?;
        let data = ProjectData::from(self);
        let num_bytes = bincode::encode_into_std_write(data, &mut wtr, common::bincode_config())?;
        Ok(PROJECT_MAGIC.len() + num_bytes)
    }

    /// Reads a project exported by [`Project::write()`].
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when the input does not start with
    /// [`PROJECT_MAGIC`] or its content is inconsistent.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut magic = [0; PROJECT_MAGIC.len()];
        rdr.read_exact(&mut magic)?;
        if magic != PROJECT_MAGIC {
            return Err(PatgenError::invalid_format(
                "rdr",
                "the magic number of the input project mismatches",
            ));
        }
        let data: ProjectData = bincode::decode_from_std_read(&mut rdr, common::bincode_config())?;
        Self::try_from(data)
    }
}

#[derive(Decode, Encode)]
struct WordData {
    text: String,
    hyphens: Vec<usize>,
    missed: Vec<usize>,
    false_hyphens: Vec<usize>,
    weights: Vec<u32>,
}

#[derive(Decode, Encode)]
struct LayerData {
    kind: LayerKind,
    params: Option<TrainingParams>,
    rules: Vec<(String, Vec<usize>)>,
}

#[derive(Decode, Encode)]
struct ProjectData {
    created: u64,
    modified: u64,
    weights_ignored: bool,
    margins: Margins,
    words: Vec<WordData>,
    layers: Vec<LayerData>,
}

impl From<&Project> for ProjectData {
    fn from(project: &Project) -> Self {
        let words = project
            .dictionary
            .iter()
            .map(|word| WordData {
                text: word.text().to_string(),
                hyphens: word.hyphens().iter().cloned().collect(),
                missed: word.missed().iter().cloned().collect(),
                false_hyphens: word.false_hyphens().iter().cloned().collect(),
                weights: word.weights().to_vec(),
            })
            .collect();
        let layers = project
            .pattern_set
            .layers()
            .iter()
            .map(|layer| {
                let mut rules: Vec<_> = layer
                    .rules()
                    .map(|(chunk, offsets)| (chunk.to_string(), offsets.iter().cloned().collect()))
                    .collect();
                rules.sort_unstable();
                LayerData {
                    kind: layer.kind(),
                    params: layer.params(),
                    rules,
                }
            })
            .collect();
        Self {
            created: project.created,
            modified: project.modified,
            weights_ignored: project.weights_ignored,
            margins: project.margins,
            words,
            layers,
        }
    }
}

impl TryFrom<ProjectData> for Project {
    type Error = PatgenError;

    fn try_from(data: ProjectData) -> Result<Self> {
        let mut dictionary = Dictionary::new();
        for w in data.words {
            dictionary.insert(Word::from_parts(
                w.text,
                w.hyphens.into_iter().collect(),
                w.missed.into_iter().collect(),
                w.false_hyphens.into_iter().collect(),
                w.weights,
            )?);
        }
        let mut pattern_set = PatternSet::new();
        for l in data.layers {
            let mut layer = Layer::new(l.kind, l.params);
            for (chunk, offsets) in l.rules {
                for offset in offsets {
                    layer.insert(&chunk, offset);
                }
            }
            pattern_set.push(layer)?;
        }
        let total_hyphens = dictionary.total_hyphens();
        Ok(Self {
            dictionary,
            margins: data.margins,
            total_hyphens,
            pattern_set,
            weights_ignored: data.weights_ignored,
            created: data.created,
            modified: data.modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        Dictionary::parse("ab-cd\nab-ce\nxb-cy\nabc-de\n")
    }

    #[test]
    fn test_new() {
        let project = Project::new(sample(), None).unwrap();
        assert_eq!(Margins::new(2, 2), project.margins());
        assert_eq!(4, project.total_hyphens());
        assert_eq!(4, project.missed());
        assert_eq!(0, project.false_hyphens());
        assert!(project.pattern_set().is_empty());
    }

    #[test]
    fn test_new_without_hyphens() {
        let dict = Dictionary::parse("abc\ndef\n");
        assert!(Project::new(dict.clone(), None).is_err());
        let project = Project::new(dict, Some(Margins::new(1, 1))).unwrap();
        assert_eq!(Margins::new(1, 1), project.margins());
    }

    #[test]
    fn test_train_new_layer() {
        let mut project = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        let report =
            project.train_new_layer(LengthRange::new(2, 2).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(1, report.level);
        assert_eq!(LayerKind::Hyphenating, report.kind);
        assert_eq!(report.missed, project.missed());
        assert_eq!(report.false_hyphens, project.false_hyphens());
        assert_eq!(1, project.pattern_set().len());

        let evaluation = project.evaluate();
        assert_eq!(project.missed(), evaluation.missed);
        assert_eq!(project.false_hyphens(), evaluation.false_hyphens);
    }

    #[test]
    fn test_write_read() {
        let mut project = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        project.train_new_layer(LengthRange::new(1, 3).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();
        project.train_new_layer(LengthRange::new(1, 3).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();

        let mut buf = vec![];
        let num_bytes = project.write(&mut buf).unwrap();
        assert_eq!(buf.len(), num_bytes);
        assert!(buf.starts_with(PROJECT_MAGIC));

        let other = Project::read(buf.as_slice()).unwrap();
        assert_eq!(project.margins(), other.margins());
        assert_eq!(project.total_hyphens(), other.total_hyphens());
        assert_eq!(project.dictionary().words(), other.dictionary().words());
        assert_eq!(
            project.pattern_set().pattern_strings(),
            other.pattern_set().pattern_strings()
        );
        assert_eq!(
            project.pattern_set().layers()[0].params(),
            other.pattern_set().layers()[0].params()
        );
        assert_eq!(project.created(), other.created());
        assert_eq!(project.modified(), other.modified());
        assert!(!other.weights_ignored());
    }

    #[test]
    fn test_ignore_weights() {
        let mut project = Project::new(Dictionary::parse("3ab-cd\nab-ce\n"), None).unwrap();
        assert_eq!(4, project.total_hyphens());
        assert!(!project.weights_ignored());

        project.ignore_weights();
        assert_eq!(2, project.total_hyphens());
        assert_eq!(2, project.missed());
        assert!(project.weights_ignored());
        assert!(project.created() <= project.modified());

        let mut buf = vec![];
        project.write(&mut buf).unwrap();
        let other = Project::read(buf.as_slice()).unwrap();
        assert!(other.weights_ignored());
        assert_eq!(2, other.total_hyphens());
    }

    #[test]
    fn test_modified_time() {
        let mut project = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        assert_eq!(project.created(), project.modified());
        project.modified = 0;
        project.train_new_layer(LengthRange::new(2, 2).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();
        assert!(project.created() <= project.modified());
        project.modified = 0;
        project.compact();
        assert!(project.created() <= project.modified());
    }

    #[test]
    fn test_read_wrong_magic() {
        let project = Project::new(sample(), None).unwrap();
        let mut buf = vec![];
        project.write(&mut buf).unwrap();
        buf[PROJECT_MAGIC.len() - 2] = b'9';
        assert!(matches!(
            Project::read(buf.as_slice()),
            Err(PatgenError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_swap_layer_mismatch() {
        let mut a = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        let mut b = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        a.train_new_layer(LengthRange::new(2, 2).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();
        let missed = a.missed();
        assert!(a.swap_layer(&mut b, 0).is_err());
        assert_eq!(1, a.pattern_set().len());
        assert_eq!(missed, a.missed());
        assert!(b.pattern_set().is_empty());
    }

    #[test]
    fn test_swap_layer_replays() {
        let mut a = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        let mut b = Project::new(sample(), Some(Margins::new(1, 1))).unwrap();
        a.train_new_layer(LengthRange::new(2, 2).unwrap(), Selector::new(1.0, 1.0, 1.0)).unwrap();
        b.train_new_layer(LengthRange::new(1, 1).unwrap(), Selector::new(1.0, 100.0, 1.0)).unwrap();
        let (a_missed, b_missed) = (a.missed(), b.missed());

        a.swap_layer(&mut b, 0).unwrap();
        assert_eq!(b_missed, a.missed());
        assert_eq!(a_missed, b.missed());
    }
}
