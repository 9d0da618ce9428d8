//! Suffix array over a set of strings.

/// Index answering "which stored strings contain this string, and where".
///
/// Every suffix of every stored string, except the one-character suffix, is
/// kept in lexicographic order.
pub struct SuffixArray {
    values: Vec<String>,
    // (value index, byte offset of the suffix, character offset of the suffix)
    suffixes: Vec<(usize, usize, usize)>,
}

impl SuffixArray {
    /// Builds the index.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let mut suffixes = vec![];
        for (idx, value) in values.iter().enumerate() {
            let num_chars = value.chars().count();
            for (char_offset, (byte_offset, _)) in
                value.char_indices().take(num_chars.saturating_sub(1)).enumerate()
            {
                suffixes.push((idx, byte_offset, char_offset));
            }
        }
        suffixes.sort_unstable_by(|&(a, a_byte, a_char), &(b, b_byte, b_char)| {
            values[a][a_byte..]
                .cmp(&values[b][b_byte..])
                .then_with(|| values[a].cmp(&values[b]))
                .then(a_char.cmp(&b_char))
        });
        Self { values, suffixes }
    }

    #[inline(always)]
    fn suffix(&self, entry: (usize, usize, usize)) -> &str {
        &self.values[entry.0][entry.1..]
    }

    /// Finds the stored strings that contain `query` starting at some offset.
    ///
    /// Yields `(string, character offset)` pairs. The string itself is also
    /// reported when it is stored and longer than one character.
    pub fn superstrings<'a>(&'a self, query: &'a str) -> impl Iterator<Item = (&'a str, usize)> + 'a {
        let first = self
            .suffixes
            .partition_point(|&entry| self.suffix(entry) < query);
        self.suffixes[first..]
            .iter()
            .take_while(move |&&entry| self.suffix(entry).starts_with(query))
            .map(move |&(idx, _, char_offset)| (self.values[idx].as_str(), char_offset))
    }

    /// Number of indexed suffixes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    /// Checks if no suffix is indexed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}
