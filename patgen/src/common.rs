use bincode::config::{self, Fixint, LittleEndian};

/// Marker of a true hyphen in the dictionary format.
pub const TRUE_HYPHEN: char = '-';

/// Marker of a true hyphen that the patterns do not predict yet.
pub const MISSED_HYPHEN: char = '.';

/// Marker of a predicted hyphen that is not a true one.
pub const FALSE_HYPHEN: char = '*';

/// Character padding both ends of a word before n-grams are cut out of it.
pub const WORD_BOUNDARY: char = '.';

pub fn bincode_config() -> config::Configuration<LittleEndian, Fixint> {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
        .write_fixed_array_length()
}
