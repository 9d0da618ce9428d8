//! # Patgen
//!
//! Patgen learns Liang-style hyphenation patterns from a dictionary of
//! hyphenated words.
//!
//! Patterns are organized in levels. Odd (1-based) levels add hyphens and
//! even levels remove the hyphens predicted wrongly by lower levels. Each
//! level is trained on the errors left by the levels below it.
//!
//! ## Examples
//!
//! ```
//! use patgen::{Dictionary, LengthRange, Project, Selector};
//!
//! let dict = Dictionary::parse("hy-phen\nhap-pen\nphe-no-men\n");
//! let mut project = Project::new(dict, None).unwrap();
//!
//! let range: LengthRange = "1-3".parse().unwrap();
//! let selector: Selector = "1:1:1".parse().unwrap();
//! project.train_new_layer(range, selector).unwrap();
//! project.train_new_layer(range, selector).unwrap();
//!
//! let evaluation = project.evaluate();
//! assert_eq!(project.missed(), evaluation.missed);
//! assert_eq!(project.false_hyphens(), evaluation.false_hyphens);
//! ```
#![deny(missing_docs)]

pub mod chunker;
mod common;
pub mod dictionary;
pub mod errors;
pub mod layer;
pub mod params;
pub mod pattern_set;
pub mod project;
pub mod suffix_array;

#[cfg(test)]
mod tests;

pub use dictionary::{Dictionary, Word};
pub use layer::{Layer, LayerKind};
pub use params::{LengthRange, Margins, Selector};
pub use pattern_set::PatternSet;
pub use project::Project;
