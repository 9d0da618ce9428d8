//! Parameters controlling training: margins, pattern length ranges and
//! pattern selectors.
use std::fmt;
use std::iter::Rev;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::errors::{PatgenError, Result};

/// Hyphenation margins.
///
/// No hyphen is ever predicted within `left` characters from the start of a
/// word nor within `right` characters from its end. These are TeX's
/// `\lefthyphenmin` and `\righthyphenmin`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Decode, Encode)]
pub struct Margins {
    /// Minimal length of the unbreakable word prefix.
    pub left: usize,
    /// Minimal length of the unbreakable word suffix.
    pub right: usize,
}

impl Margins {
    /// Creates a new pair of margins.
    #[inline(always)]
    pub const fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl FromStr for Margins {
    type Err = PatgenError;

    /// Parses margins written as `"left,right"`, e.g. `"2,3"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<_> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(PatgenError::invalid_argument(
                "margins",
                format!("expect two numbers delimited with a comma, e.g. \"1,1\". Got: {s}"),
            ));
        }
        Ok(Self::new(parts[0].trim().parse()?, parts[1].trim().parse()?))
    }
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.left, self.right)
    }
}

/// Inclusive range of pattern lengths trained in one layer.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Decode, Encode)]
pub struct LengthRange {
    start: usize,
    end: usize,
}

impl LengthRange {
    /// Creates a new range `start..=end`.
    ///
    /// # Errors
    ///
    /// [`PatgenError`] is returned when `start` is zero or greater than `end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start == 0 {
            return Err(PatgenError::invalid_argument(
                "range",
                "pattern length must be positive",
            ));
        }
        if start > end {
            return Err(PatgenError::invalid_argument(
                "range",
                format!("start {start} is greater than end {end}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Shortest pattern length.
    #[inline(always)]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Longest pattern length.
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Visits the lengths starting from the middle of the range and moving
    /// outwards, alternating below and above.
    ///
    /// For `1-5`, the order is `3, 2, 4, 1, 5`.
    pub fn stagger(&self) -> impl Iterator<Item = usize> {
        let span = self.end - self.start;
        let middle = self.start + span / 2 + span % 2;
        let mut above = middle..=self.end;
        above.next();
        Stagger {
            middle: Some(middle),
            below: (self.start..middle).rev(),
            above,
            below_next: true,
        }
    }
}

struct Stagger {
    middle: Option<usize>,
    below: Rev<Range<usize>>,
    above: RangeInclusive<usize>,
    below_next: bool,
}

impl Iterator for Stagger {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if let Some(middle) = self.middle.take() {
            return Some(middle);
        }
        let item = if self.below_next {
            self.below.next().or_else(|| self.above.next())
        } else {
            self.above.next().or_else(|| self.below.next())
        };
        self.below_next = !self.below_next;
        item
    }
}

impl FromStr for LengthRange {
    type Err = PatgenError;

    /// Parses a range written as `"start-end"`, e.g. `"1-5"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<_> = s.split('-').collect();
        if parts.len() != 2 {
            return Err(PatgenError::invalid_argument(
                "range",
                format!("expect two integers delimited with a dash, e.g. \"1-3\". Got: {s}"),
            ));
        }
        Self::new(parts[0].trim().parse()?, parts[1].trim().parse()?)
    }
}

impl fmt::Display for LengthRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Decides whether a candidate pattern is good enough to be kept.
///
/// A candidate that correctly fires `good` times and wrongly fires `bad`
/// times (both weighted) is selected when
/// `good * good_weight - bad * bad_weight >= threshold`.
#[derive(Clone, Copy, PartialEq, Debug, Decode, Encode)]
pub struct Selector {
    /// Weight of a correct hit.
    pub good_weight: f64,
    /// Weight of a wrong hit.
    pub bad_weight: f64,
    /// Minimal score of a selected pattern.
    pub threshold: f64,
}

impl Selector {
    /// Creates a new selector.
    #[inline(always)]
    pub const fn new(good_weight: f64, bad_weight: f64, threshold: f64) -> Self {
        Self {
            good_weight,
            bad_weight,
            threshold,
        }
    }

    /// Checks the selection criterion.
    #[inline(always)]
    pub fn select(&self, num_good: u64, num_bad: u64) -> bool {
        num_good as f64 * self.good_weight - num_bad as f64 * self.bad_weight >= self.threshold
    }
}

impl FromStr for Selector {
    type Err = PatgenError;

    /// Parses a selector written as `"good_weight:bad_weight:threshold"`,
    /// e.g. `"1:2:10"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<_> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(PatgenError::invalid_argument(
                "selector",
                format!(
                    "expect three values delimited with a colon, e.g. \"1:2:10\". Got: {s}"
                ),
            ));
        }
        let mut values = [0.0f64; 3];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part.trim().parse()?;
            if !value.is_finite() {
                return Err(PatgenError::invalid_argument(
                    "selector",
                    format!("{part} is not a finite number"),
                ));
            }
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.good_weight, self.bad_weight, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_margins() {
        let margins: Margins = "2,3".parse().unwrap();
        assert_eq!(Margins::new(2, 3), margins);
        assert_eq!("2,3", margins.to_string());
    }

    #[test]
    fn test_parse_margins_invalid() {
        assert!("2".parse::<Margins>().is_err());
        assert!("1,2,3".parse::<Margins>().is_err());
        assert!("a,1".parse::<Margins>().is_err());
        assert!("-1,1".parse::<Margins>().is_err());
    }

    #[test]
    fn test_parse_range() {
        let range: LengthRange = "1-5".parse().unwrap();
        assert_eq!(1, range.start());
        assert_eq!(5, range.end());
        assert_eq!("1-5", range.to_string());
    }

    #[test]
    fn test_parse_range_invalid() {
        assert!("1,5".parse::<LengthRange>().is_err());
        assert!("1-2-3".parse::<LengthRange>().is_err());
        assert!("0-3".parse::<LengthRange>().is_err());
        assert!("4-3".parse::<LengthRange>().is_err());
    }

    #[test]
    fn test_stagger() {
        let order: Vec<_> = LengthRange::new(1, 5).unwrap().stagger().collect();
        assert_eq!(vec![3, 2, 4, 1, 5], order);

        let order: Vec<_> = LengthRange::new(1, 2).unwrap().stagger().collect();
        assert_eq!(vec![2, 1], order);

        let order: Vec<_> = LengthRange::new(2, 2).unwrap().stagger().collect();
        assert_eq!(vec![2], order);

        let order: Vec<_> = LengthRange::new(1, 4).unwrap().stagger().collect();
        assert_eq!(vec![3, 2, 4, 1], order);

        let order: Vec<_> = LengthRange::new(2, 7).unwrap().stagger().collect();
        assert_eq!(vec![5, 4, 6, 3, 7, 2], order);
    }

    #[test]
    fn test_stagger_huge_range() {
        let range: LengthRange = "1-18446744073709551615".parse().unwrap();
        let order: Vec<_> = range.stagger().take(3).collect();
        let middle = 1usize << 63;
        assert_eq!(vec![middle, middle - 1, middle + 1], order);

        let range = LengthRange::new(usize::MAX, usize::MAX).unwrap();
        assert_eq!(vec![usize::MAX], range.stagger().collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_selector() {
        let selector: Selector = "1:3:10".parse().unwrap();
        assert_eq!(Selector::new(1.0, 3.0, 10.0), selector);
        assert_eq!("1:3:10", selector.to_string());

        let selector: Selector = "0.5:2:1.5".parse().unwrap();
        assert_eq!("0.5:2:1.5", selector.to_string());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!("1:3".parse::<Selector>().is_err());
        assert!("1:3:10:4".parse::<Selector>().is_err());
        assert!("1:x:10".parse::<Selector>().is_err());
        assert!("1:inf:10".parse::<Selector>().is_err());
        assert!("1:NaN:10".parse::<Selector>().is_err());
    }

    #[test]
    fn test_select() {
        let selector = Selector::new(1.0, 3.0, 10.0);
        assert!(selector.select(10, 0));
        assert!(selector.select(16, 2));
        assert!(!selector.select(15, 2));
    }
}
