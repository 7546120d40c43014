use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Genomic strand/orientation. Orders as `+`, `-`, `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Only `-` walks exons against genomic coordinates; `.` behaves like `+`.
    #[inline]
    pub fn is_reverse(self) -> bool {
        self == Strand::Minus
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        }
    }
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Plus),
            "-" => Ok(Strand::Minus),
            "." | "?" => Ok(Strand::Unknown),
            _ => Err(format!("'{s}' is not a valid strand")),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous interval.
/// Coordinates are 0-based, half-open: [start, end)
///
/// Ordering is by `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    start: u64,
    end: u64,
}

impl Interval {
    /// Create a new interval. Zero-length intervals are allowed.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[start, start + len)`; cannot be inverted.
    #[inline]
    pub fn with_len(start: u64, len: u64) -> Self {
        Self { start, end: start + len }
    }

    #[inline]
    pub fn start(self) -> u64 {
        self.start
    }

    #[inline]
    pub fn end(self) -> u64 {
        self.end
    }

    #[inline]
    pub fn len(self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Touching endpoints do not overlap.
    #[inline]
    pub fn overlaps(self, other: Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[inline]
    pub fn contains_pos(self, pos: u64) -> bool {
        self.start <= pos && pos < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One exon's run in transcript space, anchored at the exon's genomic start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Block {
    span: Interval,
    genomic_start: u64,
}

impl Block {
    pub(crate) fn new(span: Interval, genomic_start: u64) -> Self {
        Self { span, genomic_start }
    }

    /// Transcript-space range of this block.
    #[inline]
    pub fn span(self) -> Interval {
        self.span
    }

    #[inline]
    pub fn start(self) -> u64 {
        self.span.start
    }

    #[inline]
    pub fn end(self) -> u64 {
        self.span.end
    }

    #[inline]
    pub fn genomic_start(self) -> u64 {
        self.genomic_start
    }

    #[inline]
    pub fn contains_pos(self, pos: u64) -> bool {
        self.span.contains_pos(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(s: u64, e: u64) -> Interval {
        Interval::new(s, e).unwrap()
    }

    #[test]
    fn interval_rejects_inverted_range() {
        assert!(matches!(
            Interval::new(10, 5),
            Err(Error::InvalidRange { start: 10, end: 5 })
        ));
        assert!(iv(5, 5).is_empty());
    }

    #[test]
    fn interval_overlap_excludes_touching() {
        assert!(iv(10, 20).overlaps(iv(19, 30)));
        assert!(!iv(10, 20).overlaps(iv(20, 30)));
        assert!(!iv(20, 30).overlaps(iv(10, 20)));
        assert!(iv(10, 40).overlaps(iv(20, 30)));
    }

    #[test]
    fn interval_contains_pos_is_half_open() {
        let i = iv(100, 110);
        assert!(i.contains_pos(100));
        assert!(i.contains_pos(109));
        assert!(!i.contains_pos(110));
        assert!(!i.contains_pos(99));
        assert_eq!(i.len(), 10);
    }

    #[test]
    fn intervals_sort_by_start_then_end() {
        let mut v = vec![iv(30, 40), iv(10, 25), iv(10, 20)];
        v.sort();
        assert_eq!(v, vec![iv(10, 20), iv(10, 25), iv(30, 40)]);
    }

    #[test]
    fn strand_parses_and_prints() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Plus);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Minus);
        assert_eq!(".".parse::<Strand>().unwrap(), Strand::Unknown);
        assert!("x".parse::<Strand>().is_err());
        assert_eq!(Strand::Minus.to_string(), "-");
        assert!(!Strand::Unknown.is_reverse());
    }
}
