/// Line-range codec: closed line intervals and their minimal string form.
///
/// Chunk provenance is reported as range strings (`"1-3"`), and labeled
/// sub-chunks are re-associated with their source sub-chunks by comparing
/// encoded range lists for equality. Both directions live here.
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error raised when a `"start-end"` range string cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed line range `{0}`")]
pub struct ParseRangeError(pub String);

/// A closed interval of 1-indexed source line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    /// Create a range, rejecting inverted or zero-based bounds.
    pub fn new(start: usize, end: usize) -> Result<Self, ParseRangeError> {
        if start == 0 || end < start {
            return Err(ParseRangeError(format!("{start}-{end}")));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Number of source lines covered (ranges are closed, so never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Iterate the covered line numbers in ascending order.
    #[must_use]
    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl FromStr for LineRange {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ParseRangeError(s.to_string()))?;
        let start: usize = start
            .trim()
            .parse()
            .map_err(|_| ParseRangeError(s.to_string()))?;
        let end: usize = end
            .trim()
            .parse()
            .map_err(|_| ParseRangeError(s.to_string()))?;
        Self::new(start, end).map_err(|_| ParseRangeError(s.to_string()))
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Collapse a collection of line numbers into the minimal ordered list of
/// consecutive-range strings.
///
/// Input order and duplicates are irrelevant: `[3, 1, 2, 5, 6]` → `["1-3", "5-6"]`.
/// Empty input yields an empty list.
#[must_use]
pub fn to_consecutive_ranges(lines: &[usize]) -> Vec<String> {
    if lines.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<usize> = lines.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges = Vec::new();
    let mut start = sorted[0];
    let mut prev = sorted[0];

    for &line in &sorted[1..] {
        if line == prev + 1 {
            prev = line;
        } else {
            ranges.push(format!("{start}-{prev}"));
            start = line;
            prev = line;
        }
    }

    ranges.push(format!("{start}-{prev}"));
    ranges
}

/// Expand a list of range strings back into the flat ascending line numbers.
pub fn from_consecutive_ranges(ranges: &[String]) -> Result<Vec<usize>, ParseRangeError> {
    let mut lines = Vec::new();
    for raw in ranges {
        let range: LineRange = raw.parse()?;
        lines.extend(range.lines());
    }
    Ok(lines)
}
