//! Ancestry chromosomes.
//!
//! A chromosome is stored as a piecewise-constant map from position to
//! ancestry id: an ordered list of [`Segment`]s, the first starting at 0. The
//! chromosome length is not stored; each segment extends to the next segment's
//! start, and the last one to the end of the chromosome.
//!
//! Adjacent segments that happen to share an ancestry id are kept apart.
//! Equality is structural, so two chromosomes with the same coverage but
//! different segment boundaries compare unequal. Use [`Chromosome::coalesced`]
//! to get the minimal form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::base::{AncestryId, Position, Segment};
use crate::errors::ChromosomeError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chromosome {
    segments: Vec<Segment>,
}

impl Chromosome {
    /// A chromosome inherited entirely from one founder lineage.
    pub fn founder(ancestry_id: AncestryId) -> Self {
        Self {
            segments: vec![Segment::new(0, ancestry_id)],
        }
    }

    /// Build a chromosome from segments, checking the ordering invariants.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, ChromosomeError> {
        let first = segments.first().ok_or(ChromosomeError::Empty)?;
        if first.start_position != 0 {
            return Err(ChromosomeError::NonZeroStart(first.start_position));
        }
        if let Some(w) = segments
            .windows(2)
            .find(|w| w[0].start_position >= w[1].start_position)
        {
            return Err(ChromosomeError::Unordered {
                previous: w[0].start_position,
                next: w[1].start_position,
            });
        }
        Ok(Self { segments })
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Index of the segment covering `position`.
    #[inline]
    pub fn segment_index_at(&self, position: Position) -> usize {
        // first segment starts at 0, so the partition point is at least 1
        self.segments
            .partition_point(|s| s.start_position <= position)
            .saturating_sub(1)
    }

    /// Ancestry id at `position`: the id of the last segment starting at or
    /// before it.
    #[inline]
    pub fn coordinate_lookup(&self, position: Position) -> AncestryId {
        self.segments[self.segment_index_at(position)].ancestry_id
    }

    /// Distinct ancestry ids present, in ascending order.
    pub fn ancestry_ids(&self) -> Vec<AncestryId> {
        let mut ids: Vec<_> = self.segments.iter().map(|s| s.ancestry_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Append the segments covering `[begin, end)` to `out`.
    ///
    /// The first appended segment always starts exactly at `begin`; if `begin`
    /// falls inside a segment, that segment is cut. Nothing is appended when
    /// `begin >= end`.
    pub fn extract_segments(&self, begin: Position, end: Position, out: &mut Vec<Segment>) {
        if begin >= end {
            return;
        }
        let lo = self.segments.partition_point(|s| s.start_position < begin);
        let hi = self.segments.partition_point(|s| s.start_position < end);

        if lo == self.segments.len() || self.segments[lo].start_position > begin {
            // begin > 0 here, so lo >= 1
            out.push(Segment::new(begin, self.segments[lo - 1].ancestry_id));
        }
        out.extend_from_slice(&self.segments[lo..hi]);
    }

    /// Build a gamete from two parental chromosomes.
    ///
    /// Copying starts from `first` and switches parent at every breakpoint.
    /// A leading breakpoint at 0 therefore means "start from `second`". The
    /// output is cut exactly at each breakpoint and the segment beginning there
    /// takes the newly active parent's ancestry at that position. Boundaries of
    /// each parent are kept only inside the interval that parent supplies.
    ///
    /// Breakpoints must be sorted. Repeated breakpoints cancel out.
    pub fn recombine(first: &Chromosome, second: &Chromosome, breakpoints: &[Position]) -> Self {
        debug_assert!(breakpoints.windows(2).all(|w| w[0] <= w[1]));

        let mut segments =
            Vec::with_capacity(first.segments.len().max(second.segments.len()) + breakpoints.len());
        let mut from_first = true;
        let mut begin = 0;

        for &breakpoint in breakpoints {
            let source = if from_first { first } else { second };
            source.extract_segments(begin, breakpoint, &mut segments);
            from_first = !from_first;
            begin = breakpoint;
        }

        let source = if from_first { first } else { second };
        source.extract_segments(begin, Position::MAX, &mut segments);

        Self { segments }
    }

    /// Copy with adjacent same-ancestry segments merged.
    pub fn coalesced(&self) -> Self {
        let mut segments: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for &segment in &self.segments {
            match segments.last() {
                Some(last) if last.ancestry_id == segment.ancestry_id => {}
                _ => segments.push(segment),
            }
        }
        Self { segments }
    }
}

impl fmt::Display for Chromosome {
    /// Writes `{ (0,1) (50,2) }`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for segment in &self.segments {
            write!(f, "{segment} ")?;
        }
        f.write_str("}")
    }
}

impl FromStr for Chromosome {
    type Err = ChromosomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .ok_or_else(|| ChromosomeError::Parse(format!("expected {{ ... }}, found '{s}'")))?;

        let segments = inner
            .split_inclusive(')')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Segment>, _>>()?;

        Self::from_segments(segments)
    }
}
