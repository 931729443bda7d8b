use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ChromosomeError;

/// Opaque handle naming a founder lineage.
///
/// Ids are resolved to alleles only through a variant resolver; they never
/// own or reference anything in a population.
pub type AncestryId = u32;

/// Position along a chromosome.
pub type Position = u32;

/// A run of a chromosome inherited from a single founder lineage.
///
/// The segment covers `[start_position, next.start_position)`, or up to the
/// chromosome end for the last segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub start_position: Position,
    pub ancestry_id: AncestryId,
}

impl Segment {
    #[inline]
    pub fn new(start_position: Position, ancestry_id: AncestryId) -> Self {
        Self {
            start_position,
            ancestry_id,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.start_position, self.ancestry_id)
    }
}

impl FromStr for Segment {
    type Err = ChromosomeError;

    /// Parse the `(start,id)` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ChromosomeError::Parse(format!("expected (start,id), found '{s}'")))?;

        let (start, id) = inner
            .split_once(',')
            .ok_or_else(|| ChromosomeError::Parse(format!("missing ',' in segment '{s}'")))?;

        let start_position = start
            .trim()
            .parse()
            .map_err(|e| ChromosomeError::Parse(format!("bad start in '{s}': {e}")))?;
        let ancestry_id = id
            .trim()
            .parse()
            .map_err(|e| ChromosomeError::Parse(format!("bad ancestry id in '{s}': {e}")))?;

        Ok(Self::new(start_position, ancestry_id))
    }
}
