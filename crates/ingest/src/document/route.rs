//! Header routes: the sibling-index path from the document root to a section.
//!
//! A route serializes as its segments joined with `>` (`"1>2>1"`). The root
//! has the empty route. Ordering is segment-wise: the first differing segment
//! decides, and an ancestor sorts before its descendants, which is exactly
//! document pre-order.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

const SEPARATOR: char = '>';

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderRoute(Vec<u32>);

impl HeaderRoute {
    /// The empty route of the synthetic root section.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a route from 1-based sibling indices.
    pub fn from_segments(segments: Vec<u32>) -> Result<Self, ValidationError> {
        if segments.contains(&0) {
            return Err(ValidationError::InvalidRoute {
                route: join(&segments),
                reason: "segments must be positive".to_string(),
            });
        }
        Ok(Self(segments))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Sibling index of this section under its parent.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Route of the `index`-th (1-based) child of this section.
    pub fn child(&self, index: u32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(index);
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }
}

fn join(segments: &[u32]) -> String {
    segments
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(">")
}

impl fmt::Display for HeaderRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.0))
    }
}

impl FromStr for HeaderRoute {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let segments = trimmed
            .split(SEPARATOR)
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|e| ValidationError::InvalidRoute {
                        route: s.to_string(),
                        reason: format!("segment {part:?}: {e}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_segments(segments).map_err(|_| ValidationError::InvalidRoute {
            route: s.to_string(),
            reason: "segments must be positive".to_string(),
        })
    }
}

impl Serialize for HeaderRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HeaderRoute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
