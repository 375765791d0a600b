//! Wire and persisted entities.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub type ProbeId = i64;

/// A single telemetry reading, the shape of both inbound and outbound events.
///
/// Many events share an id; the id keys the accumulated state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub id: ProbeId,
    pub value: i64,
}

impl Probe {
    /// Parses a probe from a raw UTF-8 JSON payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).context("failed to parse the probe payload")
    }

    pub fn to_payload(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("failed to serialize the probe")
    }
}

/// Pending readings of one probe id.
///
/// At rest it holds zero or one reading: the second reading is immediately
/// reduced to an averaged probe and the record is reset before it is saved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    pub id: ProbeId,
    pub values: Vec<i64>,
}

impl Accumulator {
    pub const PAIR_SIZE: usize = 2;

    pub fn new(id: ProbeId) -> Self {
        Self {
            id,
            values: Vec::new(),
        }
    }

    /// Appends a reading and reduces the record once the pair is complete.
    ///
    /// Returns the mean of the pair, truncated toward zero, or `None` while
    /// the pair is still incomplete. Reducing clears the stored readings.
    pub fn push(&mut self, value: i64) -> Option<i64> {
        self.values.push(value);
        if self.values.len() != Self::PAIR_SIZE {
            return None;
        }
        // The sum of two `i64`-s may not fit into `i64`.
        let sum = self.values.iter().map(|value| *value as i128).sum::<i128>();
        self.values.clear();
        Some((sum / Self::PAIR_SIZE as i128) as i64)
    }
}
