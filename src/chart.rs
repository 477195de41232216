// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::time::Duration;

mod error;
mod store;

pub use error::ChartError;
pub use store::{load, load_from_path, save, save_to_path};

/// The number of lanes a chart has unless configured otherwise.
pub const DEFAULT_LANES: usize = 4;

/// A single note in a chart: the lane it falls in and when it lands, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartEntry {
    pub lane: usize,
    pub time: f64,
}

impl ChartEntry {
    pub fn new(lane: usize, time: f64) -> ChartEntry {
        ChartEntry { lane, time }
    }
}

/// An immutable, time sorted sequence of notes over a fixed number of lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    lanes: usize,
    entries: Vec<ChartEntry>,
}

impl Chart {
    /// Creates a new chart, verifying that every entry is in range and that entries
    /// are sorted by time.
    pub fn new(lanes: usize, entries: Vec<ChartEntry>) -> Result<Chart, ChartError> {
        if lanes == 0 {
            return Err(ChartError::NoLanes);
        }

        for (index, entry) in entries.iter().enumerate() {
            if entry.lane >= lanes {
                return Err(ChartError::Corrupt(format!(
                    "entry {} uses lane {} but the chart has {} lanes",
                    index, entry.lane, lanes
                )));
            }
            if Duration::try_from_secs_f64(entry.time).is_err() {
                return Err(ChartError::Corrupt(format!(
                    "entry {} has invalid time {}",
                    index, entry.time
                )));
            }
            if index > 0 && entry.time < entries[index - 1].time {
                return Err(ChartError::Corrupt(format!(
                    "entry {} at {}s is earlier than the entry before it",
                    index, entry.time
                )));
            }
        }

        Ok(Chart { lanes, entries })
    }

    /// Gets the number of lanes.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Gets the entries in time order.
    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts the notes in each lane.
    pub fn lane_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.lanes];
        for entry in self.entries.iter() {
            counts[entry.lane] += 1;
        }
        counts
    }

    /// The time of the last note, in seconds.
    pub fn duration(&self) -> f64 {
        self.entries.last().map(|entry| entry.time).unwrap_or(0.0)
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chart ({} notes, {} lanes):", self.len(), self.lanes)?;
        for (lane, count) in self.lane_counts().iter().enumerate() {
            writeln!(f, "  - Lane {}: {} notes", lane, count)?;
        }
        if let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) {
            writeln!(f, "  First note: {:.3}s", first.time)?;
            writeln!(f, "  Last note: {:.3}s", last.time)?;
        }
        Ok(())
    }
}
