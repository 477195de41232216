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
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{Chart, ChartEntry, ChartError};

/// How lanes are picked for consecutive onsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneStrategy {
    /// Every onset gets an independent, uniformly random lane.
    #[default]
    Random,
    /// Uniformly random, but never the same lane twice in a row.
    NoRepeat,
}

impl FromStr for LaneStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(LaneStrategy::Random),
            "no-repeat" => Ok(LaneStrategy::NoRepeat),
            _ => Err(format!(
                "unknown lane strategy '{}', expected random or no-repeat",
                s
            )),
        }
    }
}

/// Maps beat onsets onto lanes.
pub struct LaneAssigner {
    lanes: usize,
    strategy: LaneStrategy,
}

impl LaneAssigner {
    /// Creates a new lane assigner.
    pub fn new(lanes: usize, strategy: LaneStrategy) -> Result<LaneAssigner, ChartError> {
        if lanes == 0 {
            return Err(ChartError::NoLanes);
        }
        Ok(LaneAssigner { lanes, strategy })
    }

    /// Gets the number of lanes.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn strategy(&self) -> LaneStrategy {
        self.strategy
    }

    /// Assigns a lane to every onset. Onsets are kept in order and none are dropped or
    /// merged, so the onsets must already be sorted.
    pub fn assign<R: Rng>(&self, onsets: &[f64], rng: &mut R) -> Result<Chart, ChartError> {
        let mut previous: Option<usize> = None;
        let entries: Vec<ChartEntry> = onsets
            .iter()
            .map(|time| {
                let lane = self.pick(previous, rng);
                previous = Some(lane);
                ChartEntry::new(lane, *time)
            })
            .collect();

        debug!(
            notes = entries.len(),
            lanes = self.lanes,
            strategy = ?self.strategy,
            "Assigned lanes"
        );

        Chart::new(self.lanes, entries)
    }

    fn pick<R: Rng>(&self, previous: Option<usize>, rng: &mut R) -> usize {
        match (self.strategy, previous) {
            (LaneStrategy::NoRepeat, Some(previous)) if self.lanes > 1 => {
                // Pick among the other lanes, skipping over the previous one.
                let lane = rng.gen_range(0..self.lanes - 1);
                if lane >= previous {
                    lane + 1
                } else {
                    lane
                }
            }
            _ => rng.gen_range(0..self.lanes),
        }
    }
}
