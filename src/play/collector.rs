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
use std::time::Duration;

/// The collector at the bottom of each lane. A collector lights up whenever its lane is
/// pressed, hit or not.
#[derive(Debug, Clone, Default)]
pub struct LaneCollectors {
    flashes: Vec<Option<Duration>>,
}

impl LaneCollectors {
    pub fn new(lanes: usize) -> LaneCollectors {
        LaneCollectors {
            flashes: vec![None; lanes],
        }
    }

    pub fn lanes(&self) -> usize {
        self.flashes.len()
    }

    /// Records a press. Presses outside of the lanes are ignored.
    pub fn stamp(&mut self, lane: usize, now: Duration) {
        if let Some(flash) = self.flashes.get_mut(lane) {
            *flash = Some(now);
        }
    }

    pub fn last_flash(&self, lane: usize) -> Option<Duration> {
        self.flashes.get(lane).copied().flatten()
    }

    pub fn is_flashing(&self, lane: usize, now: Duration, duration: Duration) -> bool {
        match self.last_flash(lane) {
            Some(flash) => now.saturating_sub(flash) < duration,
            None => false,
        }
    }

    /// Last press times for every lane.
    pub fn flashes(&self) -> &[Option<Duration>] {
        &self.flashes
    }
}
