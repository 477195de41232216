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
use super::note::{Note, NoteState};
use super::settings::PlaySettings;

/// Plays a session perfectly: presses a lane as soon as an active note in it reaches
/// the target line.
#[derive(Debug, Clone)]
pub struct Autoplay {
    target_line: f64,
    bottom: f64,
}

impl Autoplay {
    pub fn new(settings: &PlaySettings) -> Autoplay {
        Autoplay {
            target_line: settings.target_line(),
            bottom: settings.playfield_height,
        }
    }

    /// The lanes to press this frame, at most once each, in lane order.
    pub fn presses(&self, notes: &[Note]) -> Vec<usize> {
        let mut lanes: Vec<usize> = notes
            .iter()
            .filter(|note| {
                note.state() == NoteState::Active
                    && self.target_line <= note.position()
                    && note.position() <= self.bottom
            })
            .map(|note| note.lane())
            .collect();
        lanes.sort_unstable();
        lanes.dedup();
        lanes
    }
}
