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
use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use super::note::{Note, NoteId, NoteState};
use super::settings::{PlaySettings, ReleaseMode};
use crate::chart::Chart;
use crate::clock::BeatTimer;

/// What happened during a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Notes put into play.
    pub released: Vec<NoteId>,
    /// Notes that scrolled off unhit without a penalty.
    pub expired: Vec<NoteId>,
    /// Notes that scrolled off unhit and should be charged as misses.
    pub missed: Vec<NoteId>,
    /// Hit notes removed once their flash finished or they left the playfield.
    pub cleared: Vec<NoteId>,
    /// Notes thrown away because their state became invalid.
    pub dropped: Vec<NoteId>,
}

/// Owns the notes of a play session: the ones still waiting to be released and the
/// live ones falling down the playfield.
pub struct NoteScheduler {
    settings: PlaySettings,
    pending: VecDeque<Note>,
    live: Vec<Note>,
    beat_timer: BeatTimer,
    started_at: Duration,
    last_tick: Duration,
}

impl NoteScheduler {
    /// Creates a scheduler with no notes.
    pub fn new(settings: PlaySettings) -> NoteScheduler {
        let beat_timer = BeatTimer::new(settings.bpm, Duration::ZERO);
        NoteScheduler {
            settings,
            pending: VecDeque::new(),
            live: Vec::new(),
            beat_timer,
            started_at: Duration::ZERO,
            last_tick: Duration::ZERO,
        }
    }

    /// Discards every note and queues the chart's notes as pending.
    pub fn start(&mut self, chart: &Chart, now: Duration) {
        self.live.clear();
        self.pending = chart
            .entries()
            .iter()
            .enumerate()
            .map(|(id, entry)| Note::pending(id, entry.lane, entry.time, self.settings.note_height))
            .collect();
        self.beat_timer = BeatTimer::new(self.settings.bpm, now);
        self.started_at = now;
        self.last_tick = now;
    }

    /// Notes currently on the playfield, in release order.
    pub fn live(&self) -> &[Note] {
        &self.live
    }

    pub(crate) fn live_mut(&mut self) -> &mut [Note] {
        &mut self.live
    }

    /// Number of notes not yet released.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// True once every note has been released and has left the playfield.
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.live.is_empty()
    }

    /// Advances the playfield to `now`: releases due notes, moves live notes by the
    /// distance covered since the previous tick, and removes notes that are done.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        let mut report = TickReport::default();
        let elapsed = now.saturating_sub(self.last_tick);
        self.last_tick = now;
        let distance = self.settings.note_speed * elapsed.as_secs_f64();

        for note in self.live.iter_mut() {
            note.advance(distance);
        }

        match self.settings.release_mode {
            ReleaseMode::BeatInterval => {
                if !self.pending.is_empty() && self.beat_timer.poll(now) {
                    self.release_next(0.0, &mut report);
                }
            }
            ReleaseMode::Onset => {
                let travel_time = self.settings.travel_time();
                while let Some(release_at) = self.pending.front().map(|note| {
                    let onset =
                        Duration::try_from_secs_f64(note.onset()).unwrap_or(Duration::MAX);
                    self.started_at
                        .saturating_add(onset.saturating_sub(travel_time))
                }) {
                    if release_at > now {
                        break;
                    }
                    let late = now.saturating_sub(release_at).as_secs_f64();
                    self.release_next(self.settings.note_speed * late, &mut report);
                }
            }
        }

        self.retire(now, &mut report);
        report
    }

    fn release_next(&mut self, position: f64, report: &mut TickReport) {
        if let Some(mut note) = self.pending.pop_front() {
            note.release(position);
            debug!(id = note.id(), lane = note.lane(), "Released note");
            report.released.push(note.id());
            self.live.push(note);
        }
    }

    fn retire(&mut self, now: Duration, report: &mut TickReport) {
        let height = self.settings.playfield_height;
        let flash_duration = self.settings.flash_duration;
        let penalize = self.settings.expiry_penalty;

        self.live.retain_mut(|note| {
            if !note.position().is_finite() {
                warn!(
                    id = note.id(),
                    lane = note.lane(),
                    position = note.position(),
                    "Dropping note with an invalid position"
                );
                report.dropped.push(note.id());
                return false;
            }

            match note.state() {
                NoteState::Hit => {
                    if note.position() >= height || !note.is_flashing(now, flash_duration) {
                        report.cleared.push(note.id());
                        return false;
                    }
                    true
                }
                NoteState::Active if note.position() >= height => {
                    note.leave(penalize);
                    debug!(id = note.id(), lane = note.lane(), "Note left the playfield");
                    if penalize {
                        report.missed.push(note.id());
                    } else {
                        report.expired.push(note.id());
                    }
                    false
                }
                _ => true,
            }
        });
    }
}
