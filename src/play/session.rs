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

use tracing::{debug, info, span, warn, Level, Span};

use super::collector::LaneCollectors;
use super::error::PlayError;
use super::note::{Note, NoteId, NoteState};
use super::resolver::{Feedback, HitOutcome, HitResolver};
use super::scheduler::{NoteScheduler, TickReport};
use super::score::ScoreState;
use super::settings::PlaySettings;
use crate::chart::Chart;

/// A note as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteView {
    pub id: NoteId,
    pub lane: usize,
    pub position: f64,
    pub state: NoteState,
    /// Hit notes stay lit for the flash duration.
    pub flashing: bool,
}

/// A read only snapshot of everything the presentation layer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub notes: Vec<NoteView>,
    pub points: i64,
    pub combo: u32,
    pub last_feedback: Option<Feedback>,
    pub last_feedback_time: Option<Duration>,
    pub feedback_visible: bool,
    pub screen_flash: Option<Duration>,
    /// One entry per lane, true while the collector is lit.
    pub collector_flashes: Vec<bool>,
    pub finished: bool,
}

/// Everything that happened in a frame.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub outcomes: Vec<HitOutcome>,
    pub rejected: Vec<PlayError>,
    pub tick: TickReport,
}

/// The state of one song being played: the live notes, the score and the lane
/// collectors. The owner drives it with presses and ticks from a single loop.
pub struct Session {
    settings: PlaySettings,
    lanes: usize,
    scheduler: NoteScheduler,
    resolver: HitResolver,
    score: ScoreState,
    collectors: LaneCollectors,
    span: Span,
}

impl Session {
    /// Creates an idle session with no notes.
    pub fn new(settings: PlaySettings) -> Session {
        Session {
            lanes: settings.lanes,
            scheduler: NoteScheduler::new(settings.clone()),
            resolver: HitResolver::new(settings.note_height, settings.hit_window),
            score: ScoreState::new(),
            collectors: LaneCollectors::new(settings.lanes),
            settings,
            span: span!(Level::INFO, "session"),
        }
    }

    /// Starts playing a chart. Discards any notes in flight and zeroes the score.
    pub fn start(&mut self, chart: &Chart, now: Duration) {
        let _enter = self.span.enter();

        self.lanes = chart.lanes();
        self.scheduler.start(chart, now);
        self.score = ScoreState::new();
        self.collectors = LaneCollectors::new(chart.lanes());

        info!(
            notes = chart.len(),
            lanes = chart.lanes(),
            release_mode = ?self.settings.release_mode,
            "Session started"
        );
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    pub fn settings(&self) -> &PlaySettings {
        &self.settings
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    /// Live notes, in release order.
    pub fn notes(&self) -> &[Note] {
        self.scheduler.live()
    }

    pub fn collectors(&self) -> &LaneCollectors {
        &self.collectors
    }

    /// True once every note has been released and cleared.
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    /// Handles a press on a lane. Resolving the hit, updating the score and lighting
    /// the collector all happen here so they can't drift apart.
    pub fn hit(&mut self, lane: usize, now: Duration) -> Result<HitOutcome, PlayError> {
        if lane >= self.lanes {
            return Err(PlayError::InvalidLane {
                lane,
                lanes: self.lanes,
            });
        }

        let outcome = self.resolver.resolve(
            lane,
            self.scheduler.live_mut(),
            self.settings.playfield_height,
            now,
        );
        self.score.apply(&outcome, now);
        self.collectors.stamp(lane, now);
        Ok(outcome)
    }

    /// Advances the notes to `now`.
    pub fn tick(&mut self, now: Duration) -> TickReport {
        let report = self.scheduler.tick(now);
        for id in report.missed.iter() {
            debug!(id, "Charging a miss for an expired note");
            self.score.expire(now);
        }
        report
    }

    /// Runs one frame. Presses are resolved against the note positions from the end of
    /// the previous frame, then the notes are moved.
    pub fn frame(&mut self, presses: &[usize], now: Duration) -> FrameReport {
        let span = self.span.clone();
        let _enter = span.enter();

        let mut report = FrameReport::default();
        for lane in presses {
            match self.hit(*lane, now) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    warn!(err = %e, "Dropping press");
                    report.rejected.push(e);
                }
            }
        }
        report.tick = self.tick(now);
        report
    }

    /// Takes a snapshot for drawing.
    pub fn view(&self, now: Duration) -> SessionView {
        let flash_duration = self.settings.flash_duration;
        SessionView {
            notes: self
                .scheduler
                .live()
                .iter()
                .map(|note| NoteView {
                    id: note.id(),
                    lane: note.lane(),
                    position: note.position(),
                    state: note.state(),
                    flashing: note.is_flashing(now, flash_duration),
                })
                .collect(),
            points: self.score.points(),
            combo: self.score.combo(),
            last_feedback: self.score.last_feedback(),
            last_feedback_time: self.score.last_feedback_time(),
            feedback_visible: self
                .score
                .feedback_visible(now, self.settings.feedback_duration),
            screen_flash: self.score.screen_flash(),
            collector_flashes: (0..self.lanes)
                .map(|lane| {
                    self.collectors
                        .is_flashing(lane, now, self.settings.collector_flash_duration)
                })
                .collect(),
            finished: self.is_finished(),
        }
    }
}
