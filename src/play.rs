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
//! Live play: releasing notes, moving them, and matching presses against them.

mod autoplay;
mod collector;
mod error;
mod note;
mod resolver;
mod scheduler;
mod score;
mod session;
mod settings;

pub use autoplay::Autoplay;
pub use collector::LaneCollectors;
pub use error::PlayError;
pub use note::{Note, NoteId, NoteState};
pub use resolver::{Feedback, HitOutcome, HitResolver, HIT_REWARD, MISS_PENALTY};
pub use scheduler::{NoteScheduler, TickReport};
pub use score::ScoreState;
pub use session::{FrameReport, NoteView, Session, SessionView};
pub use settings::{
    PlaySettings, ReleaseMode, DEFAULT_BPM, DEFAULT_COLLECTOR_FLASH_DURATION,
    DEFAULT_FEEDBACK_DURATION, DEFAULT_FLASH_DURATION, DEFAULT_HIT_WINDOW, DEFAULT_NOTE_HEIGHT,
    DEFAULT_NOTE_SPEED, DEFAULT_PLAYFIELD_HEIGHT,
};
