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

use tracing::debug;

use super::note::{Note, NoteId};

/// Points awarded for a hit.
pub const HIT_REWARD: i64 = 100;
/// Points taken for a press that hits nothing.
pub const MISS_PENALTY: i64 = 50;

/// Player facing feedback for a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Hit,
    Miss,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Hit => write!(f, "Hit!"),
            Feedback::Miss => write!(f, "Miss!"),
        }
    }
}

/// The result of resolving one lane press.
#[derive(Debug, Clone, PartialEq)]
pub struct HitOutcome {
    /// Score change.
    pub delta: i64,
    pub feedback: Feedback,
    /// When the hit happened, used as the flash timestamp. None on a miss.
    pub flash: Option<Duration>,
    /// The note that was hit.
    pub note: Option<NoteId>,
}

impl HitOutcome {
    pub fn is_hit(&self) -> bool {
        self.feedback == Feedback::Hit
    }

    fn miss() -> HitOutcome {
        HitOutcome {
            delta: -MISS_PENALTY,
            feedback: Feedback::Miss,
            flash: None,
            note: None,
        }
    }
}

/// Decides whether a lane press hits a live note.
#[derive(Debug, Clone)]
pub struct HitResolver {
    note_height: f64,
    hit_window: f64,
}

impl HitResolver {
    pub fn new(note_height: f64, hit_window: f64) -> HitResolver {
        HitResolver {
            note_height,
            hit_window,
        }
    }

    /// The inclusive range of positions that count as a hit.
    pub fn window(&self, playfield_height: f64) -> (f64, f64) {
        (
            playfield_height - self.note_height - self.hit_window,
            playfield_height,
        )
    }

    /// Resolves a press on `lane`. The first active note in that lane, in release order,
    /// whose position is inside the window is marked hit. If there is none the press is
    /// a miss and no note changes.
    pub fn resolve(
        &self,
        lane: usize,
        notes: &mut [Note],
        playfield_height: f64,
        now: Duration,
    ) -> HitOutcome {
        let window = self.window(playfield_height);
        let Some(note) = notes
            .iter_mut()
            .find(|note| note.lane() == lane && note.is_hittable(window))
        else {
            debug!(lane, "Press missed");
            return HitOutcome::miss();
        };

        note.hit(now);
        debug!(lane, id = note.id(), position = note.position(), "Press hit");
        HitOutcome {
            delta: HIT_REWARD,
            feedback: Feedback::Hit,
            flash: Some(now),
            note: Some(note.id()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{Feedback, HitResolver, HIT_REWARD, MISS_PENALTY};
    use crate::play::note::{Note, NoteState};

    fn active(id: usize, lane: usize, position: f64) -> Note {
        let mut note = Note::pending(id, lane, 0.0, 50.0);
        note.release(position);
        note
    }

    #[test]
    fn test_clean_hit() {
        let resolver = HitResolver::new(50.0, 50.0);
        let mut notes = vec![active(0, 2, 540.0)];
        let now = Duration::from_secs(3);

        let outcome = resolver.resolve(2, &mut notes, 600.0, now);
        assert_eq!(HIT_REWARD, outcome.delta);
        assert_eq!(Feedback::Hit, outcome.feedback);
        assert_eq!(Some(now), outcome.flash);
        assert_eq!(Some(0), outcome.note);
        assert_eq!(NoteState::Hit, notes[0].state());
        assert_eq!(Some(now), notes[0].hit_time());
    }

    #[test]
    fn test_miss_by_absence() {
        let resolver = HitResolver::new(50.0, 50.0);
        // Wrong lane, too high, and past the bottom.
        let mut notes = vec![active(0, 1, 550.0), active(1, 0, 100.0), active(2, 0, 601.0)];
        let before = notes.clone();

        let outcome = resolver.resolve(0, &mut notes, 600.0, Duration::from_secs(1));
        assert_eq!(-MISS_PENALTY, outcome.delta);
        assert_eq!(Feedback::Miss, outcome.feedback);
        assert_eq!(None, outcome.flash);
        assert_eq!(None, outcome.note);
        assert_eq!(before, notes);

        let outcome = resolver.resolve(3, &mut [], 600.0, Duration::ZERO);
        assert_eq!(Feedback::Miss, outcome.feedback);
    }

    #[test]
    fn test_window_boundaries() {
        let resolver = HitResolver::new(50.0, 50.0);
        assert_eq!((500.0, 600.0), resolver.window(600.0));

        let mut notes = vec![active(0, 0, 499.0)];
        assert!(!resolver.resolve(0, &mut notes, 600.0, Duration::ZERO).is_hit());
        let mut notes = vec![active(0, 0, 500.0)];
        assert!(resolver.resolve(0, &mut notes, 600.0, Duration::ZERO).is_hit());
        let mut notes = vec![active(0, 0, 600.0)];
        assert!(resolver.resolve(0, &mut notes, 600.0, Duration::ZERO).is_hit());
    }

    #[test]
    fn test_first_in_release_order_wins() {
        let resolver = HitResolver::new(50.0, 50.0);
        let mut notes = vec![active(0, 1, 510.0), active(1, 1, 590.0)];

        let first = resolver.resolve(1, &mut notes, 600.0, Duration::from_millis(10));
        assert_eq!(Some(0), first.note);
        assert_eq!(NoteState::Active, notes[1].state());

        let second = resolver.resolve(1, &mut notes, 600.0, Duration::from_millis(20));
        assert_eq!(Some(1), second.note);

        // Both notes are spent, a third press is a miss.
        let third = resolver.resolve(1, &mut notes, 600.0, Duration::from_millis(30));
        assert!(!third.is_hit());
        assert_eq!(Some(Duration::from_millis(10)), notes[0].hit_time());
    }

    #[test]
    fn test_feedback_display() {
        assert_eq!("Hit!", Feedback::Hit.to_string());
        assert_eq!("Miss!", Feedback::Miss.to_string());
    }
}
