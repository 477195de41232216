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

/// Identifies a note within a session. Notes are numbered in release order.
pub type NoteId = usize;

/// Where a note is in its lifecycle. Hit, Missed and Expired are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Waiting to be released.
    Pending,
    /// Falling and hittable.
    Active,
    /// Hit by the player.
    Hit,
    /// Scrolled off without a hit, and charged as a miss.
    Missed,
    /// Scrolled off without a hit, without a penalty.
    Expired,
}

impl NoteState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NoteState::Hit | NoteState::Missed | NoteState::Expired)
    }
}

/// A live note. Only the transition methods change its state, and each of them refuses
/// to move a note out of a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    id: NoteId,
    lane: usize,
    onset: f64,
    position: f64,
    state: NoteState,
    hit_time: Option<Duration>,
}

impl Note {
    /// Creates a pending note parked just above the playfield.
    pub(crate) fn pending(id: NoteId, lane: usize, onset: f64, note_height: f64) -> Note {
        Note {
            id,
            lane,
            onset,
            position: -note_height,
            state: NoteState::Pending,
            hit_time: None,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    /// The chart onset time of this note, in seconds.
    pub fn onset(&self) -> f64 {
        self.onset
    }

    /// Distance of the note's top edge from the top of the playfield.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn hit_time(&self) -> Option<Duration> {
        self.hit_time
    }

    /// True while a hit note should still be drawn lit.
    pub fn is_flashing(&self, now: Duration, flash_duration: Duration) -> bool {
        match (self.state, self.hit_time) {
            (NoteState::Hit, Some(hit_time)) => now.saturating_sub(hit_time) <= flash_duration,
            _ => false,
        }
    }

    /// True if the note is active and its position lies within the inclusive range.
    pub fn is_hittable(&self, range: (f64, f64)) -> bool {
        self.state == NoteState::Active && range.0 <= self.position && self.position <= range.1
    }

    /// Puts a pending note into play at the given position.
    pub(crate) fn release(&mut self, position: f64) -> bool {
        if self.state != NoteState::Pending {
            return false;
        }
        self.state = NoteState::Active;
        self.position = position;
        true
    }

    /// Moves the note down. Notes that aren't on the playfield don't move.
    pub(crate) fn advance(&mut self, distance: f64) {
        if matches!(self.state, NoteState::Active | NoteState::Hit) {
            self.position += distance;
        }
    }

    /// Marks an active note as hit.
    pub(crate) fn hit(&mut self, now: Duration) -> bool {
        if self.state != NoteState::Active {
            return false;
        }
        self.state = NoteState::Hit;
        self.hit_time = Some(now);
        true
    }

    /// Retires an active note that left the playfield without being hit.
    pub(crate) fn leave(&mut self, penalized: bool) -> bool {
        if self.state != NoteState::Active {
            return false;
        }
        self.state = if penalized {
            NoteState::Missed
        } else {
            NoteState::Expired
        };
        true
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{Note, NoteState};

    #[test]
    fn test_lifecycle() {
        let mut note = Note::pending(0, 2, 1.5, 50.0);
        assert_eq!(NoteState::Pending, note.state());
        assert_eq!(-50.0, note.position());

        // Pending notes can't be hit or moved.
        assert!(!note.hit(Duration::ZERO));
        note.advance(10.0);
        assert_eq!(-50.0, note.position());

        assert!(note.release(0.0));
        assert!(!note.release(0.0));
        note.advance(5.0);
        assert_eq!(5.0, note.position());

        assert!(note.hit(Duration::from_millis(700)));
        assert_eq!(NoteState::Hit, note.state());
        assert_eq!(Some(Duration::from_millis(700)), note.hit_time());

        // Terminal states are final.
        assert!(!note.hit(Duration::from_millis(800)));
        assert!(!note.leave(true));
        assert_eq!(Some(Duration::from_millis(700)), note.hit_time());
        assert!(note.state().is_terminal());
    }

    #[test]
    fn test_leave() {
        let mut expired = Note::pending(0, 0, 0.0, 50.0);
        expired.release(0.0);
        assert!(expired.leave(false));
        assert_eq!(NoteState::Expired, expired.state());
        assert!(!expired.hit(Duration::ZERO));

        let mut missed = Note::pending(1, 0, 0.0, 50.0);
        missed.release(0.0);
        assert!(missed.leave(true));
        assert_eq!(NoteState::Missed, missed.state());
    }

    #[test]
    fn test_hittable_range_is_inclusive() {
        let mut note = Note::pending(0, 0, 0.0, 50.0);
        note.release(500.0);
        assert!(note.is_hittable((500.0, 600.0)));
        note.set_position(600.0);
        assert!(note.is_hittable((500.0, 600.0)));
        note.set_position(499.0);
        assert!(!note.is_hittable((500.0, 600.0)));
        note.set_position(600.5);
        assert!(!note.is_hittable((500.0, 600.0)));
    }

    #[test]
    fn test_flashing() {
        let mut note = Note::pending(0, 0, 0.0, 50.0);
        let flash = Duration::from_millis(100);
        note.release(0.0);
        assert!(!note.is_flashing(Duration::ZERO, flash));

        note.hit(Duration::from_secs(1));
        assert!(note.is_flashing(Duration::from_secs(1), flash));
        assert!(note.is_flashing(Duration::from_millis(1100), flash));
        assert!(!note.is_flashing(Duration::from_millis(1101), flash));
    }
}
