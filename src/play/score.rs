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

use super::resolver::{Feedback, HitOutcome, MISS_PENALTY};

/// Running score for a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreState {
    points: i64,
    hits: u32,
    misses: u32,
    combo: u32,
    max_combo: u32,
    last_feedback: Option<Feedback>,
    last_feedback_time: Option<Duration>,
    screen_flash: Option<Duration>,
}

impl ScoreState {
    pub fn new() -> ScoreState {
        ScoreState::default()
    }

    /// Applies the result of a press.
    pub fn apply(&mut self, outcome: &HitOutcome, now: Duration) {
        self.points += outcome.delta;
        match outcome.feedback {
            Feedback::Hit => {
                self.hits += 1;
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
            }
            Feedback::Miss => {
                self.misses += 1;
                self.combo = 0;
            }
        }
        self.last_feedback = Some(outcome.feedback);
        self.last_feedback_time = Some(now);
        if let Some(flash) = outcome.flash {
            self.screen_flash = Some(flash);
        }
    }

    /// Charges a miss for a note that scrolled away unhit.
    pub fn expire(&mut self, now: Duration) {
        self.points -= MISS_PENALTY;
        self.misses += 1;
        self.combo = 0;
        self.last_feedback = Some(Feedback::Miss);
        self.last_feedback_time = Some(now);
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn last_feedback(&self) -> Option<Feedback> {
        self.last_feedback
    }

    pub fn last_feedback_time(&self) -> Option<Duration> {
        self.last_feedback_time
    }

    /// Time of the most recent hit.
    pub fn screen_flash(&self) -> Option<Duration> {
        self.screen_flash
    }

    /// True while the last feedback should still be shown.
    pub fn feedback_visible(&self, now: Duration, duration: Duration) -> bool {
        match self.last_feedback_time {
            Some(time) => now.saturating_sub(time) < duration,
            None => false,
        }
    }
}

impl fmt::Display for ScoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Score: {} ({} hits, {} misses, max combo {})",
            self.points, self.hits, self.misses, self.max_combo
        )
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::ScoreState;
    use crate::play::resolver::{Feedback, HitOutcome, HIT_REWARD, MISS_PENALTY};

    fn hit(at: Duration) -> HitOutcome {
        HitOutcome {
            delta: HIT_REWARD,
            feedback: Feedback::Hit,
            flash: Some(at),
            note: Some(0),
        }
    }

    fn miss() -> HitOutcome {
        HitOutcome {
            delta: -MISS_PENALTY,
            feedback: Feedback::Miss,
            flash: None,
            note: None,
        }
    }

    #[test]
    fn test_conservation() {
        let mut score = ScoreState::new();
        let mut now = Duration::ZERO;
        for i in 0..17 {
            now += Duration::from_millis(100);
            if i % 3 == 0 {
                score.apply(&miss(), now);
            } else {
                score.apply(&hit(now), now);
            }
        }
        assert_eq!(11, score.hits());
        assert_eq!(6, score.misses());
        assert_eq!(100 * 11 - 50 * 6, score.points());
    }

    #[test]
    fn test_negative_score() {
        let mut score = ScoreState::new();
        score.apply(&miss(), Duration::ZERO);
        score.apply(&miss(), Duration::ZERO);
        assert_eq!(-100, score.points());
    }

    #[test]
    fn test_combo() {
        let mut score = ScoreState::new();
        for _ in 0..4 {
            score.apply(&hit(Duration::ZERO), Duration::ZERO);
        }
        score.apply(&miss(), Duration::ZERO);
        score.apply(&hit(Duration::ZERO), Duration::ZERO);
        assert_eq!(1, score.combo());
        assert_eq!(4, score.max_combo());

        score.expire(Duration::from_secs(4));
        assert_eq!(Some(Feedback::Miss), score.last_feedback());
        assert_eq!(Some(Duration::from_secs(4)), score.last_feedback_time());
        assert_eq!(0, score.combo());
        assert_eq!(2, score.misses());
        assert_eq!(500 - 100, score.points());
    }

    #[test]
    fn test_feedback_and_flash() {
        let mut score = ScoreState::new();
        let feedback = Duration::from_millis(500);
        assert!(!score.feedback_visible(Duration::ZERO, feedback));

        score.apply(&hit(Duration::from_secs(1)), Duration::from_secs(1));
        assert_eq!(Some(Feedback::Hit), score.last_feedback());
        assert_eq!(Some(Duration::from_secs(1)), score.screen_flash());
        assert!(score.feedback_visible(Duration::from_millis(1499), feedback));
        assert!(!score.feedback_visible(Duration::from_millis(1500), feedback));

        // A miss replaces the feedback but leaves the screen flash alone.
        score.apply(&miss(), Duration::from_secs(2));
        assert_eq!(Some(Feedback::Miss), score.last_feedback());
        assert_eq!(Some(Duration::from_secs(2)), score.last_feedback_time());
        assert_eq!(Some(Duration::from_secs(1)), score.screen_flash());
    }
}
