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
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chart::DEFAULT_LANES;

pub const DEFAULT_BPM: f64 = 120.0;
pub const DEFAULT_PLAYFIELD_HEIGHT: f64 = 600.0;
pub const DEFAULT_NOTE_HEIGHT: f64 = 50.0;
/// 5 units per frame at 60 frames per second.
pub const DEFAULT_NOTE_SPEED: f64 = 300.0;
pub const DEFAULT_HIT_WINDOW: f64 = 50.0;
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(100);
pub const DEFAULT_COLLECTOR_FLASH_DURATION: Duration = Duration::from_millis(200);
pub const DEFAULT_FEEDBACK_DURATION: Duration = Duration::from_millis(500);

/// When pending notes are released onto the playfield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseMode {
    /// One note per beat interval, in chart order, ignoring the stored onset times.
    #[default]
    BeatInterval,
    /// Each note is released so that it reaches the target line at its onset time.
    Onset,
}

impl FromStr for ReleaseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beat-interval" => Ok(ReleaseMode::BeatInterval),
            "onset" => Ok(ReleaseMode::Onset),
            _ => Err(format!(
                "unknown release mode '{}', expected beat-interval or onset",
                s
            )),
        }
    }
}

/// Everything a play session needs to know about timing and geometry. Positions are in
/// playfield units, with 0 at the top and `playfield_height` at the bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaySettings {
    /// The number of lanes charts are loaded with.
    pub lanes: usize,
    /// Tempo used to derive the beat interval.
    pub bpm: f64,
    pub playfield_height: f64,
    pub note_height: f64,
    /// Note fall speed in units per second.
    pub note_speed: f64,
    /// Extra tolerance above the target area.
    pub hit_window: f64,
    /// How long a hit note stays lit (and on screen).
    pub flash_duration: Duration,
    /// How long a lane collector stays lit after a press.
    pub collector_flash_duration: Duration,
    /// How long hit/miss feedback stays visible.
    pub feedback_duration: Duration,
    pub release_mode: ReleaseMode,
    /// Charge a miss for notes that scroll off without being hit.
    pub expiry_penalty: bool,
}

impl Default for PlaySettings {
    fn default() -> Self {
        PlaySettings {
            lanes: DEFAULT_LANES,
            bpm: DEFAULT_BPM,
            playfield_height: DEFAULT_PLAYFIELD_HEIGHT,
            note_height: DEFAULT_NOTE_HEIGHT,
            note_speed: DEFAULT_NOTE_SPEED,
            hit_window: DEFAULT_HIT_WINDOW,
            flash_duration: DEFAULT_FLASH_DURATION,
            collector_flash_duration: DEFAULT_COLLECTOR_FLASH_DURATION,
            feedback_duration: DEFAULT_FEEDBACK_DURATION,
            release_mode: ReleaseMode::default(),
            expiry_penalty: false,
        }
    }
}

impl PlaySettings {
    /// The line a note's top edge crosses when it sits exactly on the collector.
    pub fn target_line(&self) -> f64 {
        self.playfield_height - self.note_height
    }

    /// How long a note takes to fall from the top to the target line.
    pub fn travel_time(&self) -> Duration {
        Duration::try_from_secs_f64((self.target_line() / self.note_speed).max(0.0))
            .unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{PlaySettings, ReleaseMode};

    #[test]
    fn test_geometry() {
        let settings = PlaySettings::default();
        assert_eq!(550.0, settings.target_line());
        assert_eq!(Duration::from_secs_f64(550.0 / 300.0), settings.travel_time());
    }

    #[test]
    fn test_release_mode_from_str() {
        assert_eq!(Ok(ReleaseMode::BeatInterval), "beat-interval".parse());
        assert_eq!(Ok(ReleaseMode::Onset), "onset".parse());
        assert!("whenever".parse::<ReleaseMode>().is_err());
    }
}
