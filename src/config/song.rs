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
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A YAML representation of a catalog entry.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Song {
    /// The title shown in the menu.
    title: String,
    /// The audio file the chart was generated from.
    audio: String,
    /// The chart file.
    chart: String,
}

impl Song {
    pub fn new(title: &str, audio: &str, chart: &str) -> Song {
        Song {
            title: title.to_string(),
            audio: audio.to_string(),
            chart: chart.to_string(),
        }
    }

    /// Converts to a catalog song. Relative paths are resolved against `base`.
    pub fn to_song(&self, base: &Path) -> crate::catalog::Song {
        crate::catalog::Song::new(&self.title, base.join(&self.audio), base.join(&self.chart))
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use super::Song;

    #[test]
    fn test_paths_are_relative_to_base() {
        let song = Song::new("Song 1", "audio/song1.wav", "/charts/song1.json");
        let song = song.to_song(Path::new("/games/beatlane"));
        assert_eq!("Song 1", song.title());
        assert_eq!(
            PathBuf::from("/games/beatlane/audio/song1.wav"),
            song.audio()
        );
        // Absolute paths are left alone.
        assert_eq!(PathBuf::from("/charts/song1.json"), song.chart());
    }
}
