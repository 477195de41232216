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
use std::path::{Path, PathBuf};

use tracing::{info, span, Level, Span};

use crate::chart::{self, Chart, ChartError};

/// A playable song: its audio and the chart generated from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    title: String,
    audio: PathBuf,
    chart: PathBuf,
}

impl Song {
    pub fn new(title: &str, audio: PathBuf, chart: PathBuf) -> Song {
        Song {
            title: title.to_string(),
            audio,
            chart,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn audio(&self) -> &Path {
        &self.audio
    }

    pub fn chart(&self) -> &Path {
        &self.chart
    }

    /// Loads the song's chart.
    pub fn load_chart(&self, lanes: usize) -> Result<Chart, ChartError> {
        chart::load_from_path(&self.chart, lanes)
    }
}

/// The songs available to play, with a selection cursor that wraps around at both ends.
pub struct Catalog {
    songs: Vec<Song>,
    position: usize,
    span: Span,
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog ({} songs):", self.songs.len())?;
        for (i, song) in self.songs.iter().enumerate() {
            let marker = if i == self.position { ">" } else { "-" };
            writeln!(f, "  {} {} ({})", marker, song.title, song.chart.display())?;
        }

        Ok(())
    }
}

impl Catalog {
    /// Creates a new catalog with the cursor on the first song.
    pub fn new(songs: Vec<Song>) -> Catalog {
        Catalog {
            songs,
            position: 0,
            span: span!(Level::INFO, "catalog"),
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves to the next song, wrapping to the first after the last.
    pub fn next(&mut self) -> Option<&Song> {
        let _enter = self.span.enter();
        if self.songs.is_empty() {
            return None;
        }

        self.position = (self.position + 1) % self.songs.len();
        let current = &self.songs[self.position];
        info!(
            position = self.position,
            song = current.title,
            "Moving to next song."
        );
        Some(current)
    }

    /// Moves to the previous song, wrapping to the last before the first.
    pub fn prev(&mut self) -> Option<&Song> {
        let _enter = self.span.enter();
        if self.songs.is_empty() {
            return None;
        }

        self.position = (self.position + self.songs.len() - 1) % self.songs.len();
        let current = &self.songs[self.position];
        info!(
            position = self.position,
            song = current.title,
            "Moving to previous song."
        );
        Some(current)
    }

    /// The song under the cursor.
    pub fn current(&self) -> Option<&Song> {
        self.songs.get(self.position)
    }

    /// Moves the cursor to the song with the given title.
    pub fn find(&mut self, title: &str) -> Option<&Song> {
        let position = self.songs.iter().position(|song| song.title == title)?;
        self.position = position;
        self.songs.get(position)
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::{Catalog, Song};

    fn catalog() -> Catalog {
        Catalog::new(
            ["Song 1", "Song 2", "Song 3"]
                .iter()
                .map(|title| {
                    Song::new(
                        title,
                        PathBuf::from(format!("{}.wav", title)),
                        PathBuf::from(format!("{}.json", title)),
                    )
                })
                .collect(),
        )
    }

    fn title(song: Option<&Song>) -> &str {
        song.map(|song| song.title()).unwrap_or("none")
    }

    #[test]
    fn test_catalog_wraps() {
        let mut catalog = catalog();
        assert_eq!("Song 1", title(catalog.current()));

        assert_eq!("Song 3", title(catalog.prev()));
        assert_eq!("Song 1", title(catalog.next()));
        assert_eq!("Song 2", title(catalog.next()));
        assert_eq!("Song 3", title(catalog.next()));
        assert_eq!("Song 1", title(catalog.next()));
        assert_eq!(0, catalog.position());
    }

    #[test]
    fn test_find() {
        let mut catalog = catalog();
        assert_eq!("Song 3", title(catalog.find("Song 3")));
        assert_eq!("Song 3", title(catalog.current()));
        assert!(catalog.find("Song 9").is_none());
        assert_eq!("Song 3", title(catalog.current()));
    }

    #[test]
    fn test_empty() {
        let mut catalog = Catalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.current().is_none());
        assert!(catalog.next().is_none());
        assert!(catalog.prev().is_none());
    }

    #[test]
    fn test_display() {
        let catalog = catalog();
        let display = catalog.to_string();
        assert!(display.starts_with("Catalog (3 songs):"));
        assert!(display.contains("> Song 1 (Song 1.json)"));
        assert!(display.contains("- Song 2 (Song 2.json)"));
    }
}
