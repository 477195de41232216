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

use tracing::info;

mod error;
mod game;
mod song;

pub use error::ConfigError;
pub use game::{Game, DEFAULT_FRAME_RATE, DEFAULT_KEYS};
pub use song::Song;

/// Loads the game configuration from a YAML file.
pub fn load(path: &Path) -> Result<Game, ConfigError> {
    let game = Game::deserialize(path)?;
    // Catch bad values at load time rather than when a song starts.
    game.play_settings()?;
    game.keys()?;

    info!(path = %path.display(), lanes = game.lanes(), "Loaded config");
    Ok(game)
}
