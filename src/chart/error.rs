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

/// Typed error for chart construction and persistence, so the host can tell a corrupt
/// chart (fall back to the menu) from an I/O failure without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Corrupt chart: {0}")]
    Corrupt(String),

    #[error("A chart needs at least one lane")]
    NoLanes,

    #[error("Chart JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChartError {
    /// True if the chart data itself is malformed.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ChartError::Corrupt(_) | ChartError::Json(_))
    }
}
