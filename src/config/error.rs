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

/// Typed error for config load/parse failures so callers can distinguish
/// e.g. file-not-found from invalid values without string matching.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid MIDI channel {0}: channels must be in [1, 16]")]
    InvalidChannel(u8),
    #[error("Invalid default velocity {0}: must be in [0, 127]")]
    InvalidVelocity(u8),
    #[error("Invalid transpose {0}: must be within [-{max}, {max}] semitones", max = crate::router::MAX_TRANSPOSE)]
    InvalidTranspose(i32),
}
