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

/// Errors raised when binding a router. Message handling itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("recording is enabled but no record buffer was supplied")]
    MissingRecordBuffer,
    #[error("invalid MIDI channel {0}: channels must be in [1, 16]")]
    InvalidChannel(u8),
    #[error("invalid transpose {0}: must be within [-{max}, {max}] semitones", max = super::options::MAX_TRANSPOSE)]
    InvalidTranspose(i32),
    #[error("unable to install handler on input: {0}")]
    Input(String),
}
