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

//! Routes live MIDI input to a sample player.
//!
//! The [`router`] module holds the note-event state machine. [`midi`] provides the
//! input side (message normalization and transports) and [`player`] the playback side.

pub mod config;
pub mod midi;
pub mod player;
pub mod router;

pub use router::{ListenOptions, ListenToMidi, RecordBuffer, RecordedNote, Router, RouterError};
