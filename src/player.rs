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

//! The playback side of the router.
//!
//! A [`SamplePlayer`] starts voices, and a [`Voice`] can be stopped. The player owns
//! whatever audio resources back a voice; callers only keep the handle.

use std::time::Duration;

mod logging;
#[cfg(test)]
mod mock;

pub use logging::LoggingPlayer;

/// Options for starting a voice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayOptions {
    /// Playback gain, 0.0 to 1.0.
    pub gain: f32,
}

/// A single playing instance of a sample.
pub trait Voice: Send {
    /// Stops the voice.
    fn stop(&mut self);
}

/// Something that can play samples by note number.
pub trait SamplePlayer: Send + Sync {
    type Voice: Voice;

    /// Starts playing the given note after the given delay. Notes may fall outside the
    /// MIDI range once transposed; players decide how to handle that.
    fn play(&self, note: i32, delay: Duration, options: PlayOptions) -> Self::Voice;
}

#[cfg(test)]
pub mod test {
    pub use super::mock::{Call, Player};
}
