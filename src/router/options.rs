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
use std::sync::Arc;

use midly::num::u4;

use super::error::RouterError;
use super::recording::RecordBuffer;

/// The largest shift, in either direction, that can still land on a MIDI note.
pub const MAX_TRANSPOSE: i32 = 127;

/// Maps a MIDI velocity (0-127) to a playback gain (0.0-1.0).
pub type GainFn = Arc<dyn Fn(u8) -> f32 + Send + Sync>;

/// The default gain curve, `velocity / 127`.
pub fn linear_gain(velocity: u8) -> f32 {
    velocity as f32 / 127.0
}

/// Options for a single binding. Everything is optional.
#[derive(Clone, Default)]
pub struct ListenOptions {
    /// Allowed channels (1-16). `None` accepts every channel.
    channels: Option<Vec<u8>>,
    gain: Option<GainFn>,
    /// Semitones added to the played note.
    transpose: Option<i32>,
    recording: bool,
    record_buffer: Option<RecordBuffer>,
}

impl ListenOptions {
    pub fn new() -> ListenOptions {
        ListenOptions::default()
    }

    /// Only accept messages on the given channels (1-16).
    pub fn with_channels(mut self, channels: impl IntoIterator<Item = u8>) -> ListenOptions {
        self.channels = Some(channels.into_iter().collect());
        self
    }

    /// Use the given velocity to gain mapping instead of the linear default.
    pub fn with_gain(mut self, gain: impl Fn(u8) -> f32 + Send + Sync + 'static) -> ListenOptions {
        self.gain = Some(Arc::new(gain));
        self
    }

    /// Use an already shared gain function.
    pub fn with_gain_fn(mut self, gain: GainFn) -> ListenOptions {
        self.gain = Some(gain);
        self
    }

    pub fn with_transpose(mut self, semitones: i32) -> ListenOptions {
        self.transpose = Some(semitones);
        self
    }

    /// Enables or disables recording. Recording requires a record buffer.
    pub fn with_recording(mut self, recording: bool) -> ListenOptions {
        self.recording = recording;
        self
    }

    /// Sets the buffer recorded notes are appended to.
    pub fn with_record_buffer(mut self, buffer: RecordBuffer) -> ListenOptions {
        self.record_buffer = Some(buffer);
        self
    }

    /// Validates the options and resolves defaults.
    pub(super) fn into_settings(self) -> Result<Settings, RouterError> {
        let channels = match self.channels {
            Some(channels) => {
                let mut allowed = [false; 16];
                for channel in channels {
                    if !(1..=16).contains(&channel) {
                        return Err(RouterError::InvalidChannel(channel));
                    }
                    allowed[usize::from(channel - 1)] = true;
                }
                Some(allowed)
            }
            None => None,
        };

        if let Some(transpose) = self.transpose {
            if !(-MAX_TRANSPOSE..=MAX_TRANSPOSE).contains(&transpose) {
                return Err(RouterError::InvalidTranspose(transpose));
            }
        }

        let record_buffer = match (self.recording, self.record_buffer) {
            (true, Some(buffer)) => Some(buffer),
            (true, None) => return Err(RouterError::MissingRecordBuffer),
            (false, _) => None,
        };

        Ok(Settings {
            channels,
            gain: self.gain.unwrap_or_else(|| Arc::new(linear_gain)),
            transpose: self.transpose,
            record_buffer,
        })
    }
}

impl fmt::Debug for ListenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenOptions")
            .field("channels", &self.channels)
            .field("custom_gain", &self.gain.is_some())
            .field("transpose", &self.transpose)
            .field("recording", &self.recording)
            .field("record_buffer", &self.record_buffer.is_some())
            .finish()
    }
}

/// Resolved options, fixed for the life of a router.
pub(super) struct Settings {
    /// Indexed by wire channel.
    channels: Option<[bool; 16]>,
    pub(super) gain: GainFn,
    pub(super) transpose: Option<i32>,
    pub(super) record_buffer: Option<RecordBuffer>,
}

impl Settings {
    /// Returns true if messages on the given wire channel pass the filter.
    pub(super) fn accepts(&self, channel: u4) -> bool {
        match &self.channels {
            Some(allowed) => allowed[usize::from(channel.as_int())],
            None => true,
        }
    }
}
