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

//! Routes MIDI note events from an input to a sample player.
//!
//! A [`Router`] is bound to one input and owns two registries, both keyed by the
//! untransposed note number:
//! - the voices currently sounding, so a note off can stop them
//! - the pending note ons, while recording, so a note off can emit a [`RecordedNote`]
//!
//! Each key holds at most one entry. A second note on for a key that is still sounding
//! replaces the registry entry without stopping the earlier voice, which then can no
//! longer be stopped through the router.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, span, trace, Level};

use crate::midi::{self, ChannelMessage, IncomingMessage, MessageKind};
use crate::player::{PlayOptions, SamplePlayer, Voice};

mod error;
mod options;
mod recording;

pub use error::RouterError;
pub use options::{linear_gain, GainFn, ListenOptions, MAX_TRANSPOSE};
pub use recording::{RecordBuffer, RecordedNote};

use options::Settings;

/// Where recorded notes go, and the instant their time stamps are relative to.
struct Recording {
    buffer: RecordBuffer,
    started_at: Instant,
}

/// The note event state machine for a single input binding.
pub struct Router<P: SamplePlayer> {
    player: Arc<P>,
    settings: Settings,
    recording: Option<Recording>,
    /// Sounding voices by key.
    active: HashMap<u8, P::Voice>,
    /// Note ons awaiting their note off, by key. Only used while recording.
    pending: HashMap<u8, ChannelMessage>,
}

impl<P: SamplePlayer> Router<P> {
    /// Creates a router. If recording, the recording starts now.
    pub fn new(player: Arc<P>, options: ListenOptions) -> Result<Self, RouterError> {
        Self::starting_at(player, options, Instant::now())
    }

    /// Creates a router whose recording, if enabled, starts at the given instant.
    pub fn starting_at(
        player: Arc<P>,
        options: ListenOptions,
        started_at: Instant,
    ) -> Result<Self, RouterError> {
        let mut settings = options.into_settings()?;
        let recording = settings
            .record_buffer
            .take()
            .map(|buffer| Recording { buffer, started_at });

        Ok(Self {
            player,
            settings,
            recording,
            active: HashMap::new(),
            pending: HashMap::new(),
        })
    }

    /// Returns the instant recorded time stamps are relative to, if recording.
    pub fn recording_started_at(&self) -> Option<Instant> {
        self.recording.as_ref().map(|recording| recording.started_at)
    }

    /// Returns the number of voices the router can still stop.
    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    /// Returns the number of note ons waiting for a note off to be recorded.
    pub fn pending_notes(&self) -> usize {
        self.pending.len()
    }

    /// Handles a single incoming message. Never fails; anything that can't be
    /// interpreted is dropped.
    pub fn handle(&mut self, incoming: IncomingMessage) {
        let message = match incoming.into_channel_message() {
            Ok(message) => message.normalized(),
            Err(e) => {
                debug!(err = %e, "Dropping MIDI input.");
                return;
            }
        };

        if !self.settings.accepts(message.channel) {
            trace!(channel = message.user_channel(), "Channel filtered.");
            return;
        }

        match message.kind {
            MessageKind::NoteOn => self.note_on(message),
            MessageKind::NoteOff => self.note_off(message),
            MessageKind::Other => {}
        }
    }

    fn note_on(&mut self, message: ChannelMessage) {
        let key = message.key.as_int();
        let note = match self.settings.transpose {
            Some(semitones) => i32::from(key).saturating_add(semitones),
            None => i32::from(key),
        };
        let gain = (self.settings.gain)(message.velocity.as_int());

        let voice = self
            .player
            .play(note, Duration::ZERO, PlayOptions { gain });
        if self.active.insert(key, voice).is_some() {
            debug!(key, "Note on replaced a sounding voice.");
        }

        if self.recording.is_some() {
            self.pending.insert(key, message);
        }
    }

    fn note_off(&mut self, message: ChannelMessage) {
        let key = message.key.as_int();

        if let Some(recording) = &self.recording {
            if let Some(note_on) = self.pending.remove(&key) {
                recording.buffer.push(RecordedNote {
                    channel: note_on.channel.as_int(),
                    key,
                    velocity: note_on.velocity.as_int(),
                    note_off_velocity: message.velocity.as_int(),
                    time_stamp: note_on
                        .received_at
                        .saturating_duration_since(recording.started_at),
                    duration: message
                        .received_at
                        .saturating_duration_since(note_on.received_at),
                });
            }
        }

        if let Some(mut voice) = self.active.remove(&key) {
            voice.stop();
        }
    }
}

/// Binds a player to a MIDI input.
pub trait ListenToMidi: Sized {
    /// Installs a new router on the input, replacing any handler already there, and
    /// returns the player so further setup can be chained.
    ///
    /// Voices still sounding when the handler is later replaced are not stopped.
    fn listen_to_midi(
        self,
        input: &dyn midi::Input,
        options: ListenOptions,
    ) -> Result<Self, RouterError>;
}

impl<P> ListenToMidi for Arc<P>
where
    P: SamplePlayer + 'static,
    P::Voice: 'static,
{
    fn listen_to_midi(
        self,
        input: &dyn midi::Input,
        options: ListenOptions,
    ) -> Result<Self, RouterError> {
        let span = span!(Level::INFO, "listen to midi");
        let _enter = span.enter();

        let mut router = Router::new(self.clone(), options)?;
        let recording = router.recording_started_at().is_some();
        input
            .set_handler(Some(Box::new(move |message: IncomingMessage| {
                router.handle(message)
            })))
            .map_err(|e| RouterError::Input(e.to_string()))?;

        info!(input = input.name(), recording, "Listening to MIDI input.");
        Ok(self)
    }
}
