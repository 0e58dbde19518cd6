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

//! Normalized channel messages and the raw/structured union delivered by inputs.

use std::time::Instant;

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};

/// The kinds of channel message the router distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    NoteOn,
    NoteOff,
    /// Any other channel message (control change, pitch bend, ...).
    Other,
}

/// A structured MIDI channel message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelMessage {
    pub kind: MessageKind,
    /// The wire channel, 0-15.
    pub channel: u4,
    pub key: u7,
    pub velocity: u7,
    /// When the message was received.
    pub received_at: Instant,
}

impl ChannelMessage {
    /// Creates a note on message. The channel is the wire channel (0-15).
    ///
    /// Values are masked to their MIDI widths the way midly's `From<u8>` does: the channel
    /// keeps its low 4 bits, the key and velocity their low 7 bits. `note_on(0, 200, ..)`
    /// therefore has key 72.
    pub fn note_on(channel: u8, key: u8, velocity: u8, received_at: Instant) -> ChannelMessage {
        ChannelMessage {
            kind: MessageKind::NoteOn,
            channel: u4::from(channel),
            key: u7::from(key),
            velocity: u7::from(velocity),
            received_at,
        }
    }

    /// Creates a note off message. The channel is the wire channel (0-15). Values are
    /// masked like [`ChannelMessage::note_on`].
    pub fn note_off(channel: u8, key: u8, velocity: u8, received_at: Instant) -> ChannelMessage {
        ChannelMessage {
            kind: MessageKind::NoteOff,
            channel: u4::from(channel),
            key: u7::from(key),
            velocity: u7::from(velocity),
            received_at,
        }
    }

    /// Parses a raw MIDI packet.
    pub fn parse(bytes: &[u8], received_at: Instant) -> Result<ChannelMessage, ParseError> {
        let event = LiveEvent::parse(bytes)?;
        ChannelMessage::from_live_event(&event, received_at).ok_or(ParseError::NotChannelMessage)
    }

    /// Converts a live event. Returns `None` for anything that isn't a channel message.
    pub fn from_live_event(event: &LiveEvent, received_at: Instant) -> Option<ChannelMessage> {
        let (channel, message) = match event {
            LiveEvent::Midi { channel, message } => (*channel, message),
            _ => return None,
        };

        let (kind, key, velocity) = match *message {
            MidiMessage::NoteOn { key, vel } => (MessageKind::NoteOn, key, vel),
            MidiMessage::NoteOff { key, vel } => (MessageKind::NoteOff, key, vel),
            MidiMessage::Aftertouch { key, vel } => (MessageKind::Other, key, vel),
            _ => (MessageKind::Other, u7::from(0), u7::from(0)),
        };

        Some(ChannelMessage {
            kind,
            channel,
            key,
            velocity,
            received_at,
        })
    }

    /// Returns the message with a zero velocity note on turned into a note off.
    pub fn normalized(mut self) -> ChannelMessage {
        if self.kind == MessageKind::NoteOn && self.velocity.as_int() == 0 {
            self.kind = MessageKind::NoteOff;
        }
        self
    }

    /// Returns the user facing channel (1-16).
    pub fn user_channel(&self) -> u8 {
        self.channel.as_int() + 1
    }
}

/// A message as delivered by an input, resolved once on entry to the router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingMessage {
    /// A raw packet straight off the wire.
    Raw { bytes: Vec<u8>, received_at: Instant },
    /// An already parsed message.
    Structured(ChannelMessage),
}

impl IncomingMessage {
    /// Creates a raw message received now.
    pub fn raw(bytes: &[u8]) -> IncomingMessage {
        IncomingMessage::Raw {
            bytes: bytes.to_vec(),
            received_at: Instant::now(),
        }
    }

    /// Resolves the message into a channel message, parsing raw bytes if needed.
    pub fn into_channel_message(self) -> Result<ChannelMessage, ParseError> {
        match self {
            IncomingMessage::Raw { bytes, received_at } => ChannelMessage::parse(&bytes, received_at),
            IncomingMessage::Structured(message) => Ok(message),
        }
    }
}

impl From<ChannelMessage> for IncomingMessage {
    fn from(message: ChannelMessage) -> Self {
        IncomingMessage::Structured(message)
    }
}

/// Errors while turning raw bytes into a channel message.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed MIDI packet: {0}")]
    Malformed(#[from] midly::Error),
    #[error("not a channel message")]
    NotChannelMessage,
}
