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
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Serialize, Serializer};

/// A completed note captured while recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RecordedNote {
    /// The wire channel (0-15) of the note on.
    pub channel: u8,
    /// The untransposed key.
    pub key: u8,
    /// The note on velocity.
    pub velocity: u8,
    pub note_off_velocity: u8,
    /// Note on time relative to the start of the recording.
    #[serde(rename = "time_stamp_ms", serialize_with = "as_millis")]
    pub time_stamp: Duration,
    /// Time between the note on and the note off.
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// A shared, append-only sink for recorded notes.
///
/// The caller keeps one handle and hands a clone to the router. The router only ever
/// appends; reading and clearing are left to the caller.
#[derive(Clone, Debug, Default)]
pub struct RecordBuffer {
    notes: Arc<Mutex<Vec<RecordedNote>>>,
}

impl RecordBuffer {
    /// Creates an empty buffer.
    pub fn new() -> RecordBuffer {
        RecordBuffer::default()
    }

    /// Appends a note.
    pub fn push(&self, note: RecordedNote) {
        self.notes.lock().push(note);
    }

    /// Returns the number of recorded notes.
    pub fn len(&self) -> usize {
        self.notes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.lock().is_empty()
    }

    /// Returns a copy of the recorded notes.
    pub fn snapshot(&self) -> Vec<RecordedNote> {
        self.notes.lock().clone()
    }

    /// Removes and returns all recorded notes.
    pub fn take(&self) -> Vec<RecordedNote> {
        std::mem::take(&mut *self.notes.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(key: u8) -> RecordedNote {
        RecordedNote {
            channel: 0,
            key,
            velocity: 100,
            note_off_velocity: 10,
            time_stamp: Duration::from_millis(1500),
            duration: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_shared_buffer() {
        let buffer = RecordBuffer::new();
        let handle = buffer.clone();
        assert!(buffer.is_empty());

        handle.push(note(60));
        handle.push(note(62));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.snapshot()[1].key, 62);

        let taken = buffer.take();
        assert_eq!(taken.len(), 2);
        assert!(handle.is_empty());
    }

    #[test]
    fn test_serialize_millis() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(note(60))?;
        assert_eq!(value["key"], 60);
        assert_eq!(value["time_stamp_ms"], 1500.0);
        assert_eq!(value["duration_ms"], 250.0);
        Ok(())
    }
}
