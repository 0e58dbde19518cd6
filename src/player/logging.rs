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
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{PlayOptions, SamplePlayer};

/// A player that produces no sound and logs every voice it starts and stops.
#[derive(Debug, Default)]
pub struct LoggingPlayer {
    /// Voice ID counter.
    next_voice_id: AtomicU64,
    /// Number of voices started and not yet stopped.
    active: Arc<AtomicUsize>,
}

impl LoggingPlayer {
    /// Creates a new logging player.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of voices that have not been stopped.
    pub fn active_voices(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

impl SamplePlayer for LoggingPlayer {
    type Voice = Voice;

    fn play(&self, note: i32, delay: Duration, options: PlayOptions) -> Voice {
        let id = self.next_voice_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.active.fetch_add(1, Ordering::Relaxed);
        info!(id, note, gain = options.gain, delay = ?delay, "Voice started.");

        Voice {
            id,
            note,
            start_time: Instant::now(),
            stopped: false,
            active: self.active.clone(),
        }
    }
}

/// A voice started by the logging player.
#[derive(Debug)]
pub struct Voice {
    id: u64,
    note: i32,
    start_time: Instant,
    stopped: bool,
    active: Arc<AtomicUsize>,
}

impl Voice {
    /// Returns the voice ID.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl super::Voice for Voice {
    fn stop(&mut self) {
        if self.stopped {
            debug!(id = self.id, "Voice already stopped.");
            return;
        }
        self.stopped = true;
        self.active.fetch_sub(1, Ordering::Relaxed);
        info!(
            id = self.id,
            note = self.note,
            held_ms = self.start_time.elapsed().as_millis() as u64,
            "Voice stopped."
        );
    }
}
