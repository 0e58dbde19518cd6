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
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{PlayOptions, SamplePlayer};

/// A call made against the mock player.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Play {
        voice: u64,
        note: i32,
        delay: Duration,
        gain: f32,
    },
    Stop {
        voice: u64,
    },
}

/// A mock player. Records every play and stop in order.
#[derive(Default)]
pub struct Player {
    next_voice_id: AtomicU64,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Player {
    pub fn new() -> Player {
        Player::default()
    }

    /// Gets the calls made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

impl SamplePlayer for Player {
    type Voice = Voice;

    fn play(&self, note: i32, delay: Duration, options: PlayOptions) -> Voice {
        let voice = self.next_voice_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().push(Call::Play {
            voice,
            note,
            delay,
            gain: options.gain,
        });
        Voice {
            id: voice,
            calls: self.calls.clone(),
        }
    }
}

pub struct Voice {
    id: u64,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl super::Voice for Voice {
    fn stop(&mut self) {
        self.calls.lock().push(Call::Stop { voice: self.id });
    }
}
