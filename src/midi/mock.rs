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
use std::{error::Error, fmt};

use parking_lot::Mutex;
use tracing::info;

use super::Handler;
#[cfg(test)]
use super::IncomingMessage;

/// A mock input. Messages only arrive when injected by tests.
pub struct Input {
    name: String,
    handler: Mutex<Option<Handler>>,
}

impl Input {
    /// Gets the given mock input.
    pub fn get(name: &str) -> Input {
        Input {
            name: name.to_string(),
            handler: Mutex::new(None),
        }
    }

    #[cfg(test)]
    /// Delivers the message to the current handler, if any.
    pub fn send(&self, message: impl Into<IncomingMessage>) {
        if let Some(handler) = self.handler.lock().as_mut() {
            handler(message.into());
        }
    }

    #[cfg(test)]
    /// Delivers a raw packet, stamped with the current time.
    pub fn send_raw(&self, bytes: &[u8]) {
        self.send(IncomingMessage::raw(bytes));
    }

    #[cfg(test)]
    /// Returns true if a handler is installed.
    pub fn has_handler(&self) -> bool {
        self.handler.lock().is_some()
    }
}

impl super::Input for Input {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_handler(&self, handler: Option<Handler>) -> Result<(), Box<dyn Error>> {
        let installed = handler.is_some();
        *self.handler.lock() = handler;
        info!(input = self.name, installed, "Handler replaced.");
        Ok(())
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use parking_lot::Mutex;

    use super::*;
    use crate::midi::{ChannelMessage, Input as _};

    #[test]
    fn test_send_without_handler() {
        let input = Input::get("mock-keys");
        assert!(!input.has_handler());
        input.send_raw(&[0x90, 60, 100]);
    }

    #[test]
    fn test_set_handler_replaces() -> Result<(), Box<dyn Error>> {
        let input = Input::get("mock-keys");
        let first: Arc<Mutex<Vec<IncomingMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let second: Arc<Mutex<Vec<IncomingMessage>>> = Arc::new(Mutex::new(Vec::new()));

        let received = first.clone();
        input.set_handler(Some(Box::new(move |message: IncomingMessage| {
            received.lock().push(message)
        })))?;
        input.send_raw(&[0x90, 60, 100]);

        let received = second.clone();
        input.set_handler(Some(Box::new(move |message: IncomingMessage| {
            received.lock().push(message)
        })))?;
        input.send(ChannelMessage::note_off(0, 60, 0, Instant::now()));

        assert_eq!(first.lock().len(), 1);
        assert_eq!(second.lock().len(), 1);

        input.set_handler(None)?;
        assert!(!input.has_handler());
        input.send_raw(&[0x90, 61, 100]);
        assert_eq!(second.lock().len(), 1);

        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Input::get("mock-keys").to_string(), "mock-keys (Mock)");
    }
}
