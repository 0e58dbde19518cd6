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
use std::{error::Error, fmt, mem, sync::Arc, time::Instant};

use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use parking_lot::Mutex;
use tracing::{info, span, Level};

use super::{Handler, IncomingMessage};

/// An input backed by a midir port.
pub struct Input {
    name: String,
    port: MidiInputPort,
    handler: Arc<Mutex<Option<Handler>>>,
    connection: Mutex<Option<MidiInputConnection<()>>>,
}

impl super::Input for Input {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_handler(&self, handler: Option<Handler>) -> Result<(), Box<dyn Error>> {
        let span = span!(Level::INFO, "set handler (midir)");
        let _enter = span.enter();

        let watching = handler.is_some();
        let slot = self.handler.clone();
        let mut connection = self.connection.lock();
        replace_handler(&self.handler, &mut *connection, handler, || {
            let input = MidiInput::new("midilisten input")?;
            Ok(input.connect(
                &self.port,
                "midilisten input watcher",
                move |_, raw_event, _| {
                    // midir's own timestamps have an unspecified epoch, so stamp on receipt.
                    let received_at = Instant::now();
                    if let Some(handler) = slot.lock().as_mut() {
                        handler(IncomingMessage::Raw {
                            bytes: raw_event.to_vec(),
                            received_at,
                        });
                    }
                },
                (),
            )?)
        })?;

        if watching {
            info!(device = self.name, "Watching MIDI input.");
        } else {
            info!(device = self.name, "Stopped watching MIDI input.");
        }
        Ok(())
    }
}

/// Swaps the handler in the slot. `None` clears it and drops the connection. A new
/// handler is only stored once a connection exists, so a failed connect leaves the
/// previous handler in place.
fn replace_handler<C>(
    slot: &Mutex<Option<Handler>>,
    connection: &mut Option<C>,
    handler: Option<Handler>,
    connect: impl FnOnce() -> Result<C, Box<dyn Error>>,
) -> Result<(), Box<dyn Error>> {
    if handler.is_none() {
        *slot.lock() = None;
        // Explicitly drop the connection.
        mem::drop(connection.take());
        return Ok(());
    }

    if connection.is_none() {
        *connection = Some(connect()?);
    }
    *slot.lock() = handler;
    Ok(())
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (midir)", self.name)
    }
}

/// Opens the first midir input port whose name contains the given name.
pub fn get(name: &str) -> Result<Input, Box<dyn Error>> {
    let input = MidiInput::new("midilisten lookup")?;
    let port = input
        .ports()
        .into_iter()
        .find(|port| {
            input
                .port_name(port)
                .is_ok_and(|port_name| port_name.contains(name))
        })
        .ok_or_else(|| format!("no MIDI input found matching {}", name))?;

    Ok(Input {
        name: input.port_name(&port)?,
        port,
        handler: Arc::new(Mutex::new(None)),
        connection: Mutex::new(None),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting(count: &Arc<AtomicUsize>) -> Handler {
        let count = count.clone();
        Box::new(move |_: IncomingMessage| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn deliver(slot: &Mutex<Option<Handler>>) {
        if let Some(handler) = slot.lock().as_mut() {
            handler(IncomingMessage::raw(&[0x90, 60, 100]));
        }
    }

    #[test]
    fn test_failed_connect_keeps_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let slot = Mutex::new(Some(counting(&first)));
        let mut connection: Option<()> = None;

        let result = replace_handler(&slot, &mut connection, Some(counting(&second)), || {
            Err("port unavailable".into())
        });
        assert!(result.is_err());
        assert!(connection.is_none());

        deliver(&slot);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_replace_handler() -> Result<(), Box<dyn Error>> {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let slot = Mutex::new(None);
        let mut connection: Option<u32> = None;
        let connects = AtomicUsize::new(0);
        let connect = || {
            connects.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        };

        replace_handler(&slot, &mut connection, Some(counting(&first)), connect)?;
        assert_eq!(connection, Some(7));
        deliver(&slot);

        // An existing connection is reused.
        replace_handler(&slot, &mut connection, Some(counting(&second)), || {
            Err("should not reconnect".into())
        })?;
        deliver(&slot);
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        replace_handler(&slot, &mut connection, None, || Ok(8))?;
        assert!(connection.is_none());
        assert!(slot.lock().is_none());
        Ok(())
    }
}
