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
use std::{error::Error, fmt, sync::Arc};

mod message;
mod midir;
mod mock;

pub use message::{ChannelMessage, IncomingMessage, MessageKind, ParseError};

/// The callback installed on an input. Invoked once per arriving message, in arrival order.
pub type Handler = Box<dyn FnMut(IncomingMessage) + Send + 'static>;

/// A MIDI input that delivers messages to a single registered handler.
pub trait Input: fmt::Display + std::marker::Send + std::marker::Sync {
    /// Returns the name of the input.
    fn name(&self) -> String;

    /// Installs the handler, replacing any previous one. `None` removes the current
    /// handler so that no further messages are delivered.
    fn set_handler(&self, handler: Option<Handler>) -> Result<(), Box<dyn Error>>;
}

/// Gets an input with the given name.
pub fn get_input(name: &str) -> Result<Arc<dyn Input>, Box<dyn Error>> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Input::get(name)));
    };

    Ok(Arc::new(midir::get(name)?))
}

#[cfg(test)]
pub mod test {
    pub use super::mock::Input;
}
