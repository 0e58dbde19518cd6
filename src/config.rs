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
use std::path::Path;

use config::{Config, File};
use tracing::info;

mod error;
mod listen;

pub use error::ConfigError;
pub use listen::{Listen, VelocityConfig, VelocityMode, DEFAULT_VELOCITY};

/// Loads and validates a listener configuration. The format is inferred from the file
/// extension.
pub fn load(path: &Path) -> Result<Listen, ConfigError> {
    let listen = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize::<Listen>()?;
    listen.validate()?;

    info!(path = %path.display(), device = listen.device(), "Loaded listener config.");
    Ok(listen)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(
            file,
            r#"
device: mock-keys
channels: [1, 10]
transpose: -12
recording: true
"#
        )?;

        let listen = load(file.path())?;
        assert_eq!(listen.device(), "mock-keys");
        assert_eq!(listen.channels(), Some(&[1, 10][..]));
        assert_eq!(listen.transpose(), Some(-12));
        assert!(listen.recording());
        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_channel() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(file, "device: mock-keys\nchannels: [0]")?;

        assert!(matches!(
            load(file.path()),
            Err(ConfigError::InvalidChannel(0))
        ));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load(Path::new("/nonexistent/listen.yaml")),
            Err(ConfigError::Load(_))
        ));
    }
}
