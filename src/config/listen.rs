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

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::router::{linear_gain, GainFn, ListenOptions, RecordBuffer, MAX_TRANSPOSE};

/// Default velocity value when velocity mode is set to ignore.
pub const DEFAULT_VELOCITY: u8 = 100;

/// A YAML representation of a listener.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct Listen {
    /// The MIDI input to listen to. Matched as a substring of the port name.
    device: String,

    /// The channels to listen to (1-indexed). All channels when not set.
    channels: Option<Vec<u8>>,

    /// Semitones to shift played notes by.
    transpose: Option<i32>,

    /// Velocity handling configuration.
    #[serde(default)]
    velocity: VelocityConfig,

    /// Whether to record played notes.
    #[serde(default)]
    recording: bool,
}

impl Listen {
    /// Gets the device name.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Gets the channel filter.
    pub fn channels(&self) -> Option<&[u8]> {
        self.channels.as_deref()
    }

    /// Gets the transposition.
    pub fn transpose(&self) -> Option<i32> {
        self.transpose
    }

    /// Gets the velocity configuration.
    pub fn velocity(&self) -> &VelocityConfig {
        &self.velocity
    }

    /// Returns true if notes should be recorded.
    pub fn recording(&self) -> bool {
        self.recording
    }

    /// Checks values serde can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(channel) = self
            .channels
            .iter()
            .flatten()
            .find(|channel| !(1..=16).contains(*channel))
        {
            return Err(ConfigError::InvalidChannel(*channel));
        }

        if let Some(transpose) = self
            .transpose
            .filter(|t| !(-MAX_TRANSPOSE..=MAX_TRANSPOSE).contains(t))
        {
            return Err(ConfigError::InvalidTranspose(transpose));
        }

        match self.velocity.default {
            Some(velocity) if velocity > 127 => Err(ConfigError::InvalidVelocity(velocity)),
            _ => Ok(()),
        }
    }

    /// Builds router options from this config. The record buffer is only used when
    /// recording is enabled.
    pub fn to_options(&self, record_buffer: Option<RecordBuffer>) -> ListenOptions {
        let mut options = ListenOptions::new()
            .with_gain_fn(self.velocity.gain())
            .with_recording(self.recording);
        if let Some(channels) = &self.channels {
            options = options.with_channels(channels.iter().copied());
        }
        if let Some(transpose) = self.transpose {
            options = options.with_transpose(transpose);
        }
        if let Some(record_buffer) = record_buffer {
            options = options.with_record_buffer(record_buffer);
        }
        options
    }
}

#[cfg(test)]
impl Listen {
    /// Creates a new listener config (test only).
    pub fn new(
        device: &str,
        channels: Option<Vec<u8>>,
        transpose: Option<i32>,
        velocity: VelocityConfig,
        recording: bool,
    ) -> Self {
        Self {
            device: device.to_string(),
            channels,
            transpose,
            velocity,
            recording,
        }
    }
}

impl fmt::Display for Listen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device: {}", self.device)?;
        match &self.channels {
            Some(channels) => writeln!(f, "Channels: {:?}", channels)?,
            None => writeln!(f, "Channels: all")?,
        }
        writeln!(f, "Transpose: {}", self.transpose.unwrap_or(0))?;
        match self.velocity.mode {
            VelocityMode::Scale => writeln!(f, "Velocity: scale")?,
            VelocityMode::Ignore => writeln!(
                f,
                "Velocity: ignore (default {})",
                self.velocity.default.unwrap_or(DEFAULT_VELOCITY)
            )?,
        }
        write!(f, "Recording: {}", self.recording)
    }
}

/// Configuration for velocity handling.
#[derive(Deserialize, Clone, Serialize, Debug, Default)]
pub struct VelocityConfig {
    /// The velocity handling mode.
    #[serde(default)]
    mode: VelocityMode,

    /// Default velocity value when mode is "ignore".
    default: Option<u8>,
}

impl VelocityConfig {
    /// Creates a velocity config with ignore mode.
    pub fn ignore(default: Option<u8>) -> Self {
        Self {
            mode: VelocityMode::Ignore,
            default,
        }
    }

    /// Creates a velocity config with scale mode.
    pub fn scale() -> Self {
        Self {
            mode: VelocityMode::Scale,
            default: None,
        }
    }

    /// Gets the velocity mode.
    pub fn mode(&self) -> VelocityMode {
        self.mode
    }

    /// Returns the velocity to gain mapping for this config.
    pub fn gain(&self) -> GainFn {
        match self.mode {
            VelocityMode::Scale => Arc::new(linear_gain),
            VelocityMode::Ignore => {
                let gain = linear_gain(self.default.unwrap_or(DEFAULT_VELOCITY));
                Arc::new(move |_: u8| gain)
            }
        }
    }
}

/// Velocity handling mode.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VelocityMode {
    /// Scale gain by velocity (velocity/127).
    #[default]
    Scale,
    /// Ignore velocity, play at the default velocity's gain.
    Ignore,
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Result<Listen, Box<dyn Error>> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Listen>()?)
    }

    #[test]
    fn test_defaults() -> Result<(), Box<dyn Error>> {
        let listen = parse("device: keys")?;

        assert_eq!(listen.device(), "keys");
        assert_eq!(listen.channels(), None);
        assert_eq!(listen.transpose(), None);
        assert_eq!(listen.velocity().mode(), VelocityMode::Scale);
        assert!(!listen.recording());
        listen.validate()?;
        Ok(())
    }

    #[test]
    fn test_full() -> Result<(), Box<dyn Error>> {
        let listen = parse(
            r#"
            device: keys
            channels: [2, 3]
            transpose: 12
            velocity:
              mode: ignore
              default: 64
            recording: true
        "#,
        )?;

        assert_eq!(listen.channels(), Some(&[2, 3][..]));
        assert_eq!(listen.transpose(), Some(12));
        assert_eq!(listen.velocity().mode(), VelocityMode::Ignore);
        assert!(listen.recording());
        Ok(())
    }

    #[test]
    fn test_velocity_gain() {
        let scale = VelocityConfig::scale().gain();
        assert!((scale(64) - 64.0 / 127.0).abs() < 0.001);
        assert!((scale(127) - 1.0).abs() < 0.001);

        let ignore = VelocityConfig::ignore(Some(100)).gain();
        assert!((ignore(10) - 100.0 / 127.0).abs() < 0.001);
        assert!((ignore(127) - 100.0 / 127.0).abs() < 0.001);

        let ignore_default = VelocityConfig::ignore(None).gain();
        assert!((ignore_default(1) - DEFAULT_VELOCITY as f32 / 127.0).abs() < 0.001);
    }

    #[test]
    fn test_validate() {
        let listen = Listen::new("keys", Some(vec![1, 17]), None, VelocityConfig::scale(), false);
        assert!(matches!(
            listen.validate(),
            Err(ConfigError::InvalidChannel(17))
        ));

        let listen = Listen::new("keys", None, None, VelocityConfig::ignore(Some(128)), false);
        assert!(matches!(
            listen.validate(),
            Err(ConfigError::InvalidVelocity(128))
        ));

        let listen = Listen::new("keys", None, Some(128), VelocityConfig::scale(), false);
        assert!(matches!(
            listen.validate(),
            Err(ConfigError::InvalidTranspose(128))
        ));

        let listen = Listen::new("keys", None, Some(i32::MIN), VelocityConfig::scale(), false);
        assert!(matches!(
            listen.validate(),
            Err(ConfigError::InvalidTranspose(i32::MIN))
        ));

        let listen = Listen::new("keys", None, Some(-127), VelocityConfig::scale(), false);
        assert!(listen.validate().is_ok());
    }

    #[test]
    fn test_to_options() {
        let listen = Listen::new(
            "keys",
            Some(vec![1]),
            Some(-12),
            VelocityConfig::scale(),
            true,
        );
        let options = format!("{:?}", listen.to_options(Some(RecordBuffer::new())));

        assert!(options.contains("channels: Some([1])"));
        assert!(options.contains("transpose: Some(-12)"));
        assert!(options.contains("recording: true"));
        assert!(options.contains("record_buffer: true"));
    }

    #[test]
    fn test_display() {
        let listen = Listen::new("keys", None, Some(5), VelocityConfig::ignore(None), true);
        assert_eq!(
            listen.to_string(),
            "Device: keys\nChannels: all\nTranspose: 5\nVelocity: ignore (default 100)\nRecording: true"
        );
    }
}
