//! Carrier transmitter hardware.
//!
//! The [`Transmitter`] trait is the only way the rest of the crate touches hardware. Backends map
//! the abstract carrier [`Level`]s onto whatever the device understands:
//! - [`audio`]: a tone on the default audio output, whose third harmonic is the 60 kHz carrier.
//! - [`gpio`] (feature `raspberry-pi`): hardware PWM on GPIO18 and an indicator LED on GPIO14.
//! - [`console`]: no hardware, level changes are only logged.

use std::fmt::{self, Debug, Display};
use std::error;
use std::str::FromStr;

pub mod audio;
pub mod console;
#[cfg(feature = "raspberry-pi")]
pub mod gpio;

/// Carrier amplitude level, in the device range `[0, 160]`.
///
/// The range matches a 60 kHz PWM carrier with a period of 160 clock ticks, so [`Level::FULL`] is
/// a 50% duty cycle. Backends without PWM scale levels relative to [`Level::FULL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Level(pub u8);

impl Level {
	/// Carrier off.
	pub const OFF: Level = Level(0);
	/// Reduced carrier, sent at the start of every second.
	pub const REDUCED: Level = Level(2);
	/// Full carrier.
	pub const FULL: Level = Level(80);
	/// Upper bound of the device range.
	#[cfg(any(test, feature = "raspberry-pi"))]
	pub const MAX: Level = Level(160);
}

impl Display for Level {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The error type for transmitter hardware.
#[derive(Clone, PartialEq)]
pub enum TransmitterError {
	/// The transmitter was used before [`Transmitter::initialize`] succeeded.
	NotInitialized,
	/// The requested backend was not compiled in. The backend name is provided in the payload.
	Unsupported(&'static str),
	/// The device reported an error. The device's message is provided in the payload.
	Device(String)
}

impl TransmitterError {
	/// Wrap any device error by its message.
	pub(crate) fn device(e: impl Display) -> TransmitterError {
		TransmitterError::Device(e.to_string())
	}
}

impl Display for TransmitterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransmitterError::NotInitialized => write!(f, "Transmitter not initialized"),
			TransmitterError::Unsupported(b) => write!(f, "Transmitter backend not supported in this build: {}", b),
			TransmitterError::Device(s) => write!(f, "Transmitter device error: {}", s)
		}
	}
}

impl Debug for TransmitterError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Display::fmt(self, f)
	}
}

impl error::Error for TransmitterError {}

/// A carrier transmitter with an indicator output.
///
/// Implementations own their device. Every method may fail, and callers treat any failure as
/// fatal.
pub trait Transmitter {
	/// Acquire and configure the device. Must succeed before any other call.
	fn initialize(&mut self) -> Result<(), TransmitterError>;

	/// Set the carrier amplitude.
	fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError>;

	/// Set the indicator, which is lit while the carrier is reduced.
	fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError>;

	/// Turn the carrier and indicator off.
	///
	/// Both outputs are always attempted; the first error is returned.
	fn off(&mut self) -> Result<(), TransmitterError> {
		let amplitude = self.set_amplitude(Level::OFF);
		let indicator = self.set_indicator(false);
		amplitude.and(indicator)
	}
}

/// Available transmitter backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Backend {
	/// Default audio output device. [More](audio).
	Audio,
	/// Raspberry Pi PWM and GPIO.
	Gpio,
	/// Log only. [More](console).
	Console
}

impl FromStr for Backend {
	type Err = String;

	/// Parse a backend name, case insensitive. The unrecognized input is returned on error.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"audio" => Ok(Backend::Audio),
			"gpio" | "pi" => Ok(Backend::Gpio),
			"console" | "none" => Ok(Backend::Console),
			_ => Err(s.to_string())
		}
	}
}

/// Create an uninitialized transmitter for `backend`.
///
/// # Errors
///
/// Returns [`TransmitterError::Unsupported`] for [`Backend::Gpio`] unless built with the
/// `raspberry-pi` feature.
pub fn open(backend: Backend) -> Result<Box<dyn Transmitter>, TransmitterError> {
	match backend {
		Backend::Audio => Ok(Box::new(audio::Audio::new())),
		Backend::Console => Ok(Box::new(console::Console::new())),
		#[cfg(feature = "raspberry-pi")]
		Backend::Gpio => Ok(Box::new(gpio::Gpio::new())),
		#[cfg(not(feature = "raspberry-pi"))]
		Backend::Gpio => Err(TransmitterError::Unsupported("gpio"))
	}
}
