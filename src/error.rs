//! Error types used across modules.
//!
//! This module contains the error type returned by the run loop and its parts. See
//! [`Error`] for which variants are fatal.

use std::{error, fmt};
use timecode::wwvb::FieldsError;
use crate::transmitter::TransmitterError;

/// The error type for transmitting.
pub enum Error {
	/// The system clock could not be read. Fatal.
	Clock,
	/// The sampled time could not be encoded. The underlying error is provided in the payload.
	Fields(FieldsError),
	/// The transmitter failed. Fatal. The underlying error is provided in the payload.
	Transmitter(TransmitterError),
	/// The termination handler could not be installed. The underlying error is provided in the
	/// payload.
	Signal(ctrlc::Error),
	/// Shutdown was requested. Not a failure, but the current frame was abandoned.
	Interrupted
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Clock => write!(f, "Failed to get current system time"),
			Error::Fields(e) => write!(f, "Time encoding error: {}", e),
			Error::Transmitter(e) => write!(f, "{}", e),
			Error::Signal(e) => write!(f, "Failed to install termination handler: {}", e),
			Error::Interrupted => write!(f, "Interrupted")
		}
	}
}

impl fmt::Debug for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::Fields(e) => Some(e),
			Error::Transmitter(e) => Some(e),
			Error::Signal(e) => Some(e),
			_ => None
		}
	}
}

impl From<FieldsError> for Error {
	fn from(value: FieldsError) -> Self {
		Error::Fields(value)
	}
}

impl From<TransmitterError> for Error {
	fn from(value: TransmitterError) -> Self {
		Error::Transmitter(value)
	}
}

impl From<ctrlc::Error> for Error {
	fn from(value: ctrlc::Error) -> Self {
		Error::Signal(value)
	}
}
