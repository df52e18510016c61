//! Dry run transmitter that only logs.
//!
//! Useful to watch the time code without any hardware attached: run with `-v` to see every
//! carrier change.

use log::debug;
use super::{Level, Transmitter, TransmitterError};

/// Transmitter that logs level and indicator changes instead of driving hardware.
pub struct Console {
	initialized: bool,
	level: Level,
	indicator: bool
}

impl Console {
	pub fn new() -> Console {
		Console {
			initialized: false,
			level: Level::OFF,
			indicator: false
		}
	}
}

impl Transmitter for Console {
	fn initialize(&mut self) -> Result<(), TransmitterError> {
		debug!("Console transmitter ready");
		self.initialized = true;
		Ok(())
	}

	fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError> {
		if !self.initialized {
			return Err(TransmitterError::NotInitialized);
		}
		if level != self.level {
			debug!("carrier {} -> {}", self.level, level);
			self.level = level;
		}
		Ok(())
	}

	fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError> {
		if !self.initialized {
			return Err(TransmitterError::NotInitialized);
		}
		if active != self.indicator {
			debug!("indicator {}", if active { "on" } else { "off" });
			self.indicator = active;
		}
		Ok(())
	}
}
