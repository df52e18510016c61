//! Turn symbols into timed carrier changes.

use std::time::Instant;
use log::trace;
use timecode::Symbol;
use crate::error::Error;
use crate::shutdown::Shutdown;
use crate::transmitter::{Level, Transmitter};

/// Plays symbols on a transmitter, one second each.
///
/// Each symbol starts with the carrier at [`Level::REDUCED`] and the indicator lit, then returns
/// to [`Level::FULL`] with the indicator dark for the rest of the second. Both phases are held
/// until a deadline measured from the start of the symbol, so time spent writing to the device is
/// absorbed instead of accumulating.
///
/// # Examples
/// ```
/// let mut scheduler = PulseScheduler::new(&mut transmitter, &shutdown);
/// for symbol in &wwvb::encode(&fields) {
/// 	scheduler.play(*symbol)?;
/// }
/// ```
pub struct PulseScheduler<'a, T: Transmitter + ?Sized> {
	transmitter: &'a mut T,
	shutdown: &'a Shutdown,
	/// Every hold is divided by this. `1` is real time.
	time_scale: u32
}

impl<'a, T: Transmitter + ?Sized> PulseScheduler<'a, T> {
	pub fn new(transmitter: &'a mut T, shutdown: &'a Shutdown) -> PulseScheduler<'a, T> {
		PulseScheduler {
			transmitter,
			shutdown,
			time_scale: 1
		}
	}

	/// Play symbols `time_scale` times faster than real time. Values below 1 are treated as 1.
	pub fn with_time_scale(mut self, time_scale: u32) -> PulseScheduler<'a, T> {
		self.time_scale = time_scale.max(1);
		self
	}

	/// Play one symbol, blocking for one second (divided by the time scale).
	///
	/// # Errors
	///
	/// - [`Error::Interrupted`] as soon as shutdown is requested, leaving the carrier wherever it
	///   was. The caller is responsible for switching it off.
	/// - [`Error::Transmitter`] if any write fails.
	pub fn play(&mut self, symbol: Symbol) -> Result<(), Error> {
		if self.shutdown.is_requested() {
			return Err(Error::Interrupted);
		}

		let start = Instant::now();
		let (reduced, full) = symbol.durations();
		let (reduced, full) = (reduced / self.time_scale, full / self.time_scale);

		self.transmitter.set_amplitude(Level::REDUCED)?;
		self.transmitter.set_indicator(true)?;
		if self.shutdown.sleep_until(start + reduced) {
			return Err(Error::Interrupted);
		}

		self.transmitter.set_amplitude(Level::FULL)?;
		self.transmitter.set_indicator(false)?;
		if self.shutdown.sleep_until(start + reduced + full) {
			return Err(Error::Interrupted);
		}

		trace!("{} played in {:?}", symbol, start.elapsed());
		Ok(())
	}
}
