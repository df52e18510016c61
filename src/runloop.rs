//! The transmit cycle: wait for a minute, encode it, play it.

use std::fmt::{self, Display};
use std::num::NonZero;
use log::{debug, error, info, trace};
use timecode::wwvb;
use crate::error::Error;
use crate::sampler::{Clock, TimeSampler};
use crate::scheduler::PulseScheduler;
use crate::shutdown::Shutdown;
use crate::transmitter::{Transmitter, TransmitterError};

/// Where the run loop is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
	/// Not running. Initial state, and the state after all cycles completed.
	Idle,
	/// Polling for the next minute boundary.
	WaitingForBoundary,
	/// Building the frame for the sampled minute.
	Encoding,
	/// Playing the symbol at the given position of the frame.
	Transmitting(u8),
	/// Stopped by an interruption or a fatal error. Terminal.
	Shutdown
}

impl Display for State {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			State::Idle => write!(f, "idle"),
			State::WaitingForBoundary => write!(f, "waiting for minute boundary"),
			State::Encoding => write!(f, "encoding"),
			State::Transmitting(i) => write!(f, "transmitting symbol {}", i),
			State::Shutdown => write!(f, "shut down")
		}
	}
}

/// Switches the transmitter off when dropped, including while unwinding.
struct OffGuard<'a, T: Transmitter + ?Sized> {
	transmitter: &'a mut T,
	armed: bool
}

impl<'a, T: Transmitter + ?Sized> OffGuard<'a, T> {
	fn new(transmitter: &'a mut T) -> OffGuard<'a, T> {
		OffGuard {
			transmitter,
			armed: true
		}
	}

	fn transmitter(&mut self) -> &mut T {
		&mut *self.transmitter
	}

	/// Switch the transmitter off now and report the result.
	fn release(mut self) -> Result<(), TransmitterError> {
		self.armed = false;
		self.transmitter.off()
	}
}

impl<T: Transmitter + ?Sized> Drop for OffGuard<'_, T> {
	fn drop(&mut self) {
		if self.armed {
			if let Err(e) = self.transmitter.off() {
				error!("Failed to switch transmitter off: {}", e);
			}
		}
	}
}

/// Transmits a fixed number of one-minute frames.
///
/// # Examples
/// ```
/// let shutdown = Shutdown::new();
/// let mut transmitter = transmitter::open(Backend::Console)?;
/// transmitter.initialize()?;
///
/// let mut runloop = RunLoop::new(SystemClock, NonZero::new(2).unwrap());
/// runloop.run(transmitter.as_mut(), &shutdown)?;
/// assert_eq!(runloop.state(), State::Idle);
/// ```
pub struct RunLoop<C: Clock> {
	sampler: TimeSampler<C>,
	cycles: NonZero<usize>,
	state: State,
	/// Symbol time scale handed to the [`PulseScheduler`].
	time_scale: u32
}

impl<C: Clock> RunLoop<C> {
	pub fn new(clock: C, cycles: NonZero<usize>) -> RunLoop<C> {
		RunLoop {
			sampler: TimeSampler::new(clock),
			cycles,
			state: State::Idle,
			time_scale: 1
		}
	}

	/// Play frames `time_scale` times faster than real time. Minute boundaries still come from
	/// the clock.
	#[cfg(test)]
	pub fn with_time_scale(mut self, time_scale: u32) -> RunLoop<C> {
		self.time_scale = time_scale;
		self
	}

	pub fn state(&self) -> State {
		self.state
	}

	/// Transmit `cycles` frames, each starting on a fresh minute boundary.
	///
	/// The transmitter must already be initialized. Whatever happens, it is switched off (carrier
	/// off, indicator off) before this returns, and the switch off is the last write it sees.
	///
	/// # Errors
	///
	/// - [`Error::Interrupted`] if shutdown was requested. The frame in progress is dropped.
	/// - [`Error::Clock`] or [`Error::Fields`] if the time could not be sampled.
	/// - [`Error::Transmitter`] if a write failed, including the final switch off.
	///
	/// On error the loop ends in [`State::Shutdown`] and can not be run again.
	pub fn run<T: Transmitter + ?Sized>(&mut self, transmitter: &mut T, shutdown: &Shutdown)
		-> Result<(), Error>
	{
		if self.state == State::Shutdown {
			return Err(Error::Interrupted);
		}

		let mut guard = OffGuard::new(transmitter);
		let result = self.cycle_all(guard.transmitter(), shutdown);
		let off = guard.release();
		debug!("Transmitter off");

		let result = match (result, off) {
			(Ok(()), off) => off.map_err(Error::from),
			(Err(e), Ok(())) => Err(e),
			(Err(e), Err(o)) => {
				error!("Failed to switch transmitter off: {}", o);
				Err(e)
			}
		};
		self.transition(if result.is_ok() { State::Idle } else { State::Shutdown });
		result
	}

	fn cycle_all<T: Transmitter + ?Sized>(&mut self, transmitter: &mut T, shutdown: &Shutdown)
		-> Result<(), Error>
	{
		let count = self.cycles.get();
		for cycle in 1..=count {
			self.transition(State::WaitingForBoundary);
			let fields = self.sampler.await_minute_boundary(shutdown)?;

			self.transition(State::Encoding);
			let frame = wwvb::encode(&fields);
			info!("{} ({}/{})", fields, cycle, count);
			debug!("{}", frame);

			let mut scheduler = PulseScheduler::new(&mut *transmitter, shutdown)
				.with_time_scale(self.time_scale);
			for (i, symbol) in frame.iter().enumerate() {
				self.transition(State::Transmitting(i as u8));
				trace!("{:<4} {:?}", i, symbol);
				scheduler.play(*symbol)?;
			}
		}
		Ok(())
	}

	fn transition(&mut self, state: State) {
		match state {
			State::Transmitting(_) => (),
			_ => debug!("{} -> {}", self.state, state)
		}
		self.state = state;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;
	use std::time::{Duration, Instant};
	use crate::testing::{Event, FakeClock, Recorder};
	use timecode::Symbol;
	use timecode::wwvb::TimeFields;
	use crate::transmitter::Level;

	// Sun, May 26, 2024. 16:58:00 UTC.
	const MINUTE: i64 = 1716742680;

	fn one() -> NonZero<usize> {
		NonZero::new(1).unwrap()
	}

	#[test]
	fn interrupt_test() {
		// Interrupt at several points of the frame, including mid pulse at both levels
		for delay in [50, 150, 1100, 1600, 2350] {
			let shutdown = Shutdown::new();
			let handle = shutdown.clone();
			let t = thread::spawn(move || {
				thread::sleep(Duration::from_millis(delay));
				handle.request();
			});

			let mut r = Recorder::new();
			r.initialize().unwrap();
			let mut runloop = RunLoop::new(FakeClock::starting_at(MINUTE - 1, 900_000_000), one());

			let start = Instant::now();
			let result = runloop.run(&mut r, &shutdown);
			t.join().unwrap();

			assert!(matches!(result, Err(Error::Interrupted)));
			assert!(start.elapsed() < Duration::from_millis(delay + 500));
			assert!(r.is_off());
			assert_eq!(&r.events()[r.events().len() - 2..], &[
				Event::Amplitude(Level::OFF),
				Event::Indicator(false)
			]);
			assert_eq!(runloop.state(), State::Shutdown);
		}
	}

	#[test]
	fn shutdown_before_run_test() {
		let shutdown = Shutdown::new();
		shutdown.request();

		let mut r = Recorder::new();
		r.initialize().unwrap();
		let mut runloop = RunLoop::new(FakeClock::starting_at(MINUTE, 0), one());
		assert!(matches!(runloop.run(&mut r, &shutdown), Err(Error::Interrupted)));
		assert_eq!(r.events(), &[Event::Amplitude(Level::OFF), Event::Indicator(false)]);
		assert_eq!(runloop.state(), State::Shutdown);

		// Terminal
		let fresh = Shutdown::new();
		assert!(matches!(runloop.run(&mut r, &fresh), Err(Error::Interrupted)));
	}

	#[test]
	fn transmitter_failure_test() {
		let shutdown = Shutdown::new();

		// Third amplitude write (second symbol's reduced carrier) fails
		let mut r = Recorder::failing_amplitude_after(2);
		r.initialize().unwrap();
		let mut runloop = RunLoop::new(FakeClock::starting_at(MINUTE, 0), one());
		let result = runloop.run(&mut r, &shutdown);
		assert!(matches!(result, Err(Error::Transmitter(TransmitterError::Device(_)))));
		assert_eq!(runloop.state(), State::Shutdown);

		// The carrier write of the switch off fails too, but the indicator still goes dark
		assert_eq!(r.events().last(), Some(&Event::Indicator(false)));
		assert_eq!(r.events().len(), 5);
	}

	#[test]
	fn clock_failure_test() {
		let shutdown = Shutdown::new();
		let mut r = Recorder::new();
		r.initialize().unwrap();
		let mut runloop = RunLoop::new(FakeClock::broken(), one());
		assert!(matches!(runloop.run(&mut r, &shutdown), Err(Error::Clock)));
		assert!(r.is_off());
	}

	#[test]
	fn panic_test() {
		struct Exploding(Recorder);

		impl Transmitter for Exploding {
			fn initialize(&mut self) -> Result<(), TransmitterError> {
				self.0.initialize()
			}

			fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError> {
				if level == Level::FULL {
					panic!("boom");
				}
				self.0.set_amplitude(level)
			}

			fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError> {
				self.0.set_indicator(active)
			}
		}

		let shutdown = Shutdown::new();
		let mut e = Exploding(Recorder::new());
		e.initialize().unwrap();
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			RunLoop::new(FakeClock::starting_at(MINUTE, 0), one()).run(&mut e, &shutdown)
		}));
		assert!(result.is_err());
		assert!(e.0.is_off());
	}

	#[test]
	fn frame_test() {
		const SCALE: u32 = 10;
		let shutdown = Shutdown::new();
		let mut r = Recorder::new();
		r.initialize().unwrap();

		// Half second steps read second 0 of the first minute twice; it must only be sent once
		let clock = FakeClock::stepping(MINUTE, Duration::from_millis(500));
		let mut runloop = RunLoop::new(clock, NonZero::new(2).unwrap()).with_time_scale(SCALE);
		runloop.run(&mut r, &shutdown).unwrap();
		assert_eq!(runloop.state(), State::Idle);

		let events = r.events();
		let times = r.times();
		assert_eq!(events.len(), 2 * 60 * 4 + 2);
		assert_eq!(&events[events.len() - 2..], &[Event::Amplitude(Level::OFF), Event::Indicator(false)]);

		let symbols: Vec<Symbol> = [MINUTE, MINUTE + 60].into_iter()
			.flat_map(|t| wwvb::encode(&TimeFields::new(t, false, false).unwrap()).iter().copied().collect::<Vec<_>>())
			.collect();
		for (n, symbol) in symbols.iter().enumerate() {
			let k = n * 4;
			assert_eq!(&events[k..k + 4], &[
				Event::Amplitude(Level::REDUCED),
				Event::Indicator(true),
				Event::Amplitude(Level::FULL),
				Event::Indicator(false)
			], "symbol {}", n);

			// Scaled reduced phases are 80, 50 and 20ms
			let reduced = times[k + 2] - times[k];
			let played = match reduced.as_millis() {
				0..35 => Symbol::Zero,
				35..65 => Symbol::One,
				_ => Symbol::Marker
			};
			assert_eq!(played, *symbol, "symbol {}, reduced for {:?}", n, reduced);

			// Symbols within a frame follow each other without a gap
			if n % 60 != 59 {
				let second = times[k + 4] - times[k];
				assert!(second >= Duration::from_millis(98), "symbol {}, lasted {:?}", n, second);
				assert!(second < Duration::from_millis(130), "symbol {}, lasted {:?}", n, second);
			}
		}
	}
}
