//! Test doubles for the transmitter and the clock.

use std::cell::Cell;
use std::time::{Duration, Instant};
use time::TimeSpec;
use crate::sampler::Clock;
use crate::transmitter::{Level, Transmitter, TransmitterError};

/// A write observed by [`Recorder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
	Amplitude(Level),
	Indicator(bool)
}

/// Transmitter that records every successful write and when it happened.
pub struct Recorder {
	initialized: bool,
	events: Vec<Event>,
	times: Vec<Instant>,
	/// Number of amplitude writes that succeed before all further ones fail.
	amplitude_budget: Option<usize>
}

impl Recorder {
	pub fn new() -> Recorder {
		Recorder {
			initialized: false,
			events: Vec::new(),
			times: Vec::new(),
			amplitude_budget: None
		}
	}

	/// A recorder whose amplitude writes fail after the first `n` succeed.
	pub fn failing_amplitude_after(n: usize) -> Recorder {
		Recorder {
			amplitude_budget: Some(n),
			..Recorder::new()
		}
	}

	pub fn events(&self) -> &[Event] {
		&self.events
	}

	/// When each of [`Recorder::events`] was written.
	pub fn times(&self) -> &[Instant] {
		&self.times
	}

	fn record(&mut self, event: Event) {
		self.events.push(event);
		self.times.push(Instant::now());
	}

	/// Whether the last recorded carrier level is off and the last recorded indicator is off.
	pub fn is_off(&self) -> bool {
		let amplitude = self.events.iter().rev().find_map(|e| match e {
			Event::Amplitude(l) => Some(*l),
			_ => None
		});
		let indicator = self.events.iter().rev().find_map(|e| match e {
			Event::Indicator(b) => Some(*b),
			_ => None
		});
		amplitude.unwrap_or(Level::OFF) == Level::OFF && !indicator.unwrap_or(false)
	}
}

impl Transmitter for Recorder {
	fn initialize(&mut self) -> Result<(), TransmitterError> {
		self.initialized = true;
		Ok(())
	}

	fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError> {
		if !self.initialized {
			return Err(TransmitterError::NotInitialized);
		}
		match &mut self.amplitude_budget {
			Some(0) => return Err(TransmitterError::Device(String::from("injected failure"))),
			Some(n) => *n -= 1,
			None => ()
		}
		self.record(Event::Amplitude(level));
		Ok(())
	}

	fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError> {
		if !self.initialized {
			return Err(TransmitterError::NotInitialized);
		}
		self.record(Event::Indicator(active));
		Ok(())
	}
}

/// Clock that starts at a fixed time and advances either in real time or by a fixed step on
/// every reading.
pub struct FakeClock {
	start: Option<TimeSpec>,
	epoch: Instant,
	step: Option<Duration>,
	readings: Cell<u32>,
	dst: Box<dyn Fn(i64) -> Option<bool>>
}

impl FakeClock {
	/// A clock reading `sec.nsec` now, never in daylight savings time.
	pub fn starting_at(sec: i64, nsec: i64) -> FakeClock {
		FakeClock {
			start: Some(TimeSpec { sec, nsec }),
			epoch: Instant::now(),
			step: None,
			readings: Cell::new(0),
			dst: Box::new(|_| Some(false))
		}
	}

	/// A clock reading `sec` first, then `step` later on every following reading.
	pub fn stepping(sec: i64, step: Duration) -> FakeClock {
		FakeClock {
			step: Some(step),
			..FakeClock::starting_at(sec, 0)
		}
	}

	/// A clock that can not be read.
	pub fn broken() -> FakeClock {
		FakeClock {
			start: None,
			..FakeClock::starting_at(0, 0)
		}
	}

	/// Use `dst` to decide daylight savings time.
	pub fn with_dst(self, dst: impl Fn(i64) -> bool + 'static) -> FakeClock {
		FakeClock {
			dst: Box::new(move |t| Some(dst(t))),
			..self
		}
	}

	/// A clock whose local timezone can not be read.
	pub fn with_unknown_dst(self) -> FakeClock {
		FakeClock {
			dst: Box::new(|_| None),
			..self
		}
	}
}

impl Clock for FakeClock {
	fn now(&self) -> Option<TimeSpec> {
		let start = self.start?;
		let elapsed = match self.step {
			Some(step) => {
				let n = self.readings.get();
				self.readings.set(n + 1);
				step * n
			},
			None => self.epoch.elapsed()
		};
		let nsec = start.nsec + elapsed.subsec_nanos() as i64;
		Some(TimeSpec {
			sec: start.sec + elapsed.as_secs() as i64 + nsec / 1_000_000_000,
			nsec: nsec % 1_000_000_000
		})
	}

	fn isdst(&self, time: i64) -> Option<bool> {
		(self.dst)(time)
	}
}
