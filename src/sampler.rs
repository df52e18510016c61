//! Minute boundary detection and time sampling.
//!
//! [`TimeSampler::await_minute_boundary`] polls the clock until a new UTC minute starts and
//! snapshots the fields of that minute. Polling is coarse (every [`POLL_INTERVAL`]), which is
//! plenty for a time code whose shortest pulse is 200ms.

use std::time::Duration;
use log::trace;
use time::{TimeSpec, SECONDS_PER_DAY};
use timecode::wwvb::TimeFields;
use crate::error::Error;
use crate::shutdown::Shutdown;

/// How often the clock is polled while waiting for the next minute.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Source of the current time and local daylight savings status.
pub trait Clock {
	/// The current Unix time, or `None` if the clock is unavailable.
	fn now(&self) -> Option<TimeSpec>;

	/// Whether local daylight savings time is in effect at `time`, or `None` if unknown.
	fn isdst(&self, time: i64) -> Option<bool>;
}

/// The host's realtime clock and local timezone.
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Option<TimeSpec> {
		time::now()
	}

	fn isdst(&self, time: i64) -> Option<bool> {
		time::local::localtime(time).map(|l| l.isdst)
	}
}

/// Waits for minute boundaries and samples [`TimeFields`].
pub struct TimeSampler<C: Clock> {
	clock: C,
	/// Start of the last minute sampled, never sampled twice.
	last: Option<i64>
}

impl<C: Clock> TimeSampler<C> {
	pub fn new(clock: C) -> TimeSampler<C> {
		TimeSampler {
			clock,
			last: None
		}
	}

	/// Block until second 0 of a UTC minute that has not been sampled yet, then sample it.
	///
	/// The numeric fields come from the UTC calendar date of that instant, `dst_today` from the
	/// local DST status at that instant and `dst_tomorrow` from the local DST status 24 hours
	/// later.
	///
	/// # Errors
	///
	/// - [`Error::Interrupted`] if shutdown is requested while waiting.
	/// - [`Error::Clock`] if the clock or the local timezone cannot be read. There is no retry.
	pub fn await_minute_boundary(&mut self, shutdown: &Shutdown) -> Result<TimeFields, Error> {
		loop {
			if shutdown.is_requested() {
				return Err(Error::Interrupted);
			}

			let now = self.clock.now().ok_or(Error::Clock)?;
			let minute = now.start_of_minute();
			if now.second_of_minute() == 0 && self.last != Some(minute) {
				trace!("Minute boundary at {}.{:09}", now.sec, now.nsec);
				self.last = Some(minute);
				return self.sample(minute);
			}

			if shutdown.sleep(POLL_INTERVAL) {
				return Err(Error::Interrupted);
			}
		}
	}

	/// Sample the fields for the minute starting at `time`.
	fn sample(&self, time: i64) -> Result<TimeFields, Error> {
		let dst_today = self.clock.isdst(time).ok_or(Error::Clock)?;
		let dst_tomorrow = self.clock.isdst(time + SECONDS_PER_DAY).ok_or(Error::Clock)?;
		Ok(TimeFields::new(time, dst_today, dst_tomorrow)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Instant;
	use crate::testing::FakeClock;

	// Sun, May 26, 2024. 16:58:00 UTC.
	const MINUTE: i64 = 1716742680;

	#[test]
	fn boundary_test() {
		let shutdown = Shutdown::new();
		let mut sampler = TimeSampler::new(FakeClock::starting_at(MINUTE - 1, 900_000_000));

		let start = Instant::now();
		let fields = sampler.await_minute_boundary(&shutdown).unwrap();
		assert!(start.elapsed() >= Duration::from_millis(90));
		assert_eq!(fields, TimeFields::new(MINUTE, false, false).unwrap());
		assert_eq!((fields.hour, fields.minute, fields.day_of_year, fields.year2), (16, 58, 147, 24));
	}

	#[test]
	fn already_at_boundary_test() {
		let shutdown = Shutdown::new();
		let mut sampler = TimeSampler::new(FakeClock::starting_at(MINUTE, 950_000_000));

		// Second 0 counts immediately, but the same minute is never sampled twice
		let start = Instant::now();
		let fields = sampler.await_minute_boundary(&shutdown).unwrap();
		assert!(start.elapsed() < Duration::from_millis(40));
		assert_eq!(fields.minute, 58);

		let handle = shutdown.clone();
		std::thread::spawn(move || {
			std::thread::sleep(Duration::from_millis(100));
			handle.request();
		});
		assert!(matches!(sampler.await_minute_boundary(&shutdown), Err(Error::Interrupted)));
	}

	#[test]
	fn dst_test() {
		let shutdown = Shutdown::new();

		// DST ends within the next 24 hours
		let clock = FakeClock::starting_at(MINUTE, 0).with_dst(|t| t < MINUTE + 3600);
		let fields = TimeSampler::new(clock).await_minute_boundary(&shutdown).unwrap();
		assert_eq!((fields.dst_today, fields.dst_tomorrow), (true, false));

		// DST starts within the next 24 hours
		let clock = FakeClock::starting_at(MINUTE, 0).with_dst(|t| t >= MINUTE + 3600);
		let fields = TimeSampler::new(clock).await_minute_boundary(&shutdown).unwrap();
		assert_eq!((fields.dst_today, fields.dst_tomorrow), (false, true));
	}

	#[test]
	fn errors_test() {
		let shutdown = Shutdown::new();

		let mut sampler = TimeSampler::new(FakeClock::broken());
		assert!(matches!(sampler.await_minute_boundary(&shutdown), Err(Error::Clock)));

		let mut sampler = TimeSampler::new(FakeClock::starting_at(MINUTE, 0).with_unknown_dst());
		assert!(matches!(sampler.await_minute_boundary(&shutdown), Err(Error::Clock)));

		shutdown.request();
		let mut sampler = TimeSampler::new(FakeClock::starting_at(MINUTE, 0));
		assert!(matches!(sampler.await_minute_boundary(&shutdown), Err(Error::Interrupted)));
	}

	#[test]
	fn system_clock_test() {
		let now = SystemClock.now().unwrap();
		assert!(now.sec > MINUTE);
		assert!(SystemClock.isdst(now.sec).is_some());
	}
}
