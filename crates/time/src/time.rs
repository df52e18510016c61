//! UTC calendar time from Unix timestamps, unaware of timezone.
//!
//! The calendar functions here do not rely on libc's `gmtime`, so they are thread safe and
//! available without the `now` feature. Reading the system clock ([`now`]) needs `now`.
//!
//! # Examples
//!
//! ```
//! # use time::time::Tm;
//! let date = Tm::new(1718617807).unwrap();
//! assert_eq!(date, Tm {
//! 	sec: 7,
//! 	min: 50,
//! 	hour: 9,
//! 	day: 17,
//! 	mon: 6,
//! 	year: 2024,
//! 	yday: 169
//! });
//! ```

#[cfg(feature = "now")]
use core::mem::MaybeUninit;
#[cfg(feature = "now")]
use libc::{timespec, clock_gettime, CLOCK_REALTIME};

/// Unix time with nanosecond granularity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpec {
	/// Seconds since the Unix epoch
	pub sec: i64,
	/// Nanoseconds since the beginning of `sec`, ranging [0-999999999]
	pub nsec: i64
}

impl TimeSpec {
	/// The second within the current UTC minute, ranged [0, 59].
	///
	/// Unix time has no leap seconds, so this is exact for any non-negative timestamp.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::TimeSpec;
	/// assert_eq!(TimeSpec { sec: 1716742680, nsec: 5 }.second_of_minute(), 0);
	/// assert_eq!(TimeSpec { sec: 1716742645, nsec: 0 }.second_of_minute(), 25);
	/// ```
	#[inline(always)]
	pub fn second_of_minute(&self) -> u8 {
		self.sec.rem_euclid(SECONDS_PER_MINUTE) as u8
	}

	/// The timestamp of the start of the current UTC minute.
	#[inline(always)]
	pub fn start_of_minute(&self) -> i64 {
		self.sec - self.sec.rem_euclid(SECONDS_PER_MINUTE)
	}
}

#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
impl From<timespec> for TimeSpec {
	fn from(value: timespec) -> Self {
		TimeSpec {
			sec: value.tv_sec as i64,
			nsec: value.tv_nsec as i64
		}
	}
}

/// Get the current time as a Unix timestamp with nanosecond granularity.
///
/// Returns `None` if `libc::clock_gettime` fails, i.e. the realtime clock is unavailable.
///
/// # Examples
///
/// ```
/// # use time::time::now;
/// let c = now().expect("Failed to get current time");
/// assert!(c.sec > 0);
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
pub fn now() -> Option<TimeSpec> {
	let mut time = MaybeUninit::<timespec>::uninit();
	// Safety:
	// - clock_gettime does not read time, only writes
	// - if clock_gettime returns zero, time is successfully initialized
	unsafe {
		match clock_gettime(CLOCK_REALTIME, time.as_mut_ptr()) {
			0 => Some(time.assume_init().into()),
			_ => None
		}
	}
}

/// Check whether a given `year` is a leap year in the Gregorian calendar.
///
/// Year must be the absolute calendar year (i.e. 2024), not a two-digit year.
///
/// # Examples
///
/// ```
/// # use time::time::isleapyear;
/// assert_eq!(isleapyear(1900), false);
/// assert_eq!(isleapyear(2000), true);
/// assert_eq!(isleapyear(2023), false);
/// assert_eq!(isleapyear(2024), true);
/// ```
#[inline(always)]
pub fn isleapyear(year: u16) -> bool {
	// Divisible by 4 unless it's a century, then divisible by 16 (i.e. 400)
	let l = if year % 100 != 0 { 3 } else { 15 };
	(year & l) == 0
}

/// Seconds per minute.
const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds per hour.
const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;
/// Seconds per day.
pub const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;
/// Days in one 400 year Gregorian cycle.
const DAYS_PER_ERA: i64 = 146097;
/// Days from March 1, 0000 (proleptic) to January 1, 1970.
const DAYS_FROM_MARCH_0000_TO_JAN_1970: i64 = 719468;
/// Days from March 1 to December 31, inclusive.
const DAYS_FROM_MAR_TO_DEC: i64 = 306;
/// Days from January 1 to February 28, inclusive.
const DAYS_FROM_JAN_TO_FEB: i64 = 59;

/// Gregorian calendar date in UTC.
///
/// Unlike `libc::tm`, `mon` is [1, 12], `yday` is [1, 366], and `year` is the absolute year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tm {
	/// Seconds, ranged [0, 59]
	pub sec: u8,
	/// Minutes, ranged [0, 59]
	pub min: u8,
	/// Hours, ranged [0, 23]
	pub hour: u8,
	/// Day of the month, ranged [1, 31]
	pub day: u8,
	/// Month of the year, ranged [1, 12]
	pub mon: u8,
	/// Absolute Gregorian calendar year
	pub year: u16,
	/// Day of the year, ranged [1, 366]
	pub yday: u16
}

impl Tm {
	/// Convert a Unix timestamp into a UTC calendar date.
	///
	/// Only timestamps on or after the Unix epoch are supported. Negative inputs result in `None`.
	pub fn new(unixtimestamp: i64) -> Option<Tm> {
		// Days are counted from March 1 so the leap day falls at the end of each shifted year,
		// then shifted back to a January year at the end. See
		// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
		if unixtimestamp < 0 { return None }
		let days = unixtimestamp / SECONDS_PER_DAY;
		let rem = unixtimestamp % SECONDS_PER_DAY;

		let z = days + DAYS_FROM_MARCH_0000_TO_JAN_1970;
		let era = z / DAYS_PER_ERA;
		let doe = z % DAYS_PER_ERA;
		let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
		let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
		let mp = (5 * doy + 2) / 153;
		let d = doy - (153 * mp + 2) / 5 + 1;

		let (m, y, yday) = if mp < 10 {
			let y = yoe + era * 400;
			let leap = isleapyear(y as u16) as i64;
			(mp + 3, y, doy + DAYS_FROM_JAN_TO_FEB + leap + 1)
		} else {
			(mp - 9, yoe + era * 400 + 1, doy - DAYS_FROM_MAR_TO_DEC + 1)
		};

		Some(Tm {
			sec: (rem % SECONDS_PER_MINUTE) as u8,
			min: ((rem % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as u8,
			hour: (rem / SECONDS_PER_HOUR) as u8,
			day: d as u8,
			mon: m as u8,
			year: y as u16,
			yday: yday as u16
		})
	}

	/// Check whether `self` falls in a leap year.
	#[inline(always)]
	pub fn isleapyear(&self) -> bool {
		isleapyear(self.year)
	}
}
