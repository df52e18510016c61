//! The WWVB amplitude modulated time code.
//!
//! See [WWVB documentation](https://en.wikipedia.org/wiki/WWVB) for details. Each frame encodes
//! the UTC minute at which it **begins**. Unsupported features:
//! - **DUT1**. A fixed placeholder is sent (negative sign pattern, magnitude `0.0s`).
//! - **Leap seconds**. The leap second warning bit is always zero.
//! - **Phase modulation**. Only the amplitude modulated code is produced.
//!
//! # Examples
//! ```
//! # use timecode::wwvb::{self, TimeFields};
//! // Sun, May 26, 2024. 16:58:00 UTC.
//! let fields = TimeFields::new(1716742680, true, true).unwrap();
//! let frame = wwvb::encode(&fields);
//! assert_eq!(
//! 	frame.to_string(),
//! 	"M10101000M000100110M000100100M011100010M000000010M010001011M"
//! );
//! ```

use core::{error, fmt};
use time::Tm;
use crate::Frame;

/// Placeholder DUT1 value, transmitted at positions 36-43.
///
/// The MSB four bits are the sign pattern for positions 36-39 (`0x4_` reads as `Zero, One, Zero`
/// followed by the marker slot) and the LSB four bits the magnitude for positions 40-43.
const DUT1_PLACEHOLDER: u8 = 0x40;

/// The error type for sampling time fields.
#[derive(PartialEq)]
pub enum FieldsError {
	/// The input time is before the Unix epoch (Jan 1, 1970) and not supported. The unsupported time
	/// is provided in the payload.
	UnsupportedTime(i64)
}

impl fmt::Display for FieldsError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FieldsError::UnsupportedTime(x) => write!(f, "Unsupported time: {}", x)
		}
	}
}

impl fmt::Debug for FieldsError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl error::Error for FieldsError {}

/// Everything a WWVB frame says about one minute.
///
/// The numeric fields are UTC. The two DST flags describe local time and are supplied by the
/// caller, since only the caller knows which timezone's rules apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeFields {
	/// UTC minute, ranged [0, 59]
	pub minute: u8,
	/// UTC hour, ranged [0, 23]
	pub hour: u8,
	/// UTC day of year, ranged [1, 366]
	pub day_of_year: u16,
	/// UTC year modulo 100, ranged [0, 99]
	pub year2: u8,
	/// Whether the full UTC year is a Gregorian leap year
	pub leap_year: bool,
	/// Whether daylight savings time is in effect today
	pub dst_today: bool,
	/// Whether daylight savings time is in effect 24 hours from now
	pub dst_tomorrow: bool
}

impl TimeFields {
	/// Take the fields for the UTC minute containing `time`.
	///
	/// Seconds within the minute are ignored; callers normally pass the instant of second 0.
	///
	/// # Errors
	///
	/// Returns [`FieldsError::UnsupportedTime`] if `time < 0`.
	///
	/// # Examples
	///
	/// ```
	/// # use timecode::wwvb::TimeFields;
	/// // Wed, Jul 04 2012 17:30:00 UTC
	/// let fields = TimeFields::new(1341423000, true, false).unwrap();
	/// assert_eq!(fields.minute, 30);
	/// assert_eq!(fields.hour, 17);
	/// assert_eq!(fields.day_of_year, 186);
	/// assert_eq!(fields.year2, 12);
	/// assert!(fields.leap_year);
	/// ```
	pub fn new(time: i64, dst_today: bool, dst_tomorrow: bool) -> Result<TimeFields, FieldsError> {
		let utc = Tm::new(time).ok_or(FieldsError::UnsupportedTime(time))?;
		Ok(TimeFields {
			minute: utc.min,
			hour: utc.hour,
			day_of_year: utc.yday,
			year2: (utc.year % 100) as u8,
			leap_year: utc.isleapyear(),
			dst_today,
			dst_tomorrow
		})
	}

	/// Pack the fields into transmission order.
	///
	/// Bit `n` (LSB first) is the value at frame position `n`. Marker positions and bits 60-63 are
	/// left clear; each BCD digit is masked to the width of its field.
	fn pack(&self) -> u64 {
		let minute = self.minute as u64;
		let hour = self.hour as u64;
		let day = self.day_of_year as u64;
		let year = self.year2 as u64;

		// Built MSB first, so position `n` is bit `63 - n`, then reversed
		let mut a: u64 = ((minute / 10) & 0x7) << 60;
		a |= ((minute % 10) & 0xf) << 55;
		a |= ((hour / 10) & 0x3) << 50;
		a |= ((hour % 10) & 0xf) << 45;
		a |= ((day / 100) & 0x3) << 40;
		a |= (((day / 10) % 10) & 0xf) << 35;
		a |= ((day % 10) & 0xf) << 30;
		a |= (DUT1_PLACEHOLDER as u64) << 20;
		a |= (((year / 10) % 10) & 0xf) << 15;
		a |= ((year % 10) & 0xf) << 10;
		a |= (self.leap_year as u64) << 8;
		// Bit 7: leap second warning, never set
		a |= (self.dst_tomorrow as u64) << 6;
		a |= (self.dst_today as u64) << 5;

		a.reverse_bits()
	}
}

impl fmt::Display for TimeFields {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:02}:{:02} UTC", self.hour, self.minute)
	}
}

/// Encode `fields` as a complete 60-symbol frame.
///
/// This function is pure and total. Fields outside their documented ranges are not rejected, they
/// are truncated to the width of each BCD digit instead.
pub fn encode(fields: &TimeFields) -> Frame {
	Frame::from_packed(fields.pack())
}
