//! Local calendar time, as configured for the host (`TZ` or `/etc/localtime`).
//!
//! This module defers to libc's `localtime_r`, so local time follows exactly the rules the rest of
//! the system uses, including daylight savings time.

use core::mem::MaybeUninit;
use libc::{time_t, tm};
use crate::time::Tm;

/// Calendar time in the host's local timezone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTime {
	/// The calendar time (in local timezone)
	pub tm: Tm,
	/// Whether daylight savings time is in effect
	pub isdst: bool
}

/// Get the local calendar time for a given Unix timestamp.
///
/// Returns `None` if libc cannot represent `time` in local time. A negative (unknown) DST flag
/// from libc is reported as standard time.
///
/// # Examples
///
/// ```
/// # use time::local::localtime;
/// let local = localtime(1718617807).unwrap();
/// // Every timezone in use is offset from UTC by a multiple of 15 minutes
/// assert_eq!(local.tm.min % 15, 50 % 15);
/// ```
pub fn localtime(time: i64) -> Option<LocalTime> {
	let t = time as time_t;
	let mut local = MaybeUninit::<tm>::uninit();
	// Safety:
	// - localtime_r only reads `t` and only writes `local`
	// - a non-null return means `local` was fully initialized
	let local = unsafe {
		if libc::localtime_r(&t, local.as_mut_ptr()).is_null() {
			return None;
		}
		local.assume_init()
	};

	Some(LocalTime {
		tm: Tm {
			sec: local.tm_sec as u8,
			min: local.tm_min as u8,
			hour: local.tm_hour as u8,
			day: local.tm_mday as u8,
			mon: (local.tm_mon + 1) as u8,
			year: (local.tm_year + 1900) as u16,
			yday: (local.tm_yday + 1) as u16
		},
		isdst: local.tm_isdst > 0
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn localtime_test() {
		for &t in &[0, 1341423018, 1718617807, 1730613600] {
			let utc = Tm::new(t).unwrap();
			let local = localtime(t).unwrap();
			assert_eq!(local.tm.sec, utc.sec);
			assert_eq!(local.tm.min % 15, utc.min % 15);
			assert!((1..=12).contains(&local.tm.mon));
			assert!((1..=366).contains(&local.tm.yday));
		}
	}
}
