//! Startup record.
//!
//! Each run appends one line to a plain text log, e.g.
//! ```text
//! [05-26-2024 09:58:03] wwvb started
//! ```
//! The timestamp is local time. Nothing else is ever written to this file; runtime diagnostics go
//! through [`log`].

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use time::Tm;
use time::local::localtime;

/// Format the startup line for local time `tm`, without the trailing newline.
///
/// # Examples
/// ```
/// let tm = Tm { sec: 3, min: 58, hour: 9, day: 26, mon: 5, year: 2024, yday: 147 };
/// assert_eq!(started_line(&tm), "[05-26-2024 09:58:03] wwvb started");
/// ```
pub fn started_line(tm: &Tm) -> String {
	format!(
		"[{:02}-{:02}-{:04} {:02}:{:02}:{:02}] wwvb started",
		tm.mon, tm.day, tm.year, tm.hour, tm.min, tm.sec
	)
}

/// Append the startup line for Unix time `time` to the file at `path`, creating it if needed.
///
/// # Errors
///
/// Returns any error opening or writing the file, or an error of kind [`io::ErrorKind::Other`]
/// if `time` can not be converted to local time.
pub fn append(path: &Path, time: i64) -> io::Result<()> {
	let local = localtime(time).ok_or_else(|| io::Error::other("Failed to get local time"))?;
	let mut file = OpenOptions::new().create(true).append(true).open(path)?;
	writeln!(file, "{}", started_line(&local.tm))
}
