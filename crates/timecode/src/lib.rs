//! Encode time into the WWVB amplitude modulated time code.
//!
//! A WWVB frame is 60 one-second symbols, each sent as a reduced carrier for part of the second
//! followed by full carrier for the rest. The length of the reduced interval distinguishes the
//! three [`Symbol`]s. This crate only turns time into symbols; timing them on real hardware is up
//! to the caller.
//!
//! This crate is `no_std` and does not allocate.
//!
//! # Examples
//! ```
//! # use timecode::{wwvb::{self, TimeFields}, Symbol};
//! // Wed, Jul 04 2012 17:30:00 UTC, daylight savings time in effect today and tomorrow
//! let fields = TimeFields::new(1341423000, true, true).unwrap();
//! let frame = wwvb::encode(&fields);
//!
//! assert_eq!(frame.len(), 60);
//! assert_eq!(frame[0], Symbol::Marker);
//! for symbol in &frame {
//! 	let (reduced, full) = symbol.durations();
//! 	// Drive the transmitter: reduced carrier for `reduced`, then full carrier for `full`
//! 	# let _ = (reduced, full);
//! }
//! ```
//!
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB

#![no_std]

use core::{fmt, ops::Index, slice, time::Duration};

pub mod wwvb;

/// One second of the time code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
	/// Frame/field delimiter: 800ms reduced, 200ms full.
	Marker,
	/// Binary one: 500ms reduced, 500ms full.
	One,
	/// Binary zero: 200ms reduced, 800ms full.
	Zero
}

impl Symbol {
	/// Length of the reduced carrier interval in milliseconds.
	#[inline(always)]
	pub const fn reduced_ms(self) -> u64 {
		match self {
			Symbol::Marker => 800,
			Symbol::One => 500,
			Symbol::Zero => 200
		}
	}

	/// Length of the full carrier interval in milliseconds.
	#[inline(always)]
	pub const fn full_ms(self) -> u64 {
		match self {
			Symbol::Marker => 200,
			Symbol::One => 500,
			Symbol::Zero => 800
		}
	}

	/// The `(reduced, full)` intervals of this symbol. They always add up to one second.
	pub const fn durations(self) -> (Duration, Duration) {
		(Duration::from_millis(self.reduced_ms()), Duration::from_millis(self.full_ms()))
	}

	/// [`Symbol::One`] if `bit` is set, otherwise [`Symbol::Zero`].
	#[inline(always)]
	pub const fn from_bit(bit: bool) -> Symbol {
		if bit { Symbol::One } else { Symbol::Zero }
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Symbol::Marker => f.write_str("M"),
			Symbol::One => f.write_str("1"),
			Symbol::Zero => f.write_str("0")
		}
	}
}

/// A complete one-minute time code: exactly [`Frame::LEN`] symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame([Symbol; Frame::LEN]);

impl Frame {
	/// Number of symbols per frame, one per second.
	pub const LEN: usize = 60;

	/// Positions that always carry [`Symbol::Marker`].
	pub const MARKERS: [usize; 7] = [0, 9, 19, 29, 39, 49, 59];

	/// Whether `position` is one of the fixed marker positions.
	#[inline(always)]
	pub const fn is_marker(position: usize) -> bool {
		position == 0 || position % 10 == 9
	}

	/// Expand a packed frame into symbols.
	///
	/// Bit `n` of `packed` (LSB first) becomes the symbol at position `n`. Marker positions are
	/// always [`Symbol::Marker`] regardless of their bit, and bits 60-63 are ignored.
	pub fn from_packed(packed: u64) -> Frame {
		let mut symbols = [Symbol::Zero; Frame::LEN];
		for (n, symbol) in symbols.iter_mut().enumerate() {
			*symbol = if Frame::is_marker(n) {
				Symbol::Marker
			} else {
				Symbol::from_bit((packed >> n) & 1 == 1)
			};
		}
		Frame(symbols)
	}

	/// Number of symbols, always [`Frame::LEN`].
	#[inline(always)]
	pub const fn len(&self) -> usize {
		Frame::LEN
	}

	/// Iterate over the symbols in transmission order.
	pub fn iter(&self) -> slice::Iter<'_, Symbol> {
		self.0.iter()
	}
}

impl Index<usize> for Frame {
	type Output = Symbol;

	fn index(&self, index: usize) -> &Symbol {
		&self.0[index]
	}
}

impl<'a> IntoIterator for &'a Frame {
	type Item = &'a Symbol;
	type IntoIter = slice::Iter<'a, Symbol>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl fmt::Display for Frame {
	/// Writes the frame as 60 characters, `M`, `1` or `0` per symbol.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.iter().try_for_each(|s| fmt::Display::fmt(s, f))
	}
}
