//! Utilities for dealing with time.
//!
//! This crate is divided into two halves: [`time`] converts between Unix timestamps and UTC
//! calendar time with no understanding of timezones, and [`local`] (feature `now`) asks the host
//! for local calendar time and daylight savings status.
//!
//! By default, this crate is `no_std` and has no dependencies. The `now` feature pulls in `libc`
//! to read the system clock ([`time::now`]) and the host timezone ([`local::localtime`]).
//!
//! # Examples
//!
//! Basic conversion from Unix time to UTC calendar time.
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

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod time;
#[cfg(feature = "now")]
#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
pub mod local;

pub use time::*;
