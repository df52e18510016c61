//! Support for command line argument parsing.
//!
//! See [crate] documentation for details on command line arguments and examples.

use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Debug};
use std::num::NonZero;
use std::path::PathBuf;
use crate::transmitter::Backend;

/// Default number of frames to transmit.
const DEFAULT_COUNT: NonZero<usize> = NonZero::new(10).unwrap();
/// Default startup log file.
const DEFAULT_LOG: &str = "wwvb.log";

/// How much to log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verbosity {
	/// Errors only (`-q`).
	Quiet,
	/// Informational messages, including one line per frame.
	Normal,
	/// Everything down to carrier changes (`-v`).
	Verbose
}

impl Verbosity {
	/// The default `env_logger` filter for this verbosity. `RUST_LOG` takes precedence.
	pub fn filter(&self) -> &'static str {
		match self {
			Verbosity::Quiet => "error",
			Verbosity::Normal => "info",
			Verbosity::Verbose => "debug"
		}
	}
}

/// The error type for parsing command line arguments.
#[cfg_attr(test, derive(PartialEq))]
pub enum ArgumentsError {
	/// The option was unrecognized. The option is returned as the payload of this variant.
	UnrecognizedOption(String),
	/// Error converting an option or parameter to UTF-8. Options are required to be UTF-8, as are
	/// most parameters (except the parameter to `-l` / `--log`). The argument index and original
	/// [`OsString`] that could not be converted are returned as the payload of this variant.
	InvalidUTF8(usize, OsString),
	/// The provided frame count was invalid. The supplied count argument is returned as the payload
	/// of this variant.
	InvalidCount(String),
	/// The provided backend was invalid. The supplied backend argument is returned as the payload
	/// of this variant.
	InvalidBackend(String),
	/// The parameter for an option was not supplied. The option is returned as the payload for this
	/// variant.
	MissingParameter(String),
	/// A positional argument was supplied, but none are accepted. The argument is returned as the
	/// payload for this variant.
	UnexpectedArgument(String),
	/// Help option (-h) was included, so print help details and exit.
	Help
}

impl Display for ArgumentsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ArgumentsError::UnrecognizedOption(s) => write!(f, "Unrecognized option: {}", s),
			ArgumentsError::InvalidUTF8(i, v) => write!(f, "Invalid UTF-8 in argument {}: {:?}", i, v),
			ArgumentsError::InvalidCount(s) => write!(f, "Invalid count: {}", s),
			ArgumentsError::InvalidBackend(s) => write!(f, "Invalid backend: {}", s),
			ArgumentsError::MissingParameter(s) => write!(f, "Missing parameter for option {}", s),
			ArgumentsError::UnexpectedArgument(s) => write!(f, "Unexpected argument: {}", s),
			ArgumentsError::Help => write!(f, "Help requested")
		}
	}
}

impl Debug for ArgumentsError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(self, f)
	}
}

impl Error for ArgumentsError {}

/// Convert an argument to [`&str`].
///
/// The function takes the argument index `i`, optional argument name `a`, and the argument `s`.
///
/// # Errors
///
/// Returns [`ArgumentsError::InvalidUTF8`] if the argument could not be converted to UTF-8 or
/// [`ArgumentsError::MissingParameter`] if the argument is `None`.
fn arg_to_str<'a, 'b>(i: usize, a: Option<&'a str>, s: Option<&'b OsString>)
	-> Result<&'b str, ArgumentsError>
{
	match s {
		Some(v) => v.to_str().ok_or_else(|| ArgumentsError::InvalidUTF8(i, v.clone())),
		None => Err(ArgumentsError::MissingParameter(a.map(String::from).unwrap_or_default()))
	}
}

/// Parsed command line arguments.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Arguments {
	/// The number of frames to transmit.
	pub count: NonZero<usize>,
	/// The transmitter backend.
	pub backend: Backend,
	/// The startup log file, or `None` to skip it.
	pub log: Option<PathBuf>,
	/// How much to log.
	pub verbosity: Verbosity
}

impl Arguments {
	/// Parse command line arguments.
	///
	/// The input can be any type that implements [`Iterator`] that yields [`OsString`], though
	/// typically this would be [`std::env::args_os`]. This function assumes that the application
	/// name is **not** supplied as the first item yielded by `args`, see examples for common use.
	///
	/// Later options override earlier ones, so `--no-log -l wwvb.log` logs to `wwvb.log` and
	/// `-q -v` is verbose.
	///
	/// # Errors
	///
	/// This function can return any of the variants in [`ArgumentsError`]. See that documentation
	/// for more details.
	///
	/// # Examples
	///
	/// ```
	/// let args = match Arguments::parse(std::env::args_os().skip(1)) {
	/// 	Ok(a) => a,
	/// 	Err(e) => {
	/// 		// Handle error
	/// 		panic!("{}", e);
	/// 	}
	/// };
	/// ```
	pub fn parse(mut args: impl Iterator<Item = OsString>) -> Result<Arguments, ArgumentsError>
	{
		let mut count = DEFAULT_COUNT;
		let mut backend = Backend::Audio;
		let mut log = Some(PathBuf::from(DEFAULT_LOG));
		let mut verbosity = Verbosity::Normal;
		let mut i = 0;
		while let Some(arg) = args.next() {
			match arg_to_str(i, None, Some(&arg))? {
				n @ ("-n" | "-c" | "--count") => {
					count = arg_to_str(i+1, Some(n), args.next().as_ref())
						.and_then(
							|v| v.parse().map_err(|_| ArgumentsError::InvalidCount(v.to_string()))
						)?;
					// Increment because we called args.next()
					i += 1;
				},
				b @ ("-b" | "--backend") => {
					backend = arg_to_str(i+1, Some(b), args.next().as_ref())
						.and_then(|v| v.parse().map_err(ArgumentsError::InvalidBackend))?;
					// Increment because we called args.next()
					i += 1;
				},
				l @ ("-l" | "--log") => {
					if let Some(a) = args.next() {
						log = Some(PathBuf::from(a));
					} else {
						return Err(ArgumentsError::MissingParameter(l.to_string()))
					}
					// Increment because we called args.next()
					i += 1;
				},
				"--no-log" => log = None,
				"-v" | "--verbose" => verbosity = Verbosity::Verbose,
				"-q" | "--quiet" => verbosity = Verbosity::Quiet,
				"-h" | "--help" => return Err(ArgumentsError::Help),
				v => {
					if v.starts_with('-') {
						return Err(ArgumentsError::UnrecognizedOption(v.to_string()));
					}
					return Err(ArgumentsError::UnexpectedArgument(v.to_string()));
				}
			}
			i += 1;
		}

		Ok(Arguments {
			count,
			backend,
			log,
			verbosity
		})
	}
}
