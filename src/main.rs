//! Transmit the WWVB time code to set radio-controlled clocks.
//!
//! [WWVB] broadcasts the current UTC time on a 60 kHz carrier, one 60 second frame per minute.
//! Every second the carrier drops to a reduced level for 200, 500 or 800ms, meaning a binary `0`, a
//! binary `1` or a position marker. This application samples the system clock at the start of each
//! minute, encodes that minute (see [`timecode::wwvb`]) and keys a low power transmitter with it,
//! so that nearby clocks can synchronize without reception of the real station.
//!
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB
//!
//! # Command Line Arguments
//!
//! General form: `wwvbtx [options...]`
//!
//! | Short form | Long form   | Argument                   | Default    | Description                          |
//! | ---------- | ----------- | -------------------------- | ---------- | ------------------------------------ |
//! | `-n`, `-c` | `--count`   | Integer > 0                | 10         | The number of frames to transmit     |
//! | `-b`       | `--backend` | `audio`, `gpio`, `console` | `audio`    | The [transmitter] to use             |
//! | `-l`       | `--log`     | Filename                   | `wwvb.log` | The file to record each start in     |
//! |            | `--no-log`  |                            |            | Do not record the start              |
//! | `-v`       | `--verbose` |                            |            | Log every carrier change             |
//! | `-q`       | `--quiet`   |                            |            | Log errors only                      |
//!
//! Logging goes to stderr and can be tuned further with `RUST_LOG`, which takes precedence over
//! `-v` and `-q`.
//!
//! The application exits with status 0 once all frames have been sent, and 1 if it was terminated
//! (SIGINT, SIGTERM or SIGHUP) or failed. Either way the carrier is off when it exits.
//!
//! # Examples
//!
//! Transmit the default 10 frames through the audio output
//! ```sh
//! wwvbtx
//! ```
//!
//! Transmit for an hour with the Raspberry Pi transmitter board
//! ```sh
//! wwvbtx -n 60 -b gpio -l /home/pi/wwvb/wwvb.log
//! ```
//!
//! Watch the time code without any hardware
//! ```sh
//! wwvbtx -b console --no-log -v
//! ```

use std::io;
use std::process::ExitCode;
use log::{debug, warn};

use args::{Arguments, ArgumentsError};
use error::Error;
use runloop::RunLoop;
use sampler::SystemClock;
use shutdown::Shutdown;

mod args;
mod error;
mod runloop;
mod sampler;
mod scheduler;
mod shutdown;
mod startlog;
mod transmitter;
#[cfg(test)]
mod testing;

/// Set up and run the transmitter.
///
/// Installs the termination handler, opens and initializes the configured transmitter with the
/// carrier off, then transmits `args.count` frames.
///
/// # Errors
///
/// Returns [`Error::Interrupted`] if terminated, or any fatal [`Error`].
fn transmit(args: Arguments) -> Result<(), Error> {
	let shutdown = Shutdown::new();
	shutdown::install(shutdown.clone())?;

	let mut transmitter = transmitter::open(args.backend)?;
	transmitter.initialize()?;
	transmitter.off()?;
	debug!("{:?} transmitter ready", args.backend);

	println!("\nWaiting for the start of the next minute...");
	let mut runloop = RunLoop::new(SystemClock, args.count);
	let result = runloop.run(transmitter.as_mut(), &shutdown);
	debug!("Run loop {}", runloop.state());
	result
}

/// Main program entry point.
///
/// Parses input arguments and transmits the time code. See [`crate`] documentation for details.
fn main() -> ExitCode {
	let args = match Arguments::parse(std::env::args_os().skip(1)) {
		Ok(a) => a,
		Err(e) => {
			return if let ArgumentsError::Help = e {
				println!("\
Transmit the WWVB time code for radio-controlled clocks.

Usage: wwvbtx [OPTIONS]

Options:
  -n, -c, --count <COUNT>    the number of frames to transmit, default 10
  -b, --backend <BACKEND>    the transmitter to use, default audio
  -l, --log <FILE>           the file to record each start in, default wwvb.log
  --no-log                   do not record the start
  -v, --verbose              log every carrier change
  -q, --quiet                log errors only

Supported backends:
  audio    20 kHz tone on the default audio output (60 kHz third harmonic)
  gpio     Raspberry Pi PWM on GPIO18, indicator LED on GPIO14 (alias pi)
  console  no transmitter, only log (alias none)

Examples:
  wwvbtx -n 60
  wwvbtx -b gpio -l /home/pi/wwvb/wwvb.log
  wwvbtx -b console --no-log -v\n");
				ExitCode::SUCCESS
			} else {
				eprintln!("{}", e);
				ExitCode::FAILURE
			}
		}
	};

	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.verbosity.filter()))
		.format_target(false)
		.init();

	if let Some(path) = &args.log {
		let written = time::now()
			.ok_or_else(|| io::Error::other("Failed to get current system time"))
			.and_then(|now| startlog::append(path, now.sec));
		if let Err(e) = written {
			warn!("Failed to record start in {}: {}", path.display(), e);
		}
	}

	match transmit(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(Error::Interrupted) => {
			println!(" - WWVB program terminated");
			ExitCode::FAILURE
		},
		Err(e) => {
			eprintln!("{}", e);
			ExitCode::FAILURE
		}
	}
}
