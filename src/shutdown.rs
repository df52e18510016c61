//! Termination handling.
//!
//! The process signal handler never touches the transmitter. It only sets a flag that every
//! blocking wait in the run loop watches; the main thread then abandons its frame and switches the
//! transmitter off itself. Since that is the last write on the only thread that writes, the
//! transmitter always ends up off no matter where the signal landed.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};
use log::info;

/// Shutdown flag that can be waited on.
///
/// Once requested, shutdown stays requested: all subsequent sleeps return immediately.
///
/// # Examples
/// ```
/// let shutdown = Shutdown::new();
/// let handle = shutdown.clone();
/// thread::spawn(move || handle.request());
///
/// // Returns early (true) once the other thread requests shutdown
/// let interrupted = shutdown.sleep(Duration::from_secs(10));
/// ```
pub struct Shutdown {
	/// Mutex containing the flag. `true` means shutdown was requested.
	mutex: Mutex<bool>,
	/// Condition variable to wake sleepers.
	cond: Condvar
}

impl Shutdown {
	/// Create a new [`Shutdown`] that has not been requested.
	pub fn new() -> Arc<Shutdown> {
		Arc::new(Shutdown {
			mutex: Mutex::new(false),
			cond: Condvar::new()
		})
	}

	/// Request shutdown, waking every sleeping thread.
	pub fn request(&self) {
		let mut flag = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
		*flag = true;
		self.cond.notify_all();
	}

	/// Whether shutdown has been requested.
	pub fn is_requested(&self) -> bool {
		*self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Block for `duration` or until shutdown is requested, whichever comes first.
	///
	/// Returns `true` if shutdown was requested.
	pub fn sleep(&self, duration: Duration) -> bool {
		self.sleep_until(Instant::now() + duration)
	}

	/// Block until `deadline` or until shutdown is requested, whichever comes first.
	///
	/// Returns `true` if shutdown was requested. Spurious wakeups are absorbed, so unless
	/// interrupted this never returns before `deadline`.
	pub fn sleep_until(&self, deadline: Instant) -> bool {
		let flag = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
		let timeout = deadline.saturating_duration_since(Instant::now());
		let (flag, _) = self.cond
			.wait_timeout_while(flag, timeout, |requested| !*requested)
			.unwrap_or_else(PoisonError::into_inner);
		*flag
	}
}

/// Request `shutdown` on SIGINT, SIGTERM or SIGHUP.
///
/// # Errors
///
/// Returns the [`ctrlc::Error`] if a handler could not be installed, e.g. because one already is.
pub fn install(shutdown: Arc<Shutdown>) -> Result<(), ctrlc::Error> {
	ctrlc::set_handler(move || {
		info!("Termination requested");
		shutdown.request();
	})
}
