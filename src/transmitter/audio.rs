//! Transmit through the default audio output device.
//!
//! Audio hardware leaks stray RF as a side effect of its operation, which is enough to reach a
//! radio-controlled clock placed right next to it. A 60 kHz carrier cannot be sampled at common
//! audio rates, so this backend plays a 20 kHz tone instead and relies on its third harmonic.
//!
//! The carrier gain is shared with the audio callback through an atomic and picked up at the start
//! of each buffer, so level changes land within one buffer (~21ms at 48 kHz).

use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, trace};
use super::{Level, Transmitter, TransmitterError};

/// Output sample rate in Hz.
const SAMPLE_RATE: u64 = 48000;
/// Tone frequency in Hz; its third harmonic is the 60 kHz carrier.
const TONE_HZ: f32 = 60000. / 3.;

/// Audio output gain for a carrier level, relative to [`Level::FULL`] and capped at `1.0`.
fn gain(level: Level) -> f32 {
	(level.0 as f32 / Level::FULL.0 as f32).min(1.0)
}

/// Write one buffer of tone at `gain`, continuing from sample index `i`.
fn fill(gain: f32, i: &mut u64, data: &mut [f32]) {
	for sample in data.iter_mut() {
		// Whole number of tone cycles per second, so wrapping at SAMPLE_RATE keeps phase
		let pos = (*i % SAMPLE_RATE) as f32 / SAMPLE_RATE as f32;
		*sample = gain * (PI * 2. * TONE_HZ * pos).sin();
		*i += 1;
	}
}

/// Make the audio callback, reading its gain from `shared`.
fn make_writer(shared: Arc<AtomicU32>) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) {
	let mut i: u64 = 0;
	move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
		fill(f32::from_bits(shared.load(Ordering::Relaxed)), &mut i, data);
	}
}

/// Error handler for audio streaming.
fn audio_error(e: cpal::StreamError) {
	error!("Error occurred on the audio stream: {}", e);
}

/// Audio output transmitter.
///
/// The output stream is opened by [`Transmitter::initialize`] and closed when this value is
/// dropped. The indicator has no audio equivalent, its changes are only logged.
pub struct Audio {
	/// Gain as `f32` bits, shared with the audio callback.
	gain: Arc<AtomicU32>,
	/// The playing output stream, once initialized.
	stream: Option<cpal::Stream>,
	indicator: bool
}

impl Audio {
	/// Create an audio transmitter. No device is opened until [`Transmitter::initialize`].
	pub fn new() -> Audio {
		Audio {
			gain: Arc::new(AtomicU32::new(0f32.to_bits())),
			stream: None,
			indicator: false
		}
	}
}

impl Transmitter for Audio {
	/// Open the default output device at 48 kHz mono with 1024 sample buffers and start playing
	/// silence.
	fn initialize(&mut self) -> Result<(), TransmitterError> {
		let host = cpal::default_host();
		let device = host.default_output_device()
			.ok_or_else(|| TransmitterError::device("Failed to get default audio output device"))?;
		let config = cpal::StreamConfig {
			channels: 1,
			sample_rate: cpal::SampleRate(SAMPLE_RATE as u32),
			buffer_size: cpal::BufferSize::Fixed(1024),
		};

		self.gain.store(0f32.to_bits(), Ordering::Relaxed);
		let stream = device.build_output_stream(
						&config,
						make_writer(self.gain.clone()),
						audio_error,
						None)
			.map_err(TransmitterError::device)?;
		stream.play().map_err(TransmitterError::device)?;

		if let Ok(name) = device.name() {
			debug!("Audio output: {}", name);
		}
		self.stream = Some(stream);
		Ok(())
	}

	fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError> {
		if self.stream.is_none() {
			return Err(TransmitterError::NotInitialized);
		}
		self.gain.store(gain(level).to_bits(), Ordering::Relaxed);
		Ok(())
	}

	fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError> {
		if self.stream.is_none() {
			return Err(TransmitterError::NotInitialized);
		}
		if active != self.indicator {
			trace!("indicator {}", if active { "on" } else { "off" });
			self.indicator = active;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn peak(data: &[f32]) -> f32 {
		data.iter().fold(0., |m, v| m.max(v.abs()))
	}

	#[test]
	fn gain_test() {
		assert_eq!(gain(Level::OFF), 0.);
		assert_eq!(gain(Level::REDUCED), 0.025);
		assert_eq!(gain(Level::FULL), 1.);
		assert_eq!(gain(Level::MAX), 1.);
	}

	#[test]
	fn fill_test() {
		let mut i = 0;
		let mut buf = [1f32; 1024];
		fill(0., &mut i, &mut buf);
		assert_eq!(i, 1024);
		assert!(buf.iter().all(|&v| v == 0.));

		fill(1., &mut i, &mut buf);
		assert_eq!(i, 2048);
		assert!(peak(&buf) <= 1.);
		assert!(peak(&buf) > 0.9);

		fill(gain(Level::REDUCED), &mut i, &mut buf);
		assert!(peak(&buf) <= 0.025 + f32::EPSILON);
		assert!(peak(&buf) > 0.02);

		// Phase carries across buffers and across the one second wrap
		let mut i = SAMPLE_RATE - 1;
		let mut buf = [0f32; 2];
		fill(1., &mut i, &mut buf);
		assert!(buf[1].abs() < 1e-6);
	}

	#[test]
	fn uninitialized_test() {
		let mut a = Audio::new();
		assert_eq!(a.set_amplitude(Level::FULL), Err(TransmitterError::NotInitialized));
		assert_eq!(a.set_indicator(true), Err(TransmitterError::NotInitialized));
		assert_eq!(f32::from_bits(a.gain.load(Ordering::Relaxed)), 0.);
		assert!(!a.indicator);
	}
}
