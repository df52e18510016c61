//! Transmit with Raspberry Pi hardware PWM.
//!
//! Wiring:
//! - GPIO18 (header pin 12, PWM channel 0) drives the base of the antenna board transistor with a
//!   60 kHz square wave. Requires the `pwm` device tree overlay.
//! - GPIO14 (header pin 8) drives an LED that is lit while the carrier is reduced.
//!
//! The carrier level sets the PWM duty cycle as `level / 160`, so [`Level::FULL`] is a 50% square
//! wave and [`Level::OFF`] holds the output low.

use log::debug;
use rppal::gpio::{self, OutputPin};
use rppal::pwm::{Channel, Polarity, Pwm};
use super::{Level, Transmitter, TransmitterError};

/// GPIO pin of the indicator LED.
const LED_PIN: u8 = 14;
/// PWM channel wired to GPIO18.
const TX_CHANNEL: Channel = Channel::Pwm0;
/// Carrier frequency in Hz.
const CARRIER_HZ: f64 = 60000.;

/// PWM duty cycle for a carrier level.
fn duty_cycle(level: Level) -> f64 {
	(level.0 as f64 / Level::MAX.0 as f64).min(1.0)
}

/// Raspberry Pi PWM transmitter.
///
/// Pins are claimed by [`Transmitter::initialize`] and released when this value is dropped.
pub struct Gpio {
	pwm: Option<Pwm>,
	led: Option<OutputPin>
}

impl Gpio {
	pub fn new() -> Gpio {
		Gpio {
			pwm: None,
			led: None
		}
	}
}

impl Transmitter for Gpio {
	/// Claim the LED pin (low) and start the PWM carrier at 0% duty cycle.
	fn initialize(&mut self) -> Result<(), TransmitterError> {
		let led = gpio::Gpio::new()
			.and_then(|g| g.get(LED_PIN))
			.map_err(TransmitterError::device)?
			.into_output_low();
		let pwm = Pwm::with_frequency(TX_CHANNEL, CARRIER_HZ, 0.0, Polarity::Normal, true)
			.map_err(TransmitterError::device)?;

		debug!("PWM carrier at {} Hz, indicator on GPIO{}", CARRIER_HZ, LED_PIN);
		self.led = Some(led);
		self.pwm = Some(pwm);
		Ok(())
	}

	fn set_amplitude(&mut self, level: Level) -> Result<(), TransmitterError> {
		let pwm = self.pwm.as_mut().ok_or(TransmitterError::NotInitialized)?;
		pwm.set_duty_cycle(duty_cycle(level)).map_err(TransmitterError::device)
	}

	fn set_indicator(&mut self, active: bool) -> Result<(), TransmitterError> {
		let led = self.led.as_mut().ok_or(TransmitterError::NotInitialized)?;
		if active { led.set_high() } else { led.set_low() }
		Ok(())
	}
}
