//! Keyer hardware on a Linux host: sysfs paddles and light, optional sidetone

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use keyer_core::{
    EmbeddedHalKeyOutput, EmbeddedHalPaddle, HalError, InputPaddle, KeyerHal, PulseSink,
};
use tracing::{info, warn};

use crate::gpio::{Direction, SysfsPin};
use crate::settings::Settings;

#[cfg(feature = "sidetone")]
pub type Tone = crate::sidetone::CpalSidetone;
#[cfg(not(feature = "sidetone"))]
pub type Tone = keyer_core::NoTone;

pub type PaddlePin = EmbeddedHalPaddle<SysfsPin>;
pub type LightPin = EmbeddedHalKeyOutput<SysfsPin>;
pub type AppSink = PulseSink<LightPin, Tone, StdDelay>;

/// Blocking delay on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

pub struct AppHal {
    dit: PaddlePin,
    dah: PaddlePin,
    sink: AppSink,
}

impl AppHal {
    pub fn open(settings: &Settings) -> Result<Self> {
        let pins = settings.pins;
        let line = |n: u32| pins.gpio_base + n;

        let dit = SysfsPin::open(line(pins.dit), Direction::In)
            .with_context(|| format!("Failed to open dit paddle on GPIO {}", pins.dit))?;
        let dah = SysfsPin::open(line(pins.dah), Direction::In)
            .with_context(|| format!("Failed to open dah paddle on GPIO {}", pins.dah))?;

        let mut light = SysfsPin::open(line(pins.light), Direction::Out)
            .with_context(|| format!("Failed to open light on GPIO {}", pins.light))?;
        if pins.light_active_low {
            light
                .set_high()
                .with_context(|| format!("Failed to darken light on GPIO {}", pins.light))?;
        }

        let tone = open_tone(settings)?;

        info!(
            "Paddles on GPIO {}/{}, light on GPIO {}",
            pins.dit, pins.dah, pins.light
        );

        Ok(Self {
            dit: EmbeddedHalPaddle::new(dit),
            dah: EmbeddedHalPaddle::new(dah),
            sink: PulseSink::new(
                EmbeddedHalKeyOutput::new(light, pins.light_active_low),
                tone,
                StdDelay,
            ),
        })
    }
}

#[cfg(feature = "sidetone")]
fn open_tone(settings: &Settings) -> Result<Tone> {
    crate::sidetone::CpalSidetone::open(settings).context("Failed to open sidetone output")
}

#[cfg(not(feature = "sidetone"))]
fn open_tone(_settings: &Settings) -> Result<Tone> {
    info!("Built without sidetone, light only");
    Ok(keyer_core::NoTone)
}

impl KeyerHal for AppHal {
    type DitPaddle = PaddlePin;
    type DahPaddle = PaddlePin;
    type Sink = AppSink;

    fn initialize(&mut self) -> Result<(), HalError> {
        // A paddle reading pressed at startup usually means a missing pull-up
        if self.dit.is_pressed()? {
            warn!("Dit paddle reads pressed at startup");
        }
        if self.dah.is_pressed()? {
            warn!("Dah paddle reads pressed at startup");
        }
        Ok(())
    }

    fn dit_paddle(&mut self) -> &mut Self::DitPaddle {
        &mut self.dit
    }

    fn dah_paddle(&mut self) -> &mut Self::DahPaddle {
        &mut self.dah
    }

    fn sink(&mut self) -> &mut Self::Sink {
        &mut self.sink
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}
