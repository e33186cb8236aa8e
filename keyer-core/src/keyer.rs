//! Keyer loop: poll paddles, sequence elements, render and report letters

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::hal::{Clock, HalError, InputPaddle, KeyerHal, OutputSink};
use crate::sequencer::{Dequeued, ElementSequencer};
use crate::types::KeyerConfig;

/// Operator-visible text channel. Emission is fire-and-forget.
pub trait OperatorOutput {
    /// Raw dots and dashes of a completed letter
    fn symbols(&mut self, symbols: &str);

    /// Character decoded from a completed letter
    fn letter(&mut self, letter: char);
}

/// Single-threaded keyer owning the sequencer and all I/O
pub struct Keyer<H, C, D, O> {
    hal: H,
    clock: C,
    delay: D,
    operator: O,
    sequencer: ElementSequencer,
    config: KeyerConfig,
}

impl<H, C, D, O> Keyer<H, C, D, O>
where
    H: KeyerHal,
    C: Clock,
    D: DelayNs,
    O: OperatorOutput,
{
    /// Initialize the hardware and build the keyer.
    ///
    /// Fails if the paddles or the output cannot be brought up.
    pub fn new(config: KeyerConfig, mut hal: H, clock: C, delay: D, operator: O) -> Result<Self, HalError> {
        hal.initialize()?;

        #[cfg(feature = "defmt")]
        defmt::info!("Keyer ready at {} WPM", config.wpm());

        let sequencer = ElementSequencer::new(&config, clock.now());
        Ok(Self {
            hal,
            clock,
            delay,
            operator,
            sequencer,
            config,
        })
    }

    /// Run one poll/enqueue/dequeue/render cycle
    pub fn step(&mut self) -> Result<Dequeued, HalError> {
        let dit = self.hal.dit_paddle().is_pressed().map_err(Into::<HalError>::into)?;
        let dah = self.hal.dah_paddle().is_pressed().map_err(Into::<HalError>::into)?;

        self.sequencer.enqueue_from_paddles(dit, dah, self.clock.now());
        let out = self.sequencer.dequeue(self.clock.now());

        if let Some(element) = out.element {
            let duration = self.config.element_duration(element);
            self.hal.sink().play(element, duration).map_err(Into::<HalError>::into)?;
        }

        if let Some(symbols) = out.completed.as_deref().filter(|s| !s.is_empty()) {
            self.operator.symbols(symbols);
        }
        if let Some(letter) = out.decoded {
            self.operator.letter(letter);
        }

        self.delay.delay_us(self.config.settle_pause().as_micros() as u32);
        Ok(out)
    }

    /// Cycle forever; only returns when an I/O error ends the loop
    pub fn run(&mut self) -> Result<Infallible, HalError> {
        loop {
            self.step()?;
        }
    }

    pub fn sequencer(&self) -> &ElementSequencer {
        &self.sequencer
    }

    pub fn config(&self) -> &KeyerConfig {
        &self.config
    }

    /// Shut the hardware down and hand it back
    pub fn into_hal(mut self) -> Result<H, HalError> {
        self.hal.shutdown()?;
        Ok(self.hal)
    }
}
