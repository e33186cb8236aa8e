//! Hardware Abstraction Layer for keyer implementation

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::{Duration, Instant};

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Mock instant type for compilation without embassy-time (microsecond ticks)
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Instant(u64);

    impl Instant {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1_000)
        }

        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub fn duration_since(&self, earlier: Instant) -> Duration {
            Duration(self.0.saturating_sub(earlier.0))
        }

        pub fn checked_duration_since(&self, earlier: Instant) -> Option<Duration> {
            self.0.checked_sub(earlier.0).map(Duration)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1_000
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Add<Duration> for Instant {
        type Output = Instant;

        fn add(self, rhs: Duration) -> Instant {
            Instant(self.0 + rhs.0)
        }
    }

    /// Mock duration type (microsecond ticks)
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1_000)
        }

        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1_000
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }

    impl core::ops::Add for Duration {
        type Output = Duration;

        fn add(self, rhs: Duration) -> Duration {
            Duration(self.0 + rhs.0)
        }
    }

    impl core::ops::Mul<u32> for Duration {
        type Output = Duration;

        fn mul(self, rhs: u32) -> Duration {
            Duration(self.0 * rhs as u64)
        }
    }
}

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use crate::types::Element;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Tone output could not be started or stopped
    ToneError,
    /// Hardware not initialized
    NotInitialized,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::ToneError => write!(f, "Tone output failed"),
            HalError::NotInitialized => write!(f, "Hardware not initialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Monotonic time source used for letter-gap measurement
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy-time")]
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "embassy-time")]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Trait for paddle input handling
///
/// Readings are active-high: `true` means the paddle is engaged. Debounce
/// and pull-up handling belong to the implementation.
pub trait InputPaddle {
    type Error: Into<HalError>;

    /// Check if paddle is currently pressed
    fn is_pressed(&mut self) -> Result<bool, Self::Error>;
}

/// Trait for the visual indicator (light) output
pub trait OutputKey {
    type Error: Into<HalError>;

    /// Set output state (true = lit, false = dark)
    fn set_state(&mut self, state: bool) -> Result<(), Self::Error>;

    /// Get current output state
    fn get_state(&self) -> Result<bool, Self::Error>;
}

/// Trait for the audible tone output
pub trait ToneOutput {
    type Error: Into<HalError>;

    /// Start sounding the sidetone
    fn start_tone(&mut self) -> Result<(), Self::Error>;

    /// Silence the sidetone
    fn stop_tone(&mut self) -> Result<(), Self::Error>;
}

/// Renders one element for exactly `duration`, then returns
pub trait OutputSink {
    type Error: Into<HalError>;

    fn play(&mut self, element: Element, duration: Duration) -> Result<(), Self::Error>;
}

/// Complete keyer HAL interface
pub trait KeyerHal {
    type DitPaddle: InputPaddle;
    type DahPaddle: InputPaddle;
    type Sink: OutputSink;

    /// Initialize hardware
    fn initialize(&mut self) -> Result<(), HalError>;

    /// Access to Dit paddle
    fn dit_paddle(&mut self) -> &mut Self::DitPaddle;

    /// Access to Dah paddle
    fn dah_paddle(&mut self) -> &mut Self::DahPaddle;

    /// Access to element output
    fn sink(&mut self) -> &mut Self::Sink;

    /// Shutdown hardware
    fn shutdown(&mut self) -> Result<(), HalError>;
}

/// Generic implementation for embedded-hal compatible pins
///
/// The pin is pulled up and grounded by the paddle, so a low level reads
/// as pressed.
pub struct EmbeddedHalPaddle<P> {
    pin: P,
}

impl<P> EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> InputPaddle for EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    type Error = HalError;

    fn is_pressed(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalKeyOutput<P> {
    pin: P,
    inverted: bool,
    state: bool,
}

impl<P> EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted, state: false }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> OutputKey for EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
        let output_state = if self.inverted { !state } else { state };
        if output_state {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.state = state;
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        Ok(self.state)
    }
}

/// Silent tone output for light-only builds
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTone;

impl ToneOutput for NoTone {
    type Error = HalError;

    fn start_tone(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Output sink that pulses a light and a sidetone together
///
/// `play` blocks on `delay` for the element duration.
pub struct PulseSink<K, T, D> {
    light: K,
    tone: T,
    delay: D,
}

impl<K, T, D> PulseSink<K, T, D>
where
    K: OutputKey,
    T: ToneOutput,
    D: DelayNs,
{
    pub fn new(light: K, tone: T, delay: D) -> Self {
        Self { light, tone, delay }
    }

    pub fn light(&self) -> &K {
        &self.light
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn into_parts(self) -> (K, T, D) {
        (self.light, self.tone, self.delay)
    }
}

impl<K, T, D> OutputSink for PulseSink<K, T, D>
where
    K: OutputKey,
    T: ToneOutput,
    D: DelayNs,
{
    type Error = HalError;

    fn play(&mut self, element: Element, duration: Duration) -> Result<(), Self::Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("Pulse {} for {} us", element, duration.as_micros());
        #[cfg(not(feature = "defmt"))]
        let _ = element;

        self.light.set_state(true).map_err(Into::<HalError>::into)?;
        if let Err(e) = self.tone.start_tone() {
            // Leave the light dark when the tone never started
            self.light.set_state(false).ok();
            return Err(e.into());
        }

        self.delay.delay_us(duration.as_micros() as u32);

        let tone_result = self.tone.stop_tone().map_err(Into::<HalError>::into);
        self.light.set_state(false).map_err(Into::<HalError>::into)?;
        tone_result
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use crate::keyer::OperatorOutput;
    use crate::sequencer::SymbolBuffer;
    use core::cell::{Cell, RefCell};
    use heapless::{String, Vec};

    /// Virtual clock; delaying on it advances time instead of sleeping
    #[derive(Default)]
    pub struct MockClock {
        now_us: Cell<u64>,
    }

    impl MockClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn at_millis(ms: u64) -> Self {
            Self { now_us: Cell::new(ms * 1_000) }
        }

        pub fn advance(&self, duration: Duration) {
            self.now_us.set(self.now_us.get() + duration.as_micros());
        }

        pub fn advance_millis(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            Instant::from_micros(self.now_us.get())
        }
    }

    impl DelayNs for &MockClock {
        fn delay_ns(&mut self, ns: u32) {
            self.now_us.set(self.now_us.get() + (ns as u64).div_ceil(1_000));
        }

        fn delay_us(&mut self, us: u32) {
            self.now_us.set(self.now_us.get() + us as u64);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.now_us.set(self.now_us.get() + ms as u64 * 1_000);
        }
    }

    #[derive(Default)]
    pub struct MockPaddle {
        pressed: Cell<bool>,
        failing: Cell<bool>,
    }

    impl MockPaddle {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_pressed(&self, pressed: bool) {
            self.pressed.set(pressed);
        }

        /// Make subsequent reads fail with `HalError::GpioError`
        pub fn set_failing(&self, failing: bool) {
            self.failing.set(failing);
        }
    }

    impl InputPaddle for &MockPaddle {
        type Error = HalError;

        fn is_pressed(&mut self) -> Result<bool, Self::Error> {
            if self.failing.get() {
                return Err(HalError::GpioError);
            }
            Ok(self.pressed.get())
        }
    }

    #[derive(Default)]
    pub struct MockKeyOutput {
        state: Cell<bool>,
        pulses: Cell<u32>,
    }

    impl MockKeyOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_active(&self) -> bool {
            self.state.get()
        }

        /// Number of off-to-on transitions seen
        pub fn pulses(&self) -> u32 {
            self.pulses.get()
        }
    }

    impl OutputKey for &MockKeyOutput {
        type Error = HalError;

        fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
            if state && !self.state.get() {
                self.pulses.set(self.pulses.get() + 1);
            }
            self.state.set(state);
            Ok(())
        }

        fn get_state(&self) -> Result<bool, Self::Error> {
            Ok(self.state.get())
        }
    }

    #[derive(Default)]
    pub struct MockTone {
        sounding: Cell<bool>,
        failing: Cell<bool>,
    }

    impl MockTone {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_sounding(&self) -> bool {
            self.sounding.get()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.set(failing);
        }
    }

    impl ToneOutput for &MockTone {
        type Error = HalError;

        fn start_tone(&mut self) -> Result<(), Self::Error> {
            if self.failing.get() {
                return Err(HalError::ToneError);
            }
            self.sounding.set(true);
            Ok(())
        }

        fn stop_tone(&mut self) -> Result<(), Self::Error> {
            self.sounding.set(false);
            Ok(())
        }
    }

    /// Records played elements and advances the clock by their duration
    pub struct MockSink<'a> {
        clock: &'a MockClock,
        played: RefCell<Vec<(Element, Duration), 64>>,
    }

    impl<'a> MockSink<'a> {
        pub fn new(clock: &'a MockClock) -> Self {
            Self { clock, played: RefCell::new(Vec::new()) }
        }

        pub fn played(&self) -> Vec<(Element, Duration), 64> {
            self.played.borrow().clone()
        }

        pub fn elements(&self) -> Vec<Element, 64> {
            self.played.borrow().iter().map(|(element, _)| *element).collect()
        }

        pub fn clear(&self) {
            self.played.borrow_mut().clear();
        }
    }

    impl OutputSink for &MockSink<'_> {
        type Error = HalError;

        fn play(&mut self, element: Element, duration: Duration) -> Result<(), Self::Error> {
            self.played.borrow_mut().push((element, duration)).ok();
            self.clock.advance(duration);
            Ok(())
        }
    }

    /// Records everything emitted on the operator channel
    #[derive(Default)]
    pub struct MockOperator {
        groups: RefCell<Vec<SymbolBuffer, 32>>,
        letters: RefCell<String<64>>,
    }

    impl MockOperator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn symbol_groups(&self) -> Vec<SymbolBuffer, 32> {
            self.groups.borrow().clone()
        }

        pub fn letters(&self) -> String<64> {
            self.letters.borrow().clone()
        }
    }

    impl OperatorOutput for &MockOperator {
        fn symbols(&mut self, symbols: &str) {
            let mut group = SymbolBuffer::new();
            group.push_str(symbols).ok();
            self.groups.borrow_mut().push(group).ok();
        }

        fn letter(&mut self, letter: char) {
            self.letters.borrow_mut().push(letter).ok();
        }
    }

    /// Mock hardware collection
    pub struct MockKeyerHal<'a> {
        dit: &'a MockPaddle,
        dah: &'a MockPaddle,
        sink: &'a MockSink<'a>,
        initialized: bool,
        fail_init: bool,
    }

    impl<'a> MockKeyerHal<'a> {
        pub fn new(dit: &'a MockPaddle, dah: &'a MockPaddle, sink: &'a MockSink<'a>) -> Self {
            Self { dit, dah, sink, initialized: false, fail_init: false }
        }

        /// HAL whose `initialize` reports the device as missing
        pub fn unavailable(dit: &'a MockPaddle, dah: &'a MockPaddle, sink: &'a MockSink<'a>) -> Self {
            Self { fail_init: true, ..Self::new(dit, dah, sink) }
        }

        pub fn is_initialized(&self) -> bool {
            self.initialized
        }
    }

    impl<'a> KeyerHal for MockKeyerHal<'a> {
        type DitPaddle = &'a MockPaddle;
        type DahPaddle = &'a MockPaddle;
        type Sink = &'a MockSink<'a>;

        fn initialize(&mut self) -> Result<(), HalError> {
            if self.fail_init {
                return Err(HalError::NotInitialized);
            }
            self.initialized = true;
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
            self.initialized = false;
            Ok(())
        }
    }
}
