//! Core data types for the iambic keyer

use crate::hal::Duration;

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// Dit (short element)
    Dit,
    /// Dah (long element)
    Dah,
}

impl Element {
    /// Returns the duration of this element in units
    pub const fn duration_units(&self) -> u32 {
        match self {
            Element::Dit => 1,
            Element::Dah => 3,
        }
    }

    /// Returns the opposite element (Dit <-> Dah)
    pub const fn opposite(&self) -> Element {
        match self {
            Element::Dit => Element::Dah,
            Element::Dah => Element::Dit,
        }
    }

    /// Symbol used in the character buffer and the Morse table
    pub const fn symbol(&self) -> char {
        match self {
            Element::Dit => '.',
            Element::Dah => '-',
        }
    }

    pub const fn from_symbol(symbol: char) -> Option<Element> {
        match symbol {
            '.' => Some(Element::Dit),
            '-' => Some(Element::Dah),
            _ => None,
        }
    }
}

/// Keying speed used when none is configured
pub const DEFAULT_WPM: u32 = 15;

/// Keyer timing configuration
///
/// Everything derives from the dit unit: a dah and the letter gap are three
/// units, the settle pause after each cycle is one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyerConfig {
    /// Basic timing unit (Dit duration)
    pub unit: Duration,
}

impl Default for KeyerConfig {
    fn default() -> Self {
        Self {
            unit: Duration::from_millis(1200 / DEFAULT_WPM as u64), // 15 WPM
        }
    }
}

impl KeyerConfig {
    /// Create a new configuration with validation.
    ///
    /// The unit follows PARIS timing, 1200 ms / WPM, so 15 WPM gives an
    /// 80 ms dit. Keyers that take the dit as WPM / 200 seconds get 75 ms at
    /// the same setting, about 6% shorter than this.
    pub fn new(wpm: u32) -> Result<Self, &'static str> {
        if wpm == 0 || wpm > 100 {
            return Err("WPM must be between 1 and 100");
        }

        // Calculate unit time from WPM (PARIS standard: 50 units per word)
        let unit = Duration::from_millis(1200 / wpm as u64);

        Ok(Self { unit })
    }

    /// Get Words Per Minute from current unit timing
    pub fn wpm(&self) -> u32 {
        (1200 / self.unit.as_millis().max(1) as u32).max(1)
    }

    pub fn dit_length(&self) -> Duration {
        self.unit
    }

    pub fn dah_length(&self) -> Duration {
        self.unit * 3
    }

    /// Silence after the last keyed element that completes a letter
    pub fn letter_gap(&self) -> Duration {
        self.dah_length()
    }

    /// Pause applied after every keyer cycle
    pub fn settle_pause(&self) -> Duration {
        self.unit
    }

    pub fn element_duration(&self, element: Element) -> Duration {
        self.unit * element.duration_units()
    }
}
