//! Element sequencer: squeeze resolution, pending queue and letter decode

use heapless::{Deque, String};

use crate::hal::{Duration, Instant};
use crate::morse;
use crate::types::{Element, KeyerConfig};

/// Pending queue capacity. The keyer drains after every enqueue, so in
/// practice the queue never holds more than one element.
pub const QUEUE_CAPACITY: usize = 4;

/// Character buffer capacity, well above the longest table entry. A full
/// buffer refuses further elements until the letter gap clears it.
pub const SYMBOL_CAPACITY: usize = 32;

/// Dots and dashes of one letter
pub type SymbolBuffer = String<SYMBOL_CAPACITY>;

/// Result of one `dequeue` call
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Dequeued {
    /// Element ready to play, if the queue was not empty
    pub element: Option<Element>,
    /// Symbols of a completed letter; present (possibly empty) whenever the
    /// letter gap had elapsed
    pub completed: Option<SymbolBuffer>,
    /// Character decoded from `completed`, if it is in the table
    pub decoded: Option<char>,
}

impl Dequeued {
    /// True when a letter boundary carried at least one symbol
    pub fn has_letter(&self) -> bool {
        self.completed.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Pick the element for one poll of the paddles.
///
/// A squeeze alternates against the last played element and produces
/// nothing until something has been played.
pub const fn resolve_squeeze(
    dit_pressed: bool,
    dah_pressed: bool,
    last_played: Option<Element>,
) -> Option<Element> {
    match (dit_pressed, dah_pressed) {
        (true, true) => match last_played {
            Some(last) => Some(last.opposite()),
            None => None,
        },
        (true, false) => Some(Element::Dit),
        (false, true) => Some(Element::Dah),
        (false, false) => None,
    }
}

/// Owns every piece of mutable keying state
#[derive(Debug)]
pub struct ElementSequencer {
    pending: Deque<Element, QUEUE_CAPACITY>,
    last_played: Option<Element>,
    symbols: SymbolBuffer,
    last_activity: Instant,
    letter_gap: Duration,
}

impl ElementSequencer {
    /// Create a sequencer; `now` seeds the last-activity timestamp
    pub fn new(config: &KeyerConfig, now: Instant) -> Self {
        Self {
            pending: Deque::new(),
            last_played: None,
            symbols: SymbolBuffer::new(),
            last_activity: now,
            letter_gap: config.letter_gap(),
        }
    }

    /// Apply the squeeze rule, appending at most one element.
    ///
    /// Returns the element appended. Nothing is appended while the queue or
    /// the symbol buffer is full, so every queued element has its symbol in
    /// the buffer and refreshes the last-activity time.
    pub fn enqueue_from_paddles(&mut self, dit_pressed: bool, dah_pressed: bool, now: Instant) -> Option<Element> {
        let element = resolve_squeeze(dit_pressed, dah_pressed, self.last_played)?;

        if self.symbols.len() >= SYMBOL_CAPACITY {
            #[cfg(feature = "defmt")]
            defmt::warn!("Symbol buffer full, dropping {}", element);
            return None;
        }

        if self.pending.push_back(element).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Pending queue full, dropping {}", element);
            return None;
        }

        // Cannot fail, capacity checked above
        self.symbols.push(element.symbol()).ok();
        self.last_activity = now;
        Some(element)
    }

    /// True once the in-progress letter can take no more symbols
    pub fn symbols_full(&self) -> bool {
        self.symbols.len() >= SYMBOL_CAPACITY
    }

    /// Pop the next element and evaluate the letter gap.
    ///
    /// The gap is checked even when the queue is empty. A cleared buffer is
    /// reported as an empty symbol string, never decoded again.
    pub fn dequeue(&mut self, now: Instant) -> Dequeued {
        let element = self.pending.pop_front();
        if element.is_some() {
            self.last_played = element;
        }

        let silence = now
            .checked_duration_since(self.last_activity)
            .unwrap_or(Duration::from_millis(0));

        if silence > self.letter_gap {
            let completed = core::mem::take(&mut self.symbols);
            let decoded = morse::decode(completed.as_str());

            #[cfg(feature = "defmt")]
            if !completed.is_empty() {
                defmt::debug!("Letter {} -> {}", completed.as_str(), decoded);
            }

            Dequeued { element, completed: Some(completed), decoded }
        } else {
            Dequeued { element, completed: None, decoded: None }
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn last_played(&self) -> Option<Element> {
        self.last_played
    }

    /// Symbols enqueued since the last letter boundary
    pub fn symbols(&self) -> &str {
        self.symbols.as_str()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }
}
