//! Squeeze resolution and queue behaviour under arbitrary paddle input

use keyer_core::{resolve_squeeze, Element, ElementSequencer, Instant, KeyerConfig, QUEUE_CAPACITY, SYMBOL_CAPACITY};
use proptest::prelude::*;

fn paddle_states() -> impl Strategy<Value = Vec<(bool, bool)>> {
    prop::collection::vec((any::<bool>(), any::<bool>()), 0..200)
}

proptest! {
    /// The queue grows by at most one per poll, shrinks by exactly one per
    /// element dequeued, and never passes its capacity
    #[test]
    fn queue_length_moves_one_step_at_a_time(ops in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..200)) {
        let config = KeyerConfig::default();
        let mut seq = ElementSequencer::new(&config, Instant::from_millis(0));

        for (i, (dit, dah, drain)) in ops.iter().enumerate() {
            let now = Instant::from_millis(i as u64);

            let before = seq.pending_len();
            let appended = seq.enqueue_from_paddles(*dit, *dah, now);
            let after = seq.pending_len();
            prop_assert!(after == before || after == before + 1);
            prop_assert_eq!(after - before, usize::from(appended.is_some()));
            prop_assert!(after <= QUEUE_CAPACITY);

            if *drain {
                let out = seq.dequeue(now);
                if after > 0 {
                    prop_assert!(out.element.is_some());
                    prop_assert_eq!(seq.pending_len(), after - 1);
                } else {
                    prop_assert_eq!(out.element, None);
                    prop_assert_eq!(seq.pending_len(), 0);
                }
            }
        }
    }

    /// Draining after every poll plays exactly what the squeeze rule picks
    #[test]
    fn drained_output_follows_rule(polls in paddle_states()) {
        let config = KeyerConfig::default();
        let mut seq = ElementSequencer::new(&config, Instant::from_millis(0));
        let mut last = None;

        for (i, (dit, dah)) in polls.iter().enumerate() {
            let now = Instant::from_millis(i as u64 * 10);
            let expected = if seq.symbols_full() {
                None
            } else {
                resolve_squeeze(*dit, *dah, last)
            };

            seq.enqueue_from_paddles(*dit, *dah, now);
            let out = seq.dequeue(now);

            prop_assert_eq!(out.element, expected);
            if out.element.is_some() {
                last = out.element;
            }
            prop_assert_eq!(seq.last_played(), last);
            prop_assert_eq!(seq.pending_len(), 0);
        }
    }

    /// A held squeeze strictly alternates once something has been played
    #[test]
    fn held_squeeze_alternates(first_is_dit in any::<bool>(), held in 1usize..SYMBOL_CAPACITY) {
        let config = KeyerConfig::default();
        let mut seq = ElementSequencer::new(&config, Instant::from_millis(0));
        let first = if first_is_dit { Element::Dit } else { Element::Dah };

        seq.enqueue_from_paddles(first_is_dit, !first_is_dit, Instant::from_millis(0));
        seq.dequeue(Instant::from_millis(0));

        let mut previous = first;
        for i in 0..held {
            let now = Instant::from_millis(i as u64);
            seq.enqueue_from_paddles(true, true, now);
            let element = seq.dequeue(now).element;
            prop_assert_eq!(element, Some(previous.opposite()));
            previous = previous.opposite();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squeeze_with_no_history_is_ignored() {
        let mut seq = ElementSequencer::new(&KeyerConfig::default(), Instant::from_millis(0));

        for t in 0..10 {
            seq.enqueue_from_paddles(true, true, Instant::from_millis(t));
        }

        assert_eq!(seq.pending_len(), 0);
        assert_eq!(seq.symbols(), "");
        assert_eq!(seq.last_played(), None);
    }

    #[test]
    fn test_enqueue_without_dequeue_keeps_fifo_order() {
        let mut seq = ElementSequencer::new(&KeyerConfig::default(), Instant::from_millis(0));
        let now = Instant::from_millis(0);

        seq.enqueue_from_paddles(false, true, now);
        seq.enqueue_from_paddles(true, false, now);
        seq.enqueue_from_paddles(false, true, now);

        // last_played only moves on dequeue, so the squeeze sees no history
        seq.enqueue_from_paddles(true, true, now);
        assert_eq!(seq.pending_len(), 3);

        assert_eq!(seq.dequeue(now).element, Some(Element::Dah));
        assert_eq!(seq.dequeue(now).element, Some(Element::Dit));
        assert_eq!(seq.dequeue(now).element, Some(Element::Dah));
        assert_eq!(seq.dequeue(now).element, None);
        assert_eq!(seq.symbols(), "-.-");
    }
}
