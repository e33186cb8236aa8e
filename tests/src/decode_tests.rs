//! Letter decoding: table lookups and letters keyed end to end

use keyer_core::hal::mock::*;
use keyer_core::morse::{self, MORSE_TABLE};
use keyer_core::test_utils::paddle_script::{drive, keying_steps, PaddleStep, LETTER_GAP_CYCLES};
use keyer_core::{Element, Keyer, KeyerConfig};
use rstest::rstest;

#[rstest]
#[case(".-", 'A')]
#[case("-...", 'B')]
#[case("...", 'S')]
#[case("---", 'O')]
#[case("--..", 'Z')]
#[case("-----", '0')]
#[case(".----", '1')]
#[case("----.", '9')]
fn decodes_table_entries(#[case] symbols: &str, #[case] expected: char) {
    assert_eq!(morse::decode(symbols), Some(expected));
}

#[rstest]
#[case("")]
#[case("..--..")]
#[case("........")]
#[case(".-.-.-")]
#[case("x")]
fn rejects_unknown_sequences(#[case] symbols: &str) {
    assert_eq!(morse::decode(symbols), None);
}

#[test]
fn table_has_unique_patterns() {
    assert_eq!(MORSE_TABLE.len(), 36);
    for (i, (pattern, ch)) in MORSE_TABLE.iter().enumerate() {
        for (other_pattern, other_ch) in &MORSE_TABLE[i + 1..] {
            assert_ne!(pattern, other_pattern);
            assert_ne!(ch, other_ch);
        }
    }
}

#[rstest]
#[case(15)]
#[case(30)]
fn every_table_entry_keys_back_to_its_character(#[case] wpm: u32) {
    for (pattern, ch) in MORSE_TABLE {
        let clock = MockClock::new();
        let dit = MockPaddle::new();
        let dah = MockPaddle::new();
        let sink = MockSink::new(&clock);
        let operator = MockOperator::new();
        let hal = MockKeyerHal::new(&dit, &dah, &sink);
        let mut keyer = Keyer::new(KeyerConfig::new(wpm).unwrap(), hal, &clock, &clock, &operator).unwrap();

        // One paddle press per element, then a letter gap
        let mut steps: Vec<PaddleStep> = pattern
            .chars()
            .map(|symbol| PaddleStep::element(Element::from_symbol(symbol).unwrap()))
            .collect();
        steps.push(PaddleStep::idle(LETTER_GAP_CYCLES));
        drive(&mut keyer, &dit, &dah, &steps).unwrap();

        assert_eq!(operator.letters().as_str(), ch.to_string(), "keying {}", pattern);
        assert_eq!(operator.symbol_groups().len(), 1);
        assert_eq!(operator.symbol_groups()[0].as_str(), *pattern);
        assert_eq!(keying_steps(&ch.to_string()).as_slice(), steps.as_slice());
    }
}

#[rstest]
#[case("sos", "SOS")]
#[case("paris", "PARIS")]
#[case("73", "73")]
#[case("k1abc", "K1ABC")]
fn keyed_text_decodes(#[case] text: &str, #[case] expected: &str) {
    let clock = MockClock::new();
    let dit = MockPaddle::new();
    let dah = MockPaddle::new();
    let sink = MockSink::new(&clock);
    let operator = MockOperator::new();
    let hal = MockKeyerHal::new(&dit, &dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::new(20).unwrap(), hal, &clock, &clock, &operator).unwrap();

    drive(&mut keyer, &dit, &dah, &keying_steps(text)).unwrap();

    assert_eq!(operator.letters().as_str(), expected);
    assert_eq!(operator.symbol_groups().len(), expected.len());
}

#[test]
fn unknown_letter_reports_symbols_only() {
    let clock = MockClock::new();
    let dit = MockPaddle::new();
    let dah = MockPaddle::new();
    let sink = MockSink::new(&clock);
    let operator = MockOperator::new();
    let hal = MockKeyerHal::new(&dit, &dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &clock, &clock, &operator).unwrap();

    let steps = [
        PaddleStep::dit(2),
        PaddleStep::dah(2),
        PaddleStep::dit(2),
        PaddleStep::idle(LETTER_GAP_CYCLES),
    ];
    drive(&mut keyer, &dit, &dah, &steps).unwrap();

    assert_eq!(operator.symbol_groups().len(), 1);
    assert_eq!(operator.symbol_groups()[0].as_str(), "..--..");
    assert!(operator.letters().is_empty());
}
