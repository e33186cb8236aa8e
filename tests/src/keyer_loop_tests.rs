//! Keyer loop timing and reporting, driven on a virtual clock

use keyer_core::hal::mock::*;
use keyer_core::test_utils::output_capture::to_morse_string;
use keyer_core::test_utils::paddle_script::{drive, PaddleStep};
use keyer_core::{Clock, Duration, Element, HalError, Keyer, KeyerConfig};

struct Rig {
    clock: MockClock,
    dit: MockPaddle,
    dah: MockPaddle,
    operator: MockOperator,
}

impl Rig {
    fn new() -> Self {
        Self {
            clock: MockClock::new(),
            dit: MockPaddle::new(),
            dah: MockPaddle::new(),
            operator: MockOperator::new(),
        }
    }
}

#[test]
fn test_element_and_settle_durations() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::new(20).unwrap(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    drive(&mut keyer, &rig.dit, &rig.dah, &[PaddleStep::dah(1)]).unwrap();
    // 180 ms dah plus 60 ms settle
    assert_eq!(rig.clock.now().as_millis(), 240);

    drive(&mut keyer, &rig.dit, &rig.dah, &[PaddleStep::idle(1)]).unwrap();
    // Idle cycles only settle
    assert_eq!(rig.clock.now().as_millis(), 300);

    assert_eq!(
        sink.played().as_slice(),
        &[(Element::Dah, Duration::from_millis(180))]
    );
}

#[test]
fn test_dah_letter_completes_on_first_idle_cycle() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    drive(&mut keyer, &rig.dit, &rig.dah, &[PaddleStep::dah(1)]).unwrap();
    assert!(rig.operator.letters().is_empty());

    let out = keyer.step().unwrap();
    assert!(out.has_letter());
    assert_eq!(out.decoded, Some('T'));
    assert_eq!(rig.operator.letters().as_str(), "T");
}

#[test]
fn test_letter_reported_once_through_long_idle() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    let steps = [PaddleStep::dit(1), PaddleStep::dah(1), PaddleStep::idle(50)];
    let cycles = drive(&mut keyer, &rig.dit, &rig.dah, &steps).unwrap();

    assert_eq!(cycles, 52);
    assert_eq!(rig.operator.letters().as_str(), "A");
    assert_eq!(rig.operator.symbol_groups().len(), 1);
    assert_eq!(keyer.sequencer().symbols(), "");
}

#[test]
fn test_squeeze_iambic_sequence() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    // Dah first, then squeeze: -.-. is C
    let steps = [PaddleStep::dah(1), PaddleStep::squeeze(3), PaddleStep::idle(3)];
    drive(&mut keyer, &rig.dit, &rig.dah, &steps).unwrap();

    assert_eq!(to_morse_string(&sink.elements()).as_str(), "-.-.");
    assert_eq!(rig.operator.letters().as_str(), "C");
}

#[test]
fn test_pause_within_letter_does_not_split_it() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    // Dit leaves 2 units behind it; one idle cycle brings silence to 3 units,
    // which is not past the letter gap
    let steps = [PaddleStep::dit(1), PaddleStep::idle(1), PaddleStep::dit(1), PaddleStep::idle(3)];
    drive(&mut keyer, &rig.dit, &rig.dah, &steps).unwrap();

    assert_eq!(rig.operator.letters().as_str(), "I");
}

#[test]
fn test_speed_change_scales_timing() {
    for wpm in [5, 15, 30] {
        let rig = Rig::new();
        let sink = MockSink::new(&rig.clock);
        let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
        let config = KeyerConfig::new(wpm).unwrap();
        let mut keyer = Keyer::new(config, hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

        drive(&mut keyer, &rig.dit, &rig.dah, &[PaddleStep::dit(1)]).unwrap();

        let unit_ms = 1200 / wpm as u64;
        assert_eq!(keyer.config().dit_length().as_millis(), unit_ms);
        assert_eq!(rig.clock.now().as_millis(), 2 * unit_ms);
    }
}

#[test]
fn test_paddle_failure_mid_word_stops_keyer() {
    let rig = Rig::new();
    let sink = MockSink::new(&rig.clock);
    let hal = MockKeyerHal::new(&rig.dit, &rig.dah, &sink);
    let mut keyer = Keyer::new(KeyerConfig::default(), hal, &rig.clock, &rig.clock, &rig.operator).unwrap();

    drive(&mut keyer, &rig.dit, &rig.dah, &[PaddleStep::dit(2)]).unwrap();
    rig.dit.set_failing(true);

    assert_eq!(keyer.step().unwrap_err(), HalError::GpioError);
    assert_eq!(sink.elements().len(), 2);
}
