//! Test utilities for keyer core functionality

pub mod paddle_script {
    //! Paddle input scripting for driving a keyer cycle by cycle

    use crate::hal::mock::MockPaddle;
    use crate::hal::{Clock, HalError, KeyerHal};
    use crate::keyer::{Keyer, OperatorOutput};
    use crate::morse;
    use crate::types::Element;
    use embedded_hal::delay::DelayNs;
    use heapless::Vec;

    /// Idle cycles that always complete a letter: a dit leaves two units of
    /// silence behind it and each idle cycle adds one more.
    pub const LETTER_GAP_CYCLES: u32 = 3;

    /// Paddle state held for a number of keyer cycles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PaddleStep {
        pub dit: bool,
        pub dah: bool,
        pub cycles: u32,
    }

    impl PaddleStep {
        pub const fn dit(cycles: u32) -> Self {
            Self { dit: true, dah: false, cycles }
        }

        pub const fn dah(cycles: u32) -> Self {
            Self { dit: false, dah: true, cycles }
        }

        pub const fn squeeze(cycles: u32) -> Self {
            Self { dit: true, dah: true, cycles }
        }

        pub const fn idle(cycles: u32) -> Self {
            Self { dit: false, dah: false, cycles }
        }

        pub const fn element(element: Element) -> Self {
            match element {
                Element::Dit => Self::dit(1),
                Element::Dah => Self::dah(1),
            }
        }
    }

    /// Steps keying `text` one paddle press per element, with a letter gap
    /// after each character. Characters missing from the table are skipped.
    pub fn keying_steps(text: &str) -> Vec<PaddleStep, 128> {
        let mut steps = Vec::new();
        for ch in text.chars() {
            let Some(pattern) = morse::encode(ch) else {
                continue;
            };
            for element in pattern.chars().filter_map(Element::from_symbol) {
                steps.push(PaddleStep::element(element)).ok();
            }
            steps.push(PaddleStep::idle(LETTER_GAP_CYCLES)).ok();
        }
        steps
    }

    /// Apply each step to the mock paddles and cycle the keyer.
    /// Returns the number of cycles run.
    pub fn drive<H, C, D, O>(
        keyer: &mut Keyer<H, C, D, O>,
        dit: &MockPaddle,
        dah: &MockPaddle,
        steps: &[PaddleStep],
    ) -> Result<u32, HalError>
    where
        H: KeyerHal,
        C: Clock,
        D: DelayNs,
        O: OperatorOutput,
    {
        let mut cycles = 0;
        for step in steps {
            dit.set_pressed(step.dit);
            dah.set_pressed(step.dah);
            for _ in 0..step.cycles {
                keyer.step()?;
                cycles += 1;
            }
        }
        dit.set_pressed(false);
        dah.set_pressed(false);
        Ok(cycles)
    }
}

pub mod output_capture {
    //! Helpers for inspecting rendered output

    use crate::types::Element;
    use heapless::String;

    /// Convert a played element sequence to dots and dashes
    pub fn to_morse_string(elements: &[Element]) -> String<64> {
        let mut result = String::new();
        for element in elements {
            result.push(element.symbol()).ok();
        }
        result
    }
}
