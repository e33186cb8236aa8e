//! Host-based integration tests for the keyer core

#[cfg(test)]
mod squeeze_tests;
#[cfg(test)]
mod decode_tests;
#[cfg(test)]
mod keyer_loop_tests;
