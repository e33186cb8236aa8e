use std::f32::consts::PI;

/// Rise and fall time of the keying envelope, in seconds
const RAMP_SECONDS: f32 = 0.005;

/// Right channel level relative to the left
const RIGHT_CHANNEL_GAIN: f32 = 0.5;

/// Sine sidetone with a linear attack/decay envelope to avoid key clicks
#[derive(Debug, Clone)]
pub struct SidetoneGenerator {
    phase: f32,
    phase_increment: f32,
    volume: f32,
    envelope: f32,
    ramp_step: f32,
}

impl SidetoneGenerator {
    pub fn new(frequency: f32, volume: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: 2.0 * PI * frequency / sample_rate,
            volume: volume.clamp(0.0, 1.0),
            envelope: 0.0,
            ramp_step: 1.0 / (RAMP_SECONDS * sample_rate),
        }
    }

    /// Generate the next mono sample
    pub fn next_sample(&mut self, key_down: bool) -> f32 {
        if key_down {
            self.envelope = (self.envelope + self.ramp_step).min(1.0);
        } else {
            self.envelope = (self.envelope - self.ramp_step).max(0.0);
        }

        let sample = self.phase.sin() * self.envelope * self.volume;

        self.phase += self.phase_increment;
        if self.phase >= 2.0 * PI {
            self.phase -= 2.0 * PI;
        }

        sample
    }

    /// Generate the next stereo frame as `[left, right]`
    pub fn next_frame(&mut self, key_down: bool) -> [f32; 2] {
        let sample = self.next_sample(key_down);
        [sample, sample * RIGHT_CHANNEL_GAIN]
    }

    /// Fill an interleaved buffer of `channels` channels. Mono buffers get
    /// the left channel; channels past the second repeat the right.
    pub fn fill(&mut self, data: &mut [f32], channels: usize, key_down: bool) {
        for frame in data.chunks_mut(channels.max(1)) {
            let [left, right] = self.next_frame(key_down);
            for (i, out) in frame.iter_mut().enumerate() {
                *out = if i == 0 { left } else { right };
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        self.envelope == 0.0
    }
}
