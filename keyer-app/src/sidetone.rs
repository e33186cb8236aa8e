//! Sidetone output on the sound card via cpal

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use keyer_core::{HalError, ToneOutput};
use tracing::{error, info, warn};

use crate::settings::Settings;
use crate::tone::SidetoneGenerator;

/// Keeps an output stream running; `start_tone`/`stop_tone` only flip a flag
/// the audio callback reads
pub struct CpalSidetone {
    key_down: Arc<AtomicBool>,
    _stream: Stream,
}

impl CpalSidetone {
    pub fn open(settings: &Settings) -> Result<Self> {
        let host = cpal::default_host();
        let device = match &settings.output_device {
            Some(name) => host
                .output_devices()
                .context("Failed to enumerate output devices")?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("Output device '{}' not found", name))?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No default output device"))?,
        };

        let (config, format) = pick_config(&device, settings)?;
        info!(
            "Sidetone on '{}': {} Hz, {} ch, {:?}",
            device.name().unwrap_or_default(),
            config.sample_rate.0,
            config.channels,
            format
        );

        let generator = SidetoneGenerator::new(
            settings.sidetone_frequency,
            settings.sidetone_volume,
            config.sample_rate.0 as f32,
        );
        let key_down = Arc::new(AtomicBool::new(false));

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, generator, Arc::clone(&key_down)),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, generator, Arc::clone(&key_down)),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, generator, Arc::clone(&key_down)),
            SampleFormat::U8 => build_stream::<u8>(&device, &config, generator, Arc::clone(&key_down)),
            other => return Err(anyhow!("Unsupported output sample format {:?}", other)),
        }?;
        stream.play().context("Failed to start output stream")?;

        Ok(Self { key_down, _stream: stream })
    }
}

/// Prefer a config at the requested rate and depth, else the device default
fn pick_config(device: &Device, settings: &Settings) -> Result<(StreamConfig, SampleFormat)> {
    let wanted_format = match settings.bit_depth {
        8 => SampleFormat::U8,
        32 => SampleFormat::F32,
        _ => SampleFormat::I16,
    };
    let rate = cpal::SampleRate(settings.sample_rate);

    if let Ok(mut ranges) = device.supported_output_configs() {
        if let Some(range) = ranges.find(|r| {
            r.sample_format() == wanted_format && r.min_sample_rate() <= rate && rate <= r.max_sample_rate()
        }) {
            let config = range.with_sample_rate(rate);
            return Ok((config.config(), config.sample_format()));
        }
    }

    warn!(
        "{} Hz at {} bits not supported, using device default",
        settings.sample_rate, settings.bit_depth
    );
    let config = device
        .default_output_config()
        .context("Failed to get default output config")?;
    Ok((config.config(), config.sample_format()))
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut generator: SidetoneGenerator,
    key_down: Arc<AtomicBool>,
) -> Result<Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                generator.fill(&mut scratch, channels, key_down.load(Ordering::Relaxed));
                for (out, sample) in data.iter_mut().zip(&scratch) {
                    *out = T::from_sample(*sample);
                }
            },
            |err| error!("Output stream error: {}", err),
            None,
        )
        .context("Failed to build output stream")
}

impl ToneOutput for CpalSidetone {
    type Error = HalError;

    fn start_tone(&mut self) -> Result<(), Self::Error> {
        self.key_down.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), Self::Error> {
        self.key_down.store(false, Ordering::Relaxed);
        Ok(())
    }
}
