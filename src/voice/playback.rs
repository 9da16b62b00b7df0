//! Speaker playback

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};

use crate::{Error, Result};

/// Decoded mono audio
#[derive(Debug, Clone, Default)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Plays mono audio on the default output device, blocking until done
pub struct AudioPlayback {
    device: Device,
}

impl AudioPlayback {
    /// Open the default output device
    ///
    /// # Errors
    ///
    /// Returns error if there is no output device
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        tracing::debug!(device = device.name().unwrap_or_default(), "playback device opened");
        Ok(Self { device })
    }

    /// Decode MP3 bytes and play them
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        let audio = decode_mp3(mp3_data)?;
        self.play(&audio.samples, audio.sample_rate)
    }

    /// Play mono samples at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns error if no output config supports the rate or the stream fails
    pub fn play(&self, samples: &[f32], sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let config = self.output_config(sample_rate)?;
        let channels = usize::from(config.channels.max(1));

        let data: Arc<[f32]> = samples.into();
        let position = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stream = {
            let data = Arc::clone(&data);
            let position = Arc::clone(&position);
            let finished = Arc::clone(&finished);

            self.device
                .build_output_stream(
                    &config,
                    move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for frame in out.chunks_mut(channels) {
                            let pos = position.load(Ordering::Relaxed);
                            let sample = data.get(pos).copied().unwrap_or_else(|| {
                                finished.store(true, Ordering::Relaxed);
                                0.0
                            });
                            frame.fill(sample);
                            if pos < data.len() {
                                position.store(pos + 1, Ordering::Relaxed);
                            }
                        }
                    },
                    |err| {
                        tracing::error!(error = %err, "playback stream error");
                    },
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?
        };

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        // Poll with a deadline in case the device stops calling back
        let duration_ms = (data.len() as u64 * 1000) / u64::from(sample_rate.max(1));
        let deadline = Instant::now() + Duration::from_millis(duration_ms + 500);

        while !finished.load(Ordering::Relaxed) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }

        // Let the device drain its last buffer
        std::thread::sleep(Duration::from_millis(100));
        drop(stream);

        tracing::debug!(samples = data.len(), sample_rate, "playback complete");
        Ok(())
    }

    fn output_config(&self, sample_rate: u32) -> Result<StreamConfig> {
        let rate = SampleRate(sample_rate);
        let ranges: Vec<_> = self
            .device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .collect();

        // Mono first, stereo with the sample duplicated otherwise
        ranges
            .iter()
            .find(|c| supports(c, 1, rate))
            .or_else(|| ranges.iter().find(|c| supports(c, 2, rate)))
            .map(|c| c.clone().with_sample_rate(rate).config())
            .ok_or_else(|| Error::Audio(format!("no output config for {sample_rate} Hz")))
    }
}

fn supports(range: &SupportedStreamConfigRange, channels: u16, rate: SampleRate) -> bool {
    range.channels() == channels
        && range.sample_format() == SampleFormat::F32
        && range.min_sample_rate() <= rate
        && range.max_sample_rate() >= rate
}

/// Decode MP3 bytes to mono `f32` samples
///
/// # Errors
///
/// Returns error if the data is not valid MP3
pub fn decode_mp3(mp3_data: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut audio = DecodedAudio::default();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if audio.sample_rate == 0 {
                    audio.sample_rate = u32::try_from(frame.sample_rate)
                        .map_err(|_| Error::Audio("invalid MP3 sample rate".to_string()))?;
                }

                if frame.channels == 2 {
                    audio.samples.extend(frame.data.chunks(2).map(|pair| {
                        let left = f32::from(pair[0]) / 32768.0;
                        let right = f32::from(pair.get(1).copied().unwrap_or(pair[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    audio
                        .samples
                        .extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            // ID3 tags and junk between frames
            Err(minimp3::Error::SkippedData) => {}
            Err(minimp3::Error::Eof | minimp3::Error::InsufficientData) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e:?}"))),
        }
    }

    if audio.samples.is_empty() {
        return Err(Error::Audio("MP3 contained no audio frames".to_string()));
    }

    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_mp3(b"definitely not an mp3").is_err());
        assert!(decode_mp3(&[]).is_err());
    }
}
