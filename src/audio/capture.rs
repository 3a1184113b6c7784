//! Live audio capture using CPAL.
//!
//! Both conversation channels use the same source type: the local channel
//! captures from a microphone, the remote channel from a loopback/monitor
//! device (e.g. a PipeWire/PulseAudio "Monitor of ..." source) selected by
//! name through configuration.

use crate::audio::source::AudioSource;
use crate::audio::wav::resample;
use crate::error::{Result, WingmanError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses ALSA/JACK/PipeWire messages that CPAL triggers when probing
/// audio backends.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
/// Safe as long as no other thread concurrently manipulates fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Quiet down JACK/ALSA/PipeWire probing noise.
///
/// # Safety
/// Modifies environment variables; call at startup before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: called at startup before any threads exist
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Device names preferred when no explicit device is configured.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns that are never useful for voice capture.
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "HDMI",
    "S/PDIF",
];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// Whether a device looks like a loopback/monitor capture of an output.
pub fn is_monitor_device(name: &str) -> bool {
    name.to_lowercase().contains("monitor")
}

/// List usable capture devices, preferred ones marked `[recommended]` and
/// monitor (loopback) sources marked `[monitor]`.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| WingmanError::AudioCapture {
        message: format!("Failed to enumerate input devices: {e}"),
    })?;

    let mut names = Vec::new();
    for device in devices {
        let Ok(name) = device.name() else { continue };
        if should_filter_device(&name) {
            continue;
        }
        if is_monitor_device(&name) {
            names.push(format!("{name} [monitor]"));
        } else if is_preferred_device(&name) {
            names.push(format!("{name} [recommended]"));
        } else {
            names.push(name);
        }
    }

    Ok(names)
}

/// Find a capture device: by exact name when given, otherwise a preferred
/// server device, otherwise the system default.
fn find_device(device_name: Option<&str>) -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Some(name) = device_name {
            let devices = host
                .input_devices()
                .map_err(|e| WingmanError::AudioCapture {
                    message: format!("Failed to enumerate devices: {e}"),
                })?;
            for device in devices {
                if device.name().is_ok_and(|n| n == name) {
                    return Ok(device);
                }
            }
            return Err(WingmanError::AudioDeviceNotFound {
                device: name.to_string(),
            });
        }

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if device.name().is_ok_and(|n| is_preferred_device(&n)) {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| WingmanError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched while holding the surrounding Mutex,
/// so access is serialized even though cpal::Stream itself is !Send.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live capture source producing 16-bit mono samples at the target rate.
///
/// Tries a mono/target-rate config in i16 then f32; if the device refuses,
/// captures at its native config and downmixes/resamples in software.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Open a capture source.
    ///
    /// # Arguments
    /// * `device_name` - exact device name, or None for the best default
    /// * `sample_rate` - target rate the pipeline runs at
    pub fn new(device_name: Option<&str>, sample_rate: u32) -> Result<Self> {
        let device = find_device(device_name)?;
        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("wingman: audio stream error: {err}");
        };

        // Mono i16 at the target rate: servers convert transparently.
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // Same config, f32 samples.
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(crate::audio::codec::f32_to_i16(data));
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Capture at the device's native config, converting in software.
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let native = self
            .device
            .default_input_config()
            .map_err(|e| WingmanError::AudioCapture {
                message: format!("Failed to query default input config: {e}"),
            })?;

        let native_rate = native.sample_rate().0;
        let native_channels = native.channels() as usize;
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = native.clone().into();

        let err_callback = |err| {
            eprintln!("wingman: audio stream error: {err}");
        };

        let buffer = Arc::clone(&self.buffer);
        match native.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let converted =
                            convert_to_mono(data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| WingmanError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {e}"),
                }),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let as_i16 = crate::audio::codec::f32_to_i16(data);
                        let converted =
                            convert_to_mono(&as_i16, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| WingmanError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {e}"),
                }),
            fmt => Err(WingmanError::AudioCapture {
                message: format!("Unsupported native sample format: {fmt:?}"),
            }),
        }
    }
}

/// Mix multi-channel audio to mono and resample to the target rate.
fn convert_to_mono(samples: &[i16], channels: usize, source_rate: u32, target_rate: u32) -> Vec<i16> {
    let mono: Vec<i16> = if channels <= 1 {
        samples.to_vec()
    } else {
        samples
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    };

    if source_rate == target_rate {
        mono
    } else {
        resample(&mono, source_rate, target_rate)
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        let mut guard = self.stream.lock().map_err(|e| WingmanError::AudioCapture {
            message: format!("Failed to lock stream: {e}"),
        })?;
        if guard.is_some() {
            return Ok(()); // already started
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| WingmanError::AudioCapture {
            message: format!("Failed to start audio stream: {e}"),
        })?;
        *guard = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut guard = self.stream.lock().map_err(|e| WingmanError::AudioCapture {
            message: format!("Failed to lock stream: {e}"),
        })?;
        if let Some(stream) = guard.take() {
            stream.0.pause().map_err(|e| WingmanError::AudioCapture {
                message: format!("Failed to stop audio stream: {e}"),
            })?;
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buffer = self.buffer.lock().map_err(|e| WingmanError::AudioCapture {
            message: format!("Failed to lock audio buffer: {e}"),
        })?;
        Ok(std::mem::take(&mut *buffer))
    }

    fn is_finite(&self) -> bool {
        false
    }
}
