/// Sound engine: word-clip playback plus short procedural feedback
/// tones via rodio.
///
/// Feedback tones are generated as in-memory WAV buffers at init time;
/// word clips are decoded from the audio directory on demand. Playback
/// is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for the feedback tones.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_correct: Arc<Vec<u8>>,
        sfx_wrong: Arc<Vec<u8>>,
        sfx_pass: Arc<Vec<u8>>,
        sfx_fail: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            let sfx_correct = Arc::new(make_wav(&gen_correct()));
            let sfx_wrong = Arc::new(make_wav(&gen_wrong()));
            let sfx_pass = Arc::new(make_wav(&gen_pass()));
            let sfx_fail = Arc::new(make_wav(&gen_fail()));

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_correct,
                sfx_wrong,
                sfx_pass,
                sfx_fail,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        /// Decode and play an audio clip from disk (memory game).
        /// Unreadable or undecodable clips are silently skipped.
        pub fn play_clip(&self, path: &Path) {
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(_) => return,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_wrong(&self) { self.play(&self.sfx_wrong); }
        pub fn play_pass(&self) { self.play(&self.sfx_pass); }
        pub fn play_fail(&self) { self.play(&self.sfx_fail); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Correct answer: quick ascending two-note chime G5 -> C6.
    fn gen_correct() -> Vec<f32> {
        let mut samples = tone(784.0, 0.07, 0.3);
        samples.extend(tone(1047.0, 0.12, 0.3));
        samples
    }

    /// Wrong answer: low buzz.
    fn gen_wrong() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.18) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                // Square-ish wave for a harsher timbre.
                let wave = (t * 160.0 * 2.0 * std::f32::consts::PI).sin() * 0.6
                    + (t * 160.0 * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.4;
                wave * env * 0.25
            })
            .collect()
    }

    /// Session passed: ascending fanfare C5 -> E5 -> G5 -> C6.
    fn gen_pass() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0];
        let mut samples = Vec::new();
        for &freq in &notes {
            samples.extend(tone(freq, 0.1, 0.3));
        }
        samples.extend(tone(1047.0, 0.2, 0.3));
        samples
    }

    /// Session failed: gentle descending pair.
    fn gen_fail() -> Vec<f32> {
        let mut samples = tone(440.0, 0.12, 0.25);
        samples.extend(tone(330.0, 0.18, 0.25));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_clip(&self, _path: &std::path::Path) {}
    pub fn play_correct(&self) {}
    pub fn play_wrong(&self) {}
    pub fn play_pass(&self) {}
    pub fn play_fail(&self) {}
}
