//! Voice input: normalize a recorded clip and turn it into text.
//!
//! Every outcome other than recognized text is a [`TranscriptionError`]:
//! `Unintelligible` when nothing could be made out, `Failure` for anything
//! else (oversized or overlong clip, undecodable audio, recognizer errors).

mod normalize;
mod recognizer;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::TranscriptionError;

use normalize::normalize;
pub use recognizer::{HttpSpeechRecognizer, SpeechRecognizer};

pub struct VoiceTranscriber {
    recognizer: Arc<dyn SpeechRecognizer>,
    runtime_config: Arc<RuntimeConfig>,
}

impl VoiceTranscriber {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, runtime_config: Arc<RuntimeConfig>) -> Self {
        Self {
            recognizer,
            runtime_config,
        }
    }

    pub async fn transcribe(&self, bytes: &[u8]) -> Result<String, TranscriptionError> {
        let limits = self.runtime_config.dynamic().limits.clone();
        let max_bytes = limits.max_audio_bytes;
        if bytes.len() as u64 > max_bytes {
            return Err(TranscriptionError::Failure(format!(
                "Recording is {} bytes, the limit is {}",
                bytes.len(),
                max_bytes
            )));
        }

        let start = Instant::now();
        let result = self.run(bytes, limits.max_audio_seconds).await;

        let outcome = match &result {
            Ok(_) => "recognized",
            Err(TranscriptionError::Unintelligible) => "unintelligible",
            Err(TranscriptionError::Failure(_)) => "failed",
        };
        metrics::counter!("aura_transcriptions_total", "outcome" => outcome).increment(1);
        info!(
            outcome,
            input_bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Transcription finished"
        );

        result
    }

    async fn run(&self, bytes: &[u8], max_seconds: u64) -> Result<String, TranscriptionError> {
        let audio = normalize(bytes, max_seconds)?;
        if audio.is_silent() {
            return Err(TranscriptionError::Unintelligible);
        }

        debug!(
            samples = audio.sample_count,
            seconds = audio.duration().as_secs_f64(),
            "Audio normalized"
        );

        let text = self.recognizer.recognize(audio.wav).await?;
        if text.trim().is_empty() {
            return Err(TranscriptionError::Unintelligible);
        }
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DynamicConfig, StaticConfig};
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::normalize::TARGET_SAMPLE_RATE;
    use super::normalize::tests::wav_i16;

    struct FixedRecognizer {
        reply: Result<String, TranscriptionError>,
        received: Mutex<Vec<Vec<u8>>>,
    }

    impl FixedRecognizer {
        fn new(reply: Result<String, TranscriptionError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        async fn recognize(&self, wav: Vec<u8>) -> Result<String, TranscriptionError> {
            self.received.lock().unwrap().push(wav);
            self.reply.clone()
        }
    }

    fn transcriber(recognizer: Arc<FixedRecognizer>, max_audio_bytes: u64) -> VoiceTranscriber {
        let mut dynamic = DynamicConfig::default();
        dynamic.limits.max_audio_bytes = max_audio_bytes;
        let runtime = Arc::new(RuntimeConfig::new(StaticConfig::default(), dynamic));
        VoiceTranscriber::new(recognizer, runtime)
    }

    #[test]
    fn test_recognized_text_is_trimmed() {
        let recognizer = FixedRecognizer::new(Ok("  I feel stuck \n".to_string()));
        let voice = transcriber(recognizer.clone(), 1 << 20);

        let text = tokio_test::block_on(voice.transcribe(&wav_i16(2, 44_100, 4_410, 100))).unwrap();
        assert_eq!(text, "I feel stuck");

        let received = recognizer.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let reader = hound::WavReader::new(std::io::Cursor::new(&received[0])).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, TARGET_SAMPLE_RATE);
    }

    #[tokio::test]
    async fn test_blank_recognition_is_unintelligible() {
        let voice = transcriber(FixedRecognizer::new(Ok("   ".to_string())), 1 << 20);
        let err = voice
            .transcribe(&wav_i16(1, 16_000, 1_600, 0))
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Unintelligible);
    }

    #[tokio::test]
    async fn test_empty_clip_skips_recognizer() {
        let recognizer = FixedRecognizer::new(Ok("ghost".to_string()));
        let voice = transcriber(recognizer.clone(), 1 << 20);

        let err = voice
            .transcribe(&wav_i16(1, 16_000, 0, 0))
            .await
            .unwrap_err();
        assert_eq!(err, TranscriptionError::Unintelligible);
        assert!(recognizer.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recognizer_failure_passes_through() {
        let failure = TranscriptionError::Failure("Speech API error 500".to_string());
        let voice = transcriber(FixedRecognizer::new(Err(failure.clone())), 1 << 20);

        let err = voice
            .transcribe(&wav_i16(1, 16_000, 160, 10))
            .await
            .unwrap_err();
        assert_eq!(err, failure);
    }

    #[tokio::test]
    async fn test_oversized_clip_rejected() {
        let recognizer = FixedRecognizer::new(Ok("hello".to_string()));
        let voice = transcriber(recognizer.clone(), 100);

        let err = voice
            .transcribe(&wav_i16(1, 16_000, 1_000, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Failure(msg) if msg.contains("limit is 100")));
        assert!(recognizer.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_sample_rate_header_rejected() {
        let recognizer = FixedRecognizer::new(Ok("hello".to_string()));
        let voice = transcriber(recognizer.clone(), 1 << 20);

        let err = voice
            .transcribe(&wav_i16(1, 1, 2_000, 100))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptionError::Failure(msg) if msg.contains("sample rate")));
        assert!(recognizer.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_is_failure() {
        let voice = transcriber(FixedRecognizer::new(Ok("hello".to_string())), 1 << 20);
        let err = voice.transcribe(b"definitely not audio").await.unwrap_err();
        assert!(matches!(err, TranscriptionError::Failure(_)));
    }
}
