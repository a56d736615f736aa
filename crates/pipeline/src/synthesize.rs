//! Concurrent per-turn audio synthesis.
//!
//! Turns are processed in sequential batches; within a batch, calls run
//! concurrently under a small semaphore so the provider's rate limits are
//! respected. Results are written into index-addressed slots, so the final
//! audio and transcript follow turn order no matter when calls complete.

use std::{sync::Arc, time::Duration};

use {
    bytes::{Bytes, BytesMut},
    futures::future::join_all,
    tokio::sync::Semaphore,
    tracing::{error, info, warn},
};

use {
    podforge_common::{RetryPolicy, with_retry},
    podforge_voice::{SpeechProvider, TtsError},
};

use crate::{
    dialogue::{DialogueTurn, VoiceMap},
    error::PipelineError,
    result::PipelineResult,
};

/// Turns synthesized per batch.
const DEFAULT_CHUNK_SIZE: usize = 5;

/// Simultaneous in-flight provider calls within a batch.
const DEFAULT_CONCURRENCY: usize = 2;

/// Pause between batches to smooth rate-limit pressure.
const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(500);

/// Upper bound on a single provider call, retries excluded.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Converts an ordered turn sequence into concatenated audio plus a
/// transcript, tolerating individual turn failures.
pub struct AudioSynthesizer {
    provider: Arc<dyn SpeechProvider>,
    voices: VoiceMap,
    chunk_size: usize,
    concurrency: usize,
    retry: RetryPolicy,
    batch_pause: Duration,
    call_timeout: Duration,
}

impl AudioSynthesizer {
    #[must_use]
    pub fn new(provider: Arc<dyn SpeechProvider>, voices: VoiceMap) -> Self {
        Self {
            provider,
            voices,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
            batch_pause: DEFAULT_BATCH_PAUSE,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the batch size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Override the retry policy for individual provider calls.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the pause between batches.
    #[must_use]
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    /// Synthesize all turns into a single result.
    ///
    /// A turn whose call fails past the retry cap is recorded as an
    /// `[ERROR ...]` transcript marker and skipped in the audio; only a
    /// completely empty audio output fails the run.
    pub async fn synthesize(
        &self,
        turns: &[DialogueTurn],
    ) -> Result<PipelineResult, PipelineError> {
        if turns.is_empty() {
            return Err(PipelineError::NoTurns);
        }
        if !self.provider.is_configured() {
            return Err(PipelineError::MissingSpeechCredential);
        }

        info!(
            turns = turns.len(),
            chunk_size = self.chunk_size,
            "synthesizing dialogue audio"
        );

        let mut slots: Vec<Result<Bytes, TtsError>> = Vec::with_capacity(turns.len());
        let batch_count = turns.len().div_ceil(self.chunk_size);

        for (batch_index, batch) in turns.chunks(self.chunk_size).enumerate() {
            let semaphore = Arc::new(Semaphore::new(self.concurrency));

            let calls = batch.iter().map(|turn| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    // The semaphore is never closed; acquire only fails then.
                    let _permit = semaphore.acquire().await;
                    self.synthesize_turn(turn).await
                }
            });

            slots.extend(join_all(calls).await);

            if batch_index + 1 < batch_count {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        self.assemble(turns, slots)
    }

    async fn synthesize_turn(&self, turn: &DialogueTurn) -> Result<Bytes, TtsError> {
        let voice_id = self.voices.voice_id(turn.speaker());
        let text = turn.text();
        let provider = &self.provider;
        let call_timeout = self.call_timeout;
        with_retry(self.retry, "tts.synthesize", || async move {
            match tokio::time::timeout(call_timeout, provider.synthesize(text, voice_id)).await {
                Ok(result) => result,
                Err(_) => Err(TtsError::Timeout),
            }
        })
        .await
    }

    /// Concatenate audio and build the transcript in original turn order.
    fn assemble(
        &self,
        turns: &[DialogueTurn],
        slots: Vec<Result<Bytes, TtsError>>,
    ) -> Result<PipelineResult, PipelineError> {
        let mut audio = BytesMut::new();
        let mut transcript_lines = Vec::with_capacity(turns.len());
        let mut processed = 0usize;

        for (turn, outcome) in turns.iter().zip(slots) {
            match outcome {
                Ok(chunk) => {
                    audio.extend_from_slice(&chunk);
                    transcript_lines.push(turn.transcript_line());
                    processed += 1;
                },
                Err(err) => {
                    error!(
                        speaker = turn.speaker().label(),
                        error = %err,
                        "turn synthesis failed, continuing"
                    );
                    transcript_lines
                        .push(format!("{}: [ERROR {err}]", turn.speaker().label()));
                },
            }
        }

        if audio.is_empty() {
            return Err(PipelineError::SynthesisFailed);
        }
        if processed < turns.len() {
            warn!(
                processed,
                total = turns.len(),
                "some turns failed to synthesize"
            );
        }

        Ok(PipelineResult {
            audio: audio.freeze(),
            transcript: transcript_lines.join("\n\n"),
            total_items: turns.len(),
            processed_items: processed,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {
        super::*,
        crate::dialogue::Speaker,
        async_trait::async_trait,
        std::sync::atomic::{AtomicUsize, Ordering},
    };

    fn turn(speaker: Speaker, text: &str) -> DialogueTurn {
        DialogueTurn::new(speaker, text).unwrap()
    }

    fn voices() -> VoiceMap {
        VoiceMap::new("voice-primary", "voice-secondary")
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    /// In-process provider: returns `<text>` as audio bytes, with optional
    /// per-text failures and delays, and tracks call/concurrency counts.
    struct FakeTts {
        configured: bool,
        fail_on: Option<&'static str>,
        always_rate_limited: bool,
        delay_per_char: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeTts {
        fn ok() -> Self {
            Self {
                configured: true,
                fail_on: None,
                always_rate_limited: false,
                delay_per_char: Duration::ZERO,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn failing_on(text: &'static str) -> Self {
            Self {
                fail_on: Some(text),
                ..Self::ok()
            }
        }

        fn rate_limited() -> Self {
            Self {
                always_rate_limited: true,
                ..Self::ok()
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::ok()
            }
        }

        /// Longer texts finish later, inverting completion order.
        fn staggered() -> Self {
            Self {
                delay_per_char: Duration::from_millis(5),
                ..Self::ok()
            }
        }
    }

    #[async_trait]
    impl SpeechProvider for FakeTts {
        fn id(&self) -> &'static str {
            "fake"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn synthesize(&self, text: &str, _voice_id: &str) -> Result<Bytes, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            tokio::time::sleep(self.delay_per_char * text.len() as u32).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.always_rate_limited {
                return Err(TtsError::RateLimited {
                    message: "try later".into(),
                });
            }
            if self.fail_on == Some(text) {
                return Err(TtsError::InvalidRequest {
                    message: "bad input".into(),
                });
            }
            Ok(Bytes::from(format!("<{text}>")))
        }
    }

    fn synthesizer(provider: FakeTts) -> (Arc<FakeTts>, AudioSynthesizer) {
        let provider = Arc::new(provider);
        let synthesizer = AudioSynthesizer::new(provider.clone(), voices())
            .with_retry_policy(fast_retry())
            .with_batch_pause(Duration::ZERO);
        (provider, synthesizer)
    }

    #[tokio::test]
    async fn test_empty_turns_fail_fast() {
        let (_, synthesizer) = synthesizer(FakeTts::ok());
        let result = synthesizer.synthesize(&[]).await;
        assert!(matches!(result, Err(PipelineError::NoTurns)));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_before_any_call() {
        let (provider, synthesizer) = synthesizer(FakeTts::unconfigured());
        let turns = vec![turn(Speaker::Primary, "hi")];
        let result = synthesizer.synthesize(&turns).await;
        assert!(matches!(
            result,
            Err(PipelineError::MissingSpeechCredential)
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_happy_path_orders_audio_and_transcript() {
        let (_, synthesizer) = synthesizer(FakeTts::ok());
        let turns = vec![
            turn(Speaker::Primary, "one"),
            turn(Speaker::Secondary, "two"),
            turn(Speaker::Primary, "three"),
        ];

        let result = synthesizer.synthesize(&turns).await.unwrap();
        assert_eq!(result.audio.as_ref(), b"<one><two><three>");
        assert_eq!(
            result.transcript,
            "male-1: one\n\nfemale-1: two\n\nmale-1: three"
        );
        assert_eq!(result.total_items, 3);
        assert_eq!(result.processed_items, 3);
        assert!(result.is_complete());
    }

    #[tokio::test]
    async fn test_out_of_order_completion_reassembles_by_index() {
        // Longer text finishes later: "airport" outlives "cab" and "up",
        // so completion order inverts submission order.
        let (_, synthesizer) = synthesizer(FakeTts::staggered());
        let turns = vec![
            turn(Speaker::Primary, "airport"),
            turn(Speaker::Secondary, "cab"),
            turn(Speaker::Primary, "up"),
        ];

        let result = synthesizer.synthesize(&turns).await.unwrap();
        assert_eq!(result.audio.as_ref(), b"<airport><cab><up>");
        assert!(result.transcript.starts_with("male-1: airport"));
    }

    #[tokio::test]
    async fn test_single_failing_turn_degrades_not_aborts() {
        let (_, synthesizer) = synthesizer(FakeTts::failing_on("boom"));
        let turns = vec![
            turn(Speaker::Primary, "intro"),
            turn(Speaker::Secondary, "boom"),
            turn(Speaker::Primary, "outro"),
        ];

        let result = synthesizer.synthesize(&turns).await.unwrap();
        assert_eq!(result.total_items, 3);
        assert_eq!(result.processed_items, 2);
        assert_eq!(result.audio.as_ref(), b"<intro><outro>");
        assert_eq!(result.transcript.matches("[ERROR").count(), 1);
        assert!(result.transcript.contains("female-1: [ERROR"));
        assert!(!result.is_complete());
    }

    #[tokio::test]
    async fn test_rate_limit_retries_to_cap_then_total_failure() {
        let (provider, synthesizer) = synthesizer(FakeTts::rate_limited());
        let turns = vec![turn(Speaker::Primary, "hi")];

        let result = synthesizer.synthesize(&turns).await;
        assert!(matches!(result, Err(PipelineError::SynthesisFailed)));
        // One turn, retried exactly to the attempt cap.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_is_not_retried() {
        let (provider, synthesizer) = synthesizer(FakeTts::failing_on("bad"));
        let turns = vec![turn(Speaker::Primary, "bad"), turn(Speaker::Secondary, "ok")];

        let result = synthesizer.synthesize(&turns).await.unwrap();
        assert_eq!(result.processed_items, 1);
        // "bad" called once (400 is terminal), "ok" called once.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_within_batches() {
        let (provider, synthesizer) = synthesizer(FakeTts::staggered());
        let turns: Vec<DialogueTurn> = (0..7)
            .map(|i| turn(Speaker::Primary, &format!("turn number {i}")))
            .collect();

        let result = synthesizer.synthesize(&turns).await.unwrap();
        assert_eq!(result.processed_items, 7);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 7);
        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
