//! Candidate search engine

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use fancycrack_crypto::{Algorithm, Digester, StandardDigester};
use fancycrack_keyspace::{Keyspace, KeyspaceSize, SourceKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::control::{CancellationToken, Throttle};
use crate::error::CrackError;
use crate::progress::{ProgressSample, SearchState, RECENT_CAPACITY};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackConfig {
    /// Attempts between progress samples in dictionary mode
    pub dictionary_batch: u64,
    /// Attempts between progress samples in brute-force mode
    pub brute_force_batch: u64,
    /// Size of the recent-candidate ring
    pub recent_capacity: usize,
    /// Initial per-attempt delay in milliseconds (clamped to 1000)
    pub delay_ms: u64,
    /// Forward per-candidate attempt events from spawned jobs
    pub forward_attempts: bool,
}

impl Default for CrackConfig {
    fn default() -> Self {
        Self {
            dictionary_batch: 100,
            brute_force_batch: 1000,
            recent_capacity: RECENT_CAPACITY,
            delay_ms: 0,
            forward_attempts: true,
        }
    }
}

impl CrackConfig {
    /// Progress cadence for a source kind, never zero
    pub fn batch_size(&self, kind: SourceKind) -> u64 {
        let batch = match kind {
            SourceKind::Dictionary => self.dictionary_batch,
            SourceKind::BruteForce => self.brute_force_batch,
        };
        batch.max(1)
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackRequest {
    pub algorithm: Algorithm,
    /// Hex digest to recover a preimage for
    pub target: String,
    pub keyspace: Keyspace,
}

impl CrackRequest {
    pub fn new(algorithm: Algorithm, target: impl Into<String>, keyspace: Keyspace) -> Self {
        Self {
            algorithm,
            target: target.into(),
            keyspace,
        }
    }
}

/// Normalized target digest: trimmed, lowercase hex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDigest(String);

impl TargetDigest {
    pub fn new(raw: &str) -> Result<Self, CrackError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(CrackError::MalformedInput("target digest is empty".to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a hex digest
    pub fn matches(&self, digest_hex: &str) -> bool {
        self.0.eq_ignore_ascii_case(digest_hex)
    }
}

/// Terminal result of a run; exactly one per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Found { plaintext: String, tried: u64 },
    Exhausted { tried: u64 },
    Cancelled { tried: u64 },
    Failed { message: String },
}

impl Outcome {
    fn failed(err: CrackError) -> Self {
        Outcome::Failed {
            message: err.to_string(),
        }
    }

    /// Candidates tried, unless the run failed
    pub fn tried(&self) -> Option<u64> {
        match self {
            Outcome::Found { tried, .. }
            | Outcome::Exhausted { tried }
            | Outcome::Cancelled { tried } => Some(*tried),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found { .. })
    }
}

/// Observation delivered to the caller while a run is in progress
#[derive(Debug)]
pub enum SearchEvent<'a> {
    /// Input validated, enumeration about to begin
    Started { kind: SourceKind, total: KeyspaceSize },
    /// One candidate was digested
    Attempt { candidate: &'a str, tried: u64 },
    /// Batch boundary reached
    Progress(&'a ProgressSample),
}

/// Candidate search engine
pub struct CrackEngine {
    digester: Arc<dyn Digester>,
    config: CrackConfig,
    throttle: Throttle,
    active: AtomicBool,
}

impl CrackEngine {
    /// Create an engine backed by the standard digester
    pub fn new(config: CrackConfig) -> Self {
        Self::with_digester(Arc::new(StandardDigester), config)
    }

    /// Create an engine with a custom digest implementation
    pub fn with_digester(digester: Arc<dyn Digester>, config: CrackConfig) -> Self {
        let throttle = Throttle::new(config.delay_ms);
        Self {
            digester,
            config,
            throttle,
            active: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CrackConfig {
        &self.config
    }

    /// Handle to the per-attempt delay, adjustable while a run is active
    pub fn throttle(&self) -> Throttle {
        self.throttle.clone()
    }

    /// Whether a run is in progress
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run without observing events
    pub fn run_silent(&self, request: &CrackRequest, token: &CancellationToken) -> Outcome {
        self.run(request, token, |_| {})
    }

    /// Run the search to completion on the calling thread.
    ///
    /// Never panics and never returns an error: every failure is reported as
    /// [`Outcome::Failed`].
    pub fn run<F>(
        &self,
        request: &CrackRequest,
        token: &CancellationToken,
        mut on_event: F,
    ) -> Outcome
    where
        F: FnMut(SearchEvent<'_>),
    {
        let Some(_guard) = ActiveGuard::acquire(&self.active) else {
            warn!("refusing to start a second search on a busy engine");
            return Outcome::failed(CrackError::Busy);
        };

        match self.search(request, token, &mut on_event) {
            Ok(outcome) => {
                info!(?outcome, "search finished");
                outcome
            }
            Err(err) => {
                error!(%err, "search failed");
                Outcome::failed(err)
            }
        }
    }

    fn search<F>(
        &self,
        request: &CrackRequest,
        token: &CancellationToken,
        on_event: &mut F,
    ) -> Result<Outcome, CrackError>
    where
        F: FnMut(SearchEvent<'_>),
    {
        let target = TargetDigest::new(&request.target)?;
        request.keyspace.validate()?;

        let algorithm = request.algorithm;
        // Surface an unsupported algorithm before any candidate is counted
        self.digest(algorithm, "")?;
        if target.as_str().len() != algorithm.hex_len() {
            warn!(
                expected = algorithm.hex_len(),
                actual = target.as_str().len(),
                "target length does not match {}; it can never match",
                algorithm
            );
        }

        let mut source = request.keyspace.candidates();
        let kind = source.kind();
        let batch = self.config.batch_size(kind);
        let total = request.keyspace.remaining();
        let mut state = SearchState::new(self.config.recent_capacity);

        info!(%algorithm, ?kind, %total, "search started");
        on_event(SearchEvent::Started { kind, total });

        loop {
            if token.is_cancelled() {
                return Ok(Outcome::Cancelled { tried: state.tried });
            }
            let Some(candidate) = source.next() else {
                break;
            };

            let digest = self.digest(algorithm, &candidate)?;
            state.record(&candidate);
            on_event(SearchEvent::Attempt {
                candidate: &candidate,
                tried: state.tried,
            });
            self.throttle.pause(token);

            if target.matches(&digest) {
                return Ok(Outcome::Found {
                    plaintext: candidate.into_owned(),
                    tried: state.tried,
                });
            }

            if state.tried % batch == 0 {
                let sample = state.sample();
                debug!(tried = sample.tried, per_second = sample.per_second, "progress");
                on_event(SearchEvent::Progress(&sample));
                thread::yield_now();
            }
        }

        Ok(Outcome::Exhausted { tried: state.tried })
    }

    /// Digest one candidate, turning digester panics into errors
    fn digest(&self, algorithm: Algorithm, candidate: &str) -> Result<String, CrackError> {
        let digester = &self.digester;
        match panic::catch_unwind(AssertUnwindSafe(|| {
            digester.digest_hex(algorithm, candidate.as_bytes())
        })) {
            Ok(result) => Ok(result?),
            Err(payload) => Err(CrackError::RuntimeFailure(panic_message(payload))),
        }
    }
}

/// Holds the engine's active flag for the duration of one run
struct ActiveGuard<'a>(&'a AtomicBool);

impl<'a> ActiveGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "digester panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fancycrack_crypto::{digest_hex, DigestError};
    use std::time::{Duration, Instant};

    fn words(list: &[&str]) -> Keyspace {
        Keyspace::dictionary(list.iter().map(|s| s.to_string()).collect())
    }

    fn sha256(s: &str) -> String {
        digest_hex(Algorithm::Sha256, s.as_bytes()).unwrap()
    }

    /// Records every event as an owned value
    #[derive(Debug, Default)]
    struct Recorder {
        attempts: Vec<(String, u64)>,
        progress: Vec<ProgressSample>,
        started: usize,
    }

    impl Recorder {
        fn observe(&mut self, event: SearchEvent<'_>) {
            match event {
                SearchEvent::Started { .. } => self.started += 1,
                SearchEvent::Attempt { candidate, tried } => {
                    self.attempts.push((candidate.to_string(), tried))
                }
                SearchEvent::Progress(sample) => self.progress.push(sample.clone()),
            }
        }
    }

    struct PanickingDigester;

    impl Digester for PanickingDigester {
        fn digest_hex(&self, _: Algorithm, _: &[u8]) -> Result<String, DigestError> {
            panic!("hash backend exploded");
        }
    }

    #[test]
    fn test_found_in_odometer_order() {
        let engine = CrackEngine::new(CrackConfig::default());
        let keyspace = Keyspace::brute_force("ab", 1, 2).unwrap();
        let request = CrackRequest::new(Algorithm::Sha256, sha256("ba"), keyspace);

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert_eq!(
            outcome,
            Outcome::Found {
                plaintext: "ba".to_string(),
                tried: 5
            }
        );
        let order: Vec<&str> = recorder.attempts.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "aa", "ab", "ba"]);
    }

    #[test]
    fn test_dictionary_exhausted() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(
            Algorithm::Sha256,
            sha256("not-present"),
            words(&["x", "y", "z"]),
        );

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert_eq!(outcome, Outcome::Exhausted { tried: 3 });
        assert_eq!(
            recorder.attempts,
            vec![
                ("x".to_string(), 1),
                ("y".to_string(), 2),
                ("z".to_string(), 3)
            ]
        );
        assert_eq!(recorder.started, 1);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let engine = CrackEngine::new(CrackConfig::default());
        let target = format!("  {}\n", sha256("y").to_uppercase());
        let request = CrackRequest::new(Algorithm::Sha256, target, words(&["x", "y", "z"]));

        let outcome = engine.run_silent(&request, &CancellationToken::new());
        assert_eq!(
            outcome,
            Outcome::Found {
                plaintext: "y".to_string(),
                tried: 2
            }
        );
    }

    #[test]
    fn test_stops_at_first_match() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(
            Algorithm::Sha1,
            digest_hex(Algorithm::Sha1, b"b").unwrap(),
            words(&["a", "b", "b", "c"]),
        );

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));
        assert_eq!(outcome.tried(), Some(2));
        assert_eq!(recorder.attempts.len(), 2);
    }

    #[test]
    fn test_progress_cadence_dictionary() {
        let engine = CrackEngine::new(CrackConfig::default());
        let list: Vec<String> = (0..250).map(|i| format!("word{}", i)).collect();
        let request = CrackRequest::new(
            Algorithm::Sha256,
            sha256("missing"),
            Keyspace::dictionary(list),
        );

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert_eq!(outcome, Outcome::Exhausted { tried: 250 });
        let at: Vec<u64> = recorder.progress.iter().map(|p| p.tried).collect();
        assert_eq!(at, vec![100, 200]);
        assert_eq!(recorder.attempts.len(), 250);
    }

    #[test]
    fn test_progress_cadence_brute_force() {
        let engine = CrackEngine::new(CrackConfig::default());
        // 10 + 100 + 1000 + 10000 = 11110 candidates
        let keyspace = Keyspace::brute_force("0123456789", 1, 4).unwrap();
        let request = CrackRequest::new(Algorithm::Sha1, "00", keyspace);

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert_eq!(outcome, Outcome::Exhausted { tried: 11110 });
        let at: Vec<u64> = recorder.progress.iter().map(|p| p.tried).collect();
        assert_eq!(at, (1..=11).map(|i| i * 1000).collect::<Vec<u64>>());
    }

    #[test]
    fn test_progress_recent_snapshot() {
        let engine = CrackEngine::new(CrackConfig::default());
        let list: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        let request = CrackRequest::new(
            Algorithm::Sha256,
            sha256("missing"),
            Keyspace::dictionary(list),
        );

        let mut recorder = Recorder::default();
        engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        let sample = &recorder.progress[0];
        assert_eq!(sample.recent.len(), RECENT_CAPACITY);
        assert_eq!(sample.recent.first().map(String::as_str), Some("50"));
        assert_eq!(sample.recent.last().map(String::as_str), Some("99"));
        assert!(sample.per_second.is_finite());
    }

    #[test]
    fn test_events_in_increasing_order() {
        let engine = CrackEngine::new(CrackConfig {
            dictionary_batch: 7,
            ..Default::default()
        });
        let list: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let request = CrackRequest::new(
            Algorithm::Sha256,
            sha256("missing"),
            Keyspace::dictionary(list),
        );

        let mut last = 0;
        engine.run(&request, &CancellationToken::new(), |event| {
            let tried = match event {
                SearchEvent::Attempt { tried, .. } => tried,
                SearchEvent::Progress(sample) => {
                    assert_eq!(sample.tried, last);
                    return;
                }
                SearchEvent::Started { .. } => return,
            };
            assert_eq!(tried, last + 1);
            last = tried;
        });
        assert_eq!(last, 50);
    }

    #[test]
    fn test_cancel_mid_run() {
        let engine = CrackEngine::new(CrackConfig::default());
        let keyspace = Keyspace::brute_force("abcdefghij", 1, 5).unwrap();
        let request = CrackRequest::new(Algorithm::Sha256, sha256("never"), keyspace);
        let token = CancellationToken::new();

        let mut attempts = 0;
        let outcome = engine.run(&request, &token, |event| {
            if let SearchEvent::Attempt { tried, .. } = event {
                attempts += 1;
                if tried == 10 {
                    token.cancel();
                }
            }
        });

        assert_eq!(outcome, Outcome::Cancelled { tried: 10 });
        assert_eq!(attempts, 10);
    }

    #[test]
    fn test_cancel_before_start() {
        let engine = CrackEngine::new(CrackConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        let request = CrackRequest::new(Algorithm::Sha256, sha256("x"), words(&["x"]));
        assert_eq!(engine.run_silent(&request, &token), Outcome::Cancelled { tried: 0 });
    }

    #[test]
    fn test_cancel_interrupts_throttle() {
        let engine = CrackEngine::new(CrackConfig {
            delay_ms: 1000,
            ..Default::default()
        });
        let token = CancellationToken::new();
        let request =
            CrackRequest::new(Algorithm::Sha256, sha256("never"), words(&["a", "b", "c"]));

        let start = Instant::now();
        let outcome = engine.run(&request, &token, |event| {
            if let SearchEvent::Attempt { .. } = event {
                token.cancel();
            }
        });

        assert_eq!(outcome, Outcome::Cancelled { tried: 1 });
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_throttle_applies_to_matching_attempt() {
        let engine = CrackEngine::new(CrackConfig {
            delay_ms: 40,
            ..Default::default()
        });
        let request = CrackRequest::new(Algorithm::Sha256, sha256("a"), words(&["a"]));

        let start = Instant::now();
        let outcome = engine.run_silent(&request, &CancellationToken::new());

        assert!(outcome.is_found());
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_throttle_adjustable_during_run() {
        let engine = CrackEngine::new(CrackConfig {
            delay_ms: 1000,
            ..Default::default()
        });
        let throttle = engine.throttle();
        let request =
            CrackRequest::new(Algorithm::Sha256, sha256("never"), words(&["a", "b", "c"]));

        let start = Instant::now();
        engine.run(&request, &CancellationToken::new(), |event| {
            if let SearchEvent::Started { .. } = event {
                throttle.set_delay_ms(0);
            }
        });
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_md5_fails() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(
            Algorithm::Md5,
            "5f4dcc3b5aa765d61d8327deb882cf99",
            words(&["password"]),
        );

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "Unsupported algorithm: MD5".to_string()
            }
        );
        assert!(recorder.attempts.is_empty());
        assert_eq!(recorder.started, 0);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_digester_panic_becomes_failure() {
        let engine =
            CrackEngine::with_digester(Arc::new(PanickingDigester), CrackConfig::default());
        let request = CrackRequest::new(Algorithm::Sha256, sha256("a"), words(&["a", "b"]));

        let outcome = engine.run_silent(&request, &CancellationToken::new());
        match outcome {
            Outcome::Failed { message } => assert!(message.contains("hash backend exploded")),
            other => panic!("expected failure, got {:?}", other),
        }

        // The engine is usable again afterwards
        let engine_ok = CrackEngine::new(CrackConfig::default());
        assert!(engine_ok.run_silent(&request, &CancellationToken::new()).is_found());
        assert!(!engine.is_active());
    }

    #[test]
    fn test_empty_target_rejected() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(Algorithm::Sha256, "   ", words(&["a"]));

        let mut recorder = Recorder::default();
        let outcome = engine.run(&request, &CancellationToken::new(), |e| recorder.observe(e));

        assert!(matches!(
            outcome,
            Outcome::Failed { ref message } if message.contains("target digest is empty")
        ));
        assert_eq!(recorder.started, 0);
    }

    #[test]
    fn test_empty_dictionary_exhausts_immediately() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(
            Algorithm::Sha256,
            sha256("a"),
            Keyspace::dictionary(Vec::new()),
        );
        assert_eq!(
            engine.run_silent(&request, &CancellationToken::new()),
            Outcome::Exhausted { tried: 0 }
        );
    }

    #[test]
    fn test_wrong_length_target_never_matches() {
        let engine = CrackEngine::new(CrackConfig::default());
        let truncated = sha256("a")[..40].to_string();
        let request = CrackRequest::new(Algorithm::Sha256, truncated, words(&["a", "b"]));
        assert_eq!(
            engine.run_silent(&request, &CancellationToken::new()),
            Outcome::Exhausted { tried: 2 }
        );
    }

    #[test]
    fn test_skip_out_of_range_is_malformed() {
        use fancycrack_keyspace::{BruteForceSpec, Charset};

        let engine = CrackEngine::new(CrackConfig::default());
        let spec = BruteForceSpec::new(Charset::new("ab").unwrap(), 1, 1).with_skip(2);
        let request = CrackRequest::new(Algorithm::Sha256, sha256("a"), Keyspace::BruteForce(spec));

        let outcome = engine.run_silent(&request, &CancellationToken::new());
        assert!(matches!(
            outcome,
            Outcome::Failed { ref message } if message.starts_with("Malformed input")
        ));
    }

    #[test]
    fn test_busy_engine_rejects_second_run() {
        let engine = CrackEngine::new(CrackConfig::default());
        let request = CrackRequest::new(Algorithm::Sha256, sha256("never"), words(&["a", "b"]));

        let mut nested = None;
        engine.run(&request, &CancellationToken::new(), |event| {
            if nested.is_none() {
                if let SearchEvent::Attempt { .. } = event {
                    nested = Some(engine.run_silent(&request, &CancellationToken::new()));
                }
            }
        });

        assert_eq!(
            nested,
            Some(Outcome::Failed {
                message: CrackError::Busy.to_string()
            })
        );
        assert!(!engine.is_active());
    }

    #[test]
    fn test_outcome_json() {
        let outcome = Outcome::Found {
            plaintext: "ba".to_string(),
            tried: 5,
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"status":"found","plaintext":"ba","tried":5}"#);
        assert_eq!(Outcome::Failed { message: "x".into() }.tried(), None);
    }

    #[test]
    fn test_request_from_json() {
        let request: CrackRequest = serde_json::from_str(
            r#"{
                "algorithm": "Sha256",
                "target": "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8",
                "keyspace": {"mode": "dictionary", "words": ["letmein", "password"]}
            }"#,
        )
        .unwrap();
        let engine = CrackEngine::new(CrackConfig::default());
        assert_eq!(
            engine.run_silent(&request, &CancellationToken::new()),
            Outcome::Found {
                plaintext: "password".to_string(),
                tried: 2
            }
        );
    }
}
