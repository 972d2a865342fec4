//! Process-wide enhancement engine.
//!
//! The engine owns the single model session for the process. Initialization
//! happens lazily on the first call and at most once per process (a timed-out
//! init leaves the slot empty, so a later job may try again). The same async
//! mutex that guards the slot also serializes enhancement calls: the backend
//! is not documented reentrant, so concurrent jobs queue here.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use clearcast_common::error::{ClearcastError, ClearcastResult};

use crate::backend::{EnhancementBackend, EnhancementSession};

type SharedSession = Arc<StdMutex<Box<dyn EnhancementSession>>>;

/// Independent bounds for the two expensive phases.
#[derive(Debug, Clone, Copy)]
pub struct EngineTimeouts {
    pub init: Duration,
    pub enhance: Duration,
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            init: Duration::from_secs(60),
            enhance: Duration::from_secs(300),
        }
    }
}

/// Shared, lazily-initialized enhancement model.
pub struct EnhancementEngine {
    backend: Arc<dyn EnhancementBackend>,
    session: tokio::sync::Mutex<Option<SharedSession>>,
    timeouts: EngineTimeouts,
}

impl EnhancementEngine {
    pub fn new(backend: Arc<dyn EnhancementBackend>, timeouts: EngineTimeouts) -> Self {
        Self {
            backend,
            session: tokio::sync::Mutex::new(None),
            timeouts,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Enhance a waveform through the shared model.
    ///
    /// Either returns a fully enhanced buffer or an error; a timeout never
    /// leaves partial state visible to the caller. On timeout the blocking
    /// worker runs to completion in the background and its result is
    /// discarded.
    pub async fn enhance(&self, samples: Vec<f32>) -> ClearcastResult<Vec<f32>> {
        // Held across both phases: serializes jobs on the shared model.
        let mut slot = self.session.lock().await;

        let session = match slot.as_ref() {
            Some(existing) => Arc::clone(existing),
            None => {
                let initialized = self.init_session().await?;
                *slot = Some(Arc::clone(&initialized));
                initialized
            }
        };

        let work = tokio::task::spawn_blocking(move || {
            let mut guard = session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.enhance(&samples)
        });

        match tokio::time::timeout(self.timeouts.enhance, work).await {
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeouts.enhance.as_secs(),
                    "Enhancement call timed out; discarding worker result"
                );
                Err(ClearcastError::timeout("enhancement"))
            }
            Ok(Err(join_err)) => Err(ClearcastError::Other(anyhow::anyhow!(
                "Enhancement worker failed: {join_err}"
            ))),
            Ok(Ok(result)) => result,
        }
    }

    async fn init_session(&self) -> ClearcastResult<SharedSession> {
        tracing::info!(backend = self.backend.name(), "Initializing enhancement model");
        let backend = Arc::clone(&self.backend);
        let init = tokio::task::spawn_blocking(move || backend.init());

        match tokio::time::timeout(self.timeouts.init, init).await {
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeouts.init.as_secs(),
                    "Model initialization timed out; discarding worker result"
                );
                Err(ClearcastError::timeout("model initialization"))
            }
            Ok(Err(join_err)) => Err(ClearcastError::model_init(format!(
                "Initialization worker failed: {join_err}"
            ))),
            Ok(Ok(Err(err))) => match err {
                wrapped @ ClearcastError::ModelInit { .. } => Err(wrapped),
                other => Err(ClearcastError::model_init(other.to_string())),
            },
            Ok(Ok(Ok(session))) => {
                tracing::info!(backend = self.backend.name(), "Enhancement model ready");
                Ok(Arc::new(StdMutex::new(session)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        inits: Arc<AtomicUsize>,
        init_delay: Duration,
        enhance_delay: Duration,
        fail_init: bool,
    }

    impl CountingBackend {
        fn instant(inits: Arc<AtomicUsize>) -> Self {
            Self {
                inits,
                init_delay: Duration::ZERO,
                enhance_delay: Duration::ZERO,
                fail_init: false,
            }
        }
    }

    #[derive(Debug)]
    struct DelaySession {
        delay: Duration,
    }

    impl EnhancementSession for DelaySession {
        fn sample_rate(&self) -> u32 {
            48_000
        }

        fn enhance(&mut self, samples: &[f32]) -> ClearcastResult<Vec<f32>> {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            Ok(samples.to_vec())
        }
    }

    impl EnhancementBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn init(&self) -> ClearcastResult<Box<dyn EnhancementSession>> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if !self.init_delay.is_zero() {
                std::thread::sleep(self.init_delay);
            }
            if self.fail_init {
                return Err(ClearcastError::model_init("backend dependency missing"));
            }
            Ok(Box::new(DelaySession {
                delay: self.enhance_delay,
            }))
        }
    }

    fn timeouts_ms(init: u64, enhance: u64) -> EngineTimeouts {
        EngineTimeouts {
            init: Duration::from_millis(init),
            enhance: Duration::from_millis(enhance),
        }
    }

    #[tokio::test]
    async fn model_initializes_exactly_once_across_jobs() {
        let inits = Arc::new(AtomicUsize::new(0));
        let engine = EnhancementEngine::new(
            Arc::new(CountingBackend::instant(Arc::clone(&inits))),
            timeouts_ms(1000, 1000),
        );

        for _ in 0..3 {
            let out = engine.enhance(vec![0.25, -0.25]).await.unwrap();
            assert_eq!(out, vec![0.25, -0.25]);
        }
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_init_is_a_timeout_not_a_model_error() {
        let inits = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inits,
            init_delay: Duration::from_millis(300),
            enhance_delay: Duration::ZERO,
            fail_init: false,
        };
        let engine = EnhancementEngine::new(Arc::new(backend), timeouts_ms(30, 1000));

        let err = engine.enhance(vec![0.0]).await.unwrap_err();
        assert!(
            matches!(err, ClearcastError::ProcessingTimeout { .. }),
            "expected timeout, got {err:?}"
        );
    }

    #[tokio::test]
    async fn failing_init_is_a_model_error() {
        let inits = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inits,
            init_delay: Duration::ZERO,
            enhance_delay: Duration::ZERO,
            fail_init: true,
        };
        let engine = EnhancementEngine::new(Arc::new(backend), timeouts_ms(1000, 1000));

        let err = engine.enhance(vec![0.0]).await.unwrap_err();
        assert!(matches!(err, ClearcastError::ModelInit { .. }));
    }

    #[tokio::test]
    async fn slow_enhancement_times_out() {
        let inits = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inits,
            init_delay: Duration::ZERO,
            enhance_delay: Duration::from_millis(300),
            fail_init: false,
        };
        let engine = EnhancementEngine::new(Arc::new(backend), timeouts_ms(1000, 30));

        let err = engine.enhance(vec![0.0]).await.unwrap_err();
        match err {
            ClearcastError::ProcessingTimeout { stage } => assert_eq!(stage, "enhancement"),
            other => panic!("expected enhancement timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timed_out_init_leaves_slot_empty_for_retry() {
        let inits = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inits: Arc::clone(&inits),
            init_delay: Duration::from_millis(100),
            enhance_delay: Duration::ZERO,
            fail_init: false,
        };
        let engine = EnhancementEngine::new(Arc::new(backend), timeouts_ms(20, 1000));

        assert!(engine.enhance(vec![0.0]).await.is_err());

        // A subsequent job attempts initialization again.
        tokio::time::sleep(Duration::from_millis(150)).await;
        let before = inits.load(Ordering::SeqCst);
        let _ = engine.enhance(vec![0.0]).await;
        assert!(inits.load(Ordering::SeqCst) > before);
    }
}
