//! Process-wide speech engine handle.
//!
//! Loading a recogniser is expensive, so a process holds exactly one engine.
//! [`SharedEngine`] builds it on first use (or accepts a ready one), and
//! every clone of the handle shares the same instance and the same permit
//! pool. At most `max_concurrency` transcriptions run at once; further
//! callers wait for a permit.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};
use tracing::info;

use crate::engine::{EngineOutput, SpeechEngine};
use crate::error::{AsrError, AsrResult};

type EngineFactory = dyn Fn() -> AsrResult<Arc<dyn SpeechEngine>> + Send + Sync;

#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<OnceCell<Arc<dyn SpeechEngine>>>,
    factory: Arc<EngineFactory>,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl SharedEngine {
    /// Build the engine with `factory` the first time it is needed.
    pub fn lazy<F>(max_concurrency: usize, factory: F) -> Self
    where
        F: Fn() -> AsrResult<Arc<dyn SpeechEngine>> + Send + Sync + 'static,
    {
        let max_concurrency = max_concurrency.max(1);
        Self {
            engine: Arc::new(OnceCell::new()),
            factory: Arc::new(factory),
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    /// Wrap an engine that is already initialised.
    pub fn ready(engine: Arc<dyn SpeechEngine>, max_concurrency: usize) -> Self {
        let shared = Self::lazy(max_concurrency, || {
            Err(AsrError::config("engine factory called on a ready engine"))
        });
        // A fresh cell cannot already be set.
        let _ = shared.engine.set(engine);
        shared
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.initialized()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// The engine, initialising it on first call. A failed initialisation is
    /// not cached; the next caller tries again.
    pub async fn engine(&self) -> AsrResult<Arc<dyn SpeechEngine>> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                let engine = (self.factory)()?;
                info!(engine = engine.name(), "Speech engine initialised");
                Ok::<_, AsrError>(engine)
            })
            .await?;
        Ok(Arc::clone(engine))
    }

    /// Run one transcription under a pool permit.
    pub async fn transcribe(&self, audio: &Path) -> AsrResult<EngineOutput> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AsrError::engine_failed("speech engine pool closed"))?;

        let engine = self.engine().await?;
        engine.transcribe(audio).await
    }
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("initialized", &self.is_initialized())
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}
