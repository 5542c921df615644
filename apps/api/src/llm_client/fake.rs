//! Scripted `CompletionProvider` for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CompletionOptions, CompletionProvider, ProviderError};

/// Replays queued responses, then repeats a fallback. Counts calls.
pub struct ScriptedProvider {
    queue: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Result<String, ProviderError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_options: Mutex<Option<CompletionOptions>>,
}

impl ScriptedProvider {
    pub fn always(text: impl Into<String>) -> Self {
        Self::with_fallback(Ok(text.into()))
    }

    pub fn failing(err: ProviderError) -> Self {
        Self::with_fallback(Err(err))
    }

    fn with_fallback(fallback: Result<String, ProviderError>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_options: Mutex::new(None),
        }
    }

    /// Queues responses served before the fallback.
    pub fn then(self, responses: Vec<Result<String, ProviderError>>) -> Self {
        self.queue.lock().unwrap().extend(responses);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<CompletionOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        *self.last_options.lock().unwrap() = Some(options.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
