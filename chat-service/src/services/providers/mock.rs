//! Mock provider for testing.

use super::{GenerativeProvider, ProviderError};
use crate::models::{ModelReply, Prompt};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: Prompt,
}

enum Behaviour {
    Reply(String),
    Fail(ProviderError),
    Stall(Duration),
}

/// Records every call and answers with a canned outcome.
pub struct MockProvider {
    behaviour: Behaviour,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with(Behaviour::Reply(text.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with(Behaviour::Fail(error))
    }

    /// Sleeps for `delay` before replying, to exercise call timeouts.
    pub fn stalling(delay: Duration) -> Self {
        Self::with(Behaviour::Stall(delay))
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<ModelReply, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.clone(),
            });
        }

        match &self.behaviour {
            Behaviour::Reply(text) => Ok(ModelReply { text: text.clone() }),
            Behaviour::Fail(error) => Err(error.clone()),
            Behaviour::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(ModelReply {
                    text: "late reply".to_string(),
                })
            }
        }
    }
}
