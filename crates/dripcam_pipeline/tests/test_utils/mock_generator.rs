//! Scripted stand-in for the image provider.

use async_trait::async_trait;
use dripcam_error::{GenerationError, GenerationErrorKind};
use dripcam_interface::ImageGenerator;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the mock does on one call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum MockBehavior {
    /// Return these bytes
    Succeed(Vec<u8>),
    /// Fail with this error
    Fail(GenerationErrorKind),
    /// Panic inside the call
    Panic,
    /// Announce the call on `started`, wait for `release`, then return bytes
    Gate {
        started: Arc<Notify>,
        release: Arc<Notify>,
        bytes: Vec<u8>,
    },
}

/// Generator that replays a script of behaviors, one per call.
///
/// Once the script runs out every call fails as `Unavailable`.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<MockBehavior>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockGenerator {
    pub fn new(script: impl IntoIterator<Item = MockBehavior>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockGenerator {
    async fn generate(
        &self,
        _source_image: &[u8],
        prompt: &str,
    ) -> Result<Vec<u8>, GenerationError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some(MockBehavior::Succeed(bytes)) => Ok(bytes),
            Some(MockBehavior::Fail(kind)) => Err(GenerationError::new(kind)),
            Some(MockBehavior::Panic) => panic!("mock provider exploded"),
            Some(MockBehavior::Gate {
                started,
                release,
                bytes,
            }) => {
                started.notify_one();
                release.notified().await;
                Ok(bytes)
            }
            None => Err(GenerationError::new(GenerationErrorKind::Unavailable(
                "mock script exhausted".to_string(),
            ))),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
