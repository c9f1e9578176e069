//! Scripted text generator
//!
//! Replies are served from a queue; once it is empty every call answers
//! "Generated summary N". A gated generator blocks inside `generate` until
//! the test releases it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedback_synth::services::{GenerationError, GenerationRequest, TextGenerator};
use tokio::sync::{Notify, Semaphore};

pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
    entered: Notify,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Every call waits for [`ScriptedGenerator::release`]
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(Some(Semaphore::new(0))))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            gate,
            entered: Notify::new(),
        }
    }

    pub fn push_reply(&self, reply: Result<String, GenerationError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Resolves once a call has entered `generate`
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("Generated summary {}", n)))
    }
}
