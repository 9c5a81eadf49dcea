//! Scripted backend for tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::backend::InferenceBackend;
use super::types::{ChunkSender, GenerateRequest};
use crate::utils::ChatError;

pub struct StubBackend {
    reply: Result<String, ChatError>,
    fragments: Vec<String>,
    fail_after: Option<(usize, ChatError)>,
    streaming: bool,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl StubBackend {
    /// Replies with `text`; streams it in word-sized fragments
    pub fn replying(text: &str) -> Self {
        let fragments = text
            .split_inclusive(' ')
            .map(str::to_string)
            .collect();
        Self {
            reply: Ok(text.to_string()),
            fragments,
            fail_after: None,
            streaming: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ChatError) -> Self {
        Self {
            reply: Err(error),
            fragments: Vec::new(),
            fail_after: None,
            streaming: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Stream `count` fragments, then fail
    pub fn failing_after(mut self, count: usize, error: ChatError) -> Self {
        self.fail_after = Some((count, error));
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &GenerateRequest) {
        self.requests.lock().unwrap().push(request.clone());
    }
}

#[async_trait]
impl InferenceBackend for StubBackend {
    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ChatError> {
        self.record(request);
        self.reply.clone()
    }

    async fn generate_stream(
        &self,
        request: &GenerateRequest,
        chunks: ChunkSender,
    ) -> Result<(), ChatError> {
        self.record(request);
        if let Err(e) = &self.reply {
            return Err(e.clone());
        }

        for (i, fragment) in self.fragments.iter().enumerate() {
            if let Some((count, error)) = &self.fail_after {
                if i == *count {
                    return Err(error.clone());
                }
            }
            let _ = chunks.send(Ok(fragment.clone())).await;
        }
        Ok(())
    }
}
