//! Scripted transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::probe::transport::{ProbeResponse, ProbeTransport, TransportError};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Body(u16, &'static str),
    Hang,
    Refuse,
}

/// Answers by exact URL; unknown URLs are refused.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, reply: Reply) -> Self {
        self.set(url, reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, url: &str, reply: Reply) {
        self.routes.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbeTransport for MockTransport {
    async fn get(&self, url: &Url, read_body: bool) -> Result<ProbeResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or(Reply::Refuse);

        match reply {
            Reply::Status(status) => Ok(ProbeResponse {
                status,
                body: read_body.then(String::new),
            }),
            Reply::Body(status, body) => Ok(ProbeResponse {
                status,
                body: read_body.then(|| body.to_string()),
            }),
            Reply::Hang => std::future::pending().await,
            Reply::Refuse => Err(TransportError::Connect("connection refused".into())),
        }
    }
}
