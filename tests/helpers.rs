// Shared test doubles for driving audits without a browser or network.
//
// This module provides a scripted page loader and a counting registry lookup
// used across multiple test files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;

use origin_audit::{CapturedRequest, PageLoad, PageLoader, RegistryLookup};

/// Page loader that replays a fixed list of requests.
#[allow(dead_code)] // Used by other test files
pub struct ScriptedPage {
    pub requests: Vec<(String, String)>,
    pub final_url: Option<String>,
    pub fail: bool,
}

impl ScriptedPage {
    /// Replays `(url, resource_type)` pairs; the final URL is the requested one.
    #[allow(dead_code)] // Used by other test files
    pub fn new(requests: &[(&str, &str)]) -> Self {
        Self {
            requests: requests
                .iter()
                .map(|(url, kind)| (url.to_string(), kind.to_string()))
                .collect(),
            final_url: None,
            fail: false,
        }
    }

    #[allow(dead_code)] // Used by other test files
    pub fn redirected_to(mut self, final_url: &str) -> Self {
        self.final_url = Some(final_url.to_string());
        self
    }

    #[allow(dead_code)] // Used by other test files
    pub fn failing() -> Self {
        Self {
            requests: Vec::new(),
            final_url: None,
            fail: true,
        }
    }
}

impl PageLoader for ScriptedPage {
    async fn load(
        &self,
        url: &str,
        wait: Option<Duration>,
        requests: mpsc::Sender<CapturedRequest>,
    ) -> anyhow::Result<PageLoad> {
        if self.fail {
            anyhow::bail!("navigation failed for {url}");
        }
        for (request_url, kind) in &self.requests {
            requests
                .send(CapturedRequest::new(request_url, kind))
                .await
                .expect("accumulator should be draining");
        }
        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }
        Ok(PageLoad {
            final_url: self.final_url.clone().unwrap_or_else(|| url.to_string()),
        })
    }
}

/// Registry lookup answering from a fixed table and recording every call.
pub struct CountingLookup {
    answers: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl CountingLookup {
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(domain, raw)| (domain.to_string(), raw.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    #[allow(dead_code)] // Used by other test files
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RegistryLookup for CountingLookup {
    async fn lookup(&self, domain: &str) -> String {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(domain.to_string());
        self.answers
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, raw)| raw.clone())
            .unwrap_or_default()
    }
}
