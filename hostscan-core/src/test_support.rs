//! Network-free fetcher for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, ScanError};
use crate::probe::{FetchedPage, Fetcher};
use crate::validation::{validate_domain, Domain};

pub fn domain(name: &str) -> Domain {
    validate_domain(name).unwrap()
}

enum Step {
    Respond(FetchedPage),
    Fail(ScanError),
}

fn replay(error: &ScanError) -> ScanError {
    match error {
        ScanError::Timeout(msg) => ScanError::Timeout(msg.clone()),
        ScanError::Connection(msg) => ScanError::Connection(msg.clone()),
        other => ScanError::Other(other.to_string()),
    }
}

#[derive(Default)]
struct Script {
    steps: HashMap<String, VecDeque<Step>>,
    calls: HashMap<String, usize>,
}

/// Replays scripted outcomes per URL. The last scripted step of a URL repeats
/// forever; unscripted URLs refuse the connection.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<Script>>,
    latency: Duration,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn push(self, url: &str, step: Step) -> Self {
        self.script
            .lock()
            .unwrap()
            .steps
            .entry(url.to_string())
            .or_default()
            .push_back(step);
        self
    }

    pub fn respond(self, url: &str, status: u16, body: &str) -> Self {
        self.push(url, Step::Respond(FetchedPage::new(status, body)))
    }

    pub fn fail(self, url: &str, error: ScanError) -> Self {
        self.push(url, Step::Fail(error))
    }

    pub fn fail_times(mut self, url: &str, times: usize, error: ScanError) -> Self {
        for _ in 0..times {
            self = self.push(url, Step::Fail(replay(&error)));
        }
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.script.lock().unwrap().calls.get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.script.lock().unwrap().calls.values().sum()
    }

    fn next(&self, url: &str) -> Result<FetchedPage> {
        let mut script = self.script.lock().unwrap();
        *script.calls.entry(url.to_string()).or_default() += 1;

        let Some(queue) = script.steps.get_mut(url) else {
            return Err(ScanError::Connection(format!("{}: connection refused", url)));
        };

        let step = if queue.len() > 1 {
            queue.pop_front()
        } else {
            None
        };

        match step.as_ref().or(queue.front()) {
            Some(Step::Respond(page)) => Ok(page.clone()),
            Some(Step::Fail(e)) => Err(replay(e)),
            None => Err(ScanError::Connection(format!("{}: connection refused", url))),
        }
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _user_agent: &str, _timeout: Duration) -> Result<FetchedPage> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.next(url)
    }
}
