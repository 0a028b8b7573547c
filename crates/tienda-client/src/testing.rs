//! Scripted transport for unit tests.
//!
//! Plays back a list of steps, one per attempt; once the script runs out
//! the last step repeats. Every request is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::FetchError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// What the transport does for one attempt.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Reply with this status and body.
    Respond(u16, String),
    /// Never reply.
    Hang,
    /// Fail at the connection level.
    Fail(String),
}

impl Step {
    pub(crate) fn respond(status: u16, body: &str) -> Self {
        Step::Respond(status, body.to_string())
    }

    pub(crate) fn fail(reason: &str) -> Self {
        Step::Fail(reason.to_string())
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        ScriptedTransport {
            script: Mutex::new(steps.into()),
            ..Default::default()
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut last = self.last.lock().unwrap();
        match self.script.lock().unwrap().pop_front() {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last.clone().unwrap_or(Step::Hang),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());

        match self.next_step() {
            Step::Respond(status, body) => Ok(HttpResponse { status, body }),
            Step::Fail(reason) => Err(FetchError::Transport(reason)),
            Step::Hang => std::future::pending().await,
        }
    }
}
