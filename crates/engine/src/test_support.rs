//! Shared fakes for engine tests: a scripted store dispatcher, a scripted
//! operator prompt, and a quiet-hook recorder writing to the same journal.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use provar_api::{DispatchError, LIST_BY_PREFIX_METHOD, PUT_PARAMETER_METHOD, ProviderDispatch, STORE_SERVICE};
use provar_types::{ParameterEntry, ParameterPage, PutParameterRequest};

use crate::prompt::{OperatorPrompt, PromptQuiet};

#[derive(Default)]
struct FakeStoreState {
    pages: HashMap<String, VecDeque<Value>>,
    list_calls: Vec<Value>,
    put_calls: Vec<PutParameterRequest>,
    passthrough_calls: Vec<(String, String, Value)>,
    fail_lists: bool,
    fail_puts: bool,
}

/// Scripted dispatcher: serves queued list pages per path, records puts and
/// passthrough traffic, and can be told to fail either operation.
#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<FakeStoreState>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue one page for a path; successive list calls pop pages in order.
    pub fn stage_page(&self, path: &str, page: ParameterPage) {
        self.stage_raw_page(path, serde_json::to_value(page).expect("serialize staged page"));
    }

    /// Queue a page given as raw wire JSON, for shapes the typed page would
    /// already have normalized.
    pub fn stage_raw_page(&self, path: &str, page: Value) {
        let mut state = self.state.lock().expect("fake store lock");
        state.pages.entry(path.to_string()).or_default().push_back(page);
    }

    /// Queue a single final page holding `entries`.
    pub fn stage_entries(&self, path: &str, entries: Vec<ParameterEntry>) {
        self.stage_page(
            path,
            ParameterPage {
                parameters: entries,
                next_token: None,
            },
        );
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().expect("fake store lock").fail_lists = fail;
    }

    pub fn fail_puts(&self, fail: bool) {
        self.state.lock().expect("fake store lock").fail_puts = fail;
    }

    pub fn list_call_count(&self) -> usize {
        self.state.lock().expect("fake store lock").list_calls.len()
    }

    /// Paths of recorded list calls, in call order.
    pub fn list_request_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("fake store lock")
            .list_calls
            .iter()
            .map(|params| params["Path"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Continuation tokens of recorded list calls, in call order.
    pub fn list_request_tokens(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .expect("fake store lock")
            .list_calls
            .iter()
            .map(|params| params.get("NextToken").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn put_requests(&self) -> Vec<PutParameterRequest> {
        self.state.lock().expect("fake store lock").put_calls.clone()
    }

    pub fn passthrough_calls(&self) -> Vec<(String, String, Value)> {
        self.state.lock().expect("fake store lock").passthrough_calls.clone()
    }
}

#[async_trait]
impl ProviderDispatch for FakeStore {
    async fn dispatch(&self, service: &str, method: &str, params: Value) -> Result<Value, DispatchError> {
        let mut state = self.state.lock().expect("fake store lock");

        if service == STORE_SERVICE && method == LIST_BY_PREFIX_METHOD {
            state.list_calls.push(params.clone());
            if state.fail_lists {
                return Err(DispatchError::Status {
                    service: service.to_string(),
                    method: method.to_string(),
                    status: 500,
                    body: "scripted list failure".into(),
                });
            }
            let path = params["Path"].as_str().unwrap_or_default().to_string();
            let page = state
                .pages
                .get_mut(&path)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| json!({ "Parameters": [] }));
            return Ok(page);
        }

        if service == STORE_SERVICE && method == PUT_PARAMETER_METHOD {
            if state.fail_puts {
                return Err(DispatchError::Status {
                    service: service.to_string(),
                    method: method.to_string(),
                    status: 500,
                    body: "scripted put failure".into(),
                });
            }
            let request: PutParameterRequest = serde_json::from_value(params)?;
            state.put_calls.push(request);
            return Ok(Value::Null);
        }

        state
            .passthrough_calls
            .push((service.to_string(), method.to_string(), params.clone()));
        Ok(json!({ "service": service, "method": method, "params": params }))
    }
}

/// Scripted prompt: pops queued answers and journals ask start/end events
/// keyed by the parameter name in the prompt text.
pub(crate) struct ScriptedPrompt {
    answers: Mutex<VecDeque<Option<String>>>,
    journal: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Option<&str>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|answer| answer.map(str::to_string)).collect()),
            journal: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        })
    }

    /// Hold each answer back for `delay`, giving a queued second resolution
    /// the chance to interleave if the worker ever allowed it.
    pub fn with_delay(answers: Vec<Option<&str>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().map(|answer| answer.map(str::to_string)).collect()),
            journal: Arc::new(Mutex::new(Vec::new())),
            delay: Some(delay),
        })
    }

    pub fn journal(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.journal)
    }

    pub fn journal_entries(&self) -> Vec<String> {
        self.journal.lock().expect("journal lock").clone()
    }

    pub fn ask_count(&self) -> usize {
        self.journal_entries()
            .iter()
            .filter(|entry| entry.starts_with("ask-start"))
            .count()
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn ask(&self, prompt: &str) -> Option<String> {
        let name = prompt.strip_prefix("Enter value for ").unwrap_or(prompt);
        self.journal
            .lock()
            .expect("journal lock")
            .push(format!("ask-start {}", name));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let answer = self.answers.lock().expect("answers lock").pop_front().flatten();
        self.journal.lock().expect("journal lock").push(format!("ask-end {}", name));
        answer
    }
}

/// Quiet hook writing pause/resume marks into a shared journal.
pub(crate) struct QuietRecorder {
    journal: Arc<Mutex<Vec<String>>>,
}

impl QuietRecorder {
    pub fn new(journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self { journal }
    }
}

impl PromptQuiet for QuietRecorder {
    fn pause(&self) {
        self.journal.lock().expect("journal lock").push("pause".into());
    }

    fn resume(&self) {
        self.journal.lock().expect("journal lock").push("resume".into());
    }
}
