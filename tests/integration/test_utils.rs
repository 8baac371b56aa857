//! Shared test utilities for integration tests
//!
//! Scripted stand-ins for the generative service and the pacer, notebook
//! builders, and an environment guard for tests that touch HOME or NBFORGE_*.

#![allow(dead_code)]

use async_trait::async_trait;
use nbforge::artifact::store::write_artifact;
use nbforge::artifact::{Artifact, Block};
use nbforge::batch::Pacer;
use nbforge::catalog::Specification;
use nbforge::error::ForgeError;
use nbforge::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

const GUARDED_VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "NBFORGE_ENV", "NBFORGE__PROVIDER__MODEL"];

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir`, restoring
/// the original environment afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = GUARDED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
    std::env::remove_var("NBFORGE_ENV");
    std::env::remove_var("NBFORGE__PROVIDER__MODEL");

    let result = f();

    for (name, value) in saved {
        match value {
            Some(v) => std::env::set_var(name, v),
            None => std::env::remove_var(name),
        }
    }
    result
}

pub fn spec(id: &str, title: &str) -> Specification {
    Specification {
        id: id.to_string(),
        title: title.to_string(),
        category: "Modern_AI".to_string(),
        topics: vec!["Topic A".to_string(), "Topic B".to_string()],
        domain_focus: vec!["Wafer test analytics".to_string()],
        prerequisites: vec![],
        learning_objectives: None,
    }
}

/// Correctly alternating artifact of `pairs` narrative/executable pairs.
pub fn alternating_artifact(heading: &str, pairs: usize) -> Artifact {
    let mut blocks = vec![Block::narrative(&format!("{}\n\nOverview", heading))];
    blocks.push(Block::executable("import numpy as np"));
    for i in 1..pairs {
        blocks.push(Block::narrative(&format!("## Section {}", i)));
        blocks.push(Block::executable(&format!("value_{} = {}", i, i)));
    }
    blocks.truncate(pairs * 2);
    Artifact::new(blocks)
}

pub fn write_notebook(root: &Path, relative: &str, first_block: &str) -> PathBuf {
    let artifact = Artifact::new(vec![
        Block::narrative(first_block),
        Block::executable("print('hello')"),
        Block::narrative("## Next"),
    ]);
    write_artifact(&artifact, &root.join(relative)).unwrap()
}

/// Reply the scripted provider gives to one request.
pub enum Reply {
    Content(String),
    Truncated(String),
    Transport(String),
}

/// Generative service stand-in answering from a script, in order.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    pub requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ForgeError> {
        self.requests.lock().push(messages);
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Reply::Transport("script exhausted".to_string()));
        let (content, finish_reason) = match reply {
            Reply::Content(content) => (content, "stop"),
            Reply::Truncated(content) => (content, "length"),
            Reply::Transport(message) => return Err(ForgeError::ProviderRequestFailed(message)),
        };
        Ok(CompletionResponse {
            content,
            model: "scripted".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some(finish_reason.to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Pacer that records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pub pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn total(&self) -> Duration {
        self.pauses.lock().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        self.pauses.lock().push(delay);
    }
}
