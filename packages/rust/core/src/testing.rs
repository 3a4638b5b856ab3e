//! Test doubles shared by this crate's unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use scout_llm::{GenerativeModel, SharedModel};
use scout_shared::{Result, ScoutError};

/// Records prompts and answers each one from a fixed script.
pub(crate) struct ScriptedModel {
    replies: Mutex<Vec<std::result::Result<String, String>>>,
    pub(crate) prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Reply with the same result to every prompt.
    pub(crate) fn fixed(reply: std::result::Result<&str, &str>) -> Arc<Self> {
        Self::sequence(vec![reply])
    }

    /// Reply with each result in order; the last one repeats.
    pub(crate) fn sequence(replies: Vec<std::result::Result<&str, &str>>) -> Arc<Self> {
        let mut replies: Vec<_> = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop().unwrap()
        } else {
            replies.last().cloned().unwrap_or_else(|| Ok(String::new()))
        };
        reply.map_err(ScoutError::Model)
    }
}

pub(crate) fn shared(model: &Arc<ScriptedModel>) -> Option<SharedModel> {
    Some(model.clone() as SharedModel)
}
