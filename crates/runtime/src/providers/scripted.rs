//! Scripted provider for fixtures and replays.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use battle_core::Selection;

use crate::api::{ActionProvider, Result, SelectionRequest};

/// Pops queued answers in order; `None` entries cancel the prompt.
///
/// Once the queue is empty it answers with the first legal action.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Option<Selection>>>,
}

impl ScriptedProvider {
    pub fn new(selections: impl IntoIterator<Item = Selection>) -> Self {
        Self::with_answers(selections.into_iter().map(Some))
    }

    /// Queue that may contain cancellations.
    pub fn with_answers(answers: impl IntoIterator<Item = Option<Selection>>) -> Self {
        Self {
            script: Mutex::new(answers.into_iter().collect()),
        }
    }

    pub async fn push(&self, answer: Option<Selection>) {
        self.script.lock().await.push_back(answer);
    }

    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn select(&self, request: &SelectionRequest<'_>) -> Result<Option<Selection>> {
        if let Some(answer) = self.script.lock().await.pop_front() {
            return Ok(answer);
        }
        tracing::debug!(
            target: "runtime::providers",
            actor = %request.actor,
            "script exhausted, taking first legal action"
        );
        Ok(request
            .legal
            .first()
            .map(|entry| Selection::new(entry.action)))
    }
}
