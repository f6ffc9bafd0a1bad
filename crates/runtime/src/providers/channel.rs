//! Channel-backed provider for human or UI input.

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use battle_core::Selection;

use crate::api::{ActionProvider, Result, RuntimeError, SelectionRequest};

/// Waits for selections sent through a [`SelectionSender`].
///
/// The UI learns what it may choose from `TurnEvent::AwaitingInput`. Sending
/// `None` cancels the prompt (for example a timed-hit input abandoned
/// mid-charge).
pub struct ChannelProvider {
    rx: Mutex<mpsc::Receiver<Option<Selection>>>,
}

/// Input side of a [`ChannelProvider`].
#[derive(Clone)]
pub struct SelectionSender {
    tx: mpsc::Sender<Option<Selection>>,
}

impl ChannelProvider {
    pub fn new(buffer: usize) -> (Self, SelectionSender) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            Self { rx: Mutex::new(rx) },
            SelectionSender { tx },
        )
    }
}

impl SelectionSender {
    pub async fn select(&self, selection: Selection) -> Result<()> {
        self.send(Some(selection)).await
    }

    pub async fn cancel(&self) -> Result<()> {
        self.send(None).await
    }

    async fn send(&self, answer: Option<Selection>) -> Result<()> {
        self.tx
            .send(answer)
            .await
            .map_err(|_| RuntimeError::ProviderChannelClosed)
    }
}

#[async_trait]
impl ActionProvider for ChannelProvider {
    async fn select(&self, request: &SelectionRequest<'_>) -> Result<Option<Selection>> {
        tracing::debug!(
            target: "runtime::providers",
            actor = %request.actor,
            attempt = request.attempt,
            "waiting for input"
        );
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or(RuntimeError::ProviderChannelClosed)
    }
}
