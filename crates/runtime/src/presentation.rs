//! Presentation gate.
//!
//! Presentation collaborators (animation, audio, UI) never call into the
//! battle rules. They see [`PresentationEvent::AnimationStageRequest`] events,
//! play whatever they like, and acknowledge each ticket through
//! [`RuntimeHandle::stage_completed`](crate::RuntimeHandle::stage_completed).
//! The pipeline awaits those acknowledgements directly.
//!
//! Locks are advisory. While one is held the next stage request is not
//! published and the next enemy turn does not start. Combat math never
//! waits on wall-clock time.
//!
//! A suspended gate holds the next turn until presentation signals that it
//! caught up: either a [`PresentationGate::stage_completed`] for a known
//! ticket or an explicit [`PresentationGate::resume`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{oneshot, watch};

use battle_core::CombatantId;

use crate::events::{Event, EventBus, PresentationEvent};

/// Identifies one outstanding stage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageTicket(pub u64);

impl std::fmt::Display for StageTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ticket:{}", self.0)
    }
}

/// What presentation is asked to play.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PresentationStage {
    /// Actor wind-up before any effect lands.
    Windup,
    /// One beat of a hit sequence.
    Hit { beat: u32, of: u32 },
    /// Heal or resource restore.
    Support,
    /// A mark reaction detonating.
    Reaction,
}

impl PresentationStage {
    /// Suggested playback length. Never enforced.
    pub fn duration_hint(self) -> Duration {
        match self {
            PresentationStage::Windup => Duration::from_millis(400),
            PresentationStage::Hit { .. } => Duration::from_millis(250),
            PresentationStage::Support => Duration::from_millis(350),
            PresentationStage::Reaction => Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresentationError {
    #[error("{0} was abandoned before it completed")]
    Abandoned(StageTicket),

    #[error("presentation gate is closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GateState {
    locks: u32,
    suspended: bool,
}

impl GateState {
    fn is_clear(&self) -> bool {
        self.locks == 0 && !self.suspended
    }
}

struct GateInner {
    bus: EventBus,
    auto_acknowledge: bool,
    closed: AtomicBool,
    next_ticket: AtomicU64,
    pending: Mutex<HashMap<StageTicket, oneshot::Sender<()>>>,
    state: watch::Sender<GateState>,
}

/// Shared between the battle worker (which awaits) and the runtime handle
/// (which acknowledges).
#[derive(Clone)]
pub struct PresentationGate {
    inner: Arc<GateInner>,
}

impl PresentationGate {
    pub fn new(bus: EventBus, auto_acknowledge: bool) -> Self {
        Self {
            inner: Arc::new(GateInner {
                bus,
                auto_acknowledge,
                closed: AtomicBool::new(false),
                next_ticket: AtomicU64::new(1),
                pending: Mutex::new(HashMap::new()),
                state: watch::Sender::new(GateState::default()),
            }),
        }
    }

    pub fn auto_acknowledge(&self) -> bool {
        self.inner.auto_acknowledge
    }

    /// Publishes a stage request once no lock is held, then waits for its
    /// acknowledgement.
    pub async fn request_stage(
        &self,
        stage: PresentationStage,
        actor: CombatantId,
        target: Option<CombatantId>,
    ) -> Result<(), PresentationError> {
        if self.is_locked() {
            tracing::trace!(target: "runtime::presentation", %stage, "stage held by lock");
            self.wait_until_unlocked().await;
        }
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PresentationError::Closed);
        }

        let ticket = StageTicket(self.inner.next_ticket.fetch_add(1, Ordering::Relaxed));
        let rx = if self.inner.auto_acknowledge {
            None
        } else {
            let (tx, rx) = oneshot::channel();
            self.pending().insert(ticket, tx);
            Some(rx)
        };

        self.inner
            .bus
            .publish(Event::Presentation(PresentationEvent::AnimationStageRequest {
                ticket,
                stage,
                actor,
                target,
                duration_hint_ms: stage.duration_hint().as_millis() as u64,
            }));

        let Some(rx) = rx else {
            return Ok(());
        };
        tracing::trace!(target: "runtime::presentation", %ticket, %stage, "awaiting stage");
        rx.await.map_err(|_| PresentationError::Abandoned(ticket))
    }

    /// Resolves an outstanding stage and lifts a suspension.
    /// Returns false for unknown tickets, which change nothing.
    pub fn stage_completed(&self, ticket: StageTicket) -> bool {
        let Some(tx) = self.pending().remove(&ticket) else {
            tracing::debug!(target: "runtime::presentation", %ticket, "unknown stage ticket");
            return false;
        };
        // The waiter may have been dropped; the acknowledgement still counts.
        let _ = tx.send(());
        self.resume();
        self.inner
            .bus
            .publish(Event::Presentation(PresentationEvent::StageCompleted { ticket }));
        true
    }

    /// Tickets still waiting for an acknowledgement.
    pub fn pending_tickets(&self) -> Vec<StageTicket> {
        let mut tickets: Vec<_> = self.pending().keys().copied().collect();
        tickets.sort();
        tickets
    }

    /// Raises or releases one advisory lock.
    pub fn set_lock(&self, locked: bool) {
        let mut changed = false;
        self.inner.state.send_modify(|state| {
            let before = state.locks;
            state.locks = if locked {
                before.saturating_add(1)
            } else {
                before.saturating_sub(1)
            };
            changed = (before == 0) != (state.locks == 0);
        });
        if changed {
            self.inner
                .bus
                .publish(Event::Presentation(PresentationEvent::LockChanged { locked }));
        }
    }

    pub fn is_locked(&self) -> bool {
        self.inner.state.borrow().locks > 0
    }

    /// Holds the orchestrator before its next turn until a stage is
    /// acknowledged or [`resume`](Self::resume) is called.
    pub fn suspend(&self) {
        self.inner.state.send_modify(|state| state.suspended = true);
    }

    pub fn resume(&self) {
        self.inner.state.send_if_modified(|state| {
            let was = state.suspended;
            state.suspended = false;
            was
        });
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.state.borrow().suspended
    }

    /// Waits until no lock is held and the gate is not suspended.
    pub async fn wait_until_clear(&self) {
        self.wait_for(GateState::is_clear).await;
    }

    /// Waits until no lock is held, ignoring suspension.
    pub async fn wait_until_unlocked(&self) {
        self.wait_for(|state| state.locks == 0).await;
    }

    /// Waits until the gate is not suspended, ignoring locks.
    pub async fn wait_until_resumed(&self) {
        self.wait_for(|state| !state.suspended).await;
    }

    async fn wait_for(&self, ready: impl Fn(&GateState) -> bool) {
        if self.inner.closed.load(Ordering::Acquire) {
            return;
        }
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `inner`, so the channel cannot close while we hold it.
        let _ = rx
            .wait_for(|state| ready(state) || self.inner.closed.load(Ordering::Acquire))
            .await;
    }

    /// Fails every outstanding stage and refuses new ones.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        let abandoned = std::mem::take(&mut *self.pending());
        tracing::debug!(
            target: "runtime::presentation",
            abandoned = abandoned.len(),
            "presentation gate closed"
        );
        drop(abandoned);
        // Wake anything parked on the lock state.
        self.inner.state.send_modify(|_| {});
    }

    /// Fails every outstanding stage but keeps the gate open.
    pub fn abandon_pending(&self) -> usize {
        let abandoned = std::mem::take(&mut *self.pending());
        abandoned.len()
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<StageTicket, oneshot::Sender<()>>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;

    #[tokio::test]
    async fn auto_acknowledge_resolves_immediately() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Topic::Presentation);
        let gate = PresentationGate::new(bus, true);

        gate.request_stage(PresentationStage::Windup, CombatantId(1), None)
            .await
            .unwrap();

        assert!(gate.pending_tickets().is_empty());
        assert!(matches!(
            sub.try_recv(),
            Some(Event::Presentation(PresentationEvent::AnimationStageRequest {
                stage: PresentationStage::Windup,
                duration_hint_ms: 400,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn stage_waits_for_acknowledgement() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Topic::Presentation);
        let gate = PresentationGate::new(bus, false);

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.request_stage(
                    PresentationStage::Hit { beat: 1, of: 2 },
                    CombatantId(1),
                    Some(CombatantId(3)),
                )
                .await
            })
        };

        let Some(Event::Presentation(PresentationEvent::AnimationStageRequest { ticket, .. })) =
            sub.recv().await
        else {
            panic!("expected a stage request");
        };
        assert!(!waiter.is_finished());
        assert!(gate.stage_completed(ticket));
        assert_eq!(waiter.await.unwrap(), Ok(()));
        assert!(!gate.stage_completed(ticket));
    }

    #[tokio::test]
    async fn closing_abandons_outstanding_stages() {
        let gate = PresentationGate::new(EventBus::new(), false);
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.request_stage(PresentationStage::Reaction, CombatantId(2), None)
                    .await
            })
        };
        while gate.pending_tickets().is_empty() {
            tokio::task::yield_now().await;
        }

        gate.close();
        assert!(matches!(
            waiter.await.unwrap(),
            Err(PresentationError::Abandoned(_))
        ));
        assert_eq!(
            gate.request_stage(PresentationStage::Windup, CombatantId(2), None)
                .await,
            Err(PresentationError::Closed)
        );
    }

    #[tokio::test]
    async fn locks_nest_and_emit_on_edges() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Topic::Presentation);
        let gate = PresentationGate::new(bus, true);

        gate.set_lock(true);
        gate.set_lock(true);
        gate.set_lock(false);
        assert!(gate.is_locked());
        gate.set_lock(false);
        assert!(!gate.is_locked());

        let changes: Vec<_> = sub.drain();
        assert_eq!(
            changes,
            vec![
                Event::Presentation(PresentationEvent::LockChanged { locked: true }),
                Event::Presentation(PresentationEvent::LockChanged { locked: false }),
            ]
        );
    }

    #[tokio::test]
    async fn lock_holds_back_stage_requests() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Topic::Presentation);
        let gate = PresentationGate::new(bus, true);
        gate.set_lock(true);
        sub.drain();

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.request_stage(PresentationStage::Windup, CombatantId(1), None)
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        assert!(sub.try_recv().is_none());

        gate.set_lock(false);
        assert_eq!(waiter.await.unwrap(), Ok(()));
        assert_eq!(
            sub.drain()
                .into_iter()
                .filter(|event| matches!(
                    event,
                    Event::Presentation(PresentationEvent::AnimationStageRequest { .. })
                ))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn closing_releases_a_locked_stage_request() {
        let gate = PresentationGate::new(EventBus::new(), false);
        gate.set_lock(true);
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.request_stage(PresentationStage::Support, CombatantId(1), None)
                    .await
            })
        };
        tokio::task::yield_now().await;
        gate.close();
        assert_eq!(waiter.await.unwrap(), Err(PresentationError::Closed));
        assert!(gate.pending_tickets().is_empty());
    }

    #[tokio::test]
    async fn acknowledgement_resumes_a_suspended_gate() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe(Topic::Presentation);
        let gate = PresentationGate::new(bus, false);

        let stage = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.request_stage(PresentationStage::Windup, CombatantId(1), None)
                    .await
            })
        };
        let Some(Event::Presentation(PresentationEvent::AnimationStageRequest { ticket, .. })) =
            sub.recv().await
        else {
            panic!("expected a stage request");
        };

        gate.suspend();
        let turn = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_until_resumed().await })
        };
        tokio::task::yield_now().await;
        assert!(!turn.is_finished());

        // Unknown tickets are not a completion signal.
        assert!(!gate.stage_completed(StageTicket(ticket.0 + 100)));
        tokio::task::yield_now().await;
        assert!(gate.is_suspended());
        assert!(!turn.is_finished());

        assert!(gate.stage_completed(ticket));
        assert_eq!(stage.await.unwrap(), Ok(()));
        assert!(!gate.is_suspended());
        turn.await.unwrap();
    }

    #[tokio::test]
    async fn wait_until_clear_parks_while_locked() {
        let gate = PresentationGate::new(EventBus::new(), true);
        gate.set_lock(true);

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_until_clear().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        gate.set_lock(false);
        waiter.await.unwrap();
    }
}
