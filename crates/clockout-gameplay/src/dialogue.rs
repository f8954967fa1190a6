//! Dialogue coordination.
//!
//! When a chasing employee catches the boss it opens a dialogue, and the
//! only way out is to pass the paperwork challenge. The coordinator owns
//! the open-dialogue bookkeeping: it switches the session into
//! [`GameMode::InDialogue`] (where the clock keeps running), starts the
//! challenge, and on success or forced cancellation hands the employee back
//! to the caller so it can be sent home.

use clockout_common::EntityId;
use tracing::debug;

use crate::game_state::{GameMode, GameSession};
use crate::qte::{QteEngine, QteOutcome};

/// One open dialogue.
#[derive(Debug, Clone, PartialEq)]
struct ActiveDialogue {
    line: String,
    employee: EntityId,
}

/// Coordinates the dialogue interruption and its challenge gate.
#[derive(Debug, Default)]
pub struct DialogueCoordinator {
    active: Option<ActiveDialogue>,
}

impl DialogueCoordinator {
    /// Creates a coordinator with no open dialogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dialogue is currently open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The line being displayed, if a dialogue is open.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        self.active.as_ref().map(|dialogue| dialogue.line.as_str())
    }

    /// The employee that opened the current dialogue.
    #[must_use]
    pub fn employee(&self) -> Option<EntityId> {
        self.active.as_ref().map(|dialogue| dialogue.employee)
    }

    /// Opens a dialogue for `employee`, freezes play into
    /// [`GameMode::InDialogue`], and starts the challenge that gates it.
    ///
    /// A dialogue that is already open wins: the call is ignored and
    /// returns `false`.
    pub fn open(
        &mut self,
        line: impl Into<String>,
        employee: EntityId,
        session: &mut GameSession,
        qte: &mut QteEngine,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        let line = line.into();
        debug!(%employee, %line, "dialogue opened");
        self.active = Some(ActiveDialogue { line, employee });
        session.set_mode(GameMode::InDialogue);
        qte.start();
        true
    }

    /// Feeds a challenge outcome through the gate.
    ///
    /// On [`QteOutcome::Succeeded`] the dialogue closes and the employee is
    /// returned so the caller can notify it and restore play. Every other
    /// outcome leaves the dialogue open.
    pub fn handle_outcome(&mut self, outcome: QteOutcome) -> Option<EntityId> {
        if outcome != QteOutcome::Succeeded {
            return None;
        }
        let dialogue = self.active.take()?;
        debug!(employee = %dialogue.employee, "dialogue closed");
        Some(dialogue.employee)
    }

    /// Force-closes an open dialogue (e.g. the day ended mid-conversation).
    ///
    /// Cancels the challenge without success and still returns the employee
    /// so it heads home. Idempotent: returns `None` when nothing is open.
    pub fn cancel(&mut self, qte: &mut QteEngine) -> Option<EntityId> {
        let dialogue = self.active.take()?;
        qte.cancel();
        debug!(employee = %dialogue.employee, "dialogue cancelled");
        Some(dialogue.employee)
    }
}
