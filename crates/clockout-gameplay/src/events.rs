//! Event bus for the display layers.
//!
//! The simulation core never draws anything; panels, HUD widgets, and the
//! floor loader subscribe to these events instead. Publishing is
//! non-blocking — if the channel fills up, the event is dropped rather than
//! stalling the tick.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use clockout_common::EntityId;

use crate::qte::ChallengeKind;

/// Domain events emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An employee cornered the boss and a dialogue opened.
    DialogueOpened {
        /// Employee that opened the dialogue
        employee: EntityId,
        /// Line being displayed
        line: String,
    },
    /// The dialogue was closed (challenge passed).
    DialogueClosed {
        /// Employee that had the dialogue open
        employee: EntityId,
    },
    /// The challenge was failed and redrawn with a new prompt.
    ChallengeRedrawn {
        /// Kind of the freshly drawn session
        kind: ChallengeKind,
    },
    /// The challenge was passed.
    ChallengeSucceeded,
    /// An employee was knocked back by an attack.
    EmployeeKnockedBack {
        /// The employee that was hit
        employee: EntityId,
    },
    /// The player swung an attack (display the slash).
    AttackSwung,
    /// The clock hit 5:00 PM and the day was lost.
    DayEnded {
        /// Day number that just ended
        day: u32,
    },
    /// The last floor was cleared.
    DayWon {
        /// Day number that was won
        day: u32,
    },
    /// The player reached a staircase and moved up a floor.
    FloorAdvanced {
        /// New floor index
        floor: usize,
    },
    /// The pause state flipped.
    PauseToggled {
        /// Whether the game is now paused
        paused: bool,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}
