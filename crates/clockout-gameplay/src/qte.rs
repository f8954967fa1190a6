//! Timed paperwork challenges (quick-time events).
//!
//! At most one challenge session is active at a time. A session is either a
//! key press ("Press [F] to approve the budget") or a click target ("Sign
//! here ↓") with a countdown. Wrong input and timeouts are handled the same
//! way: the panel shakes briefly, input is suspended, and a freshly drawn
//! session (possibly of the other kind) restarts the full countdown — the
//! challenge can delay the player but never hard-fail them.
//!
//! Completion is reported as a [`QteOutcome`] from the per-tick update; the
//! caller reacts to `Succeeded` exactly once. Cancellation never produces
//! it.

use clockout_common::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::input::{Input, KeyCode};

/// The two kinds of challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Press one specific key; any other key is a failure.
    KeyPress,
    /// Click a target placed somewhere on the panel.
    ClickTarget,
}

/// Keys a key-press challenge can ask for.
const KEY_POOL: [KeyCode; 20] = [
    KeyCode::F,
    KeyCode::G,
    KeyCode::H,
    KeyCode::J,
    KeyCode::K,
    KeyCode::L,
    KeyCode::Q,
    KeyCode::R,
    KeyCode::T,
    KeyCode::U,
    KeyCode::I,
    KeyCode::O,
    KeyCode::P,
    KeyCode::Z,
    KeyCode::X,
    KeyCode::C,
    KeyCode::V,
    KeyCode::B,
    KeyCode::N,
    KeyCode::M,
];

/// Prompt templates for key-press challenges; `{key}` is replaced by the
/// key name.
const KEY_PRESS_PROMPTS: [&str; 8] = [
    "Press [{key}] to approve the budget",
    "Press [{key}] to sign the memo",
    "Press [{key}] to authorize the expense report",
    "Press [{key}] to confirm the meeting",
    "Press [{key}] to acknowledge receipt",
    "Press [{key}] to endorse the proposal",
    "Press [{key}] to initial the document",
    "Press [{key}] to stamp APPROVED",
];

/// Prompt templates for click-target challenges.
const CLICK_TARGET_PROMPTS: [&str; 6] = [
    "Sign here \u{2193}",
    "Stamp this \u{2193}",
    "Initial here \u{2193}",
    "Click to approve \u{2193}",
    "Rubber-stamp this \u{2193}",
    "Put your John Hancock here \u{2193}",
];

/// Panel geometry used to place the click target.
///
/// Coordinates are panel-local with the origin at the panel center. The
/// target is placed inside the panel minus a margin, and strictly below the
/// prompt text so the two never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    /// Panel width in UI units.
    pub panel_width: f32,
    /// Panel height in UI units.
    pub panel_height: f32,
    /// Click target width.
    pub target_width: f32,
    /// Click target height.
    pub target_height: f32,
    /// Padding kept from the panel edges.
    pub margin: f32,
    /// Panel-local y of the prompt text's bottom edge.
    pub prompt_bottom: f32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            panel_width: 600.0,
            panel_height: 400.0,
            target_width: 120.0,
            target_height: 60.0,
            margin: 10.0,
            prompt_bottom: 100.0,
        }
    }
}

impl PanelLayout {
    /// Horizontal placement bound for the target center (symmetric).
    fn half_width(&self) -> f32 {
        (self.panel_width * 0.5 - self.target_width * 0.5 - self.margin).max(0.0)
    }

    /// Lowest valid y for the target center.
    fn spawn_bottom(&self) -> f32 {
        -self.panel_height * 0.5 + self.target_height * 0.5 + self.margin
    }

    /// Highest valid y for the target center: just below the prompt, clamped
    /// in case the prompt fills most of the panel.
    fn spawn_top(&self) -> f32 {
        let top = self.prompt_bottom - self.target_height * 0.5 - self.margin;
        top.max(self.spawn_bottom())
    }
}

/// Configuration for the challenge engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QteConfig {
    /// Countdown length for every session.
    pub time_limit: f32,
    /// Length of the shake feedback after a failure.
    pub shake_duration: f32,
    /// Maximum shake offset on each axis.
    pub shake_intensity: f32,
    /// Panel geometry for click-target placement.
    pub layout: PanelLayout,
}

impl Default for QteConfig {
    fn default() -> Self {
        Self {
            time_limit: 3.0,
            shake_duration: 0.3,
            shake_intensity: 10.0,
            layout: PanelLayout::default(),
        }
    }
}

/// One active challenge session.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    kind: ChallengeKind,
    key: Option<KeyCode>,
    prompt: String,
    target_pos: Option<Vec2>,
}

impl Challenge {
    /// The kind of this session.
    #[must_use]
    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    /// Target key (key-press sessions only).
    #[must_use]
    pub fn key(&self) -> Option<KeyCode> {
        self.key
    }

    /// Prompt to display.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Panel-local target position (click-target sessions only).
    #[must_use]
    pub fn target_pos(&self) -> Option<Vec2> {
        self.target_pos
    }
}

/// Result of one challenge engine tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QteOutcome {
    /// No session is active.
    Inactive,
    /// A session is active and still running (possibly mid-shake).
    Continuing,
    /// The player passed the challenge. Reported exactly once per session.
    Succeeded,
    /// A failure finished shaking and a fresh session was drawn.
    Redrawn,
}

/// Shake feedback in progress.
#[derive(Debug, Clone, Copy)]
struct Shake {
    elapsed: f32,
    offset: Vec2,
}

/// The challenge engine. Owns the single active session slot.
#[derive(Debug)]
pub struct QteEngine {
    config: QteConfig,
    challenge: Option<Challenge>,
    time_remaining: f32,
    shake: Option<Shake>,
    pending_target_hit: bool,
    rng: fastrand::Rng,
}

impl Default for QteEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QteEngine {
    /// Creates an engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QteConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: QteConfig) -> Self {
        Self {
            config,
            challenge: None,
            time_remaining: 0.0,
            shake: None,
            pending_target_hit: false,
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates an engine with a seeded RNG (for tests).
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut engine = Self::new();
        engine.rng = fastrand::Rng::with_seed(seed);
        engine
    }

    /// Whether a session is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.challenge.is_some()
    }

    /// Whether the shake feedback is currently playing.
    #[must_use]
    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.time_remaining
    }

    /// Fraction of the countdown left, for the timer bar.
    #[must_use]
    pub fn remaining_fraction(&self) -> f32 {
        if self.config.time_limit <= 0.0 {
            return 0.0;
        }
        (self.time_remaining / self.config.time_limit).clamp(0.0, 1.0)
    }

    /// Panel offset for the shake feedback; zero when not shaking.
    #[must_use]
    pub fn panel_offset(&self) -> Vec2 {
        self.shake.map_or(Vec2::ZERO, |shake| shake.offset)
    }

    /// Starts a new session with a uniformly random kind.
    ///
    /// Returns `false` (and changes nothing) if a session is already
    /// active — concurrent starts are rejected, never queued.
    pub fn start(&mut self) -> bool {
        let kind = if self.rng.bool() {
            ChallengeKind::KeyPress
        } else {
            ChallengeKind::ClickTarget
        };
        self.start_with(kind)
    }

    /// Starts a new session of a specific kind. Same exclusivity as
    /// [`Self::start`].
    pub fn start_with(&mut self, kind: ChallengeKind) -> bool {
        if self.is_active() {
            return false;
        }
        self.setup(kind);
        true
    }

    /// Ends any active session without reporting success. Idempotent, and
    /// preempts a shake in progress without leaving stale state.
    pub fn cancel(&mut self) {
        if self.challenge.take().is_some() {
            debug!("challenge cancelled");
        }
        self.shake = None;
        self.pending_target_hit = false;
        self.time_remaining = 0.0;
    }

    /// Signals that the click target was activated (wired from the UI
    /// layer). The success surfaces through the next [`Self::update`] call.
    pub fn notify_target_hit(&mut self) {
        if self.shake.is_some() {
            return;
        }
        if let Some(challenge) = &self.challenge {
            if challenge.kind == ChallengeKind::ClickTarget {
                self.pending_target_hit = true;
            }
        }
    }

    /// Advances the active session by one tick.
    pub fn update(&mut self, dt: f32, input: &Input) -> QteOutcome {
        let Some(challenge) = &self.challenge else {
            return QteOutcome::Inactive;
        };
        let kind = challenge.kind;
        let key = challenge.key;

        // Shake feedback: input stays suspended until it finishes, then a
        // fresh session is drawn with a full countdown.
        if let Some(shake) = &mut self.shake {
            shake.elapsed += dt;
            if shake.elapsed >= self.config.shake_duration {
                self.shake = None;
                let kind = if self.rng.bool() {
                    ChallengeKind::KeyPress
                } else {
                    ChallengeKind::ClickTarget
                };
                self.setup(kind);
                return QteOutcome::Redrawn;
            }
            let intensity = self.config.shake_intensity;
            shake.offset = Vec2::new(
                (self.rng.f32() * 2.0 - 1.0) * intensity,
                (self.rng.f32() * 2.0 - 1.0) * intensity,
            );
            return QteOutcome::Continuing;
        }

        // Externally signalled click-target success.
        if self.pending_target_hit {
            self.pending_target_hit = false;
            self.challenge = None;
            self.time_remaining = 0.0;
            debug!("challenge passed (click target)");
            return QteOutcome::Succeeded;
        }

        // Countdown.
        self.time_remaining -= dt;
        if self.time_remaining <= 0.0 {
            debug!("challenge timed out");
            self.begin_shake();
            return QteOutcome::Continuing;
        }

        // Key-press input: the right key wins, any other key fails.
        if kind == ChallengeKind::KeyPress {
            if let Some(key) = key {
                if input.key_just_pressed(key) {
                    self.challenge = None;
                    self.time_remaining = 0.0;
                    debug!("challenge passed (key press)");
                    return QteOutcome::Succeeded;
                }
                if input.any_key_just_pressed() {
                    debug!("wrong key");
                    self.begin_shake();
                }
            }
        }

        QteOutcome::Continuing
    }

    fn begin_shake(&mut self) {
        self.shake = Some(Shake {
            elapsed: 0.0,
            offset: Vec2::ZERO,
        });
        self.pending_target_hit = false;
    }

    fn setup(&mut self, kind: ChallengeKind) {
        self.time_remaining = self.config.time_limit;
        self.pending_target_hit = false;

        let challenge = match kind {
            ChallengeKind::KeyPress => {
                let key = KEY_POOL[self.rng.usize(..KEY_POOL.len())];
                let template = KEY_PRESS_PROMPTS[self.rng.usize(..KEY_PRESS_PROMPTS.len())];
                Challenge {
                    kind,
                    key: Some(key),
                    prompt: template.replace("{key}", key.name()),
                    target_pos: None,
                }
            }
            ChallengeKind::ClickTarget => {
                let prompt = CLICK_TARGET_PROMPTS[self.rng.usize(..CLICK_TARGET_PROMPTS.len())];
                Challenge {
                    kind,
                    key: None,
                    prompt: prompt.to_string(),
                    target_pos: Some(self.roll_target_pos()),
                }
            }
        };
        debug!(kind = ?challenge.kind, "challenge drawn");
        self.challenge = Some(challenge);
    }

    fn roll_target_pos(&mut self) -> Vec2 {
        let layout = self.config.layout;
        let half_width = layout.half_width();
        let bottom = layout.spawn_bottom();
        let top = layout.spawn_top();
        Vec2::new(
            -half_width + self.rng.f32() * (half_width * 2.0),
            bottom + self.rng.f32() * (top - bottom),
        )
    }
}
