//! Glitch instances: timed state objects with cooldown and active windows.
//!
//! Cooldown and activity are two independent predicates over the same
//! activation timestamp. Every defined glitch has `cooldown >= duration`, so
//! in practice the active window is a prefix of the cooldown window.

pub mod effects;
pub mod factory;

pub use effects::{EffectContext, GlitchEffect};
pub use factory::GlitchFactory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use parking_lot::Mutex;
use tokio::time::Instant;
use glitch_shared::GlitchKind;

use crate::error::GlitchError;

/// Global glitch-ID generator
static NEXT_GLITCH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a glitch instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlitchId(u64);

impl GlitchId {
    fn next() -> Self {
        Self(NEXT_GLITCH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for GlitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct ActivationState {
    last_activation: Option<Instant>,
    /// Set by a timed activation, cleared by the first deactivation after it
    engaged: bool,
    /// Bumped on every successful activation
    epoch: u64,
}

/// One owned glitch. Two instances of the same kind are distinct.
pub struct Glitch {
    id: GlitchId,
    kind: GlitchKind,
    cooldown: Duration,
    duration: Duration,
    effect: Box<dyn GlitchEffect>,
    state: Mutex<ActivationState>,
}

impl Glitch {
    pub fn new(
        kind: GlitchKind,
        cooldown: Duration,
        duration: Duration,
        effect: Box<dyn GlitchEffect>,
    ) -> Self {
        Self {
            id: GlitchId::next(),
            kind,
            cooldown,
            duration,
            effect,
            state: Mutex::new(ActivationState::default()),
        }
    }

    pub fn id(&self) -> GlitchId {
        self.id
    }

    pub fn kind(&self) -> GlitchKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Zero means the effect is instantaneous
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a successful activation needs a deactivation timer
    pub fn is_timed(&self) -> bool {
        !self.duration.is_zero()
    }

    /// Activation counter, used to match timers to the activation that armed them
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Try to fire the glitch.
    ///
    /// Refused while on cooldown, and for kinds without a concrete effect.
    /// On success the timestamp is updated before the effect runs.
    pub fn activate(&self, ctx: &EffectContext<'_>) -> Result<(), GlitchError> {
        let now = Instant::now();
        {
            let mut state = self.state.lock();
            let remaining = remaining_since(state.last_activation, self.cooldown, now);
            if !remaining.is_zero() {
                return Err(GlitchError::OnCooldown { kind: self.kind, remaining });
            }
            if !self.effect.is_implemented() {
                return Err(GlitchError::Unimplemented(self.kind));
            }
            state.last_activation = Some(now);
            state.engaged = self.is_timed();
            state.epoch += 1;
        }
        self.effect.on_activate(ctx);
        Ok(())
    }

    /// Run the deactivation effect if a timed activation is still engaged.
    ///
    /// Safe to call in any state; returns whether the effect actually ran.
    pub fn deactivate(&self, ctx: &EffectContext<'_>) -> bool {
        let was_engaged = std::mem::take(&mut self.state.lock().engaged);
        if was_engaged {
            self.effect.on_deactivate(ctx);
        }
        was_engaged
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.is_on_cooldown_at(Instant::now())
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    pub fn remaining_cooldown(&self) -> Duration {
        self.remaining_cooldown_at(Instant::now())
    }

    pub fn remaining_duration(&self) -> Duration {
        self.remaining_duration_at(Instant::now())
    }

    pub fn is_on_cooldown_at(&self, now: Instant) -> bool {
        !self.remaining_cooldown_at(now).is_zero()
    }

    pub fn is_active_at(&self, now: Instant) -> bool {
        !self.remaining_duration_at(now).is_zero()
    }

    pub fn remaining_cooldown_at(&self, now: Instant) -> Duration {
        remaining_since(self.state.lock().last_activation, self.cooldown, now)
    }

    pub fn remaining_duration_at(&self, now: Instant) -> Duration {
        remaining_since(self.state.lock().last_activation, self.duration, now)
    }
}

/// Time left in a window of `length` opened at `start`, clamped at zero
fn remaining_since(start: Option<Instant>, length: Duration, now: Instant) -> Duration {
    match start {
        Some(start) => length.saturating_sub(now.saturating_duration_since(start)),
        None => Duration::ZERO,
    }
}

impl PartialEq for Glitch {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Glitch {}

impl std::fmt::Debug for Glitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glitch")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("cooldown", &self.cooldown)
            .field("duration", &self.duration)
            .finish()
    }
}
