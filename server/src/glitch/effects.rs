//! Concrete glitch effects.
//!
//! Effects only talk to the world through [`GameHost`]. They run while the
//! owning player's record is locked and must not call back into the manager.

use std::time::Duration;
use glitch_shared::PlayerId;

use crate::host::GameHost;

/// Maximum teleport distance in blocks
pub const TELEPORT_MAX_DISTANCE: u32 = 20;

/// Who an effect applies to, and the world it acts on
pub struct EffectContext<'a> {
    pub player: PlayerId,
    pub host: &'a dyn GameHost,
}

impl EffectContext<'_> {
    fn tell(&self, text: &str) {
        self.host.send_message(self.player, text);
    }
}

/// Activation and deactivation hooks of one glitch kind
pub trait GlitchEffect: Send + Sync {
    fn on_activate(&self, ctx: &EffectContext<'_>);

    fn on_deactivate(&self, ctx: &EffectContext<'_>);

    /// Placeholders return false so activation is refused instead of faked
    fn is_implemented(&self) -> bool {
        true
    }
}

// =============================================================================
// Invisibility
// =============================================================================

/// Full invisibility, armor and held items included
pub struct InvisibilityEffect {
    pub duration: Duration,
}

impl GlitchEffect for InvisibilityEffect {
    fn on_activate(&self, ctx: &EffectContext<'_>) {
        ctx.host.set_invisible(ctx.player, Some(self.duration));
        ctx.tell(&format!(
            "§aYou activated the Invisibility Glitch! You are now completely invisible for {} seconds.",
            self.duration.as_secs()
        ));
    }

    fn on_deactivate(&self, ctx: &EffectContext<'_>) {
        ctx.host.set_invisible(ctx.player, None);
        ctx.tell("§cYour Invisibility Glitch has worn off.");
    }
}

// =============================================================================
// Immunity
// =============================================================================

/// Cancels all incoming damage and makes the player glow
pub struct ImmunityEffect {
    pub duration: Duration,
}

impl GlitchEffect for ImmunityEffect {
    fn on_activate(&self, ctx: &EffectContext<'_>) {
        ctx.host.set_damage_immune(ctx.player, true);
        ctx.host.set_glowing(ctx.player, true);
        ctx.tell(&format!(
            "§aYou activated the Immunity Glitch! You are now immune to all damage for {} seconds.",
            self.duration.as_secs()
        ));
    }

    fn on_deactivate(&self, ctx: &EffectContext<'_>) {
        ctx.host.set_damage_immune(ctx.player, false);
        ctx.host.set_glowing(ctx.player, false);
        ctx.tell("§cYour Immunity Glitch has worn off.");
    }
}

// =============================================================================
// Teleport
// =============================================================================

/// Instant teleport on top of the block the player is looking at
pub struct TeleportEffect {
    pub max_distance: u32,
}

impl Default for TeleportEffect {
    fn default() -> Self {
        Self { max_distance: TELEPORT_MAX_DISTANCE }
    }
}

impl GlitchEffect for TeleportEffect {
    fn on_activate(&self, ctx: &EffectContext<'_>) {
        // A miss still counts as an activation; the cooldown is spent.
        let Some(block) = ctx.host.target_block(ctx.player, self.max_distance) else {
            ctx.tell("§cNo valid teleport location found within range.");
            return;
        };

        let destination = [block[0] + 0.5, block[1] + 1.0, block[2] + 0.5];
        ctx.host.teleport(ctx.player, destination);
        ctx.tell("§aYou activated the Teleport Glitch!");
    }

    fn on_deactivate(&self, _ctx: &EffectContext<'_>) {}
}

// =============================================================================
// Placeholder
// =============================================================================

/// Stand-in for kinds that have no effect yet
pub struct UnimplementedEffect;

impl GlitchEffect for UnimplementedEffect {
    fn on_activate(&self, _ctx: &EffectContext<'_>) {}

    fn on_deactivate(&self, _ctx: &EffectContext<'_>) {}

    fn is_implemented(&self) -> bool {
        false
    }
}
