//! Glitch creation.
//!
//! Kinds are looked up in an open registry; any kind without a registered
//! effect gets the placeholder timings and an [`UnimplementedEffect`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use glitch_shared::GlitchKind;

use super::effects::{
    GlitchEffect, ImmunityEffect, InvisibilityEffect, TeleportEffect, UnimplementedEffect,
};
use super::Glitch;

pub const INVISIBILITY_COOLDOWN: Duration = Duration::from_secs(3 * 60);
pub const INVISIBILITY_DURATION: Duration = Duration::from_secs(30);
pub const IMMUNITY_COOLDOWN: Duration = Duration::from_secs(5 * 60);
pub const IMMUNITY_DURATION: Duration = Duration::from_secs(30);
pub const TELEPORT_COOLDOWN: Duration = Duration::from_secs(30);
pub const PLACEHOLDER_COOLDOWN: Duration = Duration::from_secs(60);
pub const PLACEHOLDER_DURATION: Duration = Duration::from_secs(30);

/// Builds a fresh effect object for each new instance
pub type EffectBuilder = Box<dyn Fn() -> Box<dyn GlitchEffect> + Send + Sync>;

struct Template {
    cooldown: Duration,
    duration: Duration,
    build: EffectBuilder,
}

pub struct GlitchFactory {
    templates: HashMap<GlitchKind, Template>,
}

impl GlitchFactory {
    /// Factory with no implemented kinds; everything is a placeholder
    pub fn empty() -> Self {
        Self { templates: HashMap::new() }
    }

    /// Factory with the built-in effects registered
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register(
            GlitchKind::Invisibility,
            INVISIBILITY_COOLDOWN,
            INVISIBILITY_DURATION,
            Box::new(|| Box::new(InvisibilityEffect { duration: INVISIBILITY_DURATION })),
        );
        factory.register(
            GlitchKind::Immunity,
            IMMUNITY_COOLDOWN,
            IMMUNITY_DURATION,
            Box::new(|| Box::new(ImmunityEffect { duration: IMMUNITY_DURATION })),
        );
        factory.register(
            GlitchKind::Teleport,
            TELEPORT_COOLDOWN,
            Duration::ZERO,
            Box::new(|| Box::new(TeleportEffect::default())),
        );
        factory
    }

    /// Register or replace the effect for a kind
    pub fn register(
        &mut self,
        kind: GlitchKind,
        cooldown: Duration,
        duration: Duration,
        build: EffectBuilder,
    ) {
        self.templates.insert(kind, Template { cooldown, duration, build });
    }

    pub fn is_implemented(&self, kind: GlitchKind) -> bool {
        self.templates.contains_key(&kind)
    }

    /// New instance with a fresh identity
    pub fn create(&self, kind: GlitchKind) -> Arc<Glitch> {
        let glitch = match self.templates.get(&kind) {
            Some(template) => Glitch::new(kind, template.cooldown, template.duration, (template.build)()),
            None => Glitch::new(
                kind,
                PLACEHOLDER_COOLDOWN,
                PLACEHOLDER_DURATION,
                Box::new(UnimplementedEffect),
            ),
        };
        Arc::new(glitch)
    }
}

impl Default for GlitchFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlitchError;
    use crate::glitch::EffectContext;
    use crate::testing::RecordingHost;

    #[test]
    fn test_builtin_timings() {
        let factory = GlitchFactory::new();

        let invis = factory.create(GlitchKind::Invisibility);
        assert_eq!(invis.cooldown(), Duration::from_secs(180));
        assert_eq!(invis.duration(), Duration::from_secs(30));

        let teleport = factory.create(GlitchKind::Teleport);
        assert_eq!(teleport.cooldown(), Duration::from_secs(30));
        assert!(!teleport.is_timed());

        let immunity = factory.create(GlitchKind::Immunity);
        assert_eq!(immunity.cooldown(), Duration::from_secs(300));
    }

    #[test]
    fn test_each_create_is_a_new_identity() {
        let factory = GlitchFactory::new();
        let a = factory.create(GlitchKind::Immunity);
        let b = factory.create(GlitchKind::Immunity);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test(start_paused = true)]
    async fn test_placeholder_refuses_without_cooldown() {
        let factory = GlitchFactory::new();
        let host = RecordingHost::default();
        let glitch = factory.create(GlitchKind::Herobrine);

        assert!(!factory.is_implemented(GlitchKind::Herobrine));
        assert_eq!(glitch.cooldown(), PLACEHOLDER_COOLDOWN);

        let ctx = EffectContext { player: 1, host: &host };
        assert_eq!(glitch.activate(&ctx), Err(GlitchError::Unimplemented(GlitchKind::Herobrine)));
        assert!(!glitch.is_on_cooldown());
        assert!(!glitch.is_active());
    }

    #[test]
    fn test_register_replaces_placeholder() {
        let mut factory = GlitchFactory::new();
        factory.register(
            GlitchKind::Freeze,
            Duration::from_secs(10),
            Duration::ZERO,
            Box::new(|| Box::new(TeleportEffect::default())),
        );
        assert!(factory.is_implemented(GlitchKind::Freeze));
        assert_eq!(factory.create(GlitchKind::Freeze).cooldown(), Duration::from_secs(10));
    }
}
