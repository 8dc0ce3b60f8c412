//! Rejections returned by glitch operations.
//!
//! None of these are fatal. Every one is reported back to the player that
//! caused it and leaves other players' state untouched.

use std::time::Duration;
use thiserror::Error;
use glitch_shared::GlitchKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlitchError {
    #[error("You already own {0}")]
    DuplicateOwnership(GlitchKind),

    #[error("You already have the maximum number of glitches equipped")]
    EquipCapExceeded,

    #[error("That glitch is already equipped")]
    AlreadyEquipped,

    #[error("You don't own that glitch")]
    NotOwned,

    #[error("That glitch is not equipped")]
    NotEquipped,

    #[error("{kind} is on cooldown for {} more seconds!", .remaining.as_secs())]
    OnCooldown { kind: GlitchKind, remaining: Duration },

    #[error("You can only have 2 glitches! You must die to lose one before getting another.")]
    GrantCapExceeded,

    #[error("Unknown glitch type: {0}")]
    UnknownType(String),

    #[error("Player not found")]
    UnknownPlayer,

    #[error("You don't have any glitches equipped!")]
    NothingEquipped,

    #[error("No glitch equipped in {} slot!", side(.slot))]
    EmptySlot { slot: u8 },

    #[error("The {0} is not yet implemented.")]
    Unimplemented(GlitchKind),

    #[error("That item is not a glitch")]
    NotAToken,
}

fn side(slot: &u8) -> &'static str {
    glitch_shared::slot_side(*slot)
}

/// Failures while loading configuration or recipe files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
