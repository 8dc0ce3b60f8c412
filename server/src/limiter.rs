//! Scarcity rules: a per-player grant counter for crafting and pickups, and
//! the random glitch drop on death.

use std::collections::HashMap;
use std::sync::Arc;
use log::{info, warn};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use glitch_shared::{GlitchToken, PlayerId};

use crate::error::GlitchError;
use crate::glitch::Glitch;
use crate::manager::GlitchManager;

/// Maximum number of craft/pickup grants a player may hold
pub const GRANT_CAP: u8 = 2;

/// What a dying player loses
#[derive(Debug)]
pub struct DeathDrop {
    pub glitch: Arc<Glitch>,
    /// Token to drop at the death location
    pub token: GlitchToken,
}

pub struct CraftingLimiter {
    manager: GlitchManager,
    counts: Mutex<HashMap<PlayerId, u8>>,
}

impl CraftingLimiter {
    pub fn new(manager: GlitchManager) -> Self {
        Self {
            manager,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Reserve one grant. Returns the new count.
    pub fn request_grant(&self, player: PlayerId) -> Result<u8, GlitchError> {
        let mut counts = self.counts.lock();
        let count = counts.entry(player).or_insert(0);
        if *count >= GRANT_CAP {
            return Err(GlitchError::GrantCapExceeded);
        }
        *count += 1;
        Ok(*count)
    }

    pub fn on_craft(&self, player: PlayerId) -> Result<u8, GlitchError> {
        self.request_grant(player)
    }

    /// Gate picking up a stack. Stacks that are not glitch tokens pass freely.
    pub fn on_pickup(&self, player: PlayerId, token: &GlitchToken) -> Result<Option<u8>, GlitchError> {
        let Some(kind) = token.kind() else {
            return Ok(None);
        };
        if self.manager.owns_kind(player, kind) {
            return Err(GlitchError::DuplicateOwnership(kind));
        }
        self.request_grant(player).map(Some)
    }

    /// Take one owned glitch at random and hand back the token to drop
    pub fn on_death(&self, player: PlayerId) -> Option<DeathDrop> {
        let owned = self.manager.owned(player);
        let chosen = owned.choose(&mut rand::thread_rng())?.clone();

        let glitch = match self.manager.remove(player, chosen.id()) {
            Ok(glitch) => glitch,
            Err(e) => {
                warn!("Death drop for player {} failed: {}", player, e);
                return None;
            }
        };

        {
            let mut counts = self.counts.lock();
            let count = counts.entry(player).or_insert(0);
            *count = count.saturating_sub(1);
        }

        info!("Player {} died and dropped {}", player, glitch.name());
        let token = GlitchToken::for_kind(glitch.kind());
        Some(DeathDrop { glitch, token })
    }

    pub fn reset(&self, player: PlayerId) {
        self.counts.lock().insert(player, 0);
    }

    pub fn get(&self, player: PlayerId) -> u8 {
        self.counts.lock().get(&player).copied().unwrap_or(0)
    }
}
