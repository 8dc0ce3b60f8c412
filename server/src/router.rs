//! Maps the activation key plus modifier state onto an equipped slot.
//!
//! Modifier released selects the right slot (0), modifier held selects the
//! left slot (1). Also handles right-clicking a glitch token.

use std::collections::HashMap;
use std::sync::Arc;
use log::debug;
use parking_lot::Mutex;
use glitch_shared::{slot_side, GlitchKind, GlitchToken, PlayerId};

use crate::error::GlitchError;
use crate::glitch::GlitchFactory;
use crate::manager::GlitchManager;

/// A successful trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub slot: u8,
    pub kind: GlitchKind,
}

pub struct ActivationRouter {
    manager: GlitchManager,
    factory: Arc<GlitchFactory>,
    modifiers: Mutex<HashMap<PlayerId, bool>>,
}

impl ActivationRouter {
    pub fn new(manager: GlitchManager, factory: Arc<GlitchFactory>) -> Self {
        Self {
            manager,
            factory,
            modifiers: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_modifier_held(&self, player: PlayerId) -> bool {
        self.modifiers.lock().get(&player).copied().unwrap_or(false)
    }

    /// Record the modifier state and return the slot hint to show, if any
    pub fn set_modifier(&self, player: PlayerId, held: bool) -> Option<String> {
        self.modifiers.lock().insert(player, held);

        let equipped = self.manager.equipped(player).len();
        if held && equipped > 1 {
            Some("§eLeft glitch slot selected (use offhand keybind to activate)".to_string())
        } else if !held && equipped > 0 {
            Some("§eRight glitch slot selected (use offhand keybind to activate)".to_string())
        } else {
            None
        }
    }

    /// Activate the glitch in the slot the modifier currently selects
    pub fn trigger(&self, player: PlayerId) -> Result<Activation, GlitchError> {
        let equipped = self.manager.equipped(player);
        if equipped.is_empty() {
            return Err(GlitchError::NothingEquipped);
        }

        let slot: u8 = if self.is_modifier_held(player) { 1 } else { 0 };
        let glitch = equipped
            .get(slot as usize)
            .ok_or(GlitchError::EmptySlot { slot })?;

        debug!("Player {} triggered {} slot", player, slot_side(slot));
        self.manager.activate(player, glitch.id())?;
        Ok(Activation { slot, kind: glitch.kind() })
    }

    /// Turn a token into an owned glitch. The caller consumes one token on `Ok`.
    pub fn use_token(&self, player: PlayerId, token: &GlitchToken) -> Result<GlitchKind, GlitchError> {
        if !token.is_glitch_token() {
            return Err(GlitchError::NotAToken);
        }
        let kind = token
            .kind()
            .ok_or_else(|| GlitchError::UnknownType(glitch_shared::strip_formatting(&token.label)))?;
        if self.manager.owns_kind(player, kind) {
            return Err(GlitchError::DuplicateOwnership(kind));
        }
        self.manager.give(player, self.factory.create(kind))?;
        Ok(kind)
    }

    /// Drop the modifier state of a disconnected player
    pub fn forget(&self, player: PlayerId) {
        self.modifiers.lock().remove(&player);
    }

    /// Chat lines to show for a trigger outcome
    pub fn feedback(result: &Result<Activation, GlitchError>) -> Vec<String> {
        match result {
            Ok(activation) => vec![
                format!("§aActivated {}!", activation.kind.display_name()),
                format!("§7Used {} glitch slot", slot_side(activation.slot)),
            ],
            Err(GlitchError::NothingEquipped) => vec![
                format!("§c{}", GlitchError::NothingEquipped),
                "§eUse /glitch equip <glitch> to equip a glitch.".to_string(),
            ],
            Err(err) => vec![format!("§c{}", err)],
        }
    }

    /// Chat lines to show after using a token
    pub fn token_feedback(result: &Result<GlitchKind, GlitchError>) -> Vec<String> {
        match result {
            Ok(kind) => vec![
                format!("§aYou received {}!", kind.display_name()),
                format!("§eUse /glitch equip {} to equip it.", kind.key().to_lowercase()),
            ],
            Err(GlitchError::DuplicateOwnership(kind)) => {
                vec![format!("§eYou already own {}", kind.display_name())]
            }
            Err(err) => vec![format!("§c{}", err)],
        }
    }
}
