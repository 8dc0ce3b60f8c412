//! Read-only status snapshot of a player's equipped glitches.

use serde::{Deserialize, Serialize};
use crate::catalog::GlitchKind;

/// Maximum number of glitches a player can equip
pub const MAX_EQUIPPED: usize = 2;

/// State of one equipped glitch. Remaining times are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    Active { remaining_ms: u64 },
    OnCooldown { remaining_ms: u64 },
    Ready,
}

/// One equipped slot as shown on the action bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotStatus {
    /// 0 = right (primary), 1 = left (secondary)
    pub slot: u8,
    pub kind: GlitchKind,
    pub state: SlotState,
}

impl SlotStatus {
    /// Short slot label used on the action bar
    pub fn slot_label(&self) -> &'static str {
        slot_label(self.slot)
    }
}

/// `R` for slot 0, `L` for slot 1
pub fn slot_label(slot: u8) -> &'static str {
    if slot == 0 { "R" } else { "L" }
}

/// `right` for slot 0, `left` for slot 1
pub fn slot_side(slot: u8) -> &'static str {
    if slot == 0 { "right" } else { "left" }
}
