//! Network protocol definitions shared between client and server.

use serde::{Deserialize, Serialize};
use crate::catalog::GlitchKind;
use crate::status::SlotStatus;
use crate::token::GlitchToken;

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

/// Server tick rate in Hz
pub const SERVER_TICK_RATE: u32 = 20;

/// Default server port
pub const DEFAULT_PORT: u16 = 7777;

/// Runtime player identity
pub type PlayerId = u64;

// =============================================================================
// Client -> Server Messages
// =============================================================================

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Join the server under a player name
    Join {
        protocol_version: u32,
        name: String,
    },

    /// Disconnect gracefully
    Leave,

    /// Activation key pressed (offhand swap)
    Trigger,

    /// Modifier (crouch) pressed or released
    SetModifier {
        held: bool,
    },

    /// Right-click with a token in hand
    UseToken {
        token: GlitchToken,
    },

    /// Craft the token for a glitch kind
    Craft {
        kind: GlitchKind,
    },

    /// Pick up a token lying in the world
    Pickup {
        token: GlitchToken,
    },

    /// The player died
    Died,

    /// The block the player is currently looking at, if any
    LookAt {
        target: Option<[f64; 3]>,
    },

    /// Chat command, e.g. `/glitch equip immunity`
    Command {
        content: String,
    },

    /// Tab completion for the words typed after `/glitch`
    Complete {
        args: Vec<String>,
    },
}

// =============================================================================
// Server -> Client Messages
// =============================================================================

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Join accepted
    Joined {
        player_id: PlayerId,
    },

    /// Join refused
    JoinFailed {
        reason: String,
    },

    /// Chat line for the player
    Notice {
        text: String,
    },

    /// Action bar text plus the structured slot status behind it
    ActionBar {
        text: String,
        slots: Vec<SlotStatus>,
    },

    /// One token from the used stack was consumed
    TokenConsumed {
        kind: GlitchKind,
    },

    /// A token was dropped into the world at the player's location
    TokenDropped {
        token: GlitchToken,
        position: [f64; 3],
    },

    /// Crafting was cancelled
    CraftRejected {
        reason: String,
    },

    /// Crafting succeeded; the crafted token
    Crafted {
        token: GlitchToken,
    },

    /// Pickup was cancelled
    PickupRejected {
        reason: String,
    },

    /// Suggestions for a `Complete` request
    Completions {
        suggestions: Vec<String>,
    },

    /// Visible state of a player changed
    EffectUpdate {
        player_id: PlayerId,
        glowing: bool,
        invisible: bool,
        immune: bool,
        position: [f64; 3],
    },
}

// =============================================================================
// Serialization helpers
// =============================================================================

impl ClientMessage {
    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

impl ServerMessage {
    pub fn serialize(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}
