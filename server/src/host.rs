//! Interface to the hosting game engine.
//!
//! Glitch effects and the status reporter only ever talk to the world through
//! this trait. It is called from game-event handling and from timer tasks, so
//! implementations must be thread-safe.

use std::time::Duration;
use glitch_shared::{GlitchToken, PlayerId, SlotStatus};

pub trait GameHost: Send + Sync {
    /// Send a chat line to a player
    fn send_message(&self, player: PlayerId, text: &str);

    /// Replace the player's action bar text
    fn send_action_bar(&self, player: PlayerId, text: &str, slots: &[SlotStatus]);

    /// Toggle the glowing outline
    fn set_glowing(&self, player: PlayerId, glowing: bool);

    /// Make the player fully invisible for `duration`, or clear it with `None`
    fn set_invisible(&self, player: PlayerId, duration: Option<Duration>);

    /// Cancel all incoming damage while enabled
    fn set_damage_immune(&self, player: PlayerId, immune: bool);

    /// First non-air block along the player's view, up to `max_distance` blocks
    fn target_block(&self, player: PlayerId, max_distance: u32) -> Option<[f64; 3]>;

    fn teleport(&self, player: PlayerId, position: [f64; 3]);

    /// Drop a token into the world at the player's location
    fn drop_token(&self, player: PlayerId, token: &GlitchToken);

    /// Resolve an online player by name (case-insensitive)
    fn find_player(&self, name: &str) -> Option<PlayerId>;

    fn player_name(&self, player: PlayerId) -> Option<String>;

    /// Names of all online players
    fn online_names(&self) -> Vec<String>;
}
