//! Server-side player entity.

use tokio::time::Instant;
use glitch_shared::{PlayerId, ServerMessage};

/// Where new players appear
pub const SPAWN_POSITION: [f64; 3] = [0.5, 64.0, 0.5];

/// Engine-side state of one connected player
#[derive(Debug)]
pub struct WorldPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: [f64; 3],
    /// Block the client reports looking at
    pub look_target: Option<[f64; 3]>,
    pub glowing: bool,
    /// Invisibility runs out by itself at this instant
    pub invisible_until: Option<Instant>,
    pub damage_immune: bool,
}

impl WorldPlayer {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            position: SPAWN_POSITION,
            look_target: None,
            glowing: false,
            invisible_until: None,
            damage_immune: false,
        }
    }

    pub fn is_invisible_at(&self, now: Instant) -> bool {
        self.invisible_until.is_some_and(|until| now < until)
    }

    pub fn distance_to(&self, point: [f64; 3]) -> f64 {
        let dx = point[0] - self.position[0];
        let dy = point[1] - self.position[1];
        let dz = point[2] - self.position[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Visible-state snapshot for other clients
    pub fn effect_update(&self, now: Instant) -> ServerMessage {
        ServerMessage::EffectUpdate {
            player_id: self.id,
            glowing: self.glowing,
            invisible: self.is_invisible_at(now),
            immune: self.damage_immune,
            position: self.position,
        }
    }
}
