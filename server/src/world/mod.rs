//! Headless game world.
//!
//! Implements [`GameHost`] over an in-memory player table. Everything the
//! glitch core asks of the engine turns into queued [`ServerMessage`]s that the
//! network layer drains once per tick.

mod player;

pub use player::{WorldPlayer, SPAWN_POSITION};

use std::collections::HashMap;
use std::time::Duration;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use glitch_shared::{GlitchToken, PlayerId, ServerMessage, SlotStatus};

use crate::host::GameHost;

/// The game world containing all connected players
pub struct GameWorld {
    players: RwLock<HashMap<PlayerId, WorldPlayer>>,
    /// Lower-cased name to the id it was first given; reused on rejoin
    known_ids: Mutex<HashMap<String, PlayerId>>,
    next_player_id: Mutex<PlayerId>,
    outbox: Mutex<Vec<(PlayerId, ServerMessage)>>,
}

impl GameWorld {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            known_ids: Mutex::new(HashMap::new()),
            next_player_id: Mutex::new(1),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Spawn a player and return their id.
    ///
    /// Ids are stable per name for the lifetime of the world, so a player who
    /// reconnects gets the same id back.
    pub fn spawn_player(&self, name: String) -> PlayerId {
        let id = *self
            .known_ids
            .lock()
            .entry(name.to_lowercase())
            .or_insert_with(|| {
                let mut next = self.next_player_id.lock();
                let id = *next;
                *next += 1;
                id
            });
        info!("Player {} ({}) spawned", name, id);
        self.players.write().insert(id, WorldPlayer::new(id, name));
        id
    }

    pub fn despawn_player(&self, id: PlayerId) {
        if let Some(player) = self.players.write().remove(&id) {
            info!("Player {} ({}) despawned", player.name, id);
        }
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.players.read().contains_key(&id)
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.players.read().values().any(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn set_look_target(&self, id: PlayerId, target: Option<[f64; 3]>) {
        if let Some(player) = self.players.write().get_mut(&id) {
            player.look_target = target;
        }
    }

    pub fn position(&self, id: PlayerId) -> Option<[f64; 3]> {
        self.players.read().get(&id).map(|p| p.position)
    }

    pub fn is_damage_immune(&self, id: PlayerId) -> bool {
        self.players.read().get(&id).is_some_and(|p| p.damage_immune)
    }

    pub fn is_glowing(&self, id: PlayerId) -> bool {
        self.players.read().get(&id).is_some_and(|p| p.glowing)
    }

    pub fn is_invisible(&self, id: PlayerId) -> bool {
        self.players.read().get(&id).is_some_and(|p| p.is_invisible_at(Instant::now()))
    }

    /// Queue a message for one player
    pub fn push(&self, to: PlayerId, msg: ServerMessage) {
        self.outbox.lock().push((to, msg));
    }

    /// Queue a message for every connected player
    pub fn broadcast(&self, msg: ServerMessage) {
        let ids: Vec<PlayerId> = self.players.read().keys().copied().collect();
        let mut outbox = self.outbox.lock();
        for id in ids {
            outbox.push((id, msg.clone()));
        }
    }

    /// Take everything queued since the last drain
    pub fn drain_outbox(&self) -> Vec<(PlayerId, ServerMessage)> {
        std::mem::take(&mut *self.outbox.lock())
    }

    /// Expire invisibility that ran out on its own
    pub fn update(&self, _tick: u64) {
        let now = Instant::now();
        let mut expired = Vec::new();
        {
            let mut players = self.players.write();
            for player in players.values_mut() {
                if player.invisible_until.is_some_and(|until| now >= until) {
                    player.invisible_until = None;
                    expired.push(player.effect_update(now));
                }
            }
        }
        for update in expired {
            self.broadcast(update);
        }
    }

    /// Apply a change to a player and tell everyone about it
    fn modify_player(&self, id: PlayerId, change: impl FnOnce(&mut WorldPlayer)) {
        let update = {
            let mut players = self.players.write();
            let Some(player) = players.get_mut(&id) else {
                debug!("Ignoring world change for unknown player {}", id);
                return;
            };
            change(player);
            player.effect_update(Instant::now())
        };
        self.broadcast(update);
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GameHost for GameWorld {
    fn send_message(&self, player: PlayerId, text: &str) {
        self.push(player, ServerMessage::Notice { text: text.to_string() });
    }

    fn send_action_bar(&self, player: PlayerId, text: &str, slots: &[SlotStatus]) {
        self.push(player, ServerMessage::ActionBar {
            text: text.to_string(),
            slots: slots.to_vec(),
        });
    }

    fn set_glowing(&self, player: PlayerId, glowing: bool) {
        self.modify_player(player, |p| p.glowing = glowing);
    }

    fn set_invisible(&self, player: PlayerId, duration: Option<Duration>) {
        let until = duration.map(|d| Instant::now() + d);
        self.modify_player(player, |p| p.invisible_until = until);
    }

    fn set_damage_immune(&self, player: PlayerId, immune: bool) {
        self.modify_player(player, |p| p.damage_immune = immune);
    }

    fn target_block(&self, player: PlayerId, max_distance: u32) -> Option<[f64; 3]> {
        let players = self.players.read();
        let player = players.get(&player)?;
        let target = player.look_target?;
        (player.distance_to(target) <= f64::from(max_distance)).then_some(target)
    }

    fn teleport(&self, player: PlayerId, position: [f64; 3]) {
        self.modify_player(player, |p| p.position = position);
    }

    fn drop_token(&self, player: PlayerId, token: &GlitchToken) {
        let Some(position) = self.position(player) else {
            return;
        };
        self.broadcast(ServerMessage::TokenDropped { token: token.clone(), position });
    }

    fn find_player(&self, name: &str) -> Option<PlayerId> {
        self.players
            .read()
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }

    fn player_name(&self, player: PlayerId) -> Option<String> {
        self.players.read().get(&player).map(|p| p.name.clone())
    }

    fn online_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.players.read().values().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_shared::GlitchKind;

    #[test]
    fn test_target_block_respects_range() {
        let world = GameWorld::new();
        let id = world.spawn_player("Alex".to_string());

        assert_eq!(world.target_block(id, 20), None);

        let near = [SPAWN_POSITION[0] + 10.0, SPAWN_POSITION[1], SPAWN_POSITION[2]];
        world.set_look_target(id, Some(near));
        assert_eq!(world.target_block(id, 20), Some(near));

        let far = [SPAWN_POSITION[0] + 30.0, SPAWN_POSITION[1], SPAWN_POSITION[2]];
        world.set_look_target(id, Some(far));
        assert_eq!(world.target_block(id, 20), None);
    }

    #[test]
    fn test_effect_changes_are_broadcast() {
        let world = GameWorld::new();
        let a = world.spawn_player("Alex".to_string());
        let b = world.spawn_player("Steve".to_string());

        world.set_glowing(a, true);
        let out = world.drain_outbox();
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|(to, _)| *to == b));
        assert!(matches!(out[0].1, ServerMessage::EffectUpdate { glowing: true, .. }));
        assert!(world.drain_outbox().is_empty());
    }

    #[test]
    fn test_glow_and_immunity_flags() {
        let world = GameWorld::new();
        let a = world.spawn_player("Alex".to_string());
        let b = world.spawn_player("Steve".to_string());

        world.set_glowing(a, true);
        world.set_damage_immune(a, true);
        assert!(world.is_glowing(a));
        assert!(world.is_damage_immune(a));
        assert!(!world.is_glowing(b));
        assert!(!world.is_damage_immune(b));

        world.set_damage_immune(a, false);
        assert!(!world.is_damage_immune(a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invisibility_runs_out() {
        let world = GameWorld::new();
        let id = world.spawn_player("Alex".to_string());

        world.set_invisible(id, Some(Duration::from_secs(30)));
        assert!(world.is_invisible(id));
        world.drain_outbox();

        tokio::time::advance(Duration::from_secs(30)).await;
        world.update(0);
        assert!(!world.is_invisible(id));
        assert_eq!(world.drain_outbox().len(), 1);
    }

    #[test]
    fn test_find_player_ignores_case() {
        let world = GameWorld::new();
        let id = world.spawn_player("Notch".to_string());
        assert_eq!(world.find_player("notch"), Some(id));
        assert!(world.is_name_taken("NOTCH"));
        assert_eq!(world.player_name(id).as_deref(), Some("Notch"));

        world.despawn_player(id);
        assert_eq!(world.find_player("notch"), None);
        assert!(!world.has_player(id));
    }

    #[test]
    fn test_rejoin_keeps_id() {
        let world = GameWorld::new();
        let alex = world.spawn_player("Alex".to_string());
        let steve = world.spawn_player("Steve".to_string());
        assert_ne!(alex, steve);

        world.despawn_player(alex);
        assert!(!world.has_player(alex));
        assert_eq!(world.spawn_player("ALEX".to_string()), alex);
        assert!(world.has_player(alex));
        assert_eq!(world.spawn_player("Herobrine".to_string()), steve + 1);
    }

    #[test]
    fn test_drop_token_at_player_position() {
        let world = GameWorld::new();
        let id = world.spawn_player("Alex".to_string());
        world.drop_token(id, &GlitchToken::for_kind(GlitchKind::Teleport));

        let out = world.drain_outbox();
        assert_eq!(
            out[0].1,
            ServerMessage::TokenDropped {
                token: GlitchToken::for_kind(GlitchKind::Teleport),
                position: SPAWN_POSITION,
            }
        );
    }
}
