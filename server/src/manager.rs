//! Per-player glitch ownership, equipment and activation bookkeeping.
//!
//! Each player's record sits behind its own mutex, held for the whole of every
//! operation on that player. Deactivation timers run as tokio tasks holding
//! only a weak reference back to the store, and are cancelled by dropping
//! their handle out of the record.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use glitch_shared::{GlitchKind, PlayerId, SlotState, SlotStatus, MAX_EQUIPPED};

use crate::error::GlitchError;
use crate::glitch::{EffectContext, Glitch, GlitchId};
use crate::host::GameHost;
use crate::timer::DeactivationTimer;

#[derive(Default)]
struct PlayerRecord {
    owned: Vec<Arc<Glitch>>,
    /// Slot 0 is right, slot 1 is left; always a subset of `owned`
    equipped: Vec<Arc<Glitch>>,
    /// One entry per engaged timed activation
    active_timers: HashMap<GlitchId, DeactivationTimer>,
    online: bool,
}

impl PlayerRecord {
    fn find_owned(&self, id: GlitchId) -> Option<&Arc<Glitch>> {
        self.owned.iter().find(|g| g.id() == id)
    }

    fn slot_of(&self, id: GlitchId) -> Option<usize> {
        self.equipped.iter().position(|g| g.id() == id)
    }

    fn owns_kind(&self, kind: GlitchKind) -> bool {
        self.owned.iter().any(|g| g.kind() == kind)
    }
}

struct Shared {
    host: Arc<dyn GameHost>,
    players: RwLock<HashMap<PlayerId, Arc<Mutex<PlayerRecord>>>>,
}

impl Shared {
    fn record(&self, player: PlayerId) -> Option<Arc<Mutex<PlayerRecord>>> {
        self.players.read().get(&player).cloned()
    }

    fn record_or_insert(&self, player: PlayerId) -> Arc<Mutex<PlayerRecord>> {
        if let Some(record) = self.record(player) {
            return record;
        }
        self.players.write().entry(player).or_default().clone()
    }

    fn ctx(&self, player: PlayerId) -> EffectContext<'_> {
        EffectContext { player, host: self.host.as_ref() }
    }

    /// Run the instance's deactivation and drop its timer, if any
    fn deactivate_locked(&self, player: PlayerId, record: &mut PlayerRecord, glitch: &Glitch) -> bool {
        let ran = glitch.deactivate(&self.ctx(player));
        record.active_timers.remove(&glitch.id());
        ran
    }

    /// Timer callback. Ignored unless the recorded timer is still the one for `epoch`.
    fn expire(&self, player: PlayerId, id: GlitchId, epoch: u64) {
        let Some(record) = self.record(player) else {
            return;
        };
        let mut record = record.lock();
        if record.active_timers.get(&id).map(|t| t.epoch()) != Some(epoch) {
            return;
        }
        let Some(glitch) = record.find_owned(id).cloned() else {
            record.active_timers.remove(&id);
            return;
        };
        debug!("{} expired for player {}", glitch.name(), player);
        self.deactivate_locked(player, &mut record, &glitch);
    }
}

/// Store of every player's glitches. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct GlitchManager {
    shared: Arc<Shared>,
}

impl GlitchManager {
    pub fn new(host: Arc<dyn GameHost>) -> Self {
        Self {
            shared: Arc::new(Shared {
                host,
                players: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn host(&self) -> &Arc<dyn GameHost> {
        &self.shared.host
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Create the player's record if needed and mark them online
    pub fn open_session(&self, player: PlayerId) {
        let record = self.shared.record_or_insert(player);
        record.lock().online = true;
        info!("Glitch session opened for player {}", player);
    }

    /// Deactivate anything active, cancel every timer and mark the player
    /// offline. Ownership and equipment are kept.
    pub fn close_session(&self, player: PlayerId) {
        let Some(record) = self.shared.record(player) else {
            return;
        };
        let mut record = record.lock();
        let equipped = record.equipped.clone();
        for glitch in &equipped {
            if record.active_timers.contains_key(&glitch.id()) {
                self.shared.deactivate_locked(player, &mut record, glitch);
            }
        }
        record.active_timers.clear();
        record.online = false;
        info!("Glitch session closed for player {}", player);
    }

    pub fn cleanup_session(&self, player: PlayerId) {
        self.close_session(player);
    }

    pub fn is_online(&self, player: PlayerId) -> bool {
        self.shared.record(player).is_some_and(|r| r.lock().online)
    }

    /// Players with an open session, in ascending id order
    pub fn online_players(&self) -> Vec<PlayerId> {
        let players = self.shared.players.read();
        let mut online: Vec<PlayerId> = players
            .iter()
            .filter(|(_, record)| record.lock().online)
            .map(|(id, _)| *id)
            .collect();
        online.sort_unstable();
        online
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    /// Record ownership. At most one instance of each kind per player.
    pub fn give(&self, player: PlayerId, glitch: Arc<Glitch>) -> Result<(), GlitchError> {
        let record = self.shared.record_or_insert(player);
        let mut record = record.lock();
        if record.owns_kind(glitch.kind()) {
            return Err(GlitchError::DuplicateOwnership(glitch.kind()));
        }
        info!("Player {} now owns {} {}", player, glitch.name(), glitch.id());
        record.owned.push(glitch);
        Ok(())
    }

    /// Take an instance away, unequipping (and so deactivating) it first
    pub fn remove(&self, player: PlayerId, id: GlitchId) -> Result<Arc<Glitch>, GlitchError> {
        let record = self.shared.record(player).ok_or(GlitchError::NotOwned)?;
        let mut record = record.lock();
        let index = record
            .owned
            .iter()
            .position(|g| g.id() == id)
            .ok_or(GlitchError::NotOwned)?;

        if let Some(slot) = record.slot_of(id) {
            let glitch = record.equipped.remove(slot);
            self.shared.deactivate_locked(player, &mut record, &glitch);
        }
        let glitch = record.owned.remove(index);
        info!("Player {} lost {} {}", player, glitch.name(), glitch.id());
        Ok(glitch)
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    /// Append to the equipped list and return the slot it landed in
    pub fn equip(&self, player: PlayerId, id: GlitchId) -> Result<u8, GlitchError> {
        let record = self.shared.record(player).ok_or(GlitchError::NotOwned)?;
        let mut record = record.lock();
        let glitch = record.find_owned(id).cloned().ok_or(GlitchError::NotOwned)?;
        if record.slot_of(id).is_some() {
            return Err(GlitchError::AlreadyEquipped);
        }
        if record.equipped.len() >= MAX_EQUIPPED {
            return Err(GlitchError::EquipCapExceeded);
        }
        record.equipped.push(glitch);
        Ok((record.equipped.len() - 1) as u8)
    }

    /// Remove from the equipped list; later slots shift down
    pub fn unequip(&self, player: PlayerId, id: GlitchId) -> Result<(), GlitchError> {
        let record = self.shared.record(player).ok_or(GlitchError::NotEquipped)?;
        let mut record = record.lock();
        let slot = record.slot_of(id).ok_or(GlitchError::NotEquipped)?;
        let glitch = record.equipped.remove(slot);
        self.shared.deactivate_locked(player, &mut record, &glitch);
        Ok(())
    }

    // =========================================================================
    // Activation
    // =========================================================================

    /// Fire an equipped glitch. Timed glitches get a deactivation timer for
    /// exactly their duration.
    pub fn activate(&self, player: PlayerId, id: GlitchId) -> Result<(), GlitchError> {
        let record = self.shared.record(player).ok_or(GlitchError::NotEquipped)?;
        let mut record = record.lock();
        let slot = record.slot_of(id).ok_or(GlitchError::NotEquipped)?;
        if !record.online {
            return Err(GlitchError::UnknownPlayer);
        }
        let glitch = record.equipped[slot].clone();

        glitch.activate(&self.shared.ctx(player))?;
        debug!("Player {} activated {} {}", player, glitch.name(), glitch.id());

        if glitch.is_timed() {
            let epoch = glitch.epoch();
            let weak: Weak<Shared> = Arc::downgrade(&self.shared);
            let timer = DeactivationTimer::schedule(glitch.duration(), epoch, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.expire(player, id, epoch);
                }
            });
            record.active_timers.insert(id, timer);
        }
        Ok(())
    }

    /// Manual deactivation. Safe to race with the timer; the effect runs once.
    pub fn deactivate(&self, player: PlayerId, id: GlitchId) -> bool {
        let Some(record) = self.shared.record(player) else {
            return false;
        };
        let mut record = record.lock();
        let Some(glitch) = record.find_owned(id).cloned() else {
            record.active_timers.remove(&id);
            return false;
        };
        self.shared.deactivate_locked(player, &mut record, &glitch)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_equipped(&self, player: PlayerId, id: GlitchId) -> bool {
        self.shared.record(player).is_some_and(|r| r.lock().slot_of(id).is_some())
    }

    /// Active means a timer is pending and the duration window is still open
    pub fn is_active(&self, player: PlayerId, id: GlitchId) -> bool {
        let Some(record) = self.shared.record(player) else {
            return false;
        };
        let record = record.lock();
        record.active_timers.contains_key(&id)
            && record.find_owned(id).is_some_and(|g| g.is_active())
    }

    pub fn owned(&self, player: PlayerId) -> Vec<Arc<Glitch>> {
        self.shared.record(player).map(|r| r.lock().owned.clone()).unwrap_or_default()
    }

    /// Equipped glitches in slot order
    pub fn equipped(&self, player: PlayerId) -> Vec<Arc<Glitch>> {
        self.shared.record(player).map(|r| r.lock().equipped.clone()).unwrap_or_default()
    }

    pub fn find_owned(&self, player: PlayerId, kind: GlitchKind) -> Option<Arc<Glitch>> {
        let record = self.shared.record(player)?;
        let record = record.lock();
        record.owned.iter().find(|g| g.kind() == kind).cloned()
    }

    pub fn find_equipped(&self, player: PlayerId, kind: GlitchKind) -> Option<Arc<Glitch>> {
        let record = self.shared.record(player)?;
        let record = record.lock();
        record.equipped.iter().find(|g| g.kind() == kind).cloned()
    }

    pub fn owns_kind(&self, player: PlayerId, kind: GlitchKind) -> bool {
        self.shared.record(player).is_some_and(|r| r.lock().owns_kind(kind))
    }

    /// Snapshot of every equipped slot for the status display
    pub fn status(&self, player: PlayerId) -> Vec<SlotStatus> {
        let Some(record) = self.shared.record(player) else {
            return Vec::new();
        };
        let record = record.lock();
        let now = Instant::now();
        record
            .equipped
            .iter()
            .enumerate()
            .map(|(slot, glitch)| {
                let state = if record.active_timers.contains_key(&glitch.id())
                    && glitch.is_active_at(now)
                {
                    SlotState::Active {
                        remaining_ms: glitch.remaining_duration_at(now).as_millis() as u64,
                    }
                } else if glitch.is_on_cooldown_at(now) {
                    SlotState::OnCooldown {
                        remaining_ms: glitch.remaining_cooldown_at(now).as_millis() as u64,
                    }
                } else {
                    SlotState::Ready
                };
                SlotStatus { slot: slot as u8, kind: glitch.kind(), state }
            })
            .collect()
    }
}
