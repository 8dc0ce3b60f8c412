//! Action bar rendering and the periodic status push.

use std::time::Duration;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use glitch_shared::{SlotState, SlotStatus};

use crate::manager::GlitchManager;

/// Default status refresh cadence
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(500);

const ACTIVATION_HINT: &str = "Offhand: Right, Crouch+Offhand: Left";

/// Build the action bar line for a player's equipped slots.
///
/// Returns `None` when nothing is equipped.
pub fn render_action_bar(slots: &[SlotStatus]) -> Option<String> {
    if slots.is_empty() {
        return None;
    }

    let mut text = String::from("§6Glitches: ");
    for (i, status) in slots.iter().enumerate() {
        if i > 0 {
            text.push_str(" §7| ");
        }
        text.push_str(&format!("§b[{}] ", status.slot_label()));
        let name = status.kind.display_name();
        let slot = match status.state {
            SlotState::Active { remaining_ms } => format!("§a{} ({}s)", name, remaining_ms / 1000),
            SlotState::OnCooldown { remaining_ms } => format!("§c{} ({}s)", name, remaining_ms / 1000),
            SlotState::Ready => format!("§e{} §a✓", name),
        };
        text.push_str(&slot);
    }
    text.push_str(&format!(" §7| §f{}", ACTIVATION_HINT));
    Some(text)
}

/// Handle to the background reporter. Dropping it also stops the task.
pub struct StatusReporter {
    handle: JoinHandle<()>,
}

impl StatusReporter {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for StatusReporter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Push every online player's action bar through the host at `interval`
pub fn spawn_status_reporter(manager: GlitchManager, interval: Duration) -> StatusReporter {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            report_once(&manager);
        }
    });
    debug!("Status reporter running every {:?}", interval);
    StatusReporter { handle }
}

/// One reporting pass over all online players
pub fn report_once(manager: &GlitchManager) {
    for player in manager.online_players() {
        let slots = manager.status(player);
        if let Some(text) = render_action_bar(&slots) {
            manager.host().send_action_bar(player, &text, &slots);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use glitch_shared::{strip_formatting, GlitchKind};
    use crate::glitch::GlitchFactory;
    use crate::testing::RecordingHost;

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(render_action_bar(&[]), None);
    }

    #[test]
    fn test_render_both_slots() {
        let slots = vec![
            SlotStatus {
                slot: 0,
                kind: GlitchKind::Immunity,
                state: SlotState::Active { remaining_ms: 12_900 },
            },
            SlotStatus { slot: 1, kind: GlitchKind::Teleport, state: SlotState::Ready },
        ];
        let text = render_action_bar(&slots).unwrap();
        assert_eq!(
            strip_formatting(&text),
            "Glitches: [R] Immunity Glitch (12s) | [L] Teleport Glitch ✓ | Offhand: Right, Crouch+Offhand: Left"
        );
    }

    #[test]
    fn test_render_cooldown() {
        let slots = vec![SlotStatus {
            slot: 0,
            kind: GlitchKind::Invisibility,
            state: SlotState::OnCooldown { remaining_ms: 150_000 },
        }];
        let text = render_action_bar(&slots).unwrap();
        assert!(text.contains("§cInvisibility Glitch (150s)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reporter_pushes_to_online_players() {
        let host = Arc::new(RecordingHost::default());
        let manager = GlitchManager::new(host.clone());
        let factory = GlitchFactory::new();
        manager.open_session(1);
        manager.open_session(2);
        let glitch = factory.create(GlitchKind::Teleport);
        manager.give(1, glitch.clone()).unwrap();
        manager.equip(1, glitch.id()).unwrap();

        let reporter = spawn_status_reporter(manager.clone(), DEFAULT_STATUS_INTERVAL);
        tokio::time::sleep(Duration::from_millis(1_100)).await;

        let bars = host.action_bars(1);
        assert_eq!(bars.len(), 3);
        assert!(bars[0].contains("Teleport Glitch"));
        // Nothing equipped, nothing sent
        assert!(host.action_bars(2).is_empty());

        reporter.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(host.action_bars(1).len(), 3);
    }
}
