//! `/glitch` chat command for players and admins.

use std::sync::Arc;
use glitch_shared::{GlitchKind, PlayerId, MAX_EQUIPPED};

use crate::error::GlitchError;
use crate::glitch::{Glitch, GlitchFactory};
use crate::limiter::{CraftingLimiter, GRANT_CAP};
use crate::manager::GlitchManager;

/// Result of executing a command
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command was successful
    pub success: bool,
    /// Message to display to the user
    pub message: String,
    /// Optional line for another player affected by the command
    pub notify: Option<(PlayerId, String)>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            notify: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            notify: None,
        }
    }

    pub fn with_notify(mut self, player: PlayerId, text: impl Into<String>) -> Self {
        self.notify = Some((player, text.into()));
        self
    }
}

/// Everything commands act on
pub struct CommandContext<'a> {
    pub manager: &'a GlitchManager,
    pub factory: &'a GlitchFactory,
    pub limiter: &'a CraftingLimiter,
}

const SUBCOMMANDS: [&str; 5] = ["give", "equip", "unequip", "list", "help"];
const ADMIN_SUBCOMMANDS: [&str; 2] = ["reset", "status"];

/// Parse and execute a chat command
/// Returns None if it's not a command (doesn't start with /)
pub fn parse_and_execute(
    content: &str,
    player_id: PlayerId,
    is_admin: bool,
    ctx: &CommandContext<'_>,
) -> Option<CommandResult> {
    let rest = content.strip_prefix('/')?;

    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.is_empty() {
        return Some(CommandResult::error("Invalid command"));
    }

    let command = parts[0].to_lowercase();
    if command != "glitch" {
        return Some(CommandResult::error(format!("Unknown command: /{}", command)));
    }
    Some(execute_glitch(&parts[1..], player_id, is_admin, ctx))
}

/// Run `/glitch <args>`
pub fn execute_glitch(
    args: &[&str],
    player_id: PlayerId,
    is_admin: bool,
    ctx: &CommandContext<'_>,
) -> CommandResult {
    let Some(sub) = args.first() else {
        return cmd_help(is_admin);
    };
    let sub = sub.to_lowercase();
    let args = &args[1..];

    match sub.as_str() {
        "equip" => cmd_equip(player_id, args, ctx),
        "unequip" => cmd_unequip(player_id, args, ctx),
        "list" => cmd_list(player_id, args, ctx),
        "help" => cmd_help(is_admin),

        // === Admin-only commands ===
        "give" | "reset" | "status" if !is_admin => {
            CommandResult::error("You don't have permission to use this command.")
        }
        "give" => cmd_give(args, ctx),
        "reset" => cmd_reset(args, ctx),
        "status" => cmd_status(args, ctx),

        _ => {
            let help = cmd_help(is_admin);
            CommandResult::error(format!("Unknown subcommand: {}\n{}", sub, help.message))
        }
    }
}

fn parse_kind(arg: &str) -> Result<GlitchKind, CommandResult> {
    GlitchKind::from_key(arg).ok_or_else(|| {
        CommandResult::error(GlitchError::UnknownType(arg.to_string()).to_string())
    })
}

fn resolve_player(name: &str, ctx: &CommandContext<'_>) -> Result<(PlayerId, String), CommandResult> {
    let host = ctx.manager.host();
    host.find_player(name)
        .map(|id| (id, host.player_name(id).unwrap_or_else(|| name.to_string())))
        .ok_or_else(|| CommandResult::error(format!("Player not found: {}", name)))
}

// =============================================================================
// Player Commands
// =============================================================================

fn cmd_help(is_admin: bool) -> CommandResult {
    let mut help = String::from("Glitch commands:\n");
    if is_admin {
        help.push_str("  /glitch give <player> <glitch> - Gives a glitch to a player\n");
    }
    help.push_str("  /glitch equip <glitch> - Equips a glitch\n");
    help.push_str("  /glitch unequip <glitch> - Unequips a glitch\n");
    help.push_str("  /glitch list [all] - Lists your glitches or all available glitches\n");
    help.push_str("  /glitch help - Shows this help message\n");

    if is_admin {
        help.push_str("  /glitch reset <player> - Resets player's glitch crafting count\n");
        help.push_str("  /glitch status <player> - Shows player's glitch status\n");
    }

    help.push_str("\nGlitch activation:\n");
    help.push_str("  Right-click glitch items to obtain them\n");
    help.push_str("  Offhand key activates the right slot glitch\n");
    help.push_str("  Crouch + offhand key activates the left slot glitch\n");
    help.push_str(&format!("  Limited to {} glitches per player (drops on death)\n", GRANT_CAP));

    CommandResult::success(help)
}

fn cmd_equip(player_id: PlayerId, args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(arg) = args.first() else {
        return CommandResult::error("Usage: /glitch equip <glitch>");
    };
    let kind = match parse_kind(arg) {
        Ok(kind) => kind,
        Err(result) => return result,
    };
    let Some(glitch) = ctx.manager.find_owned(player_id, kind) else {
        return CommandResult::error(format!("You don't own {}", kind.display_name()));
    };

    match ctx.manager.equip(player_id, glitch.id()) {
        Ok(slot) => CommandResult::success(format!(
            "Equipped {} in {} slot",
            glitch.name(),
            glitch_shared::slot_side(slot)
        )),
        Err(GlitchError::EquipCapExceeded) => CommandResult::error(format!(
            "Failed to equip {}. You may already have the maximum number of glitches equipped.",
            glitch.name()
        )),
        Err(GlitchError::AlreadyEquipped) => {
            CommandResult::error(format!("{} is already equipped", glitch.name()))
        }
        Err(e) => CommandResult::error(e.to_string()),
    }
}

fn cmd_unequip(player_id: PlayerId, args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(arg) = args.first() else {
        return CommandResult::error("Usage: /glitch unequip <glitch>");
    };
    let kind = match parse_kind(arg) {
        Ok(kind) => kind,
        Err(result) => return result,
    };
    let Some(glitch) = ctx.manager.find_equipped(player_id, kind) else {
        return CommandResult::error(format!("You don't have {} equipped", kind.display_name()));
    };

    match ctx.manager.unequip(player_id, glitch.id()) {
        Ok(()) => CommandResult::success(format!("Unequipped {}", glitch.name())),
        Err(e) => CommandResult::error(e.to_string()),
    }
}

fn cmd_list(player_id: PlayerId, args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    if args.first().is_some_and(|a| a.eq_ignore_ascii_case("all")) {
        let mut msg = String::from("Available Glitch Types:\n");
        for kind in GlitchKind::ALL {
            msg.push_str(&format!("- {}: {}\n", kind.display_name(), kind.description()));
        }
        return CommandResult::success(msg);
    }

    let equipped = ctx.manager.equipped(player_id);
    let owned = ctx.manager.owned(player_id);

    let mut msg = String::from("Your Glitches:\n");
    msg.push_str(&format!("Equipped ({}/{}):\n", equipped.len(), MAX_EQUIPPED));
    if equipped.is_empty() {
        msg.push_str("  None\n");
    }
    for glitch in &equipped {
        msg.push_str(&format!("  - {}\n", glitch.name()));
    }

    msg.push_str("Owned:\n");
    if owned.is_empty() {
        msg.push_str("  None\n");
    }
    for glitch in &owned {
        msg.push_str(&format!("  - {}\n", glitch.name()));
        msg.push_str(&format!("    {}\n", glitch.kind().description()));
        msg.push_str(&format!("    Cooldown: {} seconds\n", glitch.cooldown().as_secs()));
    }
    CommandResult::success(msg)
}

// =============================================================================
// Admin Commands
// =============================================================================

fn cmd_give(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let [name, kind_arg, ..] = args else {
        return CommandResult::error("Usage: /glitch give <player> <glitch>");
    };
    let (target, target_name) = match resolve_player(name, ctx) {
        Ok(found) => found,
        Err(result) => return result,
    };
    let kind = match parse_kind(kind_arg) {
        Ok(kind) => kind,
        Err(result) => return result,
    };

    let glitch = ctx.factory.create(kind);
    match ctx.manager.give(target, glitch) {
        Ok(()) => CommandResult::success(format!("Gave {} to {}", kind.display_name(), target_name))
            .with_notify(target, format!("You received {}", kind.display_name())),
        Err(GlitchError::DuplicateOwnership(_)) => {
            CommandResult::error(format!("{} already has {}", target_name, kind.display_name()))
        }
        Err(e) => CommandResult::error(e.to_string()),
    }
}

fn cmd_reset(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::error("Usage: /glitch reset <player>");
    };
    let (target, target_name) = match resolve_player(name, ctx) {
        Ok(found) => found,
        Err(result) => return result,
    };

    ctx.limiter.reset(target);
    CommandResult::success(format!("Reset {}'s glitch crafting count.", target_name))
        .with_notify(target, "Your glitch crafting count has been reset!")
}

fn cmd_status(args: &[&str], ctx: &CommandContext<'_>) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::error("Usage: /glitch status <player>");
    };
    let (target, target_name) = match resolve_player(name, ctx) {
        Ok(found) => found,
        Err(result) => return result,
    };

    let owned = ctx.manager.owned(target);
    let equipped = ctx.manager.equipped(target);

    let mut msg = format!("=== {}'s Glitch Status ===\n", target_name);
    msg.push_str(&format!("Crafted Glitches: {}/{}\n", ctx.limiter.get(target), GRANT_CAP));
    msg.push_str(&format!("Owned Glitches: {}\n", owned.len()));
    msg.push_str(&format!("Equipped Glitches: {}\n", equipped.len()));
    if !owned.is_empty() {
        msg.push_str("Owned:\n");
        for glitch in &owned {
            let marker = if equipped.iter().any(|e| e.id() == glitch.id()) { " (equipped)" } else { "" };
            msg.push_str(&format!("  - {}{}\n", glitch.name(), marker));
        }
    }
    CommandResult::success(msg)
}

// =============================================================================
// Tab completion
// =============================================================================

fn matching(candidates: Vec<String>, typed: &str) -> Vec<String> {
    let typed = typed.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().starts_with(&typed))
        .collect()
}

fn keys(glitches: &[Arc<Glitch>]) -> Vec<String> {
    glitches.iter().map(|g| g.kind().key().to_string()).collect()
}

/// Suggestions for the argument being typed after `/glitch`
pub fn complete(args: &[&str], player_id: PlayerId, is_admin: bool, ctx: &CommandContext<'_>) -> Vec<String> {
    match args {
        [typed] => {
            let mut subs: Vec<String> = SUBCOMMANDS.iter().map(|s| s.to_string()).collect();
            if is_admin {
                subs.extend(ADMIN_SUBCOMMANDS.iter().map(|s| s.to_string()));
            } else {
                subs.retain(|s| s != "give");
            }
            matching(subs, typed)
        }
        [sub, typed] => match sub.to_lowercase().as_str() {
            "give" | "reset" | "status" if is_admin => {
                matching(ctx.manager.host().online_names(), typed)
            }
            "equip" => matching(keys(&ctx.manager.owned(player_id)), typed),
            "unequip" => matching(keys(&ctx.manager.equipped(player_id)), typed),
            "list" => matching(vec!["all".to_string()], typed),
            _ => Vec::new(),
        },
        [sub, _, typed] if is_admin && sub.eq_ignore_ascii_case("give") => {
            matching(GlitchKind::ALL.iter().map(|k| k.key().to_string()).collect(), typed)
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    struct Fixture {
        manager: GlitchManager,
        factory: GlitchFactory,
        limiter: CraftingLimiter,
    }

    impl Fixture {
        fn new() -> Self {
            let host = Arc::new(RecordingHost::default());
            host.add_player(1, "Alex");
            host.add_player(2, "Notch");
            let manager = GlitchManager::new(host);
            manager.open_session(1);
            manager.open_session(2);
            let limiter = CraftingLimiter::new(manager.clone());
            Self { manager, factory: GlitchFactory::new(), limiter }
        }

        fn ctx(&self) -> CommandContext<'_> {
            CommandContext { manager: &self.manager, factory: &self.factory, limiter: &self.limiter }
        }

        fn run(&self, content: &str, admin: bool) -> CommandResult {
            parse_and_execute(content, 1, admin, &self.ctx()).unwrap()
        }
    }

    #[test]
    fn test_not_a_command() {
        let f = Fixture::new();
        assert!(parse_and_execute("hello", 1, false, &f.ctx()).is_none());
        assert!(!f.run("/spawn", false).success);
    }

    #[test]
    fn test_give_requires_admin() {
        let f = Fixture::new();
        let result = f.run("/glitch give Alex teleport", false);
        assert!(!result.success);
        assert!(f.manager.owned(1).is_empty());

        let result = f.run("/glitch give alex teleport", true);
        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "Gave Teleport Glitch to Alex");
        assert_eq!(result.notify, Some((1, "You received Teleport Glitch".to_string())));
        assert!(f.manager.owns_kind(1, GlitchKind::Teleport));

        let again = f.run("/glitch give Alex TELEPORT", true);
        assert_eq!(again.message, "Alex already has Teleport Glitch");
    }

    #[test]
    fn test_give_errors() {
        let f = Fixture::new();
        assert_eq!(f.run("/glitch give Herobrine teleport", true).message, "Player not found: Herobrine");
        assert_eq!(f.run("/glitch give Alex warp", true).message, "Unknown glitch type: warp");
        assert!(f.run("/glitch give Alex", true).message.starts_with("Usage"));
    }

    #[test]
    fn test_equip_and_unequip_by_key() {
        let f = Fixture::new();
        assert_eq!(f.run("/glitch equip immunity", false).message, "You don't own Immunity Glitch");

        f.manager.give(1, f.factory.create(GlitchKind::Immunity)).unwrap();
        f.manager.give(1, f.factory.create(GlitchKind::FakeBlock)).unwrap();

        let result = f.run("/glitch equip immunity", false);
        assert!(result.success);
        assert_eq!(result.message, "Equipped Immunity Glitch in right slot");
        assert_eq!(f.run("/glitch equip fake_block", false).message, "Equipped Fake Block Glitch in left slot");
        assert_eq!(f.run("/glitch equip IMMUNITY", false).message, "Immunity Glitch is already equipped");

        assert!(f.run("/glitch unequip immunity", false).success);
        assert_eq!(f.manager.equipped(1)[0].kind(), GlitchKind::FakeBlock);
        assert_eq!(
            f.run("/glitch unequip immunity", false).message,
            "You don't have Immunity Glitch equipped"
        );
    }

    #[test]
    fn test_list() {
        let f = Fixture::new();
        let empty = f.run("/glitch list", false);
        assert!(empty.message.contains("Equipped (0/2):\n  None"));

        let glitch = f.factory.create(GlitchKind::Teleport);
        f.manager.give(1, glitch.clone()).unwrap();
        f.manager.equip(1, glitch.id()).unwrap();
        let mine = f.run("/glitch list", false);
        assert!(mine.message.contains("Equipped (1/2):\n  - Teleport Glitch"));
        assert!(mine.message.contains("Cooldown: 30 seconds"));

        let all = f.run("/glitch list all", false);
        assert_eq!(all.message.lines().count(), 1 + GlitchKind::ALL.len());
    }

    #[test]
    fn test_reset_and_status() {
        let f = Fixture::new();
        f.limiter.request_grant(2).unwrap();
        f.manager.give(2, f.factory.create(GlitchKind::Dupe)).unwrap();

        assert!(!f.run("/glitch status Notch", false).success);
        let status = f.run("/glitch status notch", true);
        assert!(status.message.contains("=== Notch's Glitch Status ==="));
        assert!(status.message.contains("Crafted Glitches: 1/2"));
        assert!(status.message.contains("Owned Glitches: 1"));

        let reset = f.run("/glitch reset Notch", true);
        assert!(reset.success);
        assert_eq!(f.limiter.get(2), 0);
        assert_eq!(reset.notify.map(|(id, _)| id), Some(2));
    }

    #[test]
    fn test_unknown_subcommand_shows_help() {
        let f = Fixture::new();
        let result = f.run("/glitch dance", false);
        assert!(!result.success);
        assert!(result.message.starts_with("Unknown subcommand: dance"));
        assert!(result.message.contains("/glitch equip <glitch>"));
        assert!(!result.message.contains("/glitch reset"));

        assert!(f.run("/glitch", true).message.contains("/glitch reset <player>"));
    }

    #[test]
    fn test_completion() {
        let f = Fixture::new();
        let ctx = f.ctx();
        assert_eq!(complete(&["u"], 1, false, &ctx), vec!["unequip".to_string()]);
        assert_eq!(complete(&["s"], 1, true, &ctx), vec!["status".to_string()]);
        assert!(complete(&["s"], 1, false, &ctx).is_empty());
        assert_eq!(complete(&["give", "no"], 1, true, &ctx), vec!["Notch".to_string()]);
        assert_eq!(complete(&["give", "Alex", "inv"], 1, true, &ctx), vec!["INVENTORY".to_string(), "INVISIBILITY".to_string()]);
        assert_eq!(complete(&["list", ""], 1, false, &ctx), vec!["all".to_string()]);

        f.manager.give(1, f.factory.create(GlitchKind::Teleport)).unwrap();
        assert_eq!(complete(&["equip", "t"], 1, false, &ctx), vec!["TELEPORT".to_string()]);
        assert!(complete(&["unequip", ""], 1, false, &ctx).is_empty());
    }
}
