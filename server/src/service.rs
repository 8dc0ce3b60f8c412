//! Game-event handling: turns client messages into glitch operations.
//!
//! Every outcome reaches the player as queued world messages; nothing here
//! talks to the socket.

use std::sync::Arc;
use log::{debug, info};
use glitch_shared::{ClientMessage, GlitchKind, GlitchToken, PlayerId, ServerMessage};

use crate::commands::{self, CommandContext};
use crate::config::ServerConfig;
use crate::error::GlitchError;
use crate::glitch::GlitchFactory;
use crate::host::GameHost;
use crate::limiter::{CraftingLimiter, GRANT_CAP};
use crate::manager::GlitchManager;
use crate::recipes::RecipeBook;
use crate::router::ActivationRouter;
use crate::world::GameWorld;

pub struct GlitchService {
    world: Arc<GameWorld>,
    manager: GlitchManager,
    factory: Arc<GlitchFactory>,
    router: ActivationRouter,
    limiter: CraftingLimiter,
    recipes: RecipeBook,
    config: ServerConfig,
}

impl GlitchService {
    pub fn new(world: Arc<GameWorld>, factory: GlitchFactory, recipes: RecipeBook, config: ServerConfig) -> Self {
        let manager = GlitchManager::new(world.clone());
        let factory = Arc::new(factory);
        Self {
            router: ActivationRouter::new(manager.clone(), factory.clone()),
            limiter: CraftingLimiter::new(manager.clone()),
            world,
            manager,
            factory,
            recipes,
            config,
        }
    }

    pub fn manager(&self) -> &GlitchManager {
        &self.manager
    }

    pub fn world(&self) -> &Arc<GameWorld> {
        &self.world
    }

    pub fn limiter(&self) -> &CraftingLimiter {
        &self.limiter
    }

    /// Spawn a player and open their glitch session
    pub fn join(&self, name: &str) -> Result<PlayerId, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Name must not be empty".to_string());
        }
        if self.world.is_name_taken(name) {
            return Err(format!("{} is already online", name));
        }
        let player = self.world.spawn_player(name.to_string());
        self.manager.open_session(player);
        self.world.push(player, ServerMessage::Joined { player_id: player });
        Ok(player)
    }

    /// Close the player's session and remove them from the world
    pub fn leave(&self, player: PlayerId) {
        self.manager.cleanup_session(player);
        self.router.forget(player);
        self.world.despawn_player(player);
    }

    pub fn is_admin(&self, player: PlayerId) -> bool {
        self.world.player_name(player).is_some_and(|name| self.config.is_admin(&name))
    }

    /// Handle one message from a joined player
    pub fn handle(&self, player: PlayerId, message: ClientMessage) {
        match message {
            ClientMessage::Trigger => self.handle_trigger(player),
            ClientMessage::SetModifier { held } => {
                if let Some(hint) = self.router.set_modifier(player, held) {
                    self.world.send_message(player, &hint);
                }
            }
            ClientMessage::UseToken { token } => self.handle_use_token(player, token),
            ClientMessage::Craft { kind } => self.handle_craft(player, kind),
            ClientMessage::Pickup { token } => self.handle_pickup(player, &token),
            ClientMessage::Died => self.handle_death(player),
            ClientMessage::LookAt { target } => self.world.set_look_target(player, target),
            ClientMessage::Command { content } => self.handle_command(player, &content),
            ClientMessage::Complete { args } => self.handle_complete(player, &args),
            ClientMessage::Join { .. } | ClientMessage::Leave => {
                debug!("Ignoring session message from player {} inside the game", player);
            }
        }
    }

    fn tell_all(&self, player: PlayerId, lines: Vec<String>) {
        for line in lines {
            self.world.send_message(player, &line);
        }
    }

    fn handle_trigger(&self, player: PlayerId) {
        let result = self.router.trigger(player);
        self.tell_all(player, ActivationRouter::feedback(&result));
    }

    fn handle_use_token(&self, player: PlayerId, token: GlitchToken) {
        let result = self.router.use_token(player, &token);
        // The client owns the stack; it removes one item on TokenConsumed
        if let Ok(kind) = result {
            self.world.push(player, ServerMessage::TokenConsumed { kind });
        }
        self.tell_all(player, ActivationRouter::token_feedback(&result));
    }

    fn handle_craft(&self, player: PlayerId, kind: GlitchKind) {
        let Some(recipe) = self.recipes.get(kind) else {
            let reason = format!("There is no recipe for {}", kind.display_name());
            self.world.push(player, ServerMessage::CraftRejected { reason });
            return;
        };

        match self.limiter.on_craft(player) {
            Ok(count) => {
                info!("Player {} crafted {}", player, kind.display_name());
                self.world.push(player, ServerMessage::Crafted { token: recipe.output() });
                self.world.send_message(
                    player,
                    &format!("§aGlitch crafted! You have {}/{} glitches.", count, GRANT_CAP),
                );
            }
            Err(_) => {
                let reason = format!(
                    "You can only craft {} glitches! You must die to lose one before crafting another.",
                    GRANT_CAP
                );
                self.world.send_message(player, &format!("§c{}", reason));
                self.world.push(player, ServerMessage::CraftRejected { reason });
            }
        }
    }

    fn handle_pickup(&self, player: PlayerId, token: &GlitchToken) {
        let reason = match self.limiter.on_pickup(player, token) {
            Ok(None) => return,
            Ok(Some(count)) => {
                if let Some(kind) = token.kind() {
                    self.world.send_message(
                        player,
                        &format!(
                            "§aYou picked up {}! You now have {}/{} glitches.",
                            kind.display_name(),
                            count,
                            GRANT_CAP
                        ),
                    );
                }
                return;
            }
            Err(GlitchError::DuplicateOwnership(kind)) => format!(
                "You already own {}! You cannot pick up duplicate glitches.",
                kind.display_name()
            ),
            Err(_) => format!(
                "You can only have {} glitches! You must die to lose one before picking up another.",
                GRANT_CAP
            ),
        };
        self.world.send_message(player, &format!("§c{}", reason));
        self.world.push(player, ServerMessage::PickupRejected { reason });
    }

    fn handle_death(&self, player: PlayerId) {
        let Some(drop) = self.limiter.on_death(player) else {
            return;
        };
        self.world.drop_token(player, &drop.token);
        self.world.send_message(player, &format!("§cYou dropped {} on death!", drop.glitch.name()));

        let remaining = GRANT_CAP.saturating_sub(self.limiter.get(player));
        if remaining > 0 {
            self.world.send_message(
                player,
                &format!("§eYou can now craft {} more glitch(es).", remaining),
            );
        }
    }

    fn command_context(&self) -> CommandContext<'_> {
        CommandContext {
            manager: &self.manager,
            factory: &self.factory,
            limiter: &self.limiter,
        }
    }

    fn handle_complete(&self, player: PlayerId, args: &[String]) {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let suggestions =
            commands::complete(&args, player, self.is_admin(player), &self.command_context());
        self.world.push(player, ServerMessage::Completions { suggestions });
    }

    fn handle_command(&self, player: PlayerId, content: &str) {
        let ctx = self.command_context();
        let Some(result) = commands::parse_and_execute(content, player, self.is_admin(player), &ctx) else {
            return;
        };

        let color = if result.success { "§a" } else { "§c" };
        for line in result.message.lines().filter(|l| !l.is_empty()) {
            self.world.send_message(player, &format!("{}{}", color, line));
        }
        if let Some((target, text)) = result.notify {
            self.world.send_message(target, &format!("§a{}", text));
        }
    }
}
