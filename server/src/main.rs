//! Glitch Server
//!
//! Authoritative UDP server for the glitch abilities game mode.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{error, info};
use glitch_shared::SERVER_TICK_RATE;

use glitch_server::config::ServerConfig;
use glitch_server::glitch::GlitchFactory;
use glitch_server::network::Server;
use glitch_server::recipes::RecipeBook;
use glitch_server::service::GlitchService;
use glitch_server::status::spawn_status_reporter;
use glitch_server::world::GameWorld;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Glitch Server...");
    info!("Tick rate: {} Hz", SERVER_TICK_RATE);

    let config = ServerConfig::load();
    let recipes = RecipeBook::load(Path::new(&config.recipes_path));
    let status_interval = config.status_interval();
    let port = config.port;

    let world = Arc::new(GameWorld::new());
    let service = GlitchService::new(world.clone(), GlitchFactory::new(), recipes, config);
    let _reporter = spawn_status_reporter(service.manager().clone(), status_interval);

    // Create the network server
    let mut server = match Server::new(port, service).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return;
        }
    };

    // Calculate tick duration
    let tick_duration = Duration::from_secs_f64(1.0 / SERVER_TICK_RATE as f64);
    let mut tick_count: u64 = 0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Server started successfully!");

    // Main game loop
    loop {
        let tick_start = Instant::now();

        run_tick(&mut server, &world, tick_count).await;
        tick_count += 1;

        // Sleep until next tick
        let remaining = tick_duration.saturating_sub(tick_start.elapsed());
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(remaining) => {}
        }
    }

    info!("Shutting down");
    server.disconnect_all();
    server.process_outgoing().await;
}

async fn run_tick(server: &mut Server, world: &GameWorld, tick: u64) {
    // Process incoming network messages
    server.process_incoming().await;

    // Expire world-side effects
    world.update(tick);

    // Process outgoing messages (notices, action bars, effect updates)
    server.process_outgoing().await;
}
