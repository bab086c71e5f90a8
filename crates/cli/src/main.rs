//! Terminal chess client.
//!
//! Plays a local two-player game, a game against a UCI engine with the
//! human on white, or one seat of a room shared through a store directory.
//! See `help` at the prompt for commands.

mod app;
mod command;
mod config;
mod online;
mod render;

use std::io;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use room_sync::{FileStore, SyncSession};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uci_client::EngineSession;
use uuid::Uuid;

use app::App;
use config::{Args, ClientConfig, Mode};
use online::OnlineApp;

fn print_usage() {
    println!("ML-chess terminal client");
    println!();
    println!("Usage:");
    println!("  chess_cli [--config <path>] [--mode pvp|ai] [--level N] [--engine <path>]");
    println!("  chess_cli --mode online [--room <id>] [--store <dir>] [--player <name>]");
    println!();
    println!("Options:");
    println!("  --config, -c   TOML config file");
    println!("  --mode, -m     pvp (two players), ai (you play white) or online");
    println!("  --level, -l    engine skill level, 0-20");
    println!("  --engine, -e   UCI engine executable");
    println!("  --room, -r     online room to join; omit to create one");
    println!("  --store, -s    directory holding shared rooms");
    println!("  --player, -p   your name in the room, used to reclaim your seat");
}

fn init_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        print_usage();
        return Ok(());
    }
    let config = args.resolve()?;
    init_logging(&config);
    info!(mode = %config.mode, "starting");

    if config.mode == Mode::Online {
        let online = &config.online;
        let store = FileStore::new(&online.store_dir).with_poll_interval(online.poll_interval());
        let player = online
            .player
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        info!(%player, store = %online.store_dir.display(), "online mode");
        let app = OnlineApp::new(SyncSession::new(store, player), io::stdout());
        app.run(online.room.as_deref(), BufReader::new(tokio::io::stdin()))
            .await?;
        return Ok(());
    }

    let engine = match config.mode {
        Mode::Pvp | Mode::Online => None,
        Mode::Ai => Some(
            EngineSession::spawn(config.engine.clone())
                .await
                .context("starting the engine (see --engine)")?,
        ),
    };

    let app = App::new(&config, engine, io::stdout());
    app.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
