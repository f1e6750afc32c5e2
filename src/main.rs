mod common;
mod config;
mod media;
mod storage;
mod ui;

use std::time::Instant;

use clap::Parser;
use dotenvy::dotenv;
use media::{AttachmentStore, MediaWorker};
use storage::MessageDatabase;
use tokio::sync::mpsc;
use ui::{AppState, ChatApp};

#[derive(Parser)]
#[command(
    name = "crew_chat",
    version,
    about = "Chat with a booking agent, with image attachments"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    storage::ensure_data_dir(&app_config.data_dir)?;
    let db = MessageDatabase::with_path(app_config.database_path())?;
    log::info!(
        "Opened message store {} ({} messages)",
        app_config.database_path().display(),
        db.message_count()?
    );

    // UI -> media worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // media worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let attachments = AttachmentStore::new(app_config.attachments_dir());
    tokio::spawn(MediaWorker::new(event_tx, cmd_rx, attachments.clone()).run());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([420.0, 760.0])
            .with_title(app_config.window_title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &app_config.window_title,
        options,
        Box::new(move |cc| {
            let state = AppState::new(Box::new(db), attachments, Instant::now());
            Ok(Box::new(ChatApp::new(cc, state, cmd_tx, event_rx)))
        }),
    )?;

    Ok(())
}
