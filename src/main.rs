use tracing::{info, warn};

mod app;
mod config;
mod dialogs;
mod logging;
mod state;
mod ui;
mod upload;

use app::PhotoWall;
use config::Config;
use dialogs::NativeDialogs;
use state::PhotoStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    // A broken config file should not keep the gallery from opening
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring config file");
        Config::default()
    });

    // The app cannot function without its store
    let store = PhotoStore::open(&config.database_path())?;
    info!(db = %config.database_path().display(), "starting photo wall");

    iced::application("Photo Wall", PhotoWall::update, PhotoWall::view)
        .subscription(PhotoWall::subscription)
        .theme(PhotoWall::theme)
        .centered()
        .run_with(move || PhotoWall::new(store, Box::new(NativeDialogs), &config))?;

    Ok(())
}
