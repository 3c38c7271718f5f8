mod app_config;
mod install;

pub use app_config::{APP_NAME, AppConfig};
pub use install::{DEFAULT_INSTALL_BASE, locate_game_dir};
