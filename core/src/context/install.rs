//! Game install discovery.

use crate::error::InstallError;
use std::path::{Path, PathBuf};

/// Default install location of the game client on Windows.
pub const DEFAULT_INSTALL_BASE: &str = r"C:\Riot Games\League of Legends\";

const GAME_FOLDER: &str = "Game";

/// Find the directory the spectator client must run from: the `Game` folder
/// inside the install base.
pub fn locate_game_dir(base: &Path) -> Result<PathBuf, InstallError> {
    if !base.is_dir() {
        return Err(InstallError::BaseFolderMissing(base.to_path_buf()));
    }

    let game_dir = base.join(GAME_FOLDER);
    if !game_dir.is_dir() {
        return Err(InstallError::GameFolderMissing(game_dir));
    }

    Ok(game_dir)
}
