use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wordbook_config::Config;

pub const MAIN_PROFILE: &str = "main";

/// `<config dir>/wordbook`
fn wordbook_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordbook")
}

pub fn profiles_dir() -> PathBuf {
    wordbook_root().join("profiles")
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// Create the profiles folder and the main profile if missing
pub fn init_user_config(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create profiles dir {}", dir.display()))?;

    let main_profile = dir.join(format!("{MAIN_PROFILE}.json"));

    if !main_profile.exists() {
        let profile = Profile {
            name: MAIN_PROFILE.into(),
            value: Config::new(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

fn read_profile(file: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(file)
        .with_context(|| format!("Failed to read profile {}", file.display()))?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("Invalid profile {}", file.display()))?;
    Ok(profile.value)
}

/// Load a user profile by name, falling back to main, then to defaults
pub fn load_user_profile(dir: &Path, name: &str) -> anyhow::Result<Config> {
    let profile_file = dir.join(format!("{name}.json"));
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile");
    let main_file = dir.join(format!("{MAIN_PROFILE}.json"));
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::new())
    }
}
