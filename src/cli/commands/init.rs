use std::path::Path;

use crate::config::Config;

pub fn cmd_init(path: Option<&Path>) -> anyhow::Result<()> {
    let default_path = Config::default_config_path();
    let path = path.unwrap_or(&default_path);

    if Config::create_default_if_missing(path)? {
        println!("✓ Created default config: {}", path.display());
        println!();
        println!("Set server.session_secret (64+ bytes) or export FEEDBACK_SESSION_SECRET");
        println!("before running in production.");
    } else {
        println!("Config already exists: {}", path.display());
    }

    Ok(())
}
