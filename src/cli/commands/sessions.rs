use crate::config::{Config, SessionBackend};

use super::users::open_store;

pub async fn cmd_sessions_prune(config: &Config) -> anyhow::Result<()> {
    if config.server.session_backend == SessionBackend::Memory {
        println!("Sessions are kept in memory; nothing to prune.");
        return Ok(());
    }

    let store = open_store(config).await?;
    crate::web::prune_expired_sessions(&store).await?;

    println!("Expired sessions removed.");
    Ok(())
}
