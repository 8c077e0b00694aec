use serde::Serialize;

use crate::config::Config;
use crate::db::Store;

#[derive(Debug, Serialize)]
struct UserRow {
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    created_at: String,
    feedback_count: u64,
}

pub(super) async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

pub async fn cmd_users_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let users = store.list_users().await?;

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let feedback_count = store.count_feedback_for_user(&user.username).await?;
        rows.push(UserRow {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            feedback_count,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("Users ({} total)", rows.len());
    println!("{:-<70}", "");

    for row in rows {
        println!("{} <{}>", row.username, row.email);
        println!(
            "  Name: {} {} | Feedback: {} | Since: {}",
            row.first_name, row.last_name, row.feedback_count, row.created_at
        );
    }

    Ok(())
}

pub async fn cmd_users_remove(config: &Config, username: &str, yes: bool) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let Some(user) = store.find_user_by_username(username).await? else {
        println!("User '{username}' not found.");
        println!("Use 'feedback users list' to see usernames.");
        return Ok(());
    };

    let feedback_count = store.count_feedback_for_user(&user.username).await?;

    if !yes {
        println!(
            "Remove '{}' and their {} feedback entries?",
            user.username, feedback_count
        );
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.delete_user(&user.username).await? {
        println!("✓ Removed: {}", user.username);
    } else {
        println!("Failed to remove user.");
    }

    Ok(())
}
