//! Chat history handler

use crate::cli::output::print_history;
use crate::cli::output::print_info;
use crate::database::Database;
use crate::AppConfig;
use crate::Result;

pub async fn handle_history_command(config: &AppConfig, limit: i64) -> Result<()> {
    let database = Database::from_config(config).await?;
    database.verify_schema_or_error().await?;

    let exchanges = database.list_chat_history(Some(limit)).await?;
    if exchanges.is_empty() {
        print_info("No chat history yet");
        return Ok(());
    }

    print_history(&exchanges);
    Ok(())
}
