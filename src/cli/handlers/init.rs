//! Database initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::AppConfig;
use crate::Result;

/// Handle database initialization command
pub async fn handle_init_command(config: &AppConfig, reset: bool) -> Result<()> {
    let database = Database::from_config(config).await?;

    if reset {
        print_warning("Dropping existing tables: all chat history will be lost");
        database.drop_schema().await?;
    }

    print_info("Initializing BikeHero database...");
    if let Err(e) = database.init_schema(config.embedding_dimension()).await {
        if e.to_string().contains("vector") || e.to_string().contains("extension") {
            print_warning(&format!("Could not enable pgvector extension: {e}"));
            println!("  Run on the database server as a superuser:");
            println!("  psql -d <database> -c 'CREATE EXTENSION IF NOT EXISTS vector;'");
        }
        return Err(e);
    }

    print_success("Tables created: agents, chat_histories, pricing_documents");
    println!();
    print_info("To build the pricing index, run:");
    println!("   bikehero index");
    Ok(())
}
