//! One-shot question handler

use crate::api::build_state;
use crate::cli::output::print_info;
use crate::cli::output::print_outcome;
use crate::config::IndexBackend;
use crate::knowledge::load_catalog;
use crate::models::CreateChatExchangeRequest;
use crate::AppConfig;
use crate::Result;

const CLI_AGENT_ID: i64 = 1;

/// Send one message through the assistant and print the outcome
pub async fn handle_ask_command(config: &AppConfig, message: &str, save: bool) -> Result<()> {
    let state = build_state(config).await?;

    // Reuse a persisted index when there is one; building costs embedding calls
    let attached = if config.knowledge.backend == IndexBackend::Postgres {
        state.knowledge.attach().await?
    } else {
        None
    };
    if attached.is_none() {
        print_info("Building pricing index...");
        let catalog = match &config.knowledge.catalog_path {
            Some(path) => Some(load_catalog(path)?),
            None => None,
        };
        state.knowledge.initialize(catalog.as_ref()).await?;
    }

    let outcome = state.agent.process(message, &[]).await;
    print_outcome(&outcome);

    if save {
        state
            .database
            .ensure_agent(
                CLI_AGENT_ID,
                &state.support.default_agent_name,
                &state.support.default_agent_description,
            )
            .await?;
        let exchange = state
            .database
            .create_chat_exchange(&CreateChatExchangeRequest {
                agent_id: CLI_AGENT_ID,
                message: message.to_string(),
                outcome,
            })
            .await?;
        print_info(&format!("Saved as exchange #{}", exchange.id));
    }

    Ok(())
}
