//! Pricing index rebuild handler

use std::path::Path;

use crate::api::build_state;
use crate::cli::output::print_generation;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::config::IndexBackend;
use crate::knowledge::load_catalog;
use crate::AppConfig;
use crate::Result;

/// Rebuild the namespace's index from a catalog file or the built-in catalog
pub async fn handle_index_command(config: &AppConfig, catalog: Option<&Path>) -> Result<()> {
    if config.knowledge.backend == IndexBackend::Memory {
        print_warning("knowledge.backend is 'memory': the rebuilt index is discarded on exit");
    }

    let catalog_path = catalog
        .map(Path::to_path_buf)
        .or_else(|| config.knowledge.catalog_path.as_ref().map(Into::into));
    let catalog = match &catalog_path {
        Some(path) => {
            print_info(&format!("Loading catalog from {}", path.display()));
            Some(load_catalog(path)?)
        }
        None => {
            print_info("Using built-in catalog");
            None
        }
    };

    let state = build_state(config).await?;
    let generation = state.knowledge.initialize(catalog.as_ref()).await?;

    print_success("Pricing index rebuilt");
    print_generation(&generation);
    Ok(())
}
