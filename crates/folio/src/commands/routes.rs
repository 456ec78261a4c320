//! `folio routes` command implementation.
//!
//! Prints the routes the server would register for the current page tree,
//! followed by pages whose routes are rejected.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_pages::{RouteTable, build_routes};
use folio_store::{PageStore, SqlitePageStore};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the routes command.
#[derive(Args)]
pub(crate) struct RoutesArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config).
    #[arg(long, env = "FOLIO_DATABASE_URL")]
    database_url: Option<String>,
}

impl RoutesArgs {
    /// Execute the routes command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the pages cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            database_url: self.database_url,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if !config.pages.enabled {
            output.warning("Pages module disabled, no routes are registered");
            return Ok(());
        }

        let store =
            SqlitePageStore::connect(&config.database.url, config.database.max_connections)
                .await?;
        if !store.is_migrated().await? {
            output.warning("Pages table missing, run `folio migrate` first");
            return Ok(());
        }

        let table = RouteTable::register(build_routes(&store.route_nodes().await?));

        output.success(&format!("{} routes registered", table.len()));
        for route in table.routes() {
            output.route(route);
        }
        for rejected in table.rejected() {
            output.rejected_route(rejected);
        }

        Ok(())
    }
}
