//! `folio migrate` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_store::{PageStore, SqlitePageStore};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the migrate command.
#[derive(Args)]
pub(crate) struct MigrateArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config).
    #[arg(long, env = "FOLIO_DATABASE_URL")]
    database_url: Option<String>,
}

impl MigrateArgs {
    /// Execute the migrate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the schema cannot be created.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            database_url: self.database_url,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let store =
            SqlitePageStore::connect(&config.database.url, config.database.max_connections)
                .await?;
        if store.is_migrated().await? {
            output.info(&format!("Pages table already exists in {}", config.database.url));
        }
        store.migrate().await?;

        output.success(&format!("Pages schema ready in {}", config.database.url));
        Ok(())
    }
}
