//! Keys command - manages API keys directly against the configured store
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::admin::api_keys::{ApiKeyResponse, ApiKeyWithTokenResponse};
use crate::api::state::ApiKeyServiceTrait;
use crate::config::{AppConfig, LogFormat, StorageBackend};
use crate::domain::ApiKeyId;
use crate::infrastructure::logging;

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Issue a new API key; the token is printed once
    Create {
        /// RFC 3339 timestamp after which the key is rejected
        #[arg(long)]
        expiration: Option<DateTime<Utc>>,
    },

    /// List all API keys, expired or not
    List,

    /// Show a single API key
    Get {
        #[arg(long, conflicts_with = "prefix", required_unless_present = "prefix")]
        id: Option<u64>,

        #[arg(long)]
        prefix: Option<String>,
    },

    /// Expire an API key now
    Expire {
        #[arg(long)]
        id: u64,
    },

    /// Permanently delete an API key
    Destroy {
        #[arg(long)]
        id: u64,
    },

    /// Check whether a bearer token is accepted
    Validate {
        token: String,
    },
}

/// Run a keys subcommand and print its result
pub async fn run(command: KeysCommand) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    config.logging.format = LogFormat::Compact;
    logging::init_logging(&config.logging);

    if config.storage.backend == StorageBackend::Memory {
        warn!("Using in-memory storage; changes are lost when this command exits");
    }

    let state = crate::create_app_state_with_config(&config).await?;
    let output = execute(state.api_key_service.as_ref(), command).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

async fn execute(service: &dyn ApiKeyServiceTrait, command: KeysCommand) -> anyhow::Result<Value> {
    let output = match command {
        KeysCommand::Create { expiration } => {
            let created = service.create(expiration).await?;

            serde_json::to_value(ApiKeyWithTokenResponse {
                api_key: ApiKeyResponse::from(&created.api_key),
                token: created.token,
            })?
        }
        KeysCommand::List => {
            let keys = service.list().await?;
            let responses: Vec<ApiKeyResponse> = keys.iter().map(ApiKeyResponse::from).collect();

            serde_json::to_value(responses)?
        }
        KeysCommand::Get { id, prefix } => {
            let key = match (id, prefix) {
                (Some(id), _) => service.get(ApiKeyId::new(id)).await?,
                (None, Some(prefix)) => service.get_by_prefix(&prefix).await?,
                (None, None) => anyhow::bail!("Either --id or --prefix is required"),
            };

            serde_json::to_value(ApiKeyResponse::from(&key))?
        }
        KeysCommand::Expire { id } => {
            let key = service.get(ApiKeyId::new(id)).await?;
            let expired = service.expire(&key).await?;

            serde_json::to_value(ApiKeyResponse::from(&expired))?
        }
        KeysCommand::Destroy { id } => {
            let key = service.get(ApiKeyId::new(id)).await?;
            service.destroy(&key).await?;

            json!({ "destroyed": true, "id": id })
        }
        KeysCommand::Validate { token } => match service.validate(&token).await {
            Ok(valid) => json!({ "valid": valid }),
            Err(e) if e.is_client_error() => json!({ "valid": false, "reason": e.to_string() }),
            Err(e) => return Err(e).context("Failed to validate API key"),
        },
    };

    Ok(output)
}
