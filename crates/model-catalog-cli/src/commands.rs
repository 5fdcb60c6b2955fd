//! Subcommands and their execution
//!
//! Every command produces a JSON value that `main` prints to stdout.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use model_catalog_service::{CatalogFacade, FileArtifact};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List domains, oldest first
    Domains,

    /// Show the latest model of a domain
    Domain { domain: String },

    /// List the models of a domain, oldest first
    Models {
        domain: String,

        /// Only models in this state
        #[arg(long)]
        state: Option<String>,
    },

    /// Show a model's metadata
    Info { domain: String, model_id: String },

    /// Package files and upload them as a new model
    Upload {
        domain: String,

        /// Library recorded in the model metadata
        #[arg(long)]
        library: String,

        /// Model id (generated when omitted)
        #[arg(long)]
        model_id: Option<String>,

        /// Library-specific model type
        #[arg(long = "type")]
        type_name: Option<String>,

        /// Extra metadata as a JSON object
        #[arg(long)]
        extra: Option<String>,

        /// Files making up the model
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Download and extract a model (the domain's latest by default)
    Download {
        domain: String,

        #[arg(long)]
        model_id: Option<String>,

        /// Directory to extract into
        dir: PathBuf,
    },

    /// List user-defined states
    States,

    /// Create a state
    CreateState { name: String },

    /// Place a model in a state
    SetState {
        domain: String,
        model_id: String,
        state: String,
    },

    /// Take a model out of a state
    UnsetState {
        domain: String,
        model_id: String,
        state: String,
    },

    /// Delete a model, leaving a tombstone
    Delete {
        domain: String,
        model_id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn parse_extra(extra: Option<&str>) -> Result<Map<String, Value>> {
    match extra {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw).context("--extra is not valid JSON")? {
            Value::Object(map) => Ok(map),
            _ => bail!("--extra must be a JSON object"),
        },
    }
}

/// Run a command against the catalog
pub async fn run(facade: &CatalogFacade, command: Command) -> Result<Value> {
    let output = match command {
        Command::Domains => json!(facade.list_domains().await?),
        Command::Domain { domain } => json!(facade.get_domain(&domain).await?),
        Command::Models { domain, state } => {
            json!(facade.list_models(&domain, state.as_deref()).await?)
        }
        Command::Info { domain, model_id } => json!(facade.get_model_info(&domain, &model_id).await?),
        Command::Upload {
            domain,
            library,
            model_id,
            type_name,
            extra,
            files,
        } => {
            let extra = parse_extra(extra.as_deref())?;
            let mut artifact = FileArtifact::new(library, files);
            if let Some(type_name) = type_name {
                artifact = artifact.with_type_name(type_name);
            }
            json!(facade
                .upload(&domain, model_id.as_deref(), &artifact, extra)
                .await?)
        }
        Command::Download {
            domain,
            model_id,
            dir,
        } => {
            let path = facade.download(&dir, &domain, model_id.as_deref()).await?;
            json!({ "path": path })
        }
        Command::States => json!(facade.list_model_states().await?),
        Command::CreateState { name } => json!(facade.create_model_state(&name).await?),
        Command::SetState {
            domain,
            model_id,
            state,
        } => {
            facade.set_model_state(&domain, &model_id, &state).await?;
            json!({ "domain": domain, "model_id": model_id, "state": state })
        }
        Command::UnsetState {
            domain,
            model_id,
            state,
        } => {
            facade.remove_model_state(&domain, &model_id, &state).await?;
            json!({ "domain": domain, "model_id": model_id, "state": state })
        }
        Command::Delete {
            domain,
            model_id,
            yes,
        } => {
            if !yes {
                bail!("refusing to delete {}/{} without --yes", domain, model_id);
            }
            facade.delete_model(&domain, &model_id).await?;
            json!({ "domain": domain, "model_id": model_id, "deleted": true })
        }
    };
    Ok(output)
}
