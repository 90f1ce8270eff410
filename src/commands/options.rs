//! Option CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use framekit_core::config::FrameworkConfig;
use framekit_core::error::AppError;
use framekit_core::types::Slug;
use framekit_option::{BackendManager, OptionStore};

use crate::output::{self, OutputFormat};

/// Arguments for option commands
#[derive(Debug, Args)]
pub struct OptionsArgs {
    /// Option subcommand
    #[command(subcommand)]
    pub command: OptionsCommand,
}

/// Option subcommands
#[derive(Debug, Subcommand)]
pub enum OptionsCommand {
    /// Show the persisted names of option groups
    Names {
        /// Groups to show; the default group when omitted
        groups: Vec<String>,
    },
    /// Check whether an option name belongs to this plugin
    Managed {
        /// Option name
        name: String,
    },
}

/// An option name row
#[derive(Debug, Serialize, Tabled)]
struct NameRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Option")]
    option: String,
    #[tabled(rename = "Site option")]
    site_option: String,
}

/// Execute option commands
pub async fn execute(args: &OptionsArgs, config: &FrameworkConfig, format: OutputFormat) -> Result<(), AppError> {
    let (bus, _registry) = super::bootstrap(config);
    let backend = BackendManager::new(&config.options)?;
    let slug = Slug::new(&config.plugin.name).with_framework_prefix(&config.plugin.framework_prefix);
    let store = OptionStore::new(Arc::new(backend), bus, slug, &config.options);

    match &args.command {
        OptionsCommand::Names { groups } => {
            let groups: Vec<Option<&str>> = if groups.is_empty() {
                vec![None]
            } else {
                groups.iter().map(|g| Some(g.as_str())).collect()
            };
            let rows: Vec<NameRow> = groups
                .into_iter()
                .map(|group| NameRow {
                    group: framekit_option::keys::group_or_default(group).to_string(),
                    option: store.option_name(group),
                    site_option: store.site_option_name(group),
                })
                .collect();
            output::print_list(&rows, format);
        }
        OptionsCommand::Managed { name } => {
            let managed = store.is_managed_option_name(name);
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({ "name": name, "managed": managed })),
                OutputFormat::Table => output::print_kv(name, if managed { "managed" } else { "not managed" }),
            }
        }
    }

    Ok(())
}
