//! CLI command definitions and dispatch.

pub mod config;
pub mod filters;
pub mod options;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use framekit_core::config::FrameworkConfig;
use framekit_core::error::AppError;
use framekit_hooks::{AppContext, FilterBus, FilterRegistry};

use crate::output::OutputFormat;

/// Framekit: configuration, filter and option utilities for CMS plugins
#[derive(Debug, Parser)]
#[command(name = "framekit", version, about, long_about = None)]
pub struct Cli {
    /// Base path of the settings file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Settings overlay loaded next to the base file
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect merged config partitions
    Config(config::ConfigArgs),
    /// Inspect and run declared filters
    Filters(filters::FiltersArgs),
    /// Inspect option names
    Options(options::OptionsArgs),
}

impl Cli {
    /// Load the framework settings named on the command line
    pub fn load_config(&self) -> Result<FrameworkConfig, AppError> {
        FrameworkConfig::load_from(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &FrameworkConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Config(args) => config::execute(args, config, self.format),
            Commands::Filters(args) => filters::execute(args, config, self.format),
            Commands::Options(args) => options::execute(args, config, self.format).await,
        }
    }
}

/// Helper: build the context, bus and initialized filter registry
pub fn bootstrap(config: &FrameworkConfig) -> (Arc<FilterBus>, Arc<FilterRegistry>) {
    let context = Arc::new(AppContext::from_config(config));
    let bus = Arc::new(FilterBus::new());
    let registry = FilterRegistry::new(context, bus.clone());
    registry.initialize();
    (bus, registry)
}
