//! Config partition CLI commands.

use clap::{Args, Subcommand};

use framekit_core::config::FrameworkConfig;
use framekit_core::error::AppError;
use framekit_core::types::{KeyPath, Value};
use framekit_hooks::AppContext;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show a merged partition, or one dotted key of it
    Show {
        /// Partition name
        partition: String,
        /// Dotted key path inside the partition
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Show required and detected versions
    Versions,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &FrameworkConfig, format: OutputFormat) -> Result<(), AppError> {
    let context = AppContext::from_config(config);

    match &args.command {
        ConfigCommand::Show { partition, key } => {
            let value = context
                .config()
                .get(partition, KeyPath::from(key.as_deref()), Value::Null);
            output::print_json(&serde_json::Value::from(&value));
        }
        ConfigCommand::Versions => {
            let system = context.system();
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "required_runtime_version": system.required_runtime_version(),
                    "required_platform_version": system.required_platform_version(),
                    "runtime_version": system.runtime_version(),
                    "platform_version": system.platform_version(),
                    "is_enough_version": system.is_enough_version(),
                })),
                OutputFormat::Table => {
                    println!("Versions for '{}':", context.slug());
                    output::print_kv("Required runtime", system.required_runtime_version());
                    output::print_kv("Required platform", system.required_platform_version());
                    output::print_kv("Runtime", system.runtime_version());
                    output::print_kv("Platform", system.platform_version());
                    output::print_kv(
                        "Enough",
                        if system.is_enough_version() { "yes" } else { "no" },
                    );
                }
            }
        }
    }

    Ok(())
}
