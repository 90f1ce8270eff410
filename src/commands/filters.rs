//! Filter CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use framekit_core::config::FrameworkConfig;
use framekit_core::error::AppError;
use framekit_core::traits::HookBus;
use framekit_core::types::Value;
use framekit_hooks::FilterSubscription;

use crate::output::{self, OutputFormat};

/// Arguments for filter commands
#[derive(Debug, Args)]
pub struct FiltersArgs {
    /// Filter subcommand
    #[command(subcommand)]
    pub command: FiltersCommand,
}

/// Filter subcommands
#[derive(Debug, Subcommand)]
pub enum FiltersCommand {
    /// List every registered filter
    List,
    /// Apply a filter tag and print the result with timings
    Apply {
        /// Tag to apply
        tag: String,
        /// Arguments as JSON; anything that is not JSON is passed as a string
        args: Vec<String>,
    },
}

/// A subscription row
#[derive(Debug, Serialize, Tabled)]
struct SubscriptionRow {
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Priority")]
    priority: i32,
    #[tabled(rename = "Args")]
    accepted_args: usize,
}

impl From<FilterSubscription> for SubscriptionRow {
    fn from(s: FilterSubscription) -> Self {
        Self {
            tag: s.tag,
            target: s.target,
            method: s.method,
            priority: s.priority,
            accepted_args: s.accepted_args,
        }
    }
}

/// Execute filter commands
pub fn execute(args: &FiltersArgs, config: &FrameworkConfig, format: OutputFormat) -> Result<(), AppError> {
    let (bus, registry) = super::bootstrap(config);

    match &args.command {
        FiltersCommand::List => {
            let rows: Vec<SubscriptionRow> = registry.subscriptions().into_iter().map(Into::into).collect();
            output::print_list(&rows, format);
        }
        FiltersCommand::Apply { tag, args } => {
            let args: Vec<Value> = args.iter().map(|arg| parse_arg(arg)).collect();
            let result = bus.apply_filters(tag, args);
            let details = registry.elapsed_details();

            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    "result": serde_json::Value::from(&result),
                    "elapsed_ms": registry.elapsed(),
                    "details": details,
                })),
                OutputFormat::Table => {
                    output::print_json(&serde_json::Value::from(&result));
                    for line in details {
                        println!("{line}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn parse_arg(arg: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(arg)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(arg))
}
