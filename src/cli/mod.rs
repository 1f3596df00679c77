pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "accessc")]
#[command(about = "Compile role grants and cohort specifications into SQL predicates")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compile granted roles into a dataset row filter")]
    Grant {
        #[arg(help = "Dataset name")]
        dataset: String,
        #[arg(long, help = "Granted roles as a JSON array, or @file")]
        roles: String,
        #[arg(long, help = "Render a WHERE clause instead of a composable fragment")]
        standalone: bool,
    },

    #[command(about = "Compile a cohort specification")]
    Cohort {
        #[arg(long, help = "Cohort specification as JSON, or @file")]
        spec: String,
    },

    #[command(about = "Assemble the full statement for a registered dataset")]
    Query {
        #[arg(help = "Dataset name")]
        dataset: String,
        #[arg(long, help = "Granted roles as a JSON array, or @file")]
        roles: String,
        #[arg(long, help = "Cohort specification as JSON, or @file")]
        cohort: Option<String>,
        #[arg(long, help = "Row limit (digits only, capped at the configured ceiling)")]
        limit: Option<String>,
    },

    #[command(about = "List the cohort dimension catalog")]
    Catalog,

    #[command(about = "Issue a signed access token carrying roles (uses JWT_SECRET)")]
    Token {
        #[arg(help = "Subject the token is issued to")]
        sub: String,
        #[arg(long, help = "Granted roles as a JSON array, or @file")]
        roles: String,
        #[arg(long, help = "Expiry in hours (defaults to the configured expiry)")]
        expiry_hours: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Grant { dataset, roles, standalone } => {
            commands::grant::handle(&dataset, &roles, standalone, output_format)
        }
        Commands::Cohort { spec } => commands::cohort::handle(&spec, output_format),
        Commands::Query { dataset, roles, cohort, limit } => {
            commands::query::handle(&dataset, &roles, cohort.as_deref(), limit.as_deref(), output_format)
        }
        Commands::Catalog => commands::catalog::handle(output_format),
        Commands::Token { sub, roles, expiry_hours } => {
            commands::token::handle(&sub, &roles, expiry_hours, output_format)
        }
    }
}
