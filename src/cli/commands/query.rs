use serde_json::json;

use crate::cli::utils::{read_json_arg, read_roles_arg};
use crate::cli::OutputFormat;
use crate::config;
use crate::query::QueryAssembler;

pub fn handle(
    dataset: &str,
    roles: &str,
    cohort: Option<&str>,
    limit: Option<&str>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let granted = read_roles_arg(roles)?;
    let cohort = cohort.map(read_json_arg).transpose()?;

    let assembler = QueryAssembler::from_config(config::config());
    let assembled = assembler.build_for(dataset, &granted, cohort.as_ref(), limit)?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "dataset": assembled.dataset,
                    "query": assembled.sql.query,
                    "params": assembled.sql.params,
                    "inline": assembled.sql.inline(),
                    "limit": assembled.limit,
                }))?
            );
        }
        OutputFormat::Text => println!("{}", assembled.sql.inline()),
    }
    Ok(())
}
