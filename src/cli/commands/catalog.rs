use serde_json::json;

use crate::cli::OutputFormat;
use crate::cohort::{DimensionCatalog, DimensionKind};

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let catalog = DimensionCatalog::standard();

    match output_format {
        OutputFormat::Json => {
            let dimensions: Vec<_> = catalog.dimensions().collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "version": catalog.version(),
                    "dimensions": dimensions,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("Cohort catalog {}", catalog.version());
            for dimension in catalog.dimensions() {
                let detail = match &dimension.kind {
                    DimensionKind::Categorical { field, .. } | DimensionKind::Range { field } => field.to_string(),
                    DimensionKind::FlagSet { flags } => {
                        flags.iter().map(|f| f.label).collect::<Vec<_>>().join(", ")
                    }
                    DimensionKind::Paired { fields, .. } => fields.join(" / "),
                };
                println!("  {:<18} {:<12} {}", dimension.id, dimension.kind.family(), detail);
            }
        }
    }
    Ok(())
}
