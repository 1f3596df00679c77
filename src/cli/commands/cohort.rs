use crate::cli::utils::output_predicate;
use crate::cli::OutputFormat;
use crate::cohort::CohortFilter;

pub fn handle(spec: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    // Invalid JSON is part of what the compiler decides (it denies), so the
    // text goes through unparsed unless it names a file.
    let raw = match spec.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => spec.to_string(),
    };

    let predicate = CohortFilter::default().compile_text(Some(&raw));
    output_predicate(&output_format, &predicate)
}
