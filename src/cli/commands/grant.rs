use crate::access::GrantFilter;
use crate::cli::utils::{output_predicate, read_roles_arg};
use crate::cli::OutputFormat;

pub fn handle(dataset: &str, roles: &str, standalone: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let granted = read_roles_arg(roles)?;
    let predicate = GrantFilter::compile(&granted, dataset, standalone);
    output_predicate(&output_format, &predicate)
}
