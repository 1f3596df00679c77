use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::predicate::Predicate;

/// Read a JSON argument given inline or as `@path`.
pub fn read_json_arg(raw: &str) -> anyhow::Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?,
        None => raw.to_string(),
    };

    serde_json::from_str(&text).context("argument is not valid JSON")
}

/// Roles may be given as a single object or as an array of them.
pub fn read_roles_arg(raw: &str) -> anyhow::Result<Vec<Value>> {
    match read_json_arg(raw)? {
        Value::Array(roles) => Ok(roles),
        role => Ok(vec![role]),
    }
}

/// Output a compiled predicate in the appropriate format
pub fn output_predicate(output_format: &OutputFormat, predicate: &Predicate) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "outcome": predicate.outcome() });
            if let Some(sql) = predicate.expression() {
                response["query"] = json!(sql.query);
                response["params"] = json!(sql.params);
                response["inline"] = json!(sql.inline());
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => match predicate {
            Predicate::Empty => println!("(no restriction)"),
            Predicate::Deny => println!("DENY"),
            Predicate::Expression(sql) => println!("{}", sql.inline()),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_role_object_is_wrapped() {
        let roles = read_roles_arg(r#"{"population_gpp_code":"A1"}"#).unwrap();
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_json_arg("@/nonexistent/roles.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/roles.json"));
    }
}
