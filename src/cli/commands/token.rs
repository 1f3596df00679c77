use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::read_roles_arg;
use crate::cli::OutputFormat;
use crate::config;

pub fn handle(sub: &str, roles: &str, expiry_hours: Option<u64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let granted = read_roles_arg(roles)?;
    let expiry_hours = expiry_hours.unwrap_or(security.jwt_expiry_hours);

    let claims = Claims::new(sub, granted, expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "token": token,
                    "sub": claims.sub,
                    "expires_at": claims.exp,
                }))?
            );
        }
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
