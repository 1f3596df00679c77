use serde_json::Value;
use tracing::{debug, warn};

use super::error::GrantError;
use super::role::GrantedRole;
use crate::predicate::{ParamBinder, Predicate, SqlResult};

/// Compiles a caller's granted roles into the row filter for one dataset.
///
/// Roles are a union: each role scoped to the dataset contributes one
/// fragment and the fragments are OR-joined. Every failure folds into
/// [`Predicate::Deny`].
pub struct GrantFilter;

impl GrantFilter {
    /// `standalone` renders `WHERE <expr>`; otherwise `(<expr>) AND`, ready to
    /// be followed by further conditions.
    pub fn compile(granted: &[Value], dataset: &str, standalone: bool) -> Predicate {
        match Self::expression(granted, dataset, 0) {
            Predicate::Expression(sql) if standalone => Predicate::Expression(SqlResult {
                query: format!("WHERE {}", sql.query),
                params: sql.params,
            }),
            Predicate::Expression(sql) => Predicate::Expression(SqlResult {
                query: format!("{} AND", Self::grouped(&sql.query)),
                params: sql.params,
            }),
            Predicate::Empty if standalone => {
                warn!(dataset, "universal grant has no standalone form; denying");
                Predicate::Deny
            }
            other => other,
        }
    }

    /// The bare OR-expression, numbered from `starting_param_index`.
    pub fn expression(granted: &[Value], dataset: &str, starting_param_index: usize) -> Predicate {
        let result = Self::parse_roles(granted, dataset)
            .and_then(|roles| Self::compile_roles(&roles, dataset, starting_param_index));

        match result {
            Ok(predicate) => {
                if predicate.is_deny() {
                    warn!(dataset, roles = granted.len(), "no role grants access to dataset");
                } else {
                    debug!(dataset, outcome = predicate.outcome(), "compiled grant filter");
                }
                predicate
            }
            Err(e) => {
                warn!(dataset, error = %e, "malformed grant; denying");
                Predicate::Deny
            }
        }
    }

    /// Parse the roles that name `dataset`. Roles for other datasets are
    /// skipped unvalidated; a malformed role for `dataset` is an error.
    pub fn parse_roles(granted: &[Value], dataset: &str) -> Result<Vec<GrantedRole>, GrantError> {
        granted
            .iter()
            .filter(|role| GrantedRole::names_dataset(role, dataset))
            .map(GrantedRole::from_value)
            .collect()
    }

    pub fn compile_roles(
        roles: &[GrantedRole],
        dataset: &str,
        starting_param_index: usize,
    ) -> Result<Predicate, GrantError> {
        let scoped: Vec<&GrantedRole> = roles.iter().filter(|r| r.is_scoped_to(dataset)).collect();

        if scoped.is_empty() {
            return Ok(Predicate::Deny);
        }
        if scoped.iter().any(|r| r.is_universal()) {
            return Ok(Predicate::Empty);
        }

        let mut binder = ParamBinder::new(starting_param_index);
        let mut fragments = Vec::with_capacity(scoped.len());
        for role in scoped {
            fragments.push(Self::role_fragment(role, &mut binder)?);
        }

        let query = match fragments.as_slice() {
            [single] => single.clone(),
            _ => format!("({})", fragments.join(" OR ")),
        };
        Ok(Predicate::Expression(binder.finish(query)))
    }

    fn role_fragment(role: &GrantedRole, binder: &mut ParamBinder) -> Result<String, GrantError> {
        let mut current_field: Option<&str> = None;
        let mut comparisons = Vec::with_capacity(role.constraints().len());

        for constraint in role.constraints() {
            if !constraint.field.is_empty() {
                current_field = Some(constraint.field.as_str());
            }
            let field = current_field.ok_or_else(|| GrantError::MissingField(constraint.value.clone()))?;
            comparisons.push(format!("{} LIKE {}", field, binder.bind(constraint.value.clone())));
        }

        match comparisons.as_slice() {
            [] => Err(GrantError::NoConstraints),
            [single] => Ok(single.clone()),
            _ => Ok(format!("({})", comparisons.join(" AND "))),
        }
    }

    fn grouped(expr: &str) -> String {
        if expr.starts_with('(') && expr.ends_with(')') {
            expr.to_string()
        } else {
            format!("({})", expr)
        }
    }
}
