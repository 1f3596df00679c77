use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::dataset::Dataset;
use super::error::AssembleError;
use super::limit::{sanitise_limit_with, MAX_ROW_LIMIT};
use crate::access::GrantFilter;
use crate::cohort::{CohortFilter, DimensionCatalog};
use crate::predicate::sql::join;
use crate::predicate::{Predicate, SqlResult};

/// A statement ready for the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledQuery {
    pub dataset: String,
    pub sql: SqlResult,
    pub limit: u32,
}

/// Combines the grant filter, the optional cohort filter and a row limit with
/// a dataset's base select.
#[derive(Debug, Clone)]
pub struct QueryAssembler<'a> {
    cohort_filter: CohortFilter<'a>,
    max_limit: u32,
    audit_logging: bool,
}

impl Default for QueryAssembler<'static> {
    fn default() -> Self {
        Self::new(DimensionCatalog::standard(), MAX_ROW_LIMIT)
    }
}

impl QueryAssembler<'static> {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(DimensionCatalog::standard(), config.query.max_limit)
            .with_audit_logging(config.security.enable_audit_logging)
    }
}

impl<'a> QueryAssembler<'a> {
    /// `max_limit` can lower the row ceiling but never raise it above
    /// [`MAX_ROW_LIMIT`].
    pub fn new(catalog: &'a DimensionCatalog, max_limit: u32) -> Self {
        Self {
            cohort_filter: CohortFilter::new(catalog),
            max_limit: max_limit.min(MAX_ROW_LIMIT),
            audit_logging: false,
        }
    }

    pub fn with_audit_logging(mut self, enabled: bool) -> Self {
        self.audit_logging = enabled;
        self
    }

    pub fn catalog(&self) -> &'a DimensionCatalog {
        self.cohort_filter.catalog()
    }

    pub fn max_limit(&self) -> u32 {
        self.max_limit
    }

    /// Build against a registered dataset.
    pub fn build_for(
        &self,
        dataset: &str,
        granted: &[Value],
        cohort: Option<&Value>,
        limit: Option<&str>,
    ) -> Result<AssembledQuery, AssembleError> {
        let registered = Dataset::find(dataset).ok_or_else(|| AssembleError::UnknownDataset(dataset.to_string()))?;
        self.build(registered.base_select, registered.name, granted, cohort, limit)
    }

    /// `base_select WHERE grant [AND cohort] LIMIT n`.
    ///
    /// The grant filter is compiled first and a deny stops the build before
    /// the cohort is looked at.
    pub fn build(
        &self,
        base_select: &str,
        dataset: &str,
        granted: &[Value],
        cohort: Option<&Value>,
        limit: Option<&str>,
    ) -> Result<AssembledQuery, AssembleError> {
        let grant = match GrantFilter::expression(granted, dataset, 0) {
            Predicate::Deny => {
                warn!(dataset, "request denied: no usable grant");
                return Err(AssembleError::InsufficientPermissions(dataset.to_string()));
            }
            other => other.into_expression(),
        };

        let starting_param_index = grant.as_ref().map_or(0, |sql| sql.params.len());
        let cohort = match cohort {
            None => None,
            Some(spec) => match self.cohort_filter.generate(Some(spec), starting_param_index) {
                Predicate::Deny => {
                    warn!(dataset, "request denied: cohort specification rejected");
                    return Err(AssembleError::CohortRejected(dataset.to_string()));
                }
                other => other.into_expression(),
            },
        };

        let limit = sanitise_limit_with(limit, self.max_limit);

        let mut conditions = vec![];
        let mut params = vec![];
        for sql in [grant, cohort].into_iter().flatten() {
            conditions.push(sql.query);
            params.extend(sql.params);
        }

        let where_clause = match join(&conditions, " AND ") {
            clause if clause.is_empty() => String::new(),
            clause => format!("WHERE {}", clause),
        };
        let query = join(&[base_select.trim().to_string(), where_clause, format!("LIMIT {}", limit)], " ");

        let assembled = AssembledQuery {
            dataset: dataset.to_string(),
            sql: SqlResult { query, params },
            limit,
        };

        if self.audit_logging {
            info!(target: "audit", dataset, query = %assembled.sql.inline(), "assembled query");
        }

        Ok(assembled)
    }
}
