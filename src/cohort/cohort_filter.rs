use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::catalog::{DimensionCatalog, DimensionKind, FlagSpec, ValueRule, NONE_LABEL, UNKNOWN_DIMENSION_SENTINEL};
use super::error::CohortError;
use crate::predicate::sql::is_identifier;
use crate::predicate::{ParamBinder, Predicate};

/// Compiles a cohort specification into a row filter using a dimension catalog.
///
/// Each dimension present narrows the cohort; the per-dimension fragments are
/// AND-joined. Parse and shape errors fold into [`Predicate::Deny`].
#[derive(Debug, Clone, Copy)]
pub struct CohortFilter<'a> {
    catalog: &'a DimensionCatalog,
}

impl Default for CohortFilter<'static> {
    fn default() -> Self {
        Self::new(DimensionCatalog::standard())
    }
}

impl<'a> CohortFilter<'a> {
    pub fn new(catalog: &'a DimensionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a DimensionCatalog {
        self.catalog
    }

    pub fn compile(&self, spec: Option<&Value>) -> Predicate {
        self.generate(spec, 0)
    }

    /// Compile raw JSON text as received from a query parameter.
    pub fn compile_text(&self, raw: Option<&str>) -> Predicate {
        let spec = raw.map(|s| Value::String(s.to_string()));
        self.generate(spec.as_ref(), 0)
    }

    /// Compile with placeholders numbered from `starting_param_index`.
    pub fn generate(&self, spec: Option<&Value>, starting_param_index: usize) -> Predicate {
        let result = match spec {
            None => Ok(Predicate::Empty),
            Some(spec) => self.try_generate(spec, starting_param_index),
        };

        match result {
            Ok(predicate) => {
                debug!(outcome = predicate.outcome(), "compiled cohort filter");
                predicate
            }
            Err(e) => {
                warn!(error = %e, "rejected cohort specification; denying");
                Predicate::Deny
            }
        }
    }

    pub fn try_generate(&self, spec: &Value, starting_param_index: usize) -> Result<Predicate, CohortError> {
        match spec {
            Value::Null => Ok(Predicate::Empty),
            Value::Object(obj) => self.generate_object(obj, starting_param_index),
            // JSON text, possibly the `{}` marker
            Value::String(raw) => match Self::parse(raw)? {
                Value::Null => Ok(Predicate::Empty),
                Value::Object(obj) => self.generate_object(&obj, starting_param_index),
                _ => Err(CohortError::NotAnObject),
            },
            _ => Err(CohortError::NotAnObject),
        }
    }

    /// Blank text is treated as an absent specification.
    pub fn parse(raw: &str) -> Result<Value, CohortError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(trimmed)?)
    }

    fn generate_object(&self, spec: &Map<String, Value>, starting_param_index: usize) -> Result<Predicate, CohortError> {
        let mut binder = ParamBinder::new(starting_param_index);
        let mut fragments = vec![];

        for (key, payload) in spec {
            if self.catalog.is_ignored(key) {
                continue;
            }

            let fragment = match self.catalog.get(key) {
                Some(dimension) => self.dimension_fragment(dimension.id, &dimension.kind, payload, &mut binder)?,
                None => {
                    debug!(dimension = %key, "unknown cohort dimension; matching no rows");
                    Some(UNKNOWN_DIMENSION_SENTINEL.to_string())
                }
            };

            if let Some(fragment) = fragment {
                fragments.push(fragment);
            }
        }

        if fragments.is_empty() {
            return Ok(Predicate::Empty);
        }
        Ok(Predicate::Expression(binder.finish(fragments.join(" AND "))))
    }

    fn dimension_fragment(
        &self,
        id: &str,
        kind: &DimensionKind,
        payload: &Value,
        binder: &mut ParamBinder,
    ) -> Result<Option<String>, CohortError> {
        match kind {
            DimensionKind::Categorical { field, rule } => Self::categorical(id, field, rule, payload, binder).map(Some),
            DimensionKind::Range { field } => Self::range(id, field, payload, binder).map(Some),
            DimensionKind::FlagSet { flags } => Self::flag_set(id, flags, payload),
            DimensionKind::Paired { fields, rule } => Self::paired(id, fields, rule, payload, binder),
        }
    }

    fn categorical(
        id: &str,
        field: &str,
        rule: &ValueRule,
        payload: &Value,
        binder: &mut ParamBinder,
    ) -> Result<String, CohortError> {
        let values = Self::scalar_list(id, payload)?;
        for value in &values {
            Self::check_rule(id, rule, value)?;
        }

        Ok(match values.as_slice() {
            [] => format!("{} IS NOT NULL", field),
            [single] => format!("{} = {}", field, binder.bind(single.clone())),
            _ => {
                let params: Vec<String> = values.iter().map(|v| binder.bind(v.clone())).collect();
                format!("{} IN ({})", field, params.join(", "))
            }
        })
    }

    fn range(id: &str, field: &str, payload: &Value, binder: &mut ParamBinder) -> Result<String, CohortError> {
        let pairs = payload
            .as_array()
            .ok_or_else(|| CohortError::payload(id, "expected a list holding one [min, max] pair"))?;
        let [pair] = pairs.as_slice() else {
            return Err(CohortError::payload(id, format!("expected exactly one [min, max] pair, got {}", pairs.len())));
        };

        let bounds = pair
            .as_array()
            .ok_or_else(|| CohortError::payload(id, "range must be a [min, max] pair"))?;
        let [min, max] = bounds.as_slice() else {
            return Err(CohortError::payload(id, "range must be a [min, max] pair"));
        };

        let (min, max) = match (min.as_i64(), max.as_i64()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(CohortError::payload(id, "range bounds must be integers")),
        };

        Ok(format!("{} >= {} AND {} <= {}", field, binder.bind(min), field, binder.bind(max)))
    }

    fn flag_set(id: &str, flags: &[FlagSpec], payload: &Value) -> Result<Option<String>, CohortError> {
        let labels = Self::scalar_list(id, payload)?;

        if labels.iter().any(|label| label == NONE_LABEL) {
            return Ok(Some(Self::none_of(flags)));
        }

        let mut tests = Vec::with_capacity(labels.len());
        for label in &labels {
            let test = match flags.iter().find(|flag| flag.label == label.as_str()) {
                Some(flag) => flag.test.matches(flag.field),
                None => {
                    let field = snake_case(label);
                    if !is_identifier(&field) {
                        return Err(CohortError::InvalidFlagLabel(label.clone()));
                    }
                    format!("{} IS TRUE", field)
                }
            };
            tests.push(test);
        }

        if tests.is_empty() {
            return Ok(None);
        }
        Ok(Some(tests.join(" AND ")))
    }

    fn none_of(flags: &[FlagSpec]) -> String {
        let negations: Vec<String> = flags.iter().map(|flag| flag.test.negated(flag.field)).collect();
        format!("({})", negations.join(" AND "))
    }

    fn paired(
        id: &str,
        fields: &[&str; 2],
        rule: &ValueRule,
        payload: &Value,
        binder: &mut ParamBinder,
    ) -> Result<Option<String>, CohortError> {
        let pairs = payload
            .as_array()
            .ok_or_else(|| CohortError::payload(id, "expected a list of [a, b] pairs"))?;

        let mut matches = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let values = Self::scalar_list(id, pair)?;
            let [a, b] = values.as_slice() else {
                return Err(CohortError::payload(id, "each entry must be an [a, b] pair"));
            };
            Self::check_rule(id, rule, a)?;
            Self::check_rule(id, rule, b)?;
            matches.push(format!(
                "({} LIKE {} AND {} LIKE {})",
                fields[0],
                binder.bind(a.clone()),
                fields[1],
                binder.bind(b.clone())
            ));
        }

        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(matches.join(" AND ")))
    }

    fn scalar_list(id: &str, payload: &Value) -> Result<Vec<String>, CohortError> {
        let items = payload
            .as_array()
            .ok_or_else(|| CohortError::payload(id, "expected a list of values"))?;

        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(CohortError::payload(id, "values must be strings or numbers")),
            })
            .collect()
    }

    fn check_rule(id: &str, rule: &ValueRule, value: &str) -> Result<(), CohortError> {
        if rule.accepts(value) {
            Ok(())
        } else {
            Err(CohortError::ValueNotAllowed {
                dimension: id.to_string(),
                value: value.to_string(),
            })
        }
    }
}

/// `"Heart Failure"` -> `heart_failure`, `"LongCovid"` -> `long_covid`.
pub fn snake_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 4);
    let mut prev: Option<char> = None;

    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            let boundary = c.is_ascii_uppercase()
                && prev.map_or(false, |p| p.is_ascii_lowercase() || p.is_ascii_digit());
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(c);
    }

    out.trim_end_matches('_').to_string()
}
