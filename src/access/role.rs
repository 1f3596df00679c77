use serde::Serialize;
use serde_json::{Map, Value};

use super::error::GrantError;
use crate::predicate::sql::is_identifier;

/// One `field LIKE value` constraint of a role.
///
/// `field` is stored with the dataset prefix removed and may be empty; an empty
/// field compares against the field of the constraint before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleConstraint {
    pub field: String,
    pub value: String,
}

/// A row-visibility grant scoped to a single dataset.
///
/// Two wire shapes are accepted from token claims:
///
/// ```json
/// { "population_gpp_code": "A1", "population_pcn_code": "P7" }
/// { "dataset": "population", "constraints": { "gpp_code": "A1" } }
/// ```
///
/// The tagged shape with an empty `constraints` object grants the whole
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantedRole {
    dataset: String,
    constraints: Vec<RoleConstraint>,
}

impl GrantedRole {
    pub fn new(
        dataset: impl Into<String>,
        constraints: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            constraints: constraints
                .into_iter()
                .map(|(field, value)| RoleConstraint { field, value })
                .collect(),
        }
    }

    pub fn universal(dataset: impl Into<String>) -> Self {
        Self::new(dataset, Vec::new())
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn constraints(&self) -> &[RoleConstraint] {
        &self.constraints
    }

    pub fn is_universal(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn is_scoped_to(&self, dataset: &str) -> bool {
        self.dataset == dataset
    }

    pub fn from_value(value: &Value) -> Result<Self, GrantError> {
        let obj = value
            .as_object()
            .ok_or_else(|| GrantError::NotAnObject(value.to_string()))?;

        if Self::is_tagged(obj) {
            Self::from_tagged(obj)
        } else {
            Self::from_prefixed(obj)
        }
    }

    /// Cheap scope check on a raw role, made before any validation: the tagged
    /// shape names `dataset` exactly, the flat shape has a `<dataset>_` key.
    pub fn names_dataset(value: &Value, dataset: &str) -> bool {
        let Some(obj) = value.as_object() else {
            return false;
        };
        if Self::is_tagged(obj) {
            return obj.get("dataset").and_then(Value::as_str) == Some(dataset);
        }

        let prefix = format!("{}_", dataset);
        obj.keys().any(|key| key.starts_with(&prefix))
    }

    fn is_tagged(obj: &Map<String, Value>) -> bool {
        obj.len() == 2 && obj.contains_key("dataset") && obj.contains_key("constraints")
    }

    fn from_tagged(obj: &Map<String, Value>) -> Result<Self, GrantError> {
        let dataset = obj
            .get("dataset")
            .and_then(Value::as_str)
            .ok_or_else(|| GrantError::InvalidDataset(obj["dataset"].to_string()))?;
        Self::validate_dataset(dataset)?;

        let constraints = obj
            .get("constraints")
            .and_then(Value::as_object)
            .ok_or_else(|| GrantError::NotAnObject(obj["constraints"].to_string()))?;

        let mut parsed = Vec::with_capacity(constraints.len());
        for (field, value) in constraints {
            Self::validate_field(field)?;
            parsed.push((field.clone(), Self::value_text(field, value)?));
        }

        Ok(Self::new(dataset, parsed))
    }

    fn from_prefixed(obj: &Map<String, Value>) -> Result<Self, GrantError> {
        if obj.is_empty() {
            return Err(GrantError::NoConstraints);
        }

        let mut dataset: Option<&str> = None;
        let mut parsed = Vec::with_capacity(obj.len());

        for (key, value) in obj {
            let (prefix, field) = key
                .split_once('_')
                .ok_or_else(|| GrantError::MissingDatasetPrefix(key.clone()))?;

            match dataset {
                None => {
                    Self::validate_dataset(prefix)?;
                    dataset = Some(prefix);
                }
                Some(existing) if existing != prefix => {
                    return Err(GrantError::MixedDatasets(existing.to_string(), prefix.to_string()));
                }
                Some(_) => {}
            }

            Self::validate_field(field)?;
            parsed.push((field.to_string(), Self::value_text(key, value)?));
        }

        // Non-empty map, so the first key always set the dataset
        let dataset = dataset.ok_or(GrantError::NoConstraints)?;
        Ok(Self::new(dataset, parsed))
    }

    fn validate_dataset(dataset: &str) -> Result<(), GrantError> {
        if is_identifier(dataset) {
            Ok(())
        } else {
            Err(GrantError::InvalidDataset(dataset.to_string()))
        }
    }

    fn validate_field(field: &str) -> Result<(), GrantError> {
        if field.is_empty() || is_identifier(field) {
            Ok(())
        } else {
            Err(GrantError::InvalidField(field.to_string()))
        }
    }

    fn value_text(key: &str, value: &Value) -> Result<String, GrantError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(GrantError::InvalidValue(key.to_string())),
        }
    }
}

impl TryFrom<&Value> for GrantedRole {
    type Error = GrantError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_prefixed_role() {
        let role = GrantedRole::from_value(&json!({ "population_gpp_code": "A1" })).unwrap();
        assert_eq!(role.dataset(), "population");
        assert_eq!(
            role.constraints(),
            &[RoleConstraint { field: "gpp_code".into(), value: "A1".into() }]
        );
    }

    #[test]
    fn keeps_key_order_and_empty_fields() {
        let role = GrantedRole::from_value(&json!({
            "populationjoined_pcn_code": "P1",
            "populationjoined_": "P2",
        }))
        .unwrap();
        let fields: Vec<&str> = role.constraints().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["pcn_code", ""]);
    }

    #[test]
    fn parses_tagged_role_and_universal_grant() {
        let role = GrantedRole::from_value(&json!({
            "dataset": "population",
            "constraints": { "gpp_code": "A1", "pcn_code": 7 }
        }))
        .unwrap();
        assert_eq!(role.constraints()[1].value, "7");

        let universal = GrantedRole::from_value(&json!({ "dataset": "population", "constraints": {} })).unwrap();
        assert!(universal.is_universal());
        assert!(universal.is_scoped_to("population"));
        assert!(!universal.is_scoped_to("populationjoined"));
    }

    #[test]
    fn scope_check_reads_only_the_dataset() {
        assert!(GrantedRole::names_dataset(&json!({ "population_gpp_code": ["bad"] }), "population"));
        assert!(GrantedRole::names_dataset(&json!({ "dataset": "population", "constraints": 1 }), "population"));
        assert!(!GrantedRole::names_dataset(&json!({ "populationjoined_gpp_code": "A1" }), "population"));
        assert!(!GrantedRole::names_dataset(&json!({ "dataset": "populationjoined", "constraints": {} }), "population"));
        assert!(!GrantedRole::names_dataset(&json!({ "admin": "yes" }), "population"));
        assert!(!GrantedRole::names_dataset(&json!("population_gpp_code"), "population"));
    }

    #[test]
    fn rejects_malformed_roles() {
        assert_eq!(
            GrantedRole::from_value(&json!("population_gpp_code")),
            Err(GrantError::NotAnObject("\"population_gpp_code\"".into()))
        );
        assert_eq!(GrantedRole::from_value(&json!({})), Err(GrantError::NoConstraints));
        assert_eq!(
            GrantedRole::from_value(&json!({ "gppcode": "A1" })),
            Err(GrantError::MissingDatasetPrefix("gppcode".into()))
        );
        assert_eq!(
            GrantedRole::from_value(&json!({ "population_gpp_code": "A1", "shielding_gpp_code": "A2" })),
            Err(GrantError::MixedDatasets("population".into(), "shielding".into()))
        );
        assert!(matches!(
            GrantedRole::from_value(&json!({ "population_gpp code": "A1" })),
            Err(GrantError::InvalidField(_))
        ));
        assert!(matches!(
            GrantedRole::from_value(&json!({ "population_gpp_code": ["A1"] })),
            Err(GrantError::InvalidValue(_))
        ));
    }
}
