use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Version of the standard catalog. Client cohort specifications reference
/// catalog keys, so any change to keys or fields bumps this.
pub const CATALOG_VERSION: &str = "2021.2";

/// Flag label that selects rows carrying none of a dimension's tracked flags.
pub const NONE_LABEL: &str = "None";

/// Comparison for a zero-row result on an unrecognised dimension.
pub const UNKNOWN_DIMENSION_SENTINEL: &str = "nhs_number = '0000000000'";

/// How a tracked flag column is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FlagTest {
    IsTrue,
    Equals(i64),
    AtLeast(i64),
}

impl FlagTest {
    pub fn matches(&self, field: &str) -> String {
        match self {
            FlagTest::IsTrue => format!("{} IS TRUE", field),
            FlagTest::Equals(n) => format!("{} = {}", field, n),
            FlagTest::AtLeast(n) => format!("{} >= {}", field, n),
        }
    }

    /// Negation that also holds for NULL.
    pub fn negated(&self, field: &str) -> String {
        match self {
            FlagTest::IsTrue => format!("{} IS NOT TRUE", field),
            FlagTest::Equals(n) => format!("COALESCE({}, 0) <> {}", field, n),
            FlagTest::AtLeast(n) => format!("COALESCE({}, 0) < {}", field, n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    pub label: &'static str,
    pub field: &'static str,
    pub test: FlagTest,
}

impl FlagSpec {
    pub const fn new(label: &'static str, field: &'static str, test: FlagTest) -> Self {
        Self { label, field, test }
    }
}

/// Allow-list applied to categorical and paired values before they are bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValueRule {
    OneOf { values: &'static [&'static str] },
    /// ASCII letters and digits only.
    Code { max_len: usize },
    /// Names: letters, digits, spaces and `-'&,./()`.
    Text { max_len: usize },
}

impl ValueRule {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueRule::OneOf { values } => values.iter().any(|v| *v == value),
            ValueRule::Code { max_len } => {
                !value.is_empty() && value.len() <= *max_len && value.chars().all(|c| c.is_ascii_alphanumeric())
            }
            ValueRule::Text { max_len } => {
                !value.trim().is_empty()
                    && value.len() <= *max_len
                    && value
                        .chars()
                        .all(|c| c.is_alphanumeric() || " -'&,./()".contains(c))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DimensionKind {
    Categorical { field: &'static str, rule: ValueRule },
    Range { field: &'static str },
    FlagSet { flags: &'static [FlagSpec] },
    Paired { fields: [&'static str; 2], rule: ValueRule },
}

impl DimensionKind {
    pub fn family(&self) -> &'static str {
        match self {
            DimensionKind::Categorical { .. } => "categorical",
            DimensionKind::Range { .. } => "range",
            DimensionKind::FlagSet { .. } => "flag_set",
            DimensionKind::Paired { .. } => "paired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionSpec {
    pub id: &'static str,
    #[serde(flatten)]
    pub kind: DimensionKind,
}

impl DimensionSpec {
    pub const fn new(id: &'static str, kind: DimensionKind) -> Self {
        Self { id, kind }
    }
}

/// Immutable lookup from cohort dimension key to physical fields and
/// comparison rules.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionCatalog {
    version: &'static str,
    dimensions: BTreeMap<&'static str, DimensionSpec>,
    ignored_keys: Vec<&'static str>,
}

impl DimensionCatalog {
    pub fn new(
        version: &'static str,
        dimensions: impl IntoIterator<Item = DimensionSpec>,
        ignored_keys: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            version,
            dimensions: dimensions.into_iter().map(|d| (d.id, d)).collect(),
            ignored_keys: ignored_keys.into_iter().collect(),
        }
    }

    /// The catalog served to partner clients.
    pub fn standard() -> &'static DimensionCatalog {
        &STANDARD_CATALOG
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<&DimensionSpec> {
        self.dimensions.get(id)
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored_keys.iter().any(|k| *k == key)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &DimensionSpec> {
        self.dimensions.values()
    }
}

const SEX_VALUES: &[&str] = &["Male", "Female", "Unknown", "Indeterminate"];

const LONG_TERM_CONDITIONS: &[FlagSpec] = &[
    FlagSpec::new("Asthma", "asthma", FlagTest::IsTrue),
    FlagSpec::new("Atrial Fibrillation", "atrial_fibrillation", FlagTest::IsTrue),
    FlagSpec::new("Cancer", "cancer", FlagTest::IsTrue),
    FlagSpec::new("Chronic Kidney Disease", "chronic_kidney_disease", FlagTest::IsTrue),
    FlagSpec::new("COPD", "copd", FlagTest::IsTrue),
    FlagSpec::new("Coronary Artery Disease", "coronary_artery_disease", FlagTest::IsTrue),
    FlagSpec::new("Dementia", "dementia", FlagTest::IsTrue),
    FlagSpec::new("Depression", "depression", FlagTest::IsTrue),
    FlagSpec::new("Diabetes", "diabetes", FlagTest::IsTrue),
    FlagSpec::new("Epilepsy", "epilepsy", FlagTest::IsTrue),
    FlagSpec::new("Heart Failure", "heart_failure", FlagTest::IsTrue),
    FlagSpec::new("Hypertension", "hypertension", FlagTest::IsTrue),
    FlagSpec::new("Learning Disability", "learning_disability", FlagTest::IsTrue),
    FlagSpec::new("Serious Mental Illness", "smi", FlagTest::IsTrue),
];

const DISTRICT_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("Care Home", "care_home_flag", FlagTest::IsTrue),
    FlagSpec::new("Housebound", "housebound_flag", FlagTest::IsTrue),
    FlagSpec::new("Palliative Care", "palliative_care_flag", FlagTest::IsTrue),
    FlagSpec::new("Other Shielded", "other_shielded_category", FlagTest::Equals(1)),
    FlagSpec::new("Moderate Frailty", "efi_category", FlagTest::Equals(2)),
    FlagSpec::new("Severe Frailty", "efi_category", FlagTest::AtLeast(3)),
];

static STANDARD_CATALOG: Lazy<DimensionCatalog> = Lazy::new(|| {
    DimensionCatalog::new(
        CATALOG_VERSION,
        [
            DimensionSpec::new("AgeDimension", DimensionKind::Range { field: "age" }),
            DimensionSpec::new("RskDimension", DimensionKind::Range { field: "risk_score_int" }),
            DimensionSpec::new(
                "SexDimension",
                DimensionKind::Categorical { field: "sex", rule: ValueRule::OneOf { values: SEX_VALUES } },
            ),
            DimensionSpec::new(
                "GPDimension",
                DimensionKind::Categorical { field: "gpp_code", rule: ValueRule::Code { max_len: 10 } },
            ),
            DimensionSpec::new(
                "PCNDimension",
                DimensionKind::Categorical { field: "pcn_code", rule: ValueRule::Code { max_len: 10 } },
            ),
            DimensionSpec::new(
                "WDimension",
                DimensionKind::Categorical {
                    field: "electoral_ward_or_division",
                    rule: ValueRule::Text { max_len: 100 },
                },
            ),
            DimensionSpec::new("LTCs2Dimension", DimensionKind::FlagSet { flags: LONG_TERM_CONDITIONS }),
            DimensionSpec::new("Flags2Dimension", DimensionKind::FlagSet { flags: DISTRICT_FLAGS }),
            DimensionSpec::new(
                "MatrixDimension",
                DimensionKind::Paired {
                    fields: ["risk_score_group", "wellbeing_score_group"],
                    rule: ValueRule::Code { max_len: 4 },
                },
            ),
        ],
        ["page", "pageSize", "sortBy", "sortDirection", "limit"],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_resolves_known_dimensions() {
        let catalog = DimensionCatalog::standard();
        assert_eq!(catalog.version(), CATALOG_VERSION);
        assert_eq!(
            catalog.get("AgeDimension").map(|d| &d.kind),
            Some(&DimensionKind::Range { field: "age" })
        );
        assert!(catalog.get("ageDimension").is_none());
        assert!(catalog.is_ignored("pageSize"));
        assert!(!catalog.is_ignored("AgeDimension"));
    }

    #[test]
    fn flag_tests_and_negations() {
        assert_eq!(FlagTest::IsTrue.matches("asthma"), "asthma IS TRUE");
        assert_eq!(FlagTest::IsTrue.negated("asthma"), "asthma IS NOT TRUE");
        assert_eq!(FlagTest::Equals(2).negated("efi_category"), "COALESCE(efi_category, 0) <> 2");
        assert_eq!(FlagTest::AtLeast(3).matches("efi_category"), "efi_category >= 3");
    }

    #[test]
    fn value_rules() {
        assert!(ValueRule::Code { max_len: 6 }.accepts("P81001"));
        assert!(!ValueRule::Code { max_len: 6 }.accepts("P81001X"));
        assert!(!ValueRule::Code { max_len: 10 }.accepts("A1' OR '1'='1"));
        assert!(ValueRule::Text { max_len: 100 }.accepts("St. Anne's (North)"));
        assert!(!ValueRule::Text { max_len: 100 }.accepts("Ward; DROP"));
        assert!(ValueRule::OneOf { values: SEX_VALUES }.accepts("Female"));
        assert!(!ValueRule::OneOf { values: SEX_VALUES }.accepts("female"));
    }

    #[test]
    fn catalog_serializes_with_family_tags() {
        let value = serde_json::to_value(DimensionCatalog::standard().get("GPDimension").unwrap()).unwrap();
        assert_eq!(value["family"], "categorical");
        assert_eq!(value["field"], "gpp_code");
    }
}
