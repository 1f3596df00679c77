use serde_json::Value;

use super::types::SqlResult;

/// Collects bound values and hands out the matching `$n` placeholders.
///
/// Compilers that feed one statement share a numbering by starting each
/// binder where the previous one stopped.
#[derive(Debug, Default)]
pub struct ParamBinder {
    param_values: Vec<Value>,
    param_index: usize,
}

impl ParamBinder {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.param_values.push(value.into());
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    pub fn finish(self, query: impl Into<String>) -> SqlResult {
        SqlResult::new(query, self.param_values)
    }
}
