use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named Vega-Lite parameter.
///
/// Carries either a concrete value or an expression evaluated by the Vega
/// runtime. Other parameters reference it by its name inside their own
/// expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expr: Option<String>,
}

impl Param {
    /// Creates a parameter with a fixed value.
    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            expr: None,
        }
    }

    /// Creates a parameter computed from a Vega expression.
    pub fn expr(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            expr: Some(expr.into()),
        }
    }

    /// The name under which other expressions reference this parameter.
    pub fn name(&self) -> &str {
        &self.name
    }
}
