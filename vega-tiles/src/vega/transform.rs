use serde::{Deserialize, Serialize};

/// The Vega-Lite transform steps used by tile layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transform {
    /// Computes a new field from an expression.
    Calculate {
        /// The expression computing the field value.
        calculate: String,
        /// The name of the computed field.
        #[serde(rename = "as")]
        field: String,
    },
    /// Flattens array-valued fields into one row per element.
    Flatten {
        /// The fields to flatten.
        flatten: Vec<String>,
    },
    /// Keeps only the rows for which the predicate expression holds.
    Filter {
        /// The predicate expression.
        filter: String,
    },
}

impl Transform {
    /// Creates a calculate transform.
    pub fn calculate(expr: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Calculate {
            calculate: expr.into(),
            field: field.into(),
        }
    }

    /// Creates a flatten transform.
    pub fn flatten(fields: &[&str]) -> Self {
        Self::Flatten {
            flatten: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Creates a filter transform.
    pub fn filter(expr: impl Into<String>) -> Self {
        Self::Filter {
            filter: expr.into(),
        }
    }
}
