//! Attribution of map tile sources.

use serde::{Deserialize, Serialize};

/// Attribution of a tile provider, typically used for citing sources or
/// providing credit.
///
/// This struct stores a text description along with an optional URL where more
/// information or the source can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: String, url: Option<String>) -> Self {
        Self { text, url }
    }

    /// Returns a reference to the text of the attribution.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// Returns a reference to the URL associated with the attribution, if any.
    pub fn get_url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}
