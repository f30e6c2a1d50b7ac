//! Error types used by the crate.

use thiserror::Error;

/// Error type returned by all fallible operations of the crate.
///
/// All errors are configuration errors in a broad sense: the crate performs no
/// I/O, so every failure is detectable synchronously from the inputs alone.
#[derive(Debug, Error)]
pub enum TilesError {
    /// The composition request is inconsistent or incomplete.
    #[error("{0}")]
    Configuration(String),

    /// The requested provider name is not present in the catalog.
    #[error("unknown tile provider {0:?}")]
    UnknownProvider(String),

    /// The requested zoom level is outside of the range served by the provider.
    #[error(
        "the zoom level of {zoom} is not valid for the current tile provider{}",
        zoom_range_suffix(.min_zoom, .max_zoom)
    )]
    InvalidZoom {
        /// The rejected zoom level.
        zoom: i32,
        /// Minimum zoom level the provider serves.
        min_zoom: u8,
        /// Maximum zoom level the provider serves, if stated by the descriptor.
        max_zoom: Option<u8>,
    },

    /// The provider's URL template references a key that has no value.
    #[error("invalid URL template of tile provider {provider:?}: {source}")]
    UrlTemplate {
        /// Name of the offending provider.
        provider: String,
        /// The underlying template error.
        source: strfmt::FmtError,
    },
}

fn zoom_range_suffix(min_zoom: &u8, max_zoom: &Option<u8>) -> String {
    match max_zoom {
        Some(max_zoom) => format!(" (valid zooms: {min_zoom} - {max_zoom})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_zoom_message_includes_range_when_known() {
        let error = TilesError::InvalidZoom {
            zoom: 25,
            min_zoom: 0,
            max_zoom: Some(19),
        };
        assert_eq!(
            error.to_string(),
            "the zoom level of 25 is not valid for the current tile provider (valid zooms: 0 - 19)"
        );
    }

    #[test]
    fn invalid_zoom_message_omits_unknown_range() {
        let error = TilesError::InvalidZoom {
            zoom: 31,
            min_zoom: 0,
            max_zoom: None,
        };
        assert_eq!(
            error.to_string(),
            "the zoom level of 31 is not valid for the current tile provider"
        );
    }
}
