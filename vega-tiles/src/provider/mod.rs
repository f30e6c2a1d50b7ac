//! Tile provider descriptors.
//!
//! A [`TileProvider`] describes an XYZ tile service: its URL template, the
//! zoom range it serves, its attribution requirements and, for regional
//! services, the extent it covers. Descriptors are read-only metadata; this
//! crate never requests tiles from the described service.

pub mod catalog;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strfmt::strfmt;

use crate::attribution::Attribution;
use crate::bounding_box::GeoBounds;
use crate::error::TilesError;

/// Maximum zoom assumed for providers that do not state one. Deeper than any
/// known public service goes.
const FALLBACK_MAX_ZOOM: u8 = 30;

/// Descriptor of an XYZ tile service.
///
/// The URL template uses `{z}`, `{x}` and `{y}` placeholders for the tile
/// coordinates, `{s}` for a load-balancing subdomain, `{r}` for a retina
/// suffix, and may reference additional keys provided through
/// [`with_option`](TileProvider::with_option).
///
/// # Example
///
/// ```
/// use vega_tiles::TileProvider;
///
/// let provider = TileProvider::new(
///     "OpenStreetMap.Mapnik",
///     "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
/// )
/// .with_max_zoom(19);
///
/// let url = provider.build_url("5", "3", "3").unwrap();
/// assert_eq!(url, "https://tile.openstreetmap.org/3/5/3.png");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileProvider {
    name: String,
    url_template: String,
    #[serde(default)]
    min_zoom: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_zoom: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subdomains: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    options: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribution: Option<Attribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<GeoBounds>,
}

impl TileProvider {
    /// Creates a descriptor with the given name and URL template.
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            min_zoom: 0,
            max_zoom: None,
            subdomains: Vec::new(),
            options: HashMap::new(),
            attribution: None,
            bounds: None,
        }
    }

    /// Sets the range of zoom levels the service provides tiles for.
    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = Some(max_zoom);
        self
    }

    /// Sets the maximum zoom level the service provides tiles for.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = Some(max_zoom);
        self
    }

    /// Sets the subdomains substituted for the `{s}` template placeholder.
    ///
    /// Only the first subdomain is used when building URLs. Load balancing
    /// over subdomains is a relic of the HTTP/1.1 era, but some services
    /// still require a valid subdomain in the URL.
    pub fn with_subdomains(mut self, subdomains: &[&str]) -> Self {
        self.subdomains = subdomains.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Adds a value for a non-standard placeholder of the URL template, such
    /// as `{variant}` or `{apikey}`.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the attribution required by the service's terms of use.
    pub fn with_attribution(mut self, text: impl Into<String>, url: Option<&str>) -> Self {
        self.attribution = Some(Attribution::new(text.into(), url.map(str::to_string)));
        self
    }

    /// Sets the extent the service provides tiles for.
    ///
    /// Services without bounds are assumed to cover the whole world.
    pub fn with_bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Name of the provider.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The URL template of the provider.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Minimum zoom level the service provides tiles for.
    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    /// Maximum zoom level the service provides tiles for, if known.
    pub fn max_zoom(&self) -> Option<u8> {
        self.max_zoom
    }

    /// Attribution required by the service, if any.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.attribution.as_ref()
    }

    /// Extent covered by the service, if it is a regional one.
    pub fn bounds(&self) -> Option<&GeoBounds> {
        self.bounds.as_ref()
    }

    /// Renders the URL template with the given tile coordinate values.
    ///
    /// The values are substituted as plain strings, so both concrete tile
    /// indices and Vega expression fragments can be spliced in. A template
    /// placeholder with no value available is a configuration error.
    pub fn build_url(&self, x: &str, y: &str, z: &str) -> Result<String, TilesError> {
        let mut vars: HashMap<String, String> = self.options.clone();
        vars.insert("x".to_string(), x.to_string());
        vars.insert("y".to_string(), y.to_string());
        vars.insert("z".to_string(), z.to_string());
        vars.entry("s".to_string())
            .or_insert_with(|| self.subdomains.first().cloned().unwrap_or_default());
        vars.entry("r".to_string()).or_default();

        strfmt(&self.url_template, &vars).map_err(|source| TilesError::UrlTemplate {
            provider: self.name.clone(),
            source,
        })
    }

    /// Checks that the given zoom level is served by this provider.
    pub fn validate_zoom(&self, zoom: i32) -> Result<(), TilesError> {
        let max_zoom = self.max_zoom.unwrap_or(FALLBACK_MAX_ZOOM);
        if zoom < self.min_zoom as i32 || zoom > max_zoom as i32 {
            return Err(TilesError::InvalidZoom {
                zoom,
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use insta::assert_compact_debug_snapshot;

    use super::*;

    fn carto() -> TileProvider {
        TileProvider::new(
            "CartoDB.Positron",
            "https://{s}.basemaps.cartocdn.com/{variant}/{z}/{x}/{y}{r}.png",
        )
        .with_subdomains(&["a", "b", "c", "d"])
        .with_option("variant", "light_all")
        .with_max_zoom(20)
    }

    #[test]
    fn build_url_substitutes_coordinates() {
        let provider =
            TileProvider::new("test", "https://tiles.example.com/{z}/{x}/{y}.png");
        assert_eq!(
            provider.build_url("1", "2", "3").unwrap(),
            "https://tiles.example.com/3/1/2.png"
        );
    }

    #[test]
    fn build_url_substitutes_subdomain_and_options() {
        assert_eq!(
            carto().build_url("1", "2", "3").unwrap(),
            "https://a.basemaps.cartocdn.com/light_all/3/1/2.png"
        );
    }

    #[test]
    fn build_url_accepts_expression_fragments() {
        let provider =
            TileProvider::new("test", "https://tiles.example.com/{z}/{x}/{y}.png");
        let url = provider
            .build_url("' + (datum.a) + '", "' + (datum.b) + '", "' + zoom_ceil + '")
            .unwrap();
        assert_eq!(
            url,
            "https://tiles.example.com/' + zoom_ceil + '/' + (datum.a) + '/' + (datum.b) + '.png"
        );
    }

    #[test]
    fn build_url_fails_on_unknown_placeholder() {
        let provider =
            TileProvider::new("broken", "https://tiles.example.com/{z}/{x}/{y}.{ext}");
        let result = provider.build_url("1", "2", "3");
        assert_matches!(result, Err(TilesError::UrlTemplate { .. }));
    }

    #[test]
    fn zoom_validation() {
        let provider = carto();
        assert!(provider.validate_zoom(0).is_ok());
        assert!(provider.validate_zoom(20).is_ok());
        assert_matches!(
            provider.validate_zoom(21),
            Err(TilesError::InvalidZoom {
                zoom: 21,
                min_zoom: 0,
                max_zoom: Some(20),
            })
        );
        assert_matches!(provider.validate_zoom(-1), Err(TilesError::InvalidZoom { .. }));
    }

    #[test]
    fn zoom_validation_without_known_maximum() {
        let provider = TileProvider::new("test", "https://tiles.example.com/{z}/{x}/{y}.png");
        assert!(provider.validate_zoom(25).is_ok());

        let result = provider.validate_zoom(31);
        assert_compact_debug_snapshot!(result, @"Err(InvalidZoom { zoom: 31, min_zoom: 0, max_zoom: None })");
    }

    #[test]
    fn descriptor_roundtrips_through_serde() {
        let provider = carto().with_attribution(
            "(C) OpenStreetMap contributors (C) CARTO",
            Some("https://carto.com/attributions"),
        );
        let serialized = serde_json::to_string(&provider).unwrap();
        let deserialized: TileProvider = serde_json::from_str(&serialized).unwrap();
        assert_eq!(provider, deserialized);
    }
}
