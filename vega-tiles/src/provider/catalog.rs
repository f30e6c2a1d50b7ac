//! Curated catalog of well-known public tile providers.
//!
//! The catalog covers the services most commonly used as chart backgrounds.
//! Entries are addressed by dotted names such as `"OpenStreetMap.Mapnik"`,
//! following the naming convention of web mapping provider registries. For
//! anything not listed here, construct a [`TileProvider`] descriptor directly.

use lazy_static::lazy_static;

use super::TileProvider;
use crate::bounding_box::GeoBounds;
use crate::error::TilesError;

const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
const OSM_COPYRIGHT_URL: &str = "https://www.openstreetmap.org/copyright";
const CARTO_ATTRIBUTION: &str = "© OpenStreetMap contributors © CARTO";
const CARTO_ATTRIBUTION_URL: &str = "https://carto.com/attributions";

fn carto_variant(name: &str, variant: &str) -> TileProvider {
    TileProvider::new(
        name,
        "https://{s}.basemaps.cartocdn.com/{variant}/{z}/{x}/{y}{r}.png",
    )
    .with_subdomains(&["a", "b", "c", "d"])
    .with_option("variant", variant)
    .with_max_zoom(20)
    .with_attribution(CARTO_ATTRIBUTION, Some(CARTO_ATTRIBUTION_URL))
}

lazy_static! {
    static ref CATALOG: Vec<TileProvider> = vec![
        TileProvider::new(
            "OpenStreetMap.Mapnik",
            "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
        )
        .with_max_zoom(19)
        .with_attribution(OSM_ATTRIBUTION, Some(OSM_COPYRIGHT_URL)),
        TileProvider::new(
            "OpenStreetMap.DE",
            "https://tile.openstreetmap.de/{z}/{x}/{y}.png",
        )
        .with_max_zoom(18)
        .with_attribution(OSM_ATTRIBUTION, Some(OSM_COPYRIGHT_URL)),
        TileProvider::new(
            "OpenStreetMap.HOT",
            "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
        )
        .with_subdomains(&["a", "b", "c"])
        .with_max_zoom(19)
        .with_attribution(
            "© OpenStreetMap contributors, tiles style by Humanitarian OpenStreetMap Team",
            Some(OSM_COPYRIGHT_URL),
        ),
        // Regional provider: only serves tiles over Switzerland.
        TileProvider::new(
            "OpenStreetMap.CH",
            "https://tile.osm.ch/switzerland/{z}/{x}/{y}.png",
        )
        .with_max_zoom(18)
        .with_bounds(GeoBounds::new(5.140242, 45.398181, 11.47757, 48.230651))
        .with_attribution(OSM_ATTRIBUTION, Some(OSM_COPYRIGHT_URL)),
        TileProvider::new(
            "OpenTopoMap",
            "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        )
        .with_subdomains(&["a", "b", "c"])
        .with_max_zoom(17)
        .with_attribution(
            "Map data: © OpenStreetMap contributors, SRTM | Map style: © OpenTopoMap (CC-BY-SA)",
            Some("https://opentopomap.org"),
        ),
        carto_variant("CartoDB.Positron", "light_all"),
        carto_variant("CartoDB.DarkMatter", "dark_all"),
        carto_variant("CartoDB.Voyager", "rastertiles/voyager"),
        // Esri does not document a maximum zoom for this service.
        TileProvider::new(
            "Esri.WorldImagery",
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        )
        .with_attribution(
            "Tiles © Esri. Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, \
             Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
            None,
        ),
    ];
}

/// Looks up a provider by its dotted catalog name.
///
/// ```
/// let provider = vega_tiles::providers::lookup("OpenStreetMap.Mapnik")?;
/// assert_eq!(provider.max_zoom(), Some(19));
/// # Ok::<(), vega_tiles::TilesError>(())
/// ```
pub fn lookup(name: &str) -> Result<TileProvider, TilesError> {
    CATALOG
        .iter()
        .find(|provider| provider.name() == name)
        .cloned()
        .ok_or_else(|| TilesError::UnknownProvider(name.to_string()))
}

/// Iterates over all providers in the catalog.
pub fn all() -> impl Iterator<Item = &'static TileProvider> {
    CATALOG.iter()
}
