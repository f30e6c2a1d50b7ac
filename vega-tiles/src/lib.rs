//! vega-tiles adds slippy map tile background layers to Vega-Lite chart
//! specifications.
//!
//! The crate renders nothing and downloads nothing. It composes chart
//! specification fragments: an `image` mark layer whose Vega expressions
//! address and place the map tiles of an XYZ tile service, and a `text` mark
//! layer with the service's attribution. The downstream Vega-Lite renderer
//! evaluates the expressions and fetches the tile images when the chart is
//! displayed.
//!
//! # Quick start
//!
//! A standalone map of the area around Rome:
//!
//! ```
//! use vega_tiles::{vega::Projection, TileLayerBuilder};
//!
//! let projection = Projection::mercator()
//!     .with_scale(3000.0)
//!     .with_center(12.49, 41.89);
//!
//! let chart = TileLayerBuilder::new()
//!     .with_provider_name("CartoDB.Positron")
//!     .build_standalone(&projection)?;
//!
//! let json = serde_json::to_string_pretty(&chart.into_value());
//! # Ok::<(), vega_tiles::TilesError>(())
//! ```
//!
//! To put tiles underneath an existing chart, the chart must be a unit
//! specification with a `geoshape` mark and a Mercator projection; use
//! [`TileLayerBuilder::build_over`]. For layer charts, build the tiles with
//! [`TileLayerBuilder::build_fragment`], add them as the first layer and
//! finish with [`add_attribution`] so the credit text stays on top.
//!
//! Tile services are described by [`TileProvider`] descriptors. The
//! [`providers`] catalog has ready-made descriptors for the commonly used
//! public services; custom services only need a URL template:
//!
//! ```
//! use vega_tiles::TileProvider;
//!
//! let provider = TileProvider::new("MyTiles", "https://tiles.example.com/{z}/{x}/{y}.png")
//!     .with_max_zoom(16)
//!     .with_attribution("(C) My Tiles", None);
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod attribution;
mod bounding_box;
pub mod error;
pub mod provider;
mod tile_scheme;
mod tiles;
pub mod vega;

pub use attribution::Attribution;
pub use bounding_box::GeoBounds;
pub use error::TilesError;
pub use provider::catalog as providers;
pub use provider::TileProvider;
pub use tile_scheme::{zoom_for_bounds, TileIndex, TileRange, MAX_LATITUDE};
pub use tiles::{add_attribution, AttributionMode, TileLayerBuilder};
