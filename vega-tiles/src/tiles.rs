//! Composition of tile background layers for Vega-Lite charts.
//!
//! The tile layer is an `image` mark over a generated grid of rows. All tile
//! addressing happens in Vega expressions evaluated by the renderer: a chain
//! of parameters derives the zoom level, the tile size in pixels and the
//! index of the tile under the chart origin from the projection scale, and
//! calculate transforms turn grid cells into tile URLs and pixel positions.
//! The crate itself never touches the network.
//!
//! The expression chain follows the approach worked out for tile support in
//! Vega and Vega-Lite upstream discussions.

use serde_json::{json, Value};

use crate::error::TilesError;
use crate::provider::{catalog, TileProvider};
use crate::tile_scheme::TileRange;
use crate::vega::{ChartSpec, Param, Projection, ScaleSpec, Transform};

const DEFAULT_PROVIDER: &str = "OpenStreetMap.Mapnik";
const DEFAULT_BASE_TILE_SIZE: u32 = 256;

/// Grid side length used when the zoom level is only known to the Vega
/// runtime and the tile count cannot be evaluated ahead of time.
const FALLBACK_GRID_SIZE: u64 = 10;

/// Default scale of the d3 mercator projection: 961 / tau.
const DEFAULT_MERCATOR_SCALE: f64 = 961.0 / std::f64::consts::TAU;

/// Controls the attribution layer composed together with the tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributionMode {
    /// Use the attribution text from the provider descriptor.
    #[default]
    Provider,
    /// Use the given text instead of the provider's.
    Text(String),
    /// Do not add an attribution layer.
    ///
    /// Most tile services require visible attribution; make sure the chart
    /// complies with the provider's terms of use in some other way.
    Off,
}

impl AttributionMode {
    fn resolve(&self, provider: &TileProvider) -> Option<String> {
        match self {
            AttributionMode::Provider => {
                let text = provider.attribution().map(|a| a.get_text().to_string());
                if text.is_none() {
                    log::debug!(
                        "tile provider {} declares no attribution text",
                        provider.name()
                    );
                }
                text
            }
            AttributionMode::Text(text) => Some(text.clone()),
            AttributionMode::Off => None,
        }
    }
}

#[derive(Debug, Clone)]
enum ProviderRef {
    Name(String),
    Descriptor(TileProvider),
}

/// Composes tile background layers for Vega-Lite chart specifications.
///
/// ```
/// use vega_tiles::{vega::Projection, TileLayerBuilder};
///
/// let projection = Projection::mercator().with_scale(200.0).with_center(12.49, 41.89);
/// let chart = TileLayerBuilder::new()
///     .with_provider_name("OpenStreetMap.Mapnik")
///     .build_standalone(&projection)?;
///
/// assert_eq!(chart.layers().map(Vec::len), Some(2));
/// # Ok::<(), vega_tiles::TilesError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TileLayerBuilder {
    provider: ProviderRef,
    zoom: Option<i32>,
    base_tile_size: u32,
    attribution: AttributionMode,
}

impl TileLayerBuilder {
    /// Creates a builder with the default provider (OpenStreetMap Mapnik),
    /// automatic zoom and the provider's attribution.
    pub fn new() -> Self {
        Self {
            provider: ProviderRef::Name(DEFAULT_PROVIDER.to_string()),
            zoom: None,
            base_tile_size: DEFAULT_BASE_TILE_SIZE,
            attribution: AttributionMode::default(),
        }
    }

    /// Sets the tile provider descriptor.
    pub fn with_provider(mut self, provider: TileProvider) -> Self {
        self.provider = ProviderRef::Descriptor(provider);
        self
    }

    /// Sets the tile provider by its catalog name, e.g.
    /// `"OpenStreetMap.Mapnik"`.
    ///
    /// The name is resolved against [`providers`](crate::providers) when the
    /// layer is built; an unknown name fails the build.
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider = ProviderRef::Name(name.into());
        self
    }

    /// Fixes the zoom level of the tiles.
    ///
    /// Without a fixed zoom, an appropriate level is derived from the
    /// projection scale.
    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Sets the base tile edge length in pixels used when deriving the zoom
    /// level automatically. Defaults to 256, the standard size of XYZ tiles.
    pub fn with_base_tile_size(mut self, base_tile_size: u32) -> Self {
        self.base_tile_size = base_tile_size;
        self
    }

    /// Sets the attribution mode.
    pub fn with_attribution(mut self, attribution: AttributionMode) -> Self {
        self.attribution = attribution;
        self
    }

    /// Replaces the provider's attribution with the given text.
    pub fn with_attribution_text(mut self, text: impl Into<String>) -> Self {
        self.attribution = AttributionMode::Text(text.into());
        self
    }

    /// Disables the attribution layer.
    pub fn without_attribution(mut self) -> Self {
        self.attribution = AttributionMode::Off;
        self
    }

    /// Builds the tiles as a fragment meant to be layered into an existing
    /// chart with a geoshape mark.
    ///
    /// The result is the image mark unit specification, layered with the
    /// attribution text unless attribution is disabled.
    pub fn build_fragment(&self, projection: &Projection) -> Result<ChartSpec, TilesError> {
        let provider = self.resolve_provider()?;
        let tiles = compose_tile_layer(projection, &provider, self.zoom, self.base_tile_size)?;

        Ok(match self.attribution.resolve(&provider) {
            Some(text) => tiles.layered_with(attribution_layer(&text)),
            None => tiles,
        })
    }

    /// Builds a chart with the tiles that can be rendered on its own.
    ///
    /// An empty geoshape layer carrying the projection is placed underneath:
    /// it makes the renderer instantiate the projection the tile placement
    /// expressions refer to.
    pub fn build_standalone(&self, projection: &Projection) -> Result<ChartSpec, TilesError> {
        let tiles = self.build_fragment(projection)?;

        // With the tiles as the first layer the chart collapses to its
        // default 20x20 px size, so the geoshape layer goes first.
        let base = spec_object(json!({
            "mark": {"type": "geoshape"},
            "projection": projection,
        }));

        Ok(base.layered_with(tiles))
    }

    /// Layers the tiles underneath an existing chart.
    ///
    /// The chart must be a unit specification with a `geoshape` mark and a
    /// Mercator projection. The caller's marks end up above the tile
    /// background, and the attribution (unless disabled) above everything,
    /// so other layers cannot hide it.
    pub fn build_over(&self, chart: &ChartSpec) -> Result<ChartSpec, TilesError> {
        if chart.is_layered() {
            return Err(TilesError::Configuration(
                "only unit chart specifications are supported; build the tiles with \
                 build_fragment and add them to the layer chart yourself"
                    .to_string(),
            ));
        }

        let Some(projection) = chart.projection()? else {
            return Err(TilesError::Configuration(
                "the chart projection must be defined and be of type 'mercator'".to_string(),
            ));
        };

        if chart.mark_type() != Some("geoshape") {
            return Err(TilesError::Configuration(
                "the chart must have a geoshape mark".to_string(),
            ));
        }

        let provider = self.resolve_provider()?;
        let tiles = compose_tile_layer(&projection, &provider, self.zoom, self.base_tile_size)?;
        let layered = tiles.layered_with(chart.clone());

        Ok(match self.attribution.resolve(&provider) {
            Some(text) => layered.layered_with(attribution_layer(&text)),
            None => layered,
        })
    }

    fn resolve_provider(&self) -> Result<TileProvider, TilesError> {
        match &self.provider {
            ProviderRef::Name(name) => catalog::lookup(name),
            ProviderRef::Descriptor(provider) => Ok(provider.clone()),
        }
    }
}

impl Default for TileLayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends an attribution text layer for the given provider to the chart.
///
/// This is useful when the attribution composed by [`TileLayerBuilder`] would
/// be partially hidden by another layer: build the tiles with attribution
/// disabled and add the text to the final layered chart with this function.
pub fn add_attribution(
    chart: ChartSpec,
    provider: &TileProvider,
    attribution: &AttributionMode,
) -> ChartSpec {
    match attribution.resolve(provider) {
        Some(text) => chart.layered_with(attribution_layer(&text)),
        None => chart,
    }
}

fn attribution_layer(text: &str) -> ChartSpec {
    spec_object(json!({
        "mark": {"type": "text", "text": text, "dx": 3, "dy": -8, "align": "left"},
        "encoding": {
            "x": {"value": 0},
            "y": {"value": {"expr": "height"}},
        },
    }))
}

/// Wraps a JSON literal that is statically known to be an object.
fn spec_object(value: Value) -> ChartSpec {
    ChartSpec::from_value(value).expect("literal specifications are objects")
}

/// The projection scale as seen by the composed expressions.
enum ScaleExpr {
    Value(f64),
    Expr(String),
}

impl ScaleExpr {
    fn as_vega_expr(&self) -> String {
        match self {
            ScaleExpr::Value(value) => value.to_string(),
            ScaleExpr::Expr(expr) => expr.clone(),
        }
    }
}

fn validate_projection(projection: &Projection) -> Result<(), TilesError> {
    if projection.projection_type() != "mercator" {
        return Err(TilesError::Configuration(
            "the projection must be of type 'mercator'".to_string(),
        ));
    }

    Ok(())
}

fn projection_scale(projection: &Projection) -> Result<ScaleExpr, TilesError> {
    match projection.scale() {
        Some(ScaleSpec::Value(value)) => {
            if !(value.is_finite() && *value > 0.0) {
                return Err(TilesError::Configuration(format!(
                    "the projection scale must be a positive number, got {value}"
                )));
            }
            Ok(ScaleExpr::Value(*value))
        }
        Some(ScaleSpec::Expr { expr }) => Ok(ScaleExpr::Expr(expr.clone())),
        None => {
            // The default is projection specific; the check guards for when
            // more projection types are supported.
            if projection.projection_type() != "mercator" {
                return Err(TilesError::Configuration(
                    "the projection scale must be defined for non-mercator projections"
                        .to_string(),
                ));
            }
            Ok(ScaleExpr::Value(DEFAULT_MERCATOR_SCALE))
        }
    }
}

fn compose_tile_layer(
    projection: &Projection,
    provider: &TileProvider,
    zoom: Option<i32>,
    base_tile_size: u32,
) -> Result<ChartSpec, TilesError> {
    validate_projection(projection)?;
    let scale = projection_scale(projection)?;

    let p_pr_scale = Param::expr("pr_scale", scale.as_vega_expr());

    let (p_zoom_level, p_base_tile_size, evaluated_zoom_ceil) = match zoom {
        Some(zoom) => {
            let p_zoom_level = Param::value("zoom_level", zoom);
            let p_base_tile_size = Param::expr(
                "base_tile_size",
                format!(
                    "(2 * PI * {}) / pow(2, {})",
                    p_pr_scale.name(),
                    p_zoom_level.name()
                ),
            );
            (p_zoom_level, p_base_tile_size, Some(zoom))
        }
        None => {
            let p_base_tile_size = Param::value("base_tile_size", base_tile_size);
            let p_zoom_level = Param::expr(
                "zoom_level",
                format!(
                    "log((2 * PI * {}) / {}) / log(2)",
                    p_pr_scale.name(),
                    p_base_tile_size.name()
                ),
            );
            // With a numeric scale the zoom level can also be evaluated here.
            // Otherwise it is only known to the Vega runtime.
            let evaluated = match &scale {
                ScaleExpr::Value(scale) => {
                    let zoom = ((2.0 * std::f64::consts::PI * scale / base_tile_size as f64)
                        .ln()
                        / std::f64::consts::LN_2)
                        .ceil();
                    Some(zoom as i32)
                }
                ScaleExpr::Expr(_) => None,
            };
            (p_zoom_level, p_base_tile_size, evaluated)
        }
    };

    let evaluated_tiles_count = match evaluated_zoom_ceil {
        Some(zoom_ceil) => {
            provider.validate_zoom(zoom_ceil)?;
            log::debug!(
                "composing tiles of provider {} at zoom level {zoom_ceil}",
                provider.name()
            );
            Some(1u64 << zoom_ceil as u32)
        }
        None => None,
    };

    let p_zoom_ceil = Param::expr("zoom_ceil", format!("ceil({})", p_zoom_level.name()));
    // Number of tiles per column/row, whichever is larger. It does not
    // account for tiles that get clipped away when the chart aspect ratio is
    // not quadratic.
    let p_tiles_count = Param::expr("tiles_count", format!("pow(2, {})", p_zoom_ceil.name()));
    let p_tile_size = Param::expr(
        "tile_size",
        format!(
            "{} * pow(2, {} - {})",
            p_base_tile_size.name(),
            p_zoom_level.name(),
            p_zoom_ceil.name()
        ),
    );
    let p_base_point = Param::expr("base_point", "invert('projection', [0, 0])");
    let p_dii = Param::expr(
        "dii",
        format!(
            "({}[0] + 180) / 360 * {}",
            p_base_point.name(),
            p_tiles_count.name()
        ),
    );
    let p_dii_floor = Param::expr("dii_floor", format!("floor({})", p_dii.name()));
    let p_dx = Param::expr(
        "dx",
        format!(
            "({} - {}) * {}",
            p_dii_floor.name(),
            p_dii.name(),
            p_tile_size.name()
        ),
    );
    let p_djj = Param::expr(
        "djj",
        format!(
            "(1 - log(tan({bp}[1] * PI / 180) + 1 / cos({bp}[1] * PI / 180)) / PI) / 2 * {}",
            p_tiles_count.name(),
            bp = p_base_point.name()
        ),
    );
    let p_djj_floor = Param::expr("djj_floor", format!("floor({})", p_djj.name()));
    let p_dy = Param::expr(
        "dy",
        format!(
            "round(({} - {}) * {})",
            p_djj_floor.name(),
            p_djj.name(),
            p_tile_size.name()
        ),
    );

    let expr_url_x = format!(
        "((datum.a + {} + {count}) % {count})",
        p_dii_floor.name(),
        count = p_tiles_count.name()
    );
    let expr_url_y = format!("(datum.b + {})", p_djj_floor.name());

    let wrap = |expr: &str| format!("' + {expr} + '");
    let url_expr = format!(
        "'{}'",
        provider.build_url(
            &wrap(&expr_url_x),
            &wrap(&expr_url_y),
            &wrap(p_zoom_ceil.name())
        )?
    );

    // The grid size cannot be a Vega expression since expressions are not
    // supported in sequence data generators, so it is evaluated here. Two
    // extra rows and columns make sure the grid covers the chart even when
    // the origin tile is partially visible; the surplus is removed again by
    // the filter transforms below.
    let grid_size = evaluated_tiles_count
        .map(|count| count + 2)
        .unwrap_or(FALLBACK_GRID_SIZE);

    let mut transform = vec![
        Transform::calculate(format!("sequence(0, {grid_size})"), "b"),
        Transform::flatten(&["b"]),
        Transform::calculate(url_expr, "url"),
        Transform::calculate(
            format!(
                "datum.a * {ts} + {} + ({ts} / 2)",
                p_dx.name(),
                ts = p_tile_size.name()
            ),
            "x",
        ),
        Transform::calculate(
            format!(
                "datum.b * {ts} + {} + ({ts} / 2)",
                p_dy.name(),
                ts = p_tile_size.name()
            ),
            "y",
        ),
        // Tiles placed outside of the chart would not be visible, but the
        // renderer would still download them. Some would even duplicate
        // visible tiles after wrapping around the world.
        Transform::filter(
            "datum.x < (width + tile_size / 2) && datum.y < (height + tile_size / 2)",
        ),
    ];

    // Tile indices the provider serves no tiles for would fail to load in
    // the renderer, so they are filtered out of the grid up front.
    match provider.bounds() {
        None => {
            // The provider covers the whole world: negative indices never
            // exist, and indices beyond the tile count wrapped around it
            // already.
            transform.push(url_index_bounds_filter(
                &expr_url_x,
                &expr_url_y,
                "0",
                "0",
                &format!("({} - 1)", p_tiles_count.name()),
                &format!("({} - 1)", p_tiles_count.name()),
            ));
        }
        Some(bounds) => {
            let Some(zoom_ceil) = evaluated_zoom_ceil else {
                return Err(TilesError::Configuration(format!(
                    "tile provider {} only serves tiles for a bounded extent; this requires \
                     a fixed zoom level",
                    provider.name()
                )));
            };
            let range = TileRange::from_bounds(bounds, zoom_ceil as u32)?;
            transform.push(url_index_bounds_filter(
                &expr_url_x,
                &expr_url_y,
                &range.x_min.to_string(),
                &range.y_min.to_string(),
                &range.x_max.to_string(),
                &range.y_max.to_string(),
            ));
        }
    }

    let params = vec![
        p_base_tile_size,
        p_pr_scale,
        p_zoom_level,
        p_zoom_ceil,
        p_tiles_count,
        p_tile_size,
        p_base_point,
        p_dii,
        p_dii_floor,
        p_dx,
        p_djj,
        p_djj_floor,
        p_dy,
    ];

    Ok(spec_object(json!({
        "data": {
            "sequence": {"start": 0, "stop": grid_size, "as": "a"},
            "name": "tile_list",
        },
        "mark": {
            "type": "image",
            "clip": true,
            // Some renderer settings show a fine gap between the tiles; one
            // extra pixel of width and height avoids it.
            "width": {"expr": "tile_size + 1"},
            "height": {"expr": "tile_size + 1"},
        },
        "encoding": {
            "url": {"field": "url", "type": "nominal"},
            "x": {"field": "x", "type": "quantitative", "scale": null},
            "y": {"field": "y", "type": "quantitative", "scale": null},
        },
        "projection": projection,
        "transform": transform,
        "params": params,
    })))
}

fn url_index_bounds_filter(
    expr_url_x: &str,
    expr_url_y: &str,
    x_min: &str,
    y_min: &str,
    x_max: &str,
    y_max: &str,
) -> Transform {
    Transform::filter(format!(
        "{expr_url_x} >= {x_min} && {expr_url_y} >= {y_min} && \
         {expr_url_x} <= {x_max} && {expr_url_y} <= {y_max}"
    ))
}
