//! Minimal model of the Vega-Lite specification surface this crate reads and
//! writes.
//!
//! A full typed binding of the Vega-Lite schema is out of scope. Caller
//! charts are kept as raw JSON objects wrapped in [`ChartSpec`], and only the
//! pieces this crate needs to inspect (mark type, projection, layers) get
//! typed accessors. The fragments the crate emits are built from the typed
//! [`Param`] and [`Transform`] types so their shape is checked at compile
//! time.

mod param;
mod transform;

pub use param::Param;
pub use transform::Transform;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounding_box::GeoBounds;
use crate::error::TilesError;
use crate::tile_scheme::MAX_LATITUDE;

/// A Vega-Lite chart specification.
///
/// Wraps the raw JSON object of the specification. Everything this crate does
/// not interpret passes through untouched, so charts produced by any
/// Vega-Lite tooling can be composed with tile layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartSpec(Map<String, Value>);

impl ChartSpec {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, TilesError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TilesError::Configuration(format!(
                "a chart specification must be a JSON object, got: {other}"
            ))),
        }
    }

    /// Unwraps the specification into its JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Returns a top-level property of the specification.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether this is a layer specification.
    pub fn is_layered(&self) -> bool {
        self.0.contains_key("layer")
    }

    /// The sub-specifications of a layer chart.
    pub fn layers(&self) -> Option<&Vec<Value>> {
        self.0.get("layer").and_then(Value::as_array)
    }

    /// The type of the chart's mark, for both shorthand (`"mark": "bar"`) and
    /// full (`"mark": {"type": "bar"}`) forms.
    pub fn mark_type(&self) -> Option<&str> {
        match self.0.get("mark")? {
            Value::String(mark) => Some(mark),
            Value::Object(def) => def.get("type")?.as_str(),
            _ => None,
        }
    }

    /// The chart's projection, if one is defined.
    ///
    /// Returns a configuration error if the `projection` property does not
    /// have the expected shape.
    pub fn projection(&self) -> Result<Option<Projection>, TilesError> {
        match self.0.get("projection") {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                TilesError::Configuration(format!("malformed chart projection: {e}"))
            }),
        }
    }

    /// Layers `other` on top of `self`.
    ///
    /// Follows the layering operator of chart composition APIs: if `self`
    /// already is a layer chart, the new layer is appended to it; otherwise a
    /// new two-layer chart is created.
    pub fn layered_with(mut self, other: ChartSpec) -> ChartSpec {
        if let Some(Value::Array(layers)) = self.0.get_mut("layer") {
            layers.push(other.into_value());
            self
        } else {
            let mut map = Map::new();
            map.insert(
                "layer".to_string(),
                Value::Array(vec![self.into_value(), other.into_value()]),
            );
            Self(map)
        }
    }
}

/// Cartographic projection of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "type")]
    projection_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<ScaleSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    center: Option<[f64; 2]>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Projection {
    /// Creates a projection of the given type.
    pub fn new(projection_type: impl Into<String>) -> Self {
        Self {
            projection_type: projection_type.into(),
            scale: None,
            center: None,
            extra: Map::new(),
        }
    }

    /// Creates a Mercator projection, the only type tile layers can be
    /// composed over.
    pub fn mercator() -> Self {
        Self::new("mercator")
    }

    /// Sets a numeric projection scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(ScaleSpec::Value(scale));
        self
    }

    /// Sets the projection scale to a Vega expression, e.g. the name of a
    /// parameter controlling the scale.
    pub fn with_scale_expr(mut self, expr: impl Into<String>) -> Self {
        self.scale = Some(ScaleSpec::Expr { expr: expr.into() });
        self
    }

    /// Sets the projection center.
    pub fn with_center(mut self, lon: f64, lat: f64) -> Self {
        self.center = Some([lon, lat]);
        self
    }

    /// The type of the projection.
    pub fn projection_type(&self) -> &str {
        &self.projection_type
    }

    /// The scale of the projection, if set.
    pub fn scale(&self) -> Option<&ScaleSpec> {
        self.scale.as_ref()
    }

    /// Creates a Mercator projection fitted to the given geographic extent at
    /// the given chart size in pixels.
    ///
    /// This is the explicit-bounds entry point: charts without spatial data
    /// of their own can still get a correctly positioned tile background by
    /// fitting the projection to the extent they want to show.
    pub fn fit_bounds(bounds: &GeoBounds, width: f64, height: f64) -> Result<Self, TilesError> {
        if !bounds.is_valid() {
            return Err(TilesError::Configuration(format!(
                "cannot fit a projection to invalid bounds {bounds:?}"
            )));
        }
        if !(width > 0.0 && height > 0.0) {
            return Err(TilesError::Configuration(format!(
                "chart size must be positive, got {width}x{height}"
            )));
        }

        let mercator_y = |lat: f64| {
            let clamped = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
            (std::f64::consts::FRAC_PI_4 + clamped.to_radians() / 2.0).tan().ln()
        };

        let lon_span = bounds.width().to_radians();
        let y_span = mercator_y(bounds.north()) - mercator_y(bounds.south());
        if y_span <= 0.0 {
            return Err(TilesError::Configuration(format!(
                "bounds {bounds:?} collapse to an empty extent in the mercator projection"
            )));
        }

        let scale = (width / lon_span).min(height / y_span);
        let (center_lon, center_lat) = bounds.center();

        Ok(Self::mercator()
            .with_scale(scale)
            .with_center(center_lon, center_lat))
    }
}

/// Projection scale: either a number or a Vega expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    /// A fixed numeric scale.
    Value(f64),
    /// A scale evaluated by the Vega runtime.
    Expr {
        /// The Vega expression.
        expr: String,
    },
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_requires_an_object() {
        assert!(ChartSpec::from_value(json!({"mark": "bar"})).is_ok());
        assert!(ChartSpec::from_value(json!([1, 2])).is_err());
        assert!(ChartSpec::from_value(json!("mark")).is_err());
    }

    #[test]
    fn mark_type_shorthand_and_full_form() {
        let chart = ChartSpec::from_value(json!({"mark": "geoshape"})).unwrap();
        assert_eq!(chart.mark_type(), Some("geoshape"));

        let chart =
            ChartSpec::from_value(json!({"mark": {"type": "image", "clip": true}})).unwrap();
        assert_eq!(chart.mark_type(), Some("image"));

        let chart = ChartSpec::from_value(json!({"encoding": {}})).unwrap();
        assert_eq!(chart.mark_type(), None);
    }

    #[test]
    fn layering_nests_unit_charts() {
        let a = ChartSpec::from_value(json!({"mark": "geoshape"})).unwrap();
        let b = ChartSpec::from_value(json!({"mark": "image"})).unwrap();
        let layered = a.layered_with(b);

        assert!(layered.is_layered());
        assert_eq!(
            layered.into_value(),
            json!({"layer": [{"mark": "geoshape"}, {"mark": "image"}]})
        );
    }

    #[test]
    fn layering_appends_to_layer_charts() {
        let base =
            ChartSpec::from_value(json!({"layer": [{"mark": "image"}, {"mark": "geoshape"}]}))
                .unwrap();
        let text = ChartSpec::from_value(json!({"mark": "text"})).unwrap();
        let layered = base.layered_with(text);

        assert_eq!(layered.layers().map(Vec::len), Some(3));
    }

    #[test]
    fn projection_deserialization() {
        let chart = ChartSpec::from_value(
            json!({"projection": {"type": "mercator", "scale": 300.5, "center": [10.0, 20.0]}}),
        )
        .unwrap();
        let projection = chart.projection().unwrap().unwrap();
        assert_eq!(projection.projection_type(), "mercator");
        assert_eq!(projection.scale(), Some(&ScaleSpec::Value(300.5)));

        let chart = ChartSpec::from_value(
            json!({"projection": {"type": "mercator", "scale": {"expr": "my_param"}}}),
        )
        .unwrap();
        let projection = chart.projection().unwrap().unwrap();
        assert_eq!(
            projection.scale(),
            Some(&ScaleSpec::Expr {
                expr: "my_param".to_string()
            })
        );

        let chart = ChartSpec::from_value(json!({"mark": "geoshape"})).unwrap();
        assert!(chart.projection().unwrap().is_none());

        let chart = ChartSpec::from_value(json!({"projection": [1, 2]})).unwrap();
        assert!(chart.projection().is_err());
    }

    #[test]
    fn projection_serialization_skips_unset_fields() {
        let projection = Projection::mercator().with_scale(200.0);
        assert_eq!(
            serde_json::to_value(&projection).unwrap(),
            json!({"type": "mercator", "scale": 200.0})
        );
    }

    #[test]
    fn fit_bounds_square_world() {
        let world = GeoBounds::new(-180.0, -MAX_LATITUDE, 180.0, MAX_LATITUDE);
        let projection = Projection::fit_bounds(&world, 400.0, 400.0).unwrap();

        // The web mercator world is square, so both dimensions give the same
        // scale: width / (2 * PI).
        let Some(ScaleSpec::Value(scale)) = projection.scale() else {
            panic!("expected a numeric scale");
        };
        assert_relative_eq!(*scale, 400.0 / std::f64::consts::TAU, epsilon = 1e-9);
    }

    #[test]
    fn fit_bounds_limited_by_narrow_dimension() {
        let bounds = GeoBounds::new(-10.0, 40.0, 10.0, 50.0);
        let wide = Projection::fit_bounds(&bounds, 1000.0, 100.0).unwrap();
        let tall = Projection::fit_bounds(&bounds, 100.0, 1000.0).unwrap();

        let scale_of = |projection: &Projection| match projection.scale() {
            Some(ScaleSpec::Value(scale)) => *scale,
            _ => panic!("expected a numeric scale"),
        };
        // Both must fit the full extent into the smaller dimension.
        assert!(scale_of(&wide) < scale_of(&tall) * 10.0);
    }

    #[test]
    fn fit_bounds_rejects_degenerate_input() {
        let bounds = GeoBounds::new(-10.0, 40.0, 10.0, 50.0);
        assert!(Projection::fit_bounds(&bounds, 0.0, 100.0).is_err());
        assert!(Projection::fit_bounds(&GeoBounds::new(0.0, 0.0, 0.0, 1.0), 100.0, 100.0).is_err());
    }
}
