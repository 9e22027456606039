use geo::{BoundingRect, Point, Polygon, Rect, Relate, Within};

/// Geometry capability the planner relies on.
///
/// The graph and optimization stages only ask these questions, so any
/// engine (or a synthetic stand-in) can answer them.
pub trait Topology: Sync {
    /// Boundaries meet but interiors do not overlap
    fn touches(&self, a: &Polygon<f64>, b: &Polygon<f64>) -> bool;

    /// Point lies strictly inside the area
    fn within(&self, point: &Point<f64>, area: &Polygon<f64>) -> bool;

    /// Axis-aligned bounds used for spatial pre-filtering
    fn bounds(&self, area: &Polygon<f64>) -> Option<Rect<f64>> {
        area.bounding_rect()
    }
}

/// DE-9IM topology backed by the `geo` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTopology;

impl Topology for GeoTopology {
    fn touches(&self, a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
        a.relate(b).is_touches()
    }

    fn within(&self, point: &Point<f64>, area: &Polygon<f64>) -> bool {
        point.is_within(area)
    }
}
