//! Connector geometry: port anchors and orthogonal elbow routes.

use kurbo::{Point, Rect};

/// Horizontal distance between a route's start point and its first elbow.
pub const ROUTE_JOG: f64 = 20.0;

/// Anchor point of a port: the midpoint of its visual bounds.
pub fn port_anchor(bounds: Rect) -> Point {
    Point::new((bounds.x0 + bounds.x1) / 2.0, (bounds.y0 + bounds.y1) / 2.0)
}

/// Route a connector from `source` to `target` using right angles only.
///
/// The path always has four points: the source, a jog point [`ROUTE_JOG`]
/// units to the side of the source facing the target, the same jog column
/// at the target's height, and the target. When both anchors share an x
/// coordinate the jog goes left.
pub fn route_orthogonal(source: Point, target: Point) -> Vec<Point> {
    let jog_x = if source.x < target.x {
        source.x + ROUTE_JOG
    } else {
        source.x - ROUTE_JOG
    };
    vec![
        source,
        Point::new(jog_x, source.y),
        Point::new(jog_x, target.y),
        target,
    ]
}

/// Bounding box of a routed path. Empty paths yield a zero rect at the origin.
pub fn route_bounds(path: &[Point]) -> Rect {
    let Some(first) = path.first() else {
        return Rect::ZERO;
    };
    path.iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a routed path.
pub fn distance_to_route(point: Point, path: &[Point]) -> f64 {
    match path {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => path
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
