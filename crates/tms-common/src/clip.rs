//! Geometry clipping to axis-aligned tile bounds.
//!
//! Points use an inclusive containment check. Lines go through
//! `BooleanOps::clip` against the tile rectangle. Polygons with simple rings
//! take the Sutherland-Hodgman fast path; rings that cross or touch
//! themselves fall back to a `BooleanOps` intersection.

use geo::{
    line_intersection::line_intersection, BooleanOps, BoundingRect, Coord, Geometry,
    GeometryCollection, Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};
use tracing::trace;

use crate::bounds::Bounds;

/// Clip a geometry to bounds.
///
/// Returns `None` when nothing of the geometry lies inside the bounds.
pub fn clip_geometry(geometry: &Geometry<f64>, bounds: &Bounds) -> Option<Geometry<f64>> {
    if let Some(rect) = geometry.bounding_rect() {
        if !bounds.intersects_or_touches(&Bounds::from(rect)) {
            return None;
        }
    }

    match geometry {
        Geometry::Point(p) => clip_point(p, bounds).map(Geometry::Point),
        Geometry::Line(l) => {
            let lines = MultiLineString::new(vec![LineString::from(*l)]);
            clip_lines(&lines, bounds).map(Geometry::MultiLineString)
        }
        Geometry::LineString(ls) => clip_linestring(ls, bounds).map(Geometry::MultiLineString),
        Geometry::Polygon(p) => clip_polygon(p, bounds).map(single_or_multi),
        Geometry::MultiPoint(mp) => {
            let points: Vec<Point<f64>> = mp.iter().filter_map(|p| clip_point(p, bounds)).collect();
            non_empty(points).map(|p| Geometry::MultiPoint(MultiPoint::new(p)))
        }
        Geometry::MultiLineString(mls) => clip_lines(mls, bounds).map(Geometry::MultiLineString),
        Geometry::MultiPolygon(mp) => {
            let polygons: Vec<Polygon<f64>> = mp
                .iter()
                .filter_map(|p| clip_polygon(p, bounds))
                .flat_map(|mp| mp.0)
                .collect();
            non_empty(polygons).map(|p| Geometry::MultiPolygon(MultiPolygon::new(p)))
        }
        Geometry::GeometryCollection(gc) => {
            let parts: Vec<Geometry<f64>> =
                gc.iter().filter_map(|g| clip_geometry(g, bounds)).collect();
            non_empty(parts).map(|p| Geometry::GeometryCollection(GeometryCollection::new_from(p)))
        }
        Geometry::Rect(r) => clip_polygon(&r.to_polygon(), bounds).map(single_or_multi),
        Geometry::Triangle(t) => clip_polygon(&t.to_polygon(), bounds).map(single_or_multi),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn single_or_multi(mut polygons: MultiPolygon<f64>) -> Geometry<f64> {
    match polygons.0.len() {
        1 => Geometry::Polygon(polygons.0.remove(0)),
        _ => Geometry::MultiPolygon(polygons),
    }
}

fn clip_point(point: &Point<f64>, bounds: &Bounds) -> Option<Point<f64>> {
    if bounds.contains_point(point.x(), point.y()) {
        Some(*point)
    } else {
        None
    }
}

fn clip_linestring(ls: &LineString<f64>, bounds: &Bounds) -> Option<MultiLineString<f64>> {
    if let [only] = ls.0.as_slice() {
        return clip_point(&Point::from(*only), bounds)
            .map(|p| MultiLineString::new(vec![LineString::new(vec![p.0])]));
    }
    clip_lines(&MultiLineString::new(vec![ls.clone()]), bounds)
}

/// Keep the parts of the lines inside the tile rectangle.
///
/// The output is made of the pieces the sweep produces; pieces are not
/// merged back into the input's line strings.
fn clip_lines(lines: &MultiLineString<f64>, bounds: &Bounds) -> Option<MultiLineString<f64>> {
    let clipped = bounds.to_polygon().clip(lines, false);
    non_empty(clipped.0).map(MultiLineString::new)
}

fn clip_polygon(poly: &Polygon<f64>, bounds: &Bounds) -> Option<MultiPolygon<f64>> {
    let rect = poly.bounding_rect()?;
    let envelope = Bounds::from(rect);
    if envelope.min_x >= bounds.min_x
        && envelope.max_x <= bounds.max_x
        && envelope.min_y >= bounds.min_y
        && envelope.max_y <= bounds.max_y
    {
        return Some(MultiPolygon::new(vec![poly.clone()]));
    }

    let simple = is_simple_ring(poly.exterior()) && poly.interiors().iter().all(is_simple_ring);
    if simple {
        clip_polygon_sutherland_hodgman(poly, bounds).map(|p| MultiPolygon::new(vec![p]))
    } else {
        trace!("clipping non-simple polygon with boolean intersection");
        let result = poly.intersection(&bounds.to_polygon());
        non_empty(result.0).map(MultiPolygon::new)
    }
}

/// A closed ring of finite coordinates that neither crosses nor touches
/// itself.
fn is_simple_ring(ring: &LineString<f64>) -> bool {
    let coords = &ring.0;
    if coords.len() < 4 || coords.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return false;
    }

    let vertices = if coords.first() == coords.last() {
        &coords[..coords.len() - 1]
    } else {
        &coords[..]
    };
    let n = vertices.len();

    for i in 0..n {
        if vertices[i + 1..].contains(&vertices[i]) {
            return false;
        }
    }

    for i in 0..n {
        let edge_i = Line::new(vertices[i], vertices[(i + 1) % n]);
        for j in (i + 2)..n {
            // first and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            let edge_j = Line::new(vertices[j], vertices[(j + 1) % n]);
            if line_intersection(edge_i, edge_j).is_some() {
                return false;
            }
        }
    }

    true
}

fn clip_polygon_sutherland_hodgman(poly: &Polygon<f64>, bounds: &Bounds) -> Option<Polygon<f64>> {
    let exterior = sutherland_hodgman_clip(poly.exterior(), bounds);
    if exterior.0.len() < 4 {
        return None;
    }

    let interiors = poly
        .interiors()
        .iter()
        .map(|ring| sutherland_hodgman_clip(ring, bounds))
        .filter(|ring| ring.0.len() >= 4)
        .collect();

    Some(Polygon::new(exterior, interiors))
}

/// Sutherland-Hodgman ring clipping against an axis-aligned rectangle.
fn sutherland_hodgman_clip(ring: &LineString<f64>, bounds: &Bounds) -> LineString<f64> {
    let mut output: Vec<Coord<f64>> = ring.0.clone();
    // Drop the closing coordinate, the edge walk wraps around anyway
    if output.len() > 1 && output.first() == output.last() {
        output.pop();
    }

    output = clip_against_edge(&output, |c| c.x >= bounds.min_x, |a, b| {
        let t = (bounds.min_x - a.x) / (b.x - a.x);
        Coord {
            x: bounds.min_x,
            y: a.y + t * (b.y - a.y),
        }
    });
    output = clip_against_edge(&output, |c| c.x <= bounds.max_x, |a, b| {
        let t = (bounds.max_x - a.x) / (b.x - a.x);
        Coord {
            x: bounds.max_x,
            y: a.y + t * (b.y - a.y),
        }
    });
    output = clip_against_edge(&output, |c| c.y >= bounds.min_y, |a, b| {
        let t = (bounds.min_y - a.y) / (b.y - a.y);
        Coord {
            x: a.x + t * (b.x - a.x),
            y: bounds.min_y,
        }
    });
    output = clip_against_edge(&output, |c| c.y <= bounds.max_y, |a, b| {
        let t = (bounds.max_y - a.y) / (b.y - a.y);
        Coord {
            x: a.x + t * (b.x - a.x),
            y: bounds.max_y,
        }
    });

    if !output.is_empty() && output.first() != output.last() {
        output.push(output[0]);
    }

    LineString::new(output)
}

fn clip_against_edge<F, I>(vertices: &[Coord<f64>], inside: F, intersect: I) -> Vec<Coord<f64>>
where
    F: Fn(&Coord<f64>) -> bool,
    I: Fn(&Coord<f64>, &Coord<f64>) -> Coord<f64>,
{
    let mut output = Vec::with_capacity(vertices.len());

    for (i, current) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];

        match (inside(current), inside(next)) {
            (true, true) => output.push(*current),
            (true, false) => {
                output.push(*current);
                output.push(intersect(current, next));
            }
            (false, true) => output.push(intersect(current, next)),
            (false, false) => {}
        }
    }

    output
}
