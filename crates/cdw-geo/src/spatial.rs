use crate::models::Point;
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::Geometry as GeoGeometry;
use rstar::AABB;

/// Check if a region contains a point.
///
/// Points on the region boundary are not contained.
pub fn contains_point(region: &GeoGeometry, point: Point) -> bool {
    region.contains(&crate::models::to_geo_point(point))
}

/// Bounding box of a geometry as an R-tree envelope, `None` for empty geometries
pub fn envelope(geometry: &GeoGeometry) -> Option<AABB<[f64; 2]>> {
    let rect = geometry.bounding_rect()?;
    let (min, max) = (rect.min(), rect.max());
    Some(AABB::from_corners([min.x, min.y], [max.x, max.y]))
}
