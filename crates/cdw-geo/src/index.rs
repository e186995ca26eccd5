use crate::models::{to_geo_geometry, Geometry, Point};
use crate::spatial::{contains_point, envelope};
use geo::Geometry as GeoGeometry;
use rstar::{RTree, RTreeObject, AABB};

/// Region geometry keyed by `K`, remembering its position in the source dataset
#[derive(Debug, Clone)]
pub struct IndexedRegion<K> {
    /// Position in load order; lower wins when regions overlap
    pub ordinal: usize,

    pub key: K,

    pub geometry: GeoGeometry,

    envelope: AABB<[f64; 2]>,
}

impl<K> IndexedRegion<K> {
    fn new(ordinal: usize, key: K, geometry: &Geometry) -> Option<Self> {
        let geometry = to_geo_geometry(geometry);
        let envelope = envelope(&geometry)?;
        Some(Self {
            ordinal,
            key,
            geometry,
            envelope,
        })
    }
}

impl<K> RTreeObject for IndexedRegion<K> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over polygon regions answering first-match point location.
///
/// The result is the same as scanning the regions in load order and
/// returning the first one that contains the point.
#[derive(Debug)]
pub struct PolygonIndex<K> {
    tree: RTree<IndexedRegion<K>>,
}

impl<K> PolygonIndex<K> {
    /// Create a new empty index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load regions; the iteration order defines the ordinals.
    ///
    /// Regions without extent are dropped.
    pub fn from_regions<I>(regions: I) -> Self
    where
        I: IntoIterator<Item = (K, Geometry)>,
    {
        let indexed: Vec<IndexedRegion<K>> = regions
            .into_iter()
            .enumerate()
            .filter_map(|(ordinal, (key, geometry))| IndexedRegion::new(ordinal, key, &geometry))
            .collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Key of the first region in load order that contains the point
    pub fn locate(&self, point: Point) -> Option<&K> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.lng, point.lat]))
            .filter(|region| contains_point(&region.geometry, point))
            .min_by_key(|region| region.ordinal)
            .map(|region| &region.key)
    }

    /// Get the total number of regions in the index
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl<K> Default for PolygonIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
