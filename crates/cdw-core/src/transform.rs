//! CRS normalization for loaded datasets
//!
//! Every dataset is brought to WGS 84 lon/lat before it is indexed. Declared
//! frames are reprojected through PROJ; a dataset that declares nothing is
//! accepted only when its coordinates already look like lon/lat.

use proj::Proj;

use crate::error::{CdwError, Result};
use crate::formats::FormatDataset;
use crate::models::{DeclaredCrs, Geometry, WGS84_EPSG};

const TARGET_CRS: &str = "EPSG:4326";

/// Bring a freshly read dataset to EPSG:4326
pub fn normalize_dataset(mut dataset: FormatDataset) -> Result<FormatDataset> {
    let has_geometry = dataset.features.iter().any(|f| f.geometry.is_some());

    match dataset.crs.clone() {
        Some(crs) if crs.is_wgs84() => {}
        Some(crs) => {
            if has_geometry {
                reproject_features(&mut dataset, &crs)?;
                tracing::info!(
                    dataset = %dataset.name,
                    from = %crs,
                    "Reprojected dataset to EPSG:4326"
                );
            }
            dataset.crs = Some(DeclaredCrs::Epsg(WGS84_EPSG));
        }
        None if has_geometry => {
            if let Some([x, y]) = first_out_of_range(&dataset) {
                return Err(CdwError::CrsMismatch {
                    dataset: dataset.name.clone(),
                    dataset_crs: "no declared CRS".to_string(),
                    reason: format!("coordinate ({}, {}) is not a longitude/latitude pair", x, y),
                });
            }
            tracing::warn!(dataset = %dataset.name, "No CRS declared, assuming EPSG:4326");
        }
        None => {}
    }

    Ok(dataset)
}

/// Reproject a geometry with an already built transformation
pub fn reproject_geometry(geometry: &Geometry, proj: &Proj) -> std::result::Result<Geometry, String> {
    geometry.try_map_positions(|[x, y]| {
        let (lon, lat) = proj.convert((x, y)).map_err(|e| format!("Projection failed: {}", e))?;
        if !lon.is_finite() || !lat.is_finite() {
            return Err(format!("Projection of ({}, {}) is not finite", x, y));
        }
        Ok([lon, lat])
    })
}

fn reproject_features(dataset: &mut FormatDataset, crs: &DeclaredCrs) -> Result<()> {
    let mismatch = |reason: String| CdwError::CrsMismatch {
        dataset: dataset.name.clone(),
        dataset_crs: crs.to_string(),
        reason,
    };

    // new_known_crs normalizes the output axis order to lon/lat
    let proj = Proj::new_known_crs(&crs.proj_definition(), TARGET_CRS, None)
        .map_err(|e| mismatch(format!("Failed to create projection: {}", e)))?;

    let mut reprojected = Vec::with_capacity(dataset.features.len());
    for feature in &dataset.features {
        let geometry = match &feature.geometry {
            Some(geometry) => Some(reproject_geometry(geometry, &proj).map_err(&mismatch)?),
            None => None,
        };
        reprojected.push(geometry);
    }

    for (feature, geometry) in dataset.features.iter_mut().zip(reprojected) {
        feature.geometry = geometry;
    }
    Ok(())
}

fn first_out_of_range(dataset: &FormatDataset) -> Option<[f64; 2]> {
    dataset
        .features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(Geometry::positions)
        .find(|[x, y]| !(-180.0..=180.0).contains(x) || !(-90.0..=90.0).contains(y))
}
