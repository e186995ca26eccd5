use cdw_core::error::{CdwError, Result};
use cdw_core::models::{CompositionMode, LayerProfile, WasteComposition, DEFAULT_FALLBACK_MATERIAL};
use std::collections::BTreeMap;

/// Split an excavation of `depth` meters into volume fractions per material.
///
/// Layers are consumed from the surface down; whatever depth remains below
/// the last layer is assigned to the fallback material.
pub fn resolve_composition(depth: f64, profile: &LayerProfile) -> Result<WasteComposition> {
    if !depth.is_finite() || depth <= 0.0 {
        return Err(CdwError::invalid_input(
            "depth",
            format!("must be greater than zero, got {}", depth),
        ));
    }

    let mut composition = WasteComposition::new();
    let mut remaining = depth;

    for layer in profile.layers() {
        if remaining <= 0.0 {
            break;
        }
        if remaining >= layer.thickness {
            composition.add(layer.material.as_str(), layer.thickness / depth);
            remaining -= layer.thickness;
        } else {
            composition.add(layer.material.as_str(), remaining / depth);
            remaining = 0.0;
        }
    }

    if remaining > 0.0 {
        composition.add(DEFAULT_FALLBACK_MATERIAL, remaining / depth);
    }

    Ok(composition)
}

/// Chooses between the layered profile and the per-borough table
#[derive(Debug, Clone, Copy)]
pub struct CompositionResolver<'a> {
    mode: CompositionMode,
    layers: &'a LayerProfile,
    borough_table: &'a BTreeMap<String, WasteComposition>,
}

impl<'a> CompositionResolver<'a> {
    pub fn new(
        mode: CompositionMode,
        layers: &'a LayerProfile,
        borough_table: &'a BTreeMap<String, WasteComposition>,
    ) -> Self {
        Self {
            mode,
            layers,
            borough_table,
        }
    }

    /// Composition for an excavation in `borough`.
    ///
    /// In table mode a borough without an entry (including `"Unknown"`)
    /// uses the layered profile.
    pub fn resolve(&self, depth: f64, borough: &str) -> Result<WasteComposition> {
        let layered = resolve_composition(depth, self.layers)?;

        match self.mode {
            CompositionMode::Layered => Ok(layered),
            CompositionMode::BoroughTable => match self.borough_table.get(borough) {
                Some(composition) => Ok(composition.clone()),
                None => {
                    tracing::debug!(borough = %borough, "No composition table entry, using layer profile");
                    Ok(layered)
                }
            },
        }
    }
}
