//! Layer profiles and waste composition

use crate::error::{CdwError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Material assigned to depth below every known surface layer
pub const DEFAULT_FALLBACK_MATERIAL: &str = "dirt";

/// Six inches, in meters
const SIX_INCHES_M: f64 = 0.1524;

/// A single physical layer of the excavation profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub material: String,
    /// Thickness in meters
    pub thickness: f64,
}

impl Layer {
    pub fn new(material: impl Into<String>, thickness: f64) -> Self {
        Self { material: material.into(), thickness }
    }
}

/// Ordered surface layers, topmost first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerProfile {
    layers: Vec<Layer>,
}

impl LayerProfile {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Every material named by the profile
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.material.as_str())
    }

    /// Reject empty material names and non-positive thicknesses
    pub fn validate(&self) -> Result<()> {
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.material.trim().is_empty() {
                return Err(CdwError::config_invalid(
                    format!("layers[{}].material", idx),
                    "material name must not be empty",
                ));
            }
            if !layer.thickness.is_finite() || layer.thickness <= 0.0 {
                return Err(CdwError::config_invalid(
                    format!("layers[{}].thickness", idx),
                    format!("thickness must be a positive number, got {}", layer.thickness),
                ));
            }
        }
        Ok(())
    }
}

impl Default for LayerProfile {
    /// Six inches of asphalt over six inches of concrete
    fn default() -> Self {
        Self::new(vec![Layer::new("asphalt", SIX_INCHES_M), Layer::new("concrete", SIX_INCHES_M)])
    }
}

/// Volume fraction per material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WasteComposition {
    fractions: BTreeMap<String, f64>,
}

impl WasteComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (material, fraction) pairs; repeated materials accumulate
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut composition = Self::new();
        for (material, fraction) in pairs {
            composition.add(material, fraction);
        }
        composition
    }

    /// Add a fraction to a material, accumulating with any existing share
    pub fn add(&mut self, material: impl Into<String>, fraction: f64) {
        *self.fractions.entry(material.into()).or_insert(0.0) += fraction;
    }

    pub fn get(&self, material: &str) -> Option<f64> {
        self.fractions.get(material).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fractions.iter().map(|(m, f)| (m.as_str(), *f))
    }

    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.fractions.keys().map(|m| m.as_str())
    }

    /// Sum of all fractions
    pub fn total(&self) -> f64 {
        self.fractions.values().sum()
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }
}

/// How the composition of an excavation is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Consume the layer profile top-down, remainder goes to the fallback material
    #[default]
    Layered,
    /// Use the fixed composition configured for the located borough
    BoroughTable,
}

/// Fixed per-borough compositions used by `CompositionMode::BoroughTable`
pub fn default_borough_compositions() -> BTreeMap<String, WasteComposition> {
    let table = [
        ("Manhattan", [0.10, 0.15, 0.25, 0.5]),
        ("Brooklyn", [0.12, 0.18, 0.20, 0.5]),
        ("Queens", [0.08, 0.12, 0.30, 0.5]),
        ("Bronx", [0.11, 0.15, 0.24, 0.5]),
        ("Staten Island", [0.13, 0.17, 0.20, 0.5]),
    ];

    table
        .into_iter()
        .map(|(borough, [asphalt, concrete, gravel, dirt])| {
            let composition = WasteComposition::from_pairs([
                ("asphalt", asphalt),
                ("concrete", concrete),
                ("gravel", gravel),
                (DEFAULT_FALLBACK_MATERIAL, dirt),
            ]);
            (borough.to_string(), composition)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = LayerProfile::default();
        assert_eq!(profile.layers().len(), 2);
        assert_eq!(profile.layers()[0].material, "asphalt");
        let thickness: f64 = profile.layers().iter().map(|l| l.thickness).sum();
        assert!((thickness - 0.3048).abs() < 1e-12);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_profile_rejects_zero_thickness() {
        let profile = LayerProfile::new(vec![Layer::new("asphalt", 0.0)]);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_composition_accumulates_repeated_material() {
        let composition = WasteComposition::from_pairs([("dirt", 0.25), ("gravel", 0.5), ("dirt", 0.25)]);
        assert_eq!(composition.len(), 2);
        assert_eq!(composition.get("dirt"), Some(0.5));
        assert!((composition.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_borough_tables_sum_to_one() {
        let tables = default_borough_compositions();
        assert_eq!(tables.len(), 5);
        for (borough, composition) in &tables {
            assert!((composition.total() - 1.0).abs() < 1e-9, "{} does not sum to 1", borough);
        }
        assert_eq!(tables["Manhattan"].get("gravel"), Some(0.25));
    }

    #[test]
    fn test_composition_mode_serde() {
        let mode: CompositionMode = serde_json::from_str("\"borough_table\"").unwrap();
        assert_eq!(mode, CompositionMode::BoroughTable);
    }
}
