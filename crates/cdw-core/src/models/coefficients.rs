//! Emission factors, equipment usage rates and material densities

use crate::error::{CdwError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hours of equipment time per cubic meter excavated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRates {
    pub excavator_hours_per_m3: f64,
    pub bulldozer_hours_per_m3: f64,
}

impl Default for EquipmentRates {
    fn default() -> Self {
        Self { excavator_hours_per_m3: 0.1, bulldozer_hours_per_m3: 0.05 }
    }
}

/// Immutable coefficient tables shared by every estimate.
///
/// Units: production in kg CO2e/m³, equipment in kg CO2e/hour, transport in
/// kg CO2e/ton-mile, landfill and recycling in kg CO2e/ton, densities in t/m³.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionCoefficients {
    pub production: BTreeMap<String, f64>,
    pub densities: BTreeMap<String, f64>,
    pub excavator_per_hour: f64,
    pub bulldozer_per_hour: f64,
    pub transport_per_ton_mile: f64,
    pub landfill_per_ton: f64,
    pub recycling_per_ton: f64,
    pub equipment: EquipmentRates,
}

impl Default for EmissionCoefficients {
    fn default() -> Self {
        let production = [("asphalt", 85.0), ("concrete", 120.0), ("gravel", 20.0), ("dirt", 10.0)];
        let densities = [("asphalt", 2.4), ("concrete", 2.3), ("gravel", 1.6), ("dirt", 1.5)];

        Self {
            production: production.into_iter().map(|(m, f)| (m.to_string(), f)).collect(),
            densities: densities.into_iter().map(|(m, d)| (m.to_string(), d)).collect(),
            excavator_per_hour: 25.0,
            bulldozer_per_hour: 70.0,
            transport_per_ton_mile: 0.15,
            landfill_per_ton: 5.0,
            recycling_per_ton: 3.0,
            equipment: EquipmentRates::default(),
        }
    }
}

impl EmissionCoefficients {
    pub fn production_factor(&self, material: &str) -> Option<f64> {
        self.production.get(material).copied()
    }

    pub fn density(&self, material: &str) -> Option<f64> {
        self.densities.get(material).copied()
    }

    /// True when both a production factor and a density exist for the material
    pub fn covers(&self, material: &str) -> bool {
        self.production.contains_key(material) && self.densities.contains_key(material)
    }

    /// Materials from `materials` that lack a production factor or density
    pub fn missing_materials<'a>(&self, materials: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut missing: Vec<String> = materials
            .into_iter()
            .filter(|m| !self.covers(m))
            .map(|m| m.to_string())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Every coefficient must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("excavator_per_hour", self.excavator_per_hour),
            ("bulldozer_per_hour", self.bulldozer_per_hour),
            ("transport_per_ton_mile", self.transport_per_ton_mile),
            ("landfill_per_ton", self.landfill_per_ton),
            ("recycling_per_ton", self.recycling_per_ton),
            ("equipment.excavator_hours_per_m3", self.equipment.excavator_hours_per_m3),
            ("equipment.bulldozer_hours_per_m3", self.equipment.bulldozer_hours_per_m3),
        ];
        for (key, value) in scalars {
            check_coefficient(&format!("coefficients.{}", key), value)?;
        }
        for (material, value) in &self.production {
            check_coefficient(&format!("coefficients.production.{}", material), *value)?;
        }
        for (material, value) in &self.densities {
            check_coefficient(&format!("coefficients.densities.{}", material), *value)?;
        }
        Ok(())
    }
}

fn check_coefficient(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CdwError::config_invalid(key, format!("must be a finite, non-negative number, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_published_table() {
        let coefficients = EmissionCoefficients::default();
        assert_eq!(coefficients.production_factor("concrete"), Some(120.0));
        assert_eq!(coefficients.density("gravel"), Some(1.6));
        assert_eq!(coefficients.transport_per_ton_mile, 0.15);
        assert!(coefficients.validate().is_ok());
    }

    #[test]
    fn test_missing_materials() {
        let coefficients = EmissionCoefficients::default();
        let missing = coefficients.missing_materials(["asphalt", "brick", "dirt", "brick"]);
        assert_eq!(missing, vec!["brick".to_string()]);
    }

    #[test]
    fn test_negative_factor_rejected() {
        let mut coefficients = EmissionCoefficients::default();
        coefficients.production.insert("gravel".to_string(), -1.0);
        let err = coefficients.validate().unwrap_err();
        assert!(err.to_string().contains("coefficients.production.gravel"));
    }
}
