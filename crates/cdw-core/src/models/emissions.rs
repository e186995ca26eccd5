//! Stage-by-stage emissions output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emissions per stage in kg CO2e.
///
/// Field names are part of the public response format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionsBreakdown {
    pub total: f64,
    pub emissions_production: f64,
    pub emissions_excavator: f64,
    pub emissions_bulldozer: f64,
    pub emissions_transport_to_recycling: f64,
    pub emissions_transport_to_landfill: f64,
    pub emissions_landfill: f64,
    pub emissions_recycling: f64,
    /// Production emissions split by material
    #[serde(default)]
    pub production_by_material: BTreeMap<String, f64>,
    /// Mass of excavated material in tons
    #[serde(default)]
    pub total_weight: f64,
}

impl EmissionsBreakdown {
    /// Stage values in response order, without the total
    pub fn stages(&self) -> [(&'static str, f64); 7] {
        [
            ("emissions_production", self.emissions_production),
            ("emissions_excavator", self.emissions_excavator),
            ("emissions_bulldozer", self.emissions_bulldozer),
            ("emissions_transport_to_recycling", self.emissions_transport_to_recycling),
            ("emissions_transport_to_landfill", self.emissions_transport_to_landfill),
            ("emissions_landfill", self.emissions_landfill),
            ("emissions_recycling", self.emissions_recycling),
        ]
    }

    /// Sum of the stage values in response order
    pub fn stage_sum(&self) -> f64 {
        self.stages().iter().map(|(_, v)| v).sum()
    }
}
