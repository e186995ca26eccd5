use cdw_core::models::{EmissionCoefficients, EmissionsBreakdown, RouteResult, WasteComposition};
use std::collections::BTreeMap;

/// Stage-by-stage emissions for `volume` m³ of excavated material.
///
/// Materials without a production factor or density contribute nothing.
/// The total is the sum of the stage values in `EmissionsBreakdown::stages`
/// order.
pub fn compute_emissions(
    volume: f64,
    composition: &WasteComposition,
    route: &RouteResult,
    coefficients: &EmissionCoefficients,
    disposal_fraction: f64,
) -> EmissionsBreakdown {
    let mut production_by_material = BTreeMap::new();
    let mut emissions_production = 0.0;
    let mut total_weight = 0.0;

    for (material, fraction) in composition.iter() {
        let material_volume = volume * fraction;

        let production = material_volume * coefficients.production_factor(material).unwrap_or(0.0);
        emissions_production += production;
        production_by_material.insert(material.to_string(), production);

        total_weight += material_volume * coefficients.density(material).unwrap_or(0.0);
    }

    let equipment = &coefficients.equipment;
    let transport = coefficients.transport_per_ton_mile;
    let disposed_weight = total_weight * disposal_fraction;

    let mut breakdown = EmissionsBreakdown {
        total: 0.0,
        emissions_production,
        emissions_excavator: volume * equipment.excavator_hours_per_m3 * coefficients.excavator_per_hour,
        emissions_bulldozer: volume * equipment.bulldozer_hours_per_m3 * coefficients.bulldozer_per_hour,
        emissions_transport_to_recycling: total_weight * route.transfer_cost * transport,
        emissions_transport_to_landfill: disposed_weight * route.landfill_cost * transport,
        emissions_landfill: disposed_weight * coefficients.landfill_per_ton,
        emissions_recycling: total_weight * coefficients.recycling_per_ton,
        production_by_material,
        total_weight,
    };
    breakdown.total = breakdown.stage_sum();
    breakdown
}

/// Applies one coefficient table and disposal fraction to many estimates
#[derive(Debug, Clone, Copy)]
pub struct EmissionsCalculator<'a> {
    coefficients: &'a EmissionCoefficients,
    disposal_fraction: f64,
}

impl<'a> EmissionsCalculator<'a> {
    pub fn new(coefficients: &'a EmissionCoefficients, disposal_fraction: f64) -> Self {
        Self {
            coefficients,
            disposal_fraction,
        }
    }

    pub fn calculate(&self, volume: f64, composition: &WasteComposition, route: &RouteResult) -> EmissionsBreakdown {
        compute_emissions(volume, composition, route, self.coefficients, self.disposal_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manhattan() -> WasteComposition {
        WasteComposition::from_pairs([("asphalt", 0.1), ("concrete", 0.15), ("gravel", 0.25), ("dirt", 0.5)])
    }

    fn route() -> RouteResult {
        RouteResult {
            transfer_station: "TS-1".to_string(),
            station_location: None,
            transfer_cost: 2.0,
            landfill_cost: 10.0,
            landfill: None,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_hand_computed_breakdown() {
        let coefficients = EmissionCoefficients::default();
        let breakdown = compute_emissions(80.0, &manhattan(), &route(), &coefficients, 0.1);

        assert_close(breakdown.emissions_production, 2920.0);
        assert_close(breakdown.production_by_material["asphalt"], 680.0);
        assert_close(breakdown.production_by_material["concrete"], 1440.0);
        assert_close(breakdown.total_weight, 138.8);
        assert_close(breakdown.emissions_excavator, 200.0);
        assert_close(breakdown.emissions_bulldozer, 280.0);
        assert_close(breakdown.emissions_transport_to_recycling, 41.64);
        assert_close(breakdown.emissions_transport_to_landfill, 20.82);
        assert_close(breakdown.emissions_landfill, 69.4);
        assert_close(breakdown.emissions_recycling, 416.4);
        assert_close(breakdown.total, 3948.26);
        assert_eq!(breakdown.total, breakdown.stage_sum());
    }

    #[test]
    fn test_zero_volume_is_all_zero() {
        let coefficients = EmissionCoefficients::default();
        let breakdown = compute_emissions(0.0, &manhattan(), &route(), &coefficients, 0.1);

        assert_eq!(breakdown.total, 0.0);
        for (stage, value) in breakdown.stages() {
            assert_eq!(value, 0.0, "{} should be zero", stage);
        }
    }

    #[test]
    fn test_unknown_material_contributes_nothing() {
        let coefficients = EmissionCoefficients::default();
        let composition = WasteComposition::from_pairs([("asphalt", 0.5), ("brick", 0.5)]);
        let breakdown = compute_emissions(10.0, &composition, &route(), &coefficients, 0.1);

        assert_eq!(breakdown.production_by_material["brick"], 0.0);
        assert_close(breakdown.emissions_production, 5.0 * 85.0);
        assert_close(breakdown.total_weight, 5.0 * 2.4);
    }

    #[test]
    fn test_calculator_matches_free_function() {
        let coefficients = EmissionCoefficients::default();
        let calculator = EmissionsCalculator::new(&coefficients, 0.1);

        assert_eq!(
            calculator.calculate(80.0, &manhattan(), &route()),
            compute_emissions(80.0, &manhattan(), &route(), &coefficients, 0.1)
        );
    }

    proptest! {
        #[test]
        fn prop_linear_in_volume(volume in 0.0f64..1000.0, k in 0.0f64..10.0) {
            let coefficients = EmissionCoefficients::default();
            let base = compute_emissions(volume, &manhattan(), &route(), &coefficients, 0.1);
            let scaled = compute_emissions(volume * k, &manhattan(), &route(), &coefficients, 0.1);

            let tolerance = 1e-9 * (base.total * k).max(1.0);
            prop_assert!((scaled.total - base.total * k).abs() <= tolerance);
            prop_assert_eq!(scaled.total, scaled.stage_sum());
        }
    }
}
