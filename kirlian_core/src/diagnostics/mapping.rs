//! Translation of diagnostic parameters into chakra energies.
//!
//! Every chakra starts fully charged. Each recognized parameter drains the
//! chakras it is linked to in proportion to the link weight: a normal value
//! near the middle of its range costs nothing, a value at the range edge
//! costs 30 % of the weight, and an abnormal value costs up to the full
//! weight depending on how far it deviates.

use kirlian_shared::{Chakra, ChakraEnergyProfile, MAX_ENERGY};
use serde::Serialize;

use super::report::{DiagnosticData, DiagnosticParameter};

/// Parameters recognized by the mapper and the chakras they affect.
const PARAMETER_CHAKRAS: &[(&str, &[(Chakra, f64)])] = &[
    ("Вязкость крови", &[(Chakra::Root, 0.5), (Chakra::Sacral, 0.3)]),
    ("Общий Холестерин", &[(Chakra::Root, 0.4), (Chakra::Sacral, 0.3)]),
    ("Липиды", &[(Chakra::Root, 0.5), (Chakra::SolarPlexus, 0.2)]),
    (
        "Сосудистое сопротивление",
        &[(Chakra::Heart, 0.4), (Chakra::Root, 0.2), (Chakra::SolarPlexus, 0.2)],
    ),
    (
        "Эластичность кровеносных сосудов",
        &[(Chakra::Heart, 0.5), (Chakra::Throat, 0.2)],
    ),
    (
        "Потребность миокарда в крови",
        &[(Chakra::Heart, 0.6), (Chakra::SolarPlexus, 0.2)],
    ),
    ("Объем перфузии крови в миокарде", &[(Chakra::Heart, 0.7)]),
    (
        "Объем потребления кислорода миокардом",
        &[(Chakra::Heart, 0.5), (Chakra::Throat, 0.3)],
    ),
    ("Ударный объем", &[(Chakra::Heart, 0.6), (Chakra::Root, 0.2)]),
    (
        "Сопротивление выбросу крови из левого желудочка",
        &[(Chakra::Heart, 0.7)],
    ),
    (
        "Эластичность коронарных артерий",
        &[(Chakra::Heart, 0.5), (Chakra::Root, 0.2)],
    ),
    (
        "Сила выброса левого желудочка",
        &[(Chakra::Heart, 0.5), (Chakra::SolarPlexus, 0.3)],
    ),
    (
        "Перфузионное давление коронарных артерий",
        &[(Chakra::Heart, 0.5), (Chakra::Crown, 0.2)],
    ),
    (
        "Эластичность церебральных сосудов",
        &[(Chakra::ThirdEye, 0.5), (Chakra::Crown, 0.3)],
    ),
    (
        "Состояние кровоснабжения мозга",
        &[(Chakra::ThirdEye, 0.4), (Chakra::Crown, 0.4)],
    ),
];

/// Chakra links of a known parameter.
pub fn linked_chakras(parameter: &str) -> Option<&'static [(Chakra, f64)]> {
    PARAMETER_CHAKRAS
        .iter()
        .find(|(name, _)| *name == parameter)
        .map(|(_, links)| *links)
}

pub fn known_parameters() -> impl Iterator<Item = &'static str> {
    PARAMETER_CHAKRAS.iter().map(|(name, _)| *name)
}

/// One parameter's effect on one chakra.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub parameter: String,
    pub chakra: Chakra,
    pub weight: f64,
    /// Energy the parameter alone would imply (0..=100).
    pub energy_value: f64,
    pub reduction: f64,
    pub energy_after: f64,
}

/// Mapper output with the per-parameter trace that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct ChakraMapping {
    pub profile: ChakraEnergyProfile,
    pub contributions: Vec<Contribution>,
    /// Parameters present in the report but unknown to the mapper.
    pub ignored: Vec<String>,
}

/// Energy implied by a single parameter.
pub fn parameter_energy(parameter: &DiagnosticParameter) -> f64 {
    if parameter.is_normal() {
        let position = parameter.position.unwrap_or(50.0);
        70.0 + 30.0 * (1.0 - (position - 50.0).abs() / 50.0)
    } else {
        (100.0 - parameter.deviation.abs().min(100.0)).max(0.0)
    }
}

pub fn map_to_chakras(data: &DiagnosticData) -> ChakraEnergyProfile {
    map_with_trace(data).profile
}

pub fn map_with_trace(data: &DiagnosticData) -> ChakraMapping {
    let mut energy = [MAX_ENERGY as f64; Chakra::COUNT];
    let mut contributions = Vec::new();
    let mut ignored = Vec::new();

    for (name, parameter) in data {
        let Some(links) = linked_chakras(name) else {
            ignored.push(name.clone());
            continue;
        };
        let energy_value = parameter_energy(parameter);
        for &(chakra, weight) in links {
            let reduction = (100.0 - energy_value) * weight;
            energy[chakra.index()] -= reduction;
            tracing::debug!(
                parameter = %name,
                chakra = chakra.name(),
                weight,
                energy_value,
                reduction,
                "applied parameter to chakra"
            );
            contributions.push(Contribution {
                parameter: name.clone(),
                chakra,
                weight,
                energy_value,
                reduction,
                energy_after: energy[chakra.index()],
            });
        }
    }

    let profile = ChakraEnergyProfile::from_values(energy.map(|value| value as f32));
    tracing::info!(
        parameters = data.len(),
        applied = contributions.len(),
        ignored = ignored.len(),
        energies = %profile,
        "mapped diagnostics to chakra energies"
    );
    ChakraMapping {
        profile,
        contributions,
        ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(rows: &[(&str, f64, f64, f64)]) -> DiagnosticData {
        rows.iter()
            .map(|&(name, result, min, max)| {
                (
                    name.to_string(),
                    DiagnosticParameter::evaluate(name, result, min, max).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_report_keeps_full_energy() {
        let profile = map_to_chakras(&DiagnosticData::new());
        assert_eq!(profile, ChakraEnergyProfile::uniform(100.0));
    }

    #[test]
    fn centered_normal_value_costs_nothing() {
        let profile = map_to_chakras(&data(&[("Ударный объем", 80.0, 60.0, 100.0)]));
        assert_eq!(profile.get(Chakra::Heart), 100.0);
        assert_eq!(profile.get(Chakra::Root), 100.0);
    }

    #[test]
    fn edge_of_range_costs_thirty_percent_of_weight() {
        let profile = map_to_chakras(&data(&[("Ударный объем", 60.0, 60.0, 100.0)]));
        assert!((profile.get(Chakra::Heart) - 82.0).abs() < 1e-4);
        assert!((profile.get(Chakra::Root) - 94.0).abs() < 1e-4);
    }

    #[test]
    fn abnormal_value_drains_by_deviation() {
        // 25 % above the range.
        let mapping = map_with_trace(&data(&[("Объем перфузии крови в миокарде", 110.0, 60.0, 100.0)]));
        assert!((mapping.profile.get(Chakra::Heart) - 82.5).abs() < 1e-4);
        assert_eq!(mapping.contributions.len(), 1);
        assert!((mapping.contributions[0].energy_value - 75.0).abs() < 1e-9);
    }

    #[test]
    fn heavy_deviation_clamps_at_zero() {
        let rows: Vec<(&str, f64, f64, f64)> = known_parameters()
            .map(|name| (name, 1000.0, 1.0, 2.0))
            .collect();
        let profile = map_to_chakras(&data(&rows));
        assert_eq!(profile.get(Chakra::Heart), 0.0);
        assert!(profile.values().iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let mapping = map_with_trace(&data(&[("Пульс", 200.0, 60.0, 90.0)]));
        assert_eq!(mapping.ignored, vec!["Пульс".to_string()]);
        assert_eq!(mapping.profile, ChakraEnergyProfile::uniform(100.0));
    }

    #[test]
    fn table_lists_fifteen_parameters() {
        assert_eq!(known_parameters().count(), 15);
        assert!(linked_chakras("Липиды").is_some());
        assert!(linked_chakras("липиды").is_none());
    }
}
