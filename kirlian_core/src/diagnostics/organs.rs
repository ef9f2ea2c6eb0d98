//! Organ status derived from the diagnostic parameters linked to each organ.

use std::fmt;
use std::str::FromStr;

use kirlian_shared::Language;
use serde::{Deserialize, Serialize};

use super::report::{DiagnosticData, ParameterStatus};

/// Share of normal parameters at or above which an organ is healthy.
const HEALTHY_AT: f64 = 80.0;
/// Share of normal parameters at or below which an organ is damaged.
const DAMAGED_AT: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organ {
    Brain,
    Heart,
    Lungs,
    Liver,
    Stomach,
    Pancreas,
    Intestines,
    Kidneys,
    Bladder,
    Thyroid,
    Spleen,
    Adrenals,
}

/// Ellipse on the unit body map: center, full width/height, rotation in
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrganShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

const fn shape(x: f64, y: f64, width: f64, height: f64) -> OrganShape {
    OrganShape {
        x,
        y,
        width,
        height,
        angle: 0.0,
    }
}

struct OrganRecord {
    name_ru: &'static str,
    name_en: &'static str,
    shapes: &'static [OrganShape],
    parameters: &'static [&'static str],
}

const ORGAN_TABLE: [OrganRecord; 12] = [
    OrganRecord {
        name_ru: "Головной мозг",
        name_en: "Brain",
        shapes: &[shape(0.5, 0.95, 0.15, 0.1)],
        parameters: &[
            "Состояние кровоснабжения мозга",
            "Эластичность церебральных сосудов",
        ],
    },
    OrganRecord {
        name_ru: "Сердце",
        name_en: "Heart",
        shapes: &[shape(0.5, 0.7, 0.1, 0.09)],
        parameters: &[
            "Сила выброса левого желудочка",
            "Ударный объем",
            "Объем перфузии крови в миокарде",
            "Потребность миокарда в крови",
            "Эластичность коронарных артерий",
            "Сосудистое сопротивление",
            "Перфузионное давление коронарных артерий",
        ],
    },
    OrganRecord {
        name_ru: "Легкие",
        name_en: "Lungs",
        shapes: &[shape(0.38, 0.7, 0.15, 0.12), shape(0.62, 0.7, 0.15, 0.12)],
        parameters: &["Объем потребления кислорода миокардом"],
    },
    OrganRecord {
        name_ru: "Печень",
        name_en: "Liver",
        shapes: &[shape(0.42, 0.54, 0.20, 0.11)],
        parameters: &["Общий Холестерин", "Липиды"],
    },
    OrganRecord {
        name_ru: "Желудок",
        name_en: "Stomach",
        shapes: &[shape(0.61, 0.54, 0.12, 0.09)],
        parameters: &["Вязкость крови"],
    },
    OrganRecord {
        name_ru: "Поджелудочная железа",
        name_en: "Pancreas",
        shapes: &[shape(0.54, 0.49, 0.10, 0.03)],
        parameters: &["Липиды"],
    },
    OrganRecord {
        name_ru: "Кишечник",
        name_en: "Intestines",
        shapes: &[shape(0.5, 0.37, 0.24, 0.13)],
        parameters: &["Вязкость крови", "Общий Холестерин"],
    },
    OrganRecord {
        name_ru: "Почки",
        name_en: "Kidneys",
        shapes: &[shape(0.32, 0.46, 0.07, 0.08), shape(0.68, 0.46, 0.07, 0.08)],
        parameters: &["Сосудистое сопротивление", "Эластичность кровеносных сосудов"],
    },
    OrganRecord {
        name_ru: "Мочевой пузырь",
        name_en: "Bladder",
        shapes: &[shape(0.5, 0.22, 0.09, 0.06)],
        parameters: &["Вязкость крови"],
    },
    OrganRecord {
        name_ru: "Щитовидная железа",
        name_en: "Thyroid",
        shapes: &[shape(0.5, 0.82, 0.06, 0.02)],
        parameters: &["Эластичность кровеносных сосудов"],
    },
    OrganRecord {
        name_ru: "Селезенка",
        name_en: "Spleen",
        shapes: &[shape(0.64, 0.5, 0.06, 0.05)],
        parameters: &["Вязкость крови"],
    },
    OrganRecord {
        name_ru: "Надпочечники",
        name_en: "Adrenal glands",
        shapes: &[shape(0.35, 0.42, 0.04, 0.04), shape(0.65, 0.42, 0.04, 0.04)],
        parameters: &["Сопротивление выбросу крови из левого желудочка"],
    },
];

impl Organ {
    pub const ALL: [Organ; 12] = [
        Organ::Brain,
        Organ::Heart,
        Organ::Lungs,
        Organ::Liver,
        Organ::Stomach,
        Organ::Pancreas,
        Organ::Intestines,
        Organ::Kidneys,
        Organ::Bladder,
        Organ::Thyroid,
        Organ::Spleen,
        Organ::Adrenals,
    ];

    fn record(self) -> &'static OrganRecord {
        &ORGAN_TABLE[self as usize]
    }

    pub fn name(self, lang: Language) -> &'static str {
        match lang {
            Language::Ru => self.record().name_ru,
            Language::En => self.record().name_en,
        }
    }

    pub fn shapes(self) -> &'static [OrganShape] {
        self.record().shapes
    }

    /// Diagnostic parameters that describe this organ.
    pub fn parameters(self) -> &'static [&'static str] {
        self.record().parameters
    }

    /// Resolve Russian or English names, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|organ| {
            let record = organ.record();
            record.name_ru.to_lowercase() == key
                || record.name_en.to_lowercase() == key
                || format!("{organ:?}").to_lowercase() == key
        })
    }

    /// Derive the organ's status from the parameters present in `data`.
    pub fn status(self, data: &DiagnosticData) -> OrganStatus {
        let mut total = 0usize;
        let mut normal = 0usize;
        let mut above = 0usize;
        let mut below = 0usize;
        for parameter in self.parameters().iter().filter_map(|name| data.get(*name)) {
            total += 1;
            match parameter.status {
                ParameterStatus::Normal => normal += 1,
                ParameterStatus::Abnormal if parameter.deviation > 0.0 => above += 1,
                ParameterStatus::Abnormal => below += 1,
            }
        }

        if total == 0 {
            return OrganStatus::NoData;
        }
        let normal_share = normal as f64 / total as f64 * 100.0;
        if normal_share >= HEALTHY_AT {
            OrganStatus::Healthy
        } else if normal_share <= DAMAGED_AT {
            OrganStatus::Damaged
        } else if above > below {
            OrganStatus::Inflamed
        } else {
            OrganStatus::Weakened
        }
    }
}

impl fmt::Display for Organ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record().name_en)
    }
}

impl FromStr for Organ {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Organ::from_name(s).ok_or_else(|| format!("unknown organ '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganStatus {
    Healthy,
    Inflamed,
    Weakened,
    Damaged,
    NoData,
}

impl OrganStatus {
    pub const ALL: [OrganStatus; 5] = [
        OrganStatus::Healthy,
        OrganStatus::Inflamed,
        OrganStatus::Weakened,
        OrganStatus::Damaged,
        OrganStatus::NoData,
    ];

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (OrganStatus::Healthy, Language::Ru) => "здоровый",
            (OrganStatus::Inflamed, Language::Ru) => "воспаленный",
            (OrganStatus::Weakened, Language::Ru) => "ослабленный",
            (OrganStatus::Damaged, Language::Ru) => "поврежденный",
            (OrganStatus::NoData, Language::Ru) => "нет данных",
            (OrganStatus::Healthy, Language::En) => "healthy",
            (OrganStatus::Inflamed, Language::En) => "inflamed",
            (OrganStatus::Weakened, Language::En) => "weakened",
            (OrganStatus::Damaged, Language::En) => "damaged",
            (OrganStatus::NoData, Language::En) => "no data",
        }
    }

    /// Map fill color as RGB plus opacity.
    pub fn rgba(self) -> ([u8; 3], f64) {
        match self {
            OrganStatus::Healthy => ([230, 204, 51], 0.8),
            OrganStatus::Inflamed => ([230, 51, 51], 0.8),
            OrganStatus::Weakened => ([153, 153, 153], 0.8),
            OrganStatus::Damaged => ([26, 26, 26], 0.8),
            OrganStatus::NoData => ([204, 204, 204], 0.3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedParameter {
    pub name: String,
    pub status: ParameterStatus,
    pub result: f64,
    pub normal_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganReport {
    pub organ: String,
    pub status: OrganStatus,
    pub status_label: String,
    pub parameters: Vec<LinkedParameter>,
}

/// Status, localized label and the linked parameters found in `data`.
pub fn organ_report(organ: Organ, data: &DiagnosticData, lang: Language) -> OrganReport {
    let status = organ.status(data);
    let parameters = organ
        .parameters()
        .iter()
        .filter_map(|name| data.get(*name))
        .map(|parameter| LinkedParameter {
            name: parameter.name.clone(),
            status: parameter.status,
            result: parameter.result,
            normal_range: parameter.normal_range,
        })
        .collect();
    OrganReport {
        organ: organ.name(lang).to_string(),
        status,
        status_label: status.label(lang).to_string(),
        parameters,
    }
}

/// Status of every organ, in table order.
pub fn all_statuses(data: &DiagnosticData) -> Vec<(Organ, OrganStatus)> {
    Organ::ALL
        .iter()
        .map(|&organ| (organ, organ.status(data)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::report::DiagnosticParameter;

    fn insert(data: &mut DiagnosticData, name: &str, result: f64) {
        let parameter = DiagnosticParameter::evaluate(name, result, 10.0, 20.0).unwrap();
        data.insert(name.to_string(), parameter);
    }

    #[test]
    fn no_linked_parameters_means_no_data() {
        assert_eq!(Organ::Brain.status(&DiagnosticData::new()), OrganStatus::NoData);
    }

    #[test]
    fn all_normal_is_healthy() {
        let mut data = DiagnosticData::new();
        insert(&mut data, "Общий Холестерин", 15.0);
        insert(&mut data, "Липиды", 12.0);
        assert_eq!(Organ::Liver.status(&data), OrganStatus::Healthy);
    }

    #[test]
    fn all_abnormal_is_damaged() {
        let mut data = DiagnosticData::new();
        insert(&mut data, "Вязкость крови", 40.0);
        assert_eq!(Organ::Stomach.status(&data), OrganStatus::Damaged);
    }

    #[test]
    fn mixed_status_depends_on_deviation_direction() {
        let mut data = DiagnosticData::new();
        insert(&mut data, "Состояние кровоснабжения мозга", 15.0);
        insert(&mut data, "Эластичность церебральных сосудов", 25.0);
        assert_eq!(Organ::Brain.status(&data), OrganStatus::Inflamed);

        insert(&mut data, "Эластичность церебральных сосудов", 5.0);
        assert_eq!(Organ::Brain.status(&data), OrganStatus::Weakened);
    }

    #[test]
    fn report_lists_present_parameters_only() {
        let mut data = DiagnosticData::new();
        insert(&mut data, "Ударный объем", 15.0);
        let report = organ_report(Organ::Heart, &data, Language::En);
        assert_eq!(report.organ, "Heart");
        assert_eq!(report.status, OrganStatus::Healthy);
        assert_eq!(report.status_label, "healthy");
        assert_eq!(report.parameters.len(), 1);
        assert_eq!(report.parameters[0].normal_range, (10.0, 20.0));
    }

    #[test]
    fn names_resolve_in_both_languages() {
        assert_eq!(Organ::from_name("Печень"), Some(Organ::Liver));
        assert_eq!(Organ::from_name("adrenal glands"), Some(Organ::Adrenals));
        assert_eq!(Organ::from_name("kidneys"), Some(Organ::Kidneys));
        assert_eq!(Organ::from_name("tail"), None);
        assert_eq!(all_statuses(&DiagnosticData::new()).len(), 12);
    }
}
