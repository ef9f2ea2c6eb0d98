//! Regex extraction of client details and the measurement table from the
//! text of a Russian-language cardiovascular screening report.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Имя:\s*([^\n]+)").expect("valid regex"));
static GENDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Пол:\s*([^\n]+)").expect("valid regex"));
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Возраст:\s*(\d+)").expect("valid regex"));
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Телосложение:\s*([^\n]+)").expect("valid regex"));
static TEST_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Время тестирования:\s*([^\n]+)").expect("valid regex"));

/// Body of the results table, between its header and the reference section.
static TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)Результаты измерений.*?Диапазон.*?нормальных.*?значений.*?Результат.*?Интерпретация результата(.*?)Референсные значения",
    )
    .expect("valid regex")
});

/// `<name> <min> - <max> <result>`; the name may span lines.
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([А-Яа-я\s]+(?:\sв\s[а-я]+)?)\s+([\d\.,]+\s*-\s*[\d\.,]+)\s+([\d\.,]+)")
        .expect("valid regex")
});

/// Measurements keyed by parameter name.
pub type DiagnosticData = BTreeMap<String, DiagnosticParameter>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub body_type: Option<String>,
    pub test_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStatus {
    Normal,
    Abnormal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticParameter {
    pub name: String,
    pub result: f64,
    pub normal_range: (f64, f64),
    pub status: ParameterStatus,
    /// Signed distance outside the range as a percentage of its width;
    /// negative below the range, 0 inside it.
    pub deviation: f64,
    /// Percent position inside the range, present only when normal.
    pub position: Option<f64>,
}

impl DiagnosticParameter {
    /// Classify `result` against the inclusive range `[min, max]`.
    ///
    /// Returns `None` when the range has no positive width.
    pub fn evaluate(name: impl Into<String>, result: f64, min: f64, max: f64) -> Option<Self> {
        let width = max - min;
        if !(width > 0.0) || !result.is_finite() {
            return None;
        }
        let (status, deviation, position) = if result < min {
            (ParameterStatus::Abnormal, -(min - result) / width * 100.0, None)
        } else if result > max {
            (ParameterStatus::Abnormal, (result - max) / width * 100.0, None)
        } else {
            (
                ParameterStatus::Normal,
                0.0,
                Some((result - min) / width * 100.0),
            )
        };
        Some(Self {
            name: name.into(),
            result,
            normal_range: (min, max),
            status,
            deviation,
            position,
        })
    }

    pub fn is_normal(&self) -> bool {
        self.status == ParameterStatus::Normal
    }
}

pub fn parse_client_info(text: &str) -> ClientInfo {
    let capture = |re: &Regex| {
        re.captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|value| !value.is_empty())
    };
    ClientInfo {
        full_name: capture(&NAME_RE),
        gender: capture(&GENDER_RE),
        age: AGE_RE
            .captures(text)
            .and_then(|caps| caps[1].parse().ok()),
        body_type: capture(&BODY_RE),
        test_time: capture(&TEST_TIME_RE),
    }
}

/// Parse the measurement table. Text without the table yields an empty map;
/// rows whose numbers do not convert are skipped with a warning.
pub fn parse_parameters(text: &str) -> DiagnosticData {
    let mut data = DiagnosticData::new();
    let Some(table) = TABLE_RE.captures(text) else {
        tracing::debug!("results table not found in report text");
        return data;
    };
    let body = table[1].trim();

    for row in ROW_RE.captures_iter(body) {
        let name = clean_name(&row[1]);
        if name.is_empty() {
            continue;
        }
        match parse_row(&name, &row[2], &row[3]) {
            Some(parameter) => {
                data.insert(name, parameter);
            }
            None => {
                tracing::warn!(parameter = %name, range = &row[2], result = &row[3], "skipping unparsable table row");
            }
        }
    }
    tracing::info!(parameters = data.len(), "parsed diagnostic table");
    data
}

fn parse_row(name: &str, range: &str, result: &str) -> Option<DiagnosticParameter> {
    let result = parse_number(result)?;
    let (min, max) = range.split_once('-')?;
    DiagnosticParameter::evaluate(name, result, parse_number(min)?, parse_number(max)?)
}

/// Parse a decimal that may use a comma separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

/// Table cells wrap, so a captured name can carry the tail of the previous
/// row; the parameter name is its last non-empty line.
fn clean_name(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
