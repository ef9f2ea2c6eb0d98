//! Diagnostic report ingestion: PDF text, measurement table, chakra mapping
//! and organ status.

pub mod mapping;
pub mod organs;
pub mod pdf;
pub mod report;

pub use mapping::{map_to_chakras, map_with_trace, ChakraMapping};
pub use organs::{organ_report, Organ, OrganReport, OrganStatus};
pub use report::{
    parse_client_info, parse_parameters, ClientInfo, DiagnosticData, DiagnosticParameter,
    ParameterStatus,
};

use std::path::Path;

use kirlian_shared::ChakraEnergyProfile;
use serde::Serialize;

use crate::error::KirlianResult;

/// Everything derived from one report.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub client_info: ClientInfo,
    pub diagnostic_data: DiagnosticData,
    pub chakra_energy: ChakraEnergyProfile,
}

impl DiagnosticReport {
    pub fn from_text(text: &str) -> Self {
        let diagnostic_data = parse_parameters(text);
        Self {
            client_info: parse_client_info(text),
            chakra_energy: map_to_chakras(&diagnostic_data),
            diagnostic_data,
        }
    }

    pub fn from_pdf_bytes(bytes: &[u8]) -> KirlianResult<Self> {
        Ok(Self::from_text(&pdf::extract_text(bytes)?))
    }

    pub fn from_pdf_file<P: AsRef<Path>>(path: P) -> KirlianResult<Self> {
        Ok(Self::from_text(&pdf::extract_text_from_file(path)?))
    }
}
