use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use image::RgbImage;
use kirlian_shared::Language;
use serde::{Deserialize, Serialize};

use super::analysis::{analyze, energy_model, EnergyModel, GrvMetrics};
use super::simulator::GrvSimulator;
use super::{all_slots, Finger, Hand};
use crate::config::GrvConfig;
use crate::error::{KirlianError, KirlianResult};

type Slots<T> = [[Option<T>; 5]; 2];

/// Ten-slot scan session: one image and one metric set per finger.
#[derive(Debug, Clone)]
pub struct GrvSession {
    simulator: GrvSimulator,
    threshold: u8,
    area_norm: f64,
    images: Slots<RgbImage>,
    metrics: Slots<GrvMetrics>,
}

/// Metrics of one finger as stored in a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerRecord {
    pub hand: Hand,
    pub finger: Finger,
    pub metrics: GrvMetrics,
}

/// Persisted session: per-finger metrics and the resulting energy model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub saved_at: DateTime<Utc>,
    pub fingers: Vec<FingerRecord>,
    pub energy_model: Option<EnergyModel>,
}

impl GrvSession {
    pub fn new(config: &GrvConfig) -> Self {
        Self {
            simulator: GrvSimulator::from(config),
            threshold: config.threshold,
            area_norm: config.area_norm as f64,
            images: Default::default(),
            metrics: Default::default(),
        }
    }

    /// Simulate a capture for one finger and store it.
    pub fn capture(&mut self, hand: Hand, finger: Finger) -> &RgbImage {
        let image = self.simulator.capture(hand, finger);
        self.metrics[hand.index()][finger.index()] = None;
        self.images[hand.index()][finger.index()].insert(image)
    }

    pub fn capture_all(&mut self) {
        for (hand, finger) in all_slots() {
            self.capture(hand, finger);
        }
    }

    /// Store an externally supplied image; stale metrics for the slot are
    /// dropped.
    pub fn set_image(&mut self, hand: Hand, finger: Finger, image: RgbImage) {
        self.images[hand.index()][finger.index()] = Some(image);
        self.metrics[hand.index()][finger.index()] = None;
    }

    /// Decode a BMP, JPEG or PNG scan from disk into a slot.
    pub fn load_image_file<P: AsRef<Path>>(
        &mut self,
        hand: Hand,
        finger: Finger,
        path: P,
    ) -> KirlianResult<()> {
        let image = image::open(path.as_ref())?.to_rgb8();
        tracing::info!(%hand, %finger, path = %path.as_ref().display(), "loaded GRV-gram");
        self.set_image(hand, finger, image);
        Ok(())
    }

    pub fn image(&self, hand: Hand, finger: Finger) -> Option<&RgbImage> {
        self.images[hand.index()][finger.index()].as_ref()
    }

    pub fn metrics(&self, hand: Hand, finger: Finger) -> Option<&GrvMetrics> {
        self.metrics[hand.index()][finger.index()].as_ref()
    }

    /// Slots without an image, in scan order.
    pub fn missing(&self) -> Vec<(Hand, Finger)> {
        all_slots()
            .filter(|(hand, finger)| self.image(*hand, *finger).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Analyze every slot and build the energy model.
    ///
    /// Fails with [`KirlianError::MissingImages`] unless all ten fingers
    /// have been captured.
    pub fn process_all(&mut self, lang: Language) -> KirlianResult<EnergyModel> {
        let missing = self.missing();
        if !missing.is_empty() {
            tracing::warn!(missing = missing.len(), "not all fingers are scanned");
            return Err(KirlianError::MissingImages {
                missing: missing
                    .into_iter()
                    .map(|(hand, finger)| format!("{hand} {finger}"))
                    .collect(),
            });
        }

        for (hand, finger) in all_slots() {
            if let Some(image) = self.image(hand, finger) {
                let metrics = analyze(image, self.threshold);
                self.metrics[hand.index()][finger.index()] = Some(metrics);
            }
        }
        self.energy_model(lang)
    }

    /// Energy model from the metrics already computed or loaded.
    pub fn energy_model(&self, lang: Language) -> KirlianResult<EnergyModel> {
        let scans = self.finger_records();
        if scans.len() < Hand::ALL.len() * Finger::ALL.len() {
            let missing = all_slots()
                .filter(|(hand, finger)| self.metrics(*hand, *finger).is_none())
                .map(|(hand, finger)| format!("{hand} {finger}"))
                .collect();
            return Err(KirlianError::MissingImages { missing });
        }
        let model = energy_model(
            scans.iter().map(|record| (record.hand, record.finger, &record.metrics)),
            self.area_norm,
            lang,
        );
        tracing::info!(
            overall = model.overall_energy,
            balance = model.balance_index,
            "computed GRV energy model"
        );
        Ok(model)
    }

    fn finger_records(&self) -> Vec<FingerRecord> {
        all_slots()
            .filter_map(|(hand, finger)| {
                self.metrics(hand, finger).map(|metrics| FingerRecord {
                    hand,
                    finger,
                    metrics: *metrics,
                })
            })
            .collect()
    }

    pub fn to_record(&self, lang: Language) -> SessionRecord {
        SessionRecord {
            saved_at: Utc::now(),
            fingers: self.finger_records(),
            energy_model: self.energy_model(lang).ok(),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, lang: Language) -> KirlianResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.to_record(lang))?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "saved GRV session");
        Ok(())
    }

    /// Restore metrics from a session file. Images are not persisted, so
    /// the slots stay empty until recaptured.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> KirlianResult<SessionRecord> {
        let contents = fs::read_to_string(path.as_ref())?;
        let record: SessionRecord = serde_json::from_str(&contents)?;
        self.clear();
        for finger in &record.fingers {
            self.metrics[finger.hand.index()][finger.finger.index()] = Some(finger.metrics);
        }
        tracing::info!(fingers = record.fingers.len(), "loaded GRV session");
        Ok(record)
    }

    pub fn clear(&mut self) {
        self.images = Default::default();
        self.metrics = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GrvConfig {
        GrvConfig {
            image_size: 48,
            ..GrvConfig::default()
        }
    }

    #[test]
    fn processing_requires_every_finger() {
        let mut session = GrvSession::new(&small_config());
        session.capture(Hand::Left, Finger::Thumb);
        match session.process_all(Language::En) {
            Err(KirlianError::MissingImages { missing }) => {
                assert_eq!(missing.len(), 9);
                assert_eq!(missing[0], "left index");
            }
            other => panic!("expected missing images, got {other:?}"),
        }
    }

    #[test]
    fn full_scan_produces_bounded_model() {
        let mut session = GrvSession::new(&small_config());
        session.capture_all();
        assert!(session.is_complete());
        let model = session.process_all(Language::Ru).unwrap();
        assert!(model
            .chakra_values
            .values()
            .iter()
            .all(|v| (0.0..=100.0).contains(v)));
        assert!((0.0..=100.0).contains(&model.balance_index));
        assert!(session.metrics(Hand::Right, Finger::Pinky).is_some());
    }

    #[test]
    fn save_load_round_trip_restores_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions").join("scan.json");

        let mut session = GrvSession::new(&small_config());
        session.capture_all();
        let model = session.process_all(Language::En).unwrap();
        session.save(&path, Language::En).unwrap();

        let mut restored = GrvSession::new(&small_config());
        let record = restored.load(&path).unwrap();
        assert_eq!(record.fingers.len(), 10);
        assert_eq!(record.energy_model.as_ref(), Some(&model));
        assert_eq!(restored.energy_model(Language::En).unwrap(), model);
        assert!(restored.image(Hand::Left, Finger::Thumb).is_none());
    }

    #[test]
    fn clear_empties_all_slots() {
        let mut session = GrvSession::new(&small_config());
        session.capture_all();
        session.clear();
        assert_eq!(session.missing().len(), 10);
    }

    #[test]
    fn replacing_an_image_drops_its_metrics() {
        let mut session = GrvSession::new(&small_config());
        session.capture_all();
        session.process_all(Language::En).unwrap();
        session.set_image(Hand::Left, Finger::Ring, RgbImage::new(4, 4));
        assert!(session.metrics(Hand::Left, Finger::Ring).is_none());
    }
}
