//! JSON configuration and report helpers for weld inspection runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::features::ImageFeatures;
use crate::params::DetectorParams;
use crate::pipeline::DefectDetector;
use crate::summary::DetectionSummary;
use crate::types::{Detection, DetectorStrategy, EnhancementMode};

#[derive(thiserror::Error, Debug)]
pub enum DetectIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_confidence_threshold() -> f32 {
    0.5
}

/// Configuration of one inspection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    pub image_path: String,
    #[serde(default)]
    pub mode: EnhancementMode,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Overrides `params.strategy` when set.
    #[serde(default)]
    pub strategy: Option<DetectorStrategy>,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Full or partial parameter overrides.
    #[serde(default)]
    pub params: Option<DetectorParams>,
}

impl DetectConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            mode: EnhancementMode::default(),
            confidence_threshold: default_confidence_threshold(),
            strategy: None,
            output_path: None,
            params: None,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("weldscan_report.json"))
    }

    /// Detector parameters after applying the config's overrides.
    ///
    /// Without explicit `params`, choosing the simple strategy also picks its
    /// single-scale defaults.
    pub fn build_params(&self) -> DetectorParams {
        match (&self.params, self.strategy) {
            (Some(params), Some(strategy)) => DetectorParams {
                strategy,
                ..params.clone()
            },
            (Some(params), None) => params.clone(),
            (None, Some(DetectorStrategy::Simple)) => DetectorParams::simple(),
            (None, _) => DetectorParams::default(),
        }
    }

    pub fn build_detector(&self) -> DefectDetector {
        DefectDetector::new(self.build_params())
    }
}

/// Everything produced by one run, as written to the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectReport {
    pub image_path: String,
    pub width: usize,
    pub height: usize,
    pub mode: EnhancementMode,
    pub strategy: DetectorStrategy,
    pub confidence_threshold: f32,
    pub detections: Vec<Detection>,
    pub summary: DetectionSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<ImageFeatures>,
    pub elapsed_ms: f64,
}

impl DetectReport {
    /// Load a JSON report from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DetectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DetectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::summarize;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: DetectConfig =
            serde_json::from_str(r#"{ "image_path": "weld.png" }"#).expect("valid json");
        assert_eq!(cfg, DetectConfig::new("weld.png"));
        assert_eq!(cfg.mode, EnhancementMode::Advanced);
        assert_eq!(cfg.output_path(), PathBuf::from("weldscan_report.json"));
        assert_eq!(cfg.build_params(), DetectorParams::default());
    }

    #[test]
    fn strategy_override_selects_simple_defaults() {
        let cfg: DetectConfig = serde_json::from_str(
            r#"{ "image_path": "w.png", "mode": "high_sensitivity", "strategy": "simple" }"#,
        )
        .expect("valid json");
        assert_eq!(cfg.mode, EnhancementMode::HighSensitivity);
        assert_eq!(cfg.build_params(), DetectorParams::simple());

        let with_params = DetectConfig {
            params: Some(DetectorParams::default()),
            ..cfg
        };
        let params = with_params.build_params();
        assert_eq!(params.strategy, DetectorStrategy::Simple);
        assert_eq!(params.scales, DetectorParams::default().scales);
    }

    #[test]
    fn config_and_report_survive_a_disk_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("cfg.json");
        let cfg = DetectConfig {
            confidence_threshold: 0.3,
            output_path: Some("out.json".into()),
            ..DetectConfig::new("img.png")
        };
        cfg.write_json(&cfg_path).expect("write");
        assert_eq!(DetectConfig::load_json(&cfg_path).expect("read"), cfg);

        let report = DetectReport {
            image_path: cfg.image_path.clone(),
            width: 4,
            height: 3,
            mode: cfg.mode,
            strategy: DetectorStrategy::Enhanced,
            confidence_threshold: cfg.confidence_threshold,
            detections: Vec::new(),
            summary: summarize(&[]),
            features: None,
            elapsed_ms: 1.5,
        };
        let report_path = dir.path().join("report.json");
        report.write_json(&report_path).expect("write");
        assert_eq!(DetectReport::load_json(&report_path).expect("read"), report);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DetectConfig::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, DetectIoError::Io(_)));
    }
}
