use crate::error::{DatasetError, Result};
use crate::partition::{Mode, SplitFractions};
use serde::Deserialize;
use std::path::PathBuf;

/// One second of audio at the corpus sample rate.
pub const DEFAULT_FIXED_LENGTH: usize = 22050;

fn default_fixed_length() -> usize {
    DEFAULT_FIXED_LENGTH
}

fn default_normalize() -> bool {
    true
}

/// Parameters of a single sample build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SampleConfig {
    /// Number of samples every waveform is padded or truncated to.
    #[serde(default = "default_fixed_length")]
    pub fixed_length: usize,
    /// Rescale each waveform to a peak amplitude of 1.0.
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            fixed_length: DEFAULT_FIXED_LENGTH,
            normalize: true,
        }
    }
}

/// Everything needed to construct an [`AudioDataset`](crate::AudioDataset).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetConfig {
    /// Root directory holding one subdirectory per label.
    pub base_path: PathBuf,
    /// Maximum number of files taken from each label directory. Zero means
    /// no limit.
    #[serde(default)]
    pub limit_per_label: Option<usize>,
    #[serde(default = "default_fixed_length")]
    pub fixed_length: usize,
    #[serde(default)]
    pub split: SplitFractions,
    #[serde(default)]
    pub mode: Mode,
    /// Seed for the corpus shuffle. Without one the split differs per run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_normalize")]
    pub normalize: bool,
    /// Reject labels outside the vocabulary while indexing instead of when
    /// the sample is built.
    #[serde(default)]
    pub strict_labels: bool,
}

impl DatasetConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            limit_per_label: None,
            fixed_length: DEFAULT_FIXED_LENGTH,
            split: SplitFractions::default(),
            mode: Mode::default(),
            seed: None,
            normalize: true,
            strict_labels: false,
        }
    }

    pub fn with_limit_per_label(mut self, limit: usize) -> Self {
        self.limit_per_label = Some(limit);
        self
    }

    pub fn with_fixed_length(mut self, fixed_length: usize) -> Self {
        self.fixed_length = fixed_length;
        self
    }

    pub fn with_split(mut self, split: SplitFractions) -> Self {
        self.split = split;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_strict_labels(mut self, strict: bool) -> Self {
        self.strict_labels = strict;
        self
    }

    /// The per-label cap handed to the corpus scan, with zero read as
    /// unbounded.
    pub fn per_label_limit(&self) -> Option<usize> {
        self.limit_per_label.filter(|&limit| limit > 0)
    }

    pub fn sample_config(&self) -> SampleConfig {
        SampleConfig {
            fixed_length: self.fixed_length,
            normalize: self.normalize,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.fixed_length == 0 {
            return Err(DatasetError::InvalidConfig(
                "fixed_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = DatasetConfig::new("/data/speech");
        assert_eq!(config.fixed_length, 22050);
        assert_eq!(config.split, SplitFractions::default());
        assert_eq!(config.mode, Mode::Train);
        assert!(config.normalize);
        assert!(config.seed.is_none());
        assert!(config.limit_per_label.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_override_fields() {
        let config = DatasetConfig::new("/data")
            .with_limit_per_label(10)
            .with_fixed_length(16000)
            .with_mode(Mode::Test)
            .with_seed(42)
            .with_normalize(false);
        assert_eq!(config.limit_per_label, Some(10));
        assert_eq!(config.seed, Some(42));
        assert_eq!(
            config.sample_config(),
            SampleConfig {
                fixed_length: 16000,
                normalize: false
            }
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DatasetConfig = serde_json::from_str(
            r#"{ "base_path": "/data/speech", "mode": "val", "seed": 42, "split": [0.7, 0.2, 0.1] }"#,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::Validation);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.split, SplitFractions::new(0.7, 0.2, 0.1).unwrap());
        assert_eq!(config.fixed_length, DEFAULT_FIXED_LENGTH);
        assert!(config.normalize);
        assert!(!config.strict_labels);
    }

    #[test]
    fn mode_deserialization_ignores_case() {
        for (raw, mode) in [
            ("Validation", Mode::Validation),
            ("VAL", Mode::Validation),
            ("Test", Mode::Test),
            ("train", Mode::Train),
        ] {
            let json = format!(r#"{{ "base_path": "/d", "mode": "{raw}" }}"#);
            let config: DatasetConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config.mode, mode);
        }
        let bad: std::result::Result<DatasetConfig, _> =
            serde_json::from_str(r#"{ "base_path": "/d", "mode": "holdout" }"#);
        assert!(bad.is_err());
    }

    #[test]
    fn zero_limit_means_unbounded() {
        assert_eq!(DatasetConfig::new("/d").with_limit_per_label(0).per_label_limit(), None);
        assert_eq!(DatasetConfig::new("/d").with_limit_per_label(3).per_label_limit(), Some(3));
        let config: DatasetConfig =
            serde_json::from_str(r#"{ "base_path": "/d", "limit_per_label": 0 }"#).unwrap();
        assert_eq!(config.per_label_limit(), None);
    }

    #[test]
    fn negative_split_fails_deserialization() {
        let result: std::result::Result<DatasetConfig, _> =
            serde_json::from_str(r#"{ "base_path": "/d", "split": [0.9, -0.1, 0.2] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn zero_fixed_length_is_invalid() {
        let config = DatasetConfig::new("/data").with_fixed_length(0);
        assert!(matches!(
            config.validate(),
            Err(DatasetError::InvalidConfig(_))
        ));
    }
}
