use crate::audio::{fix_length, load_audio, normalize_peak};
use crate::config::SampleConfig;
use crate::error::{DatasetError, Result};
use crate::features::mfcc;
use crate::vocab::LabelVocabulary;
use ndarray::{arr1, Array1, Array2};
use ndarray_npy::NpzWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A prepared training example.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    /// Source file the sample was built from.
    pub name: String,
    /// Waveform of exactly the configured fixed length.
    pub audio: Array1<f32>,
    /// Vocabulary id of the label.
    pub label: usize,
    /// MFCC matrix, shape `(N_MFCC, frames)`.
    pub features: Array2<f32>,
}

impl AudioSample {
    /// Store the sample as `audio`, `features` and `label` arrays in an
    /// `.npz` archive.
    pub fn write_npz(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| DatasetError::export(path, e))?;
        let mut npz = NpzWriter::new(file);
        npz.add_array("audio", &self.audio)
            .map_err(|e| DatasetError::export(path, e))?;
        npz.add_array("features", &self.features)
            .map_err(|e| DatasetError::export(path, e))?;
        npz.add_array("label", &arr1(&[self.label as i64]))
            .map_err(|e| DatasetError::export(path, e))?;
        npz.finish().map_err(|e| DatasetError::export(path, e))?;
        Ok(())
    }
}

/// Turns one audio file into an [`AudioSample`].
///
/// Holds no mutable state, so a single builder can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    vocab: Arc<LabelVocabulary>,
    config: SampleConfig,
}

impl SampleBuilder {
    pub fn new(vocab: Arc<LabelVocabulary>, config: SampleConfig) -> Self {
        Self { vocab, config }
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn vocab(&self) -> &LabelVocabulary {
        &self.vocab
    }

    /// Decode `path`, optionally peak-normalize it, pad or truncate it to the
    /// fixed length and compute its MFCC matrix.
    pub fn build(&self, path: &Path, label: &str) -> Result<AudioSample> {
        let label = self.vocab.id_of(label)?;
        let mut audio = load_audio(path)?;
        if self.config.normalize {
            normalize_peak(&mut audio);
        }
        let audio = fix_length(audio, self.config.fixed_length);
        let features = mfcc(&audio);
        Ok(AudioSample {
            name: path.display().to_string(),
            audio: Array1::from_vec(audio),
            label,
            features,
        })
    }
}
