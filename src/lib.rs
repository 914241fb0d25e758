//! Prepare a spoken-word audio corpus for a classifier.
//!
//! A corpus is laid out as `base/<label>/<file>.wav`. [`AudioDataset`] scans
//! it once, shuffles the file list with an optional seed, keeps the
//! train/validation/test slice that was asked for, and turns each file into
//! an [`AudioSample`] (fixed-length waveform, MFCC matrix, label id) when it
//! is requested.

pub mod audio;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod features;
pub mod partition;
pub mod sample;
pub mod vocab;

pub use audio::TARGET_SAMPLE_RATE;
pub use config::{DatasetConfig, SampleConfig, DEFAULT_FIXED_LENGTH};
pub use corpus::{CorpusEntry, CorpusIndex};
pub use dataset::AudioDataset;
pub use error::{DatasetError, Result};
pub use features::{HOP_LENGTH, N_FFT, N_MELS, N_MFCC};
pub use partition::{Mode, SplitFractions};
pub use sample::{AudioSample, SampleBuilder};
pub use vocab::LabelVocabulary;
