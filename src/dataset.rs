use crate::config::DatasetConfig;
use crate::corpus::{CorpusEntry, CorpusIndex};
use crate::error::{DatasetError, Result};
use crate::partition::{self, Mode};
use crate::sample::{AudioSample, SampleBuilder};
use crate::vocab::LabelVocabulary;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// One partition of a labeled audio corpus with lazy, indexed sample access.
///
/// The corpus is scanned, shuffled and sliced once in [`AudioDataset::new`].
/// Every call to [`AudioDataset::get`] decodes the file again; nothing is
/// cached.
#[derive(Debug, Clone)]
pub struct AudioDataset {
    index: CorpusIndex,
    entries: Vec<CorpusEntry>,
    mode: Mode,
    builder: SampleBuilder,
}

impl AudioDataset {
    pub fn new(config: &DatasetConfig, vocab: Arc<LabelVocabulary>) -> Result<Self> {
        config.validate()?;
        let index = CorpusIndex::build(&config.base_path, config.per_label_limit())?;
        if config.strict_labels {
            index.validate_labels(&vocab)?;
        }
        let entries = partition::assign(
            index.entries().to_vec(),
            &config.split,
            config.mode,
            config.seed,
        );

        info!(
            base_path = %config.base_path.display(),
            corpus = index.len(),
            mode = %config.mode,
            selected = entries.len(),
            seed = ?config.seed,
            "dataset ready"
        );
        for (label, count) in index.label_counts() {
            debug!(label, count, "label files");
        }

        Ok(Self {
            index,
            entries,
            mode: config.mode,
            builder: SampleBuilder::new(vocab, config.sample_config()),
        })
    }

    /// Build the sample at `index` of this partition.
    pub fn get(&self, index: usize) -> Result<AudioSample> {
        let entry = self
            .entries
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;
        self.builder.build(&entry.path, &entry.label)
    }

    /// Build several samples in parallel. Each result stands on its own.
    pub fn get_batch(&self, indices: &[usize]) -> Vec<Result<AudioSample>> {
        indices.par_iter().map(|&i| self.get(i)).collect()
    }

    /// Lazily build every sample of the partition in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<AudioSample>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Paths of this partition in shuffled order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.entries.iter().map(|e| e.path.as_path())
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// The full corpus the partition was drawn from.
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn builder(&self) -> &SampleBuilder {
        &self.builder
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
