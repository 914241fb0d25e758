use crate::error::{DatasetError, Result};
use crate::vocab::LabelVocabulary;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions accepted as audio, compared case-insensitively.
pub const AUDIO_EXTENSIONS: [&str; 2] = ["wav", "mp3"];

/// One indexed audio file and the label of the directory it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub path: PathBuf,
    pub label: String,
}

/// Mapping from audio file path to label, built by a single directory scan.
///
/// Entries keep the order in which the filesystem enumerated them.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    entries: Vec<CorpusEntry>,
    by_path: HashMap<PathBuf, usize>,
}

/// Whether `path` carries one of the recognized audio extensions.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn read_dir(path: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(path).map_err(|source| DatasetError::CorpusAccess {
        path: path.to_path_buf(),
        source,
    })
}

fn access_error(path: &Path) -> impl FnOnce(std::io::Error) -> DatasetError + '_ {
    move |source| DatasetError::CorpusAccess {
        path: path.to_path_buf(),
        source,
    }
}

impl CorpusIndex {
    /// Scan `base_path/<label>/<file>` and collect every audio file.
    ///
    /// At most `per_label_limit` audio files are taken from each label
    /// directory, in enumeration order. Labels are not checked against any
    /// vocabulary here.
    pub fn build(base_path: impl AsRef<Path>, per_label_limit: Option<usize>) -> Result<Self> {
        let base_path = base_path.as_ref();
        let mut index = CorpusIndex::default();

        for dir_entry in read_dir(base_path)? {
            let dir_entry = dir_entry.map_err(access_error(base_path))?;
            let label_dir = dir_entry.path();
            if !label_dir.is_dir() {
                continue;
            }
            let label = match dir_entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => {
                    warn!(dir = %label_dir.display(), "skipping label directory with non UTF-8 name");
                    continue;
                }
            };

            let mut taken = 0usize;
            for file_entry in read_dir(&label_dir)? {
                if per_label_limit.map_or(false, |limit| taken >= limit) {
                    break;
                }
                let file_entry = file_entry.map_err(access_error(&label_dir))?;
                let path = file_entry.path();
                if !path.is_file() || !is_audio_file(&path) {
                    continue;
                }
                index.push(CorpusEntry {
                    path,
                    label: label.clone(),
                });
                taken += 1;
            }
            debug!(label = %label, files = taken, "indexed label directory");
        }

        Ok(index)
    }

    fn push(&mut self, entry: CorpusEntry) {
        self.by_path.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Fail on the first label that the vocabulary does not know.
    pub fn validate_labels(&self, vocab: &LabelVocabulary) -> Result<()> {
        match self.entries.iter().find(|e| !vocab.contains(&e.label)) {
            Some(entry) => Err(DatasetError::UnknownLabel(entry.label.clone())),
            None => Ok(()),
        }
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Indexed paths in enumeration order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn label_of(&self, path: &Path) -> Option<&str> {
        self.by_path
            .get(path)
            .map(|&i| self.entries[i].label.as_str())
    }

    /// Number of entries per label, sorted by label.
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
