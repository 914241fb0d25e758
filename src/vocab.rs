use crate::error::{DatasetError, Result};

/// Words of the speech commands subset, in class-id order.
const SPEECH_COMMANDS: [&str; 10] = [
    "down", "go", "left", "no", "off", "on", "right", "stop", "up", "yes",
];

/// Closed mapping from word label to dense class id.
///
/// The number of labels is the width of the classifier's output layer, so
/// the set cannot be extended after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<&'static str>,
}

impl LabelVocabulary {
    /// The fixed ten-word vocabulary, `down` = 0 through `yes` = 9.
    pub fn speech_commands() -> Self {
        Self {
            labels: SPEECH_COMMANDS.to_vec(),
        }
    }

    /// Resolve a label to its class id.
    pub fn id_of(&self, label: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|&l| l == label)
            .ok_or_else(|| DatasetError::UnknownLabel(label.to_string()))
    }

    pub fn label_of(&self, id: usize) -> Option<&'static str> {
        self.labels.get(id).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|&l| l == label)
    }

    /// Labels in id order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.labels.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self::speech_commands()
    }
}
