use crate::error::{DatasetError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Which slice of the shuffled corpus a dataset serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Mode {
    #[default]
    Train,
    Validation,
    Test,
}

impl FromStr for Mode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "train" => Ok(Mode::Train),
            "val" | "validation" => Ok(Mode::Validation),
            "test" => Ok(Mode::Test),
            _ => Err(DatasetError::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = DatasetError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Train => "train",
            Mode::Validation => "val",
            Mode::Test => "test",
        };
        f.write_str(name)
    }
}

/// Fractions of the corpus reserved for the train, validation and test sets.
///
/// The fractions are not required to sum to one; each slice is rounded
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "(f64, f64, f64)")]
pub struct SplitFractions {
    train: f64,
    val: f64,
    test: f64,
}

impl SplitFractions {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        for (name, value) in [("train", train), ("val", val), ("test", test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(DatasetError::InvalidConfig(format!(
                    "{name} fraction must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(Self { train, val, test })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn test(&self) -> f64 {
        self.test
    }

    /// Index range of `mode` within a shuffled list of `n` items.
    ///
    /// Train takes the head, validation the range after it, and test is
    /// measured back from the end of the list, so the validation and test
    /// slices may overlap or leave a gap when rounding does not line up.
    pub fn range(&self, n: usize, mode: Mode) -> Range<usize> {
        let train_end = scaled(n, self.train);
        match mode {
            Mode::Train => 0..train_end,
            Mode::Validation => {
                let val_end = scaled(n, self.train + self.val);
                if val_end > train_end {
                    train_end..val_end
                } else {
                    train_end..train_end
                }
            }
            Mode::Test => n - scaled(n, self.test)..n,
        }
    }
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.8,
            val: 0.1,
            test: 0.1,
        }
    }
}

impl TryFrom<(f64, f64, f64)> for SplitFractions {
    type Error = DatasetError;

    fn try_from((train, val, test): (f64, f64, f64)) -> Result<Self> {
        Self::new(train, val, test)
    }
}

/// `round(n * fraction)` with ties to even, clamped to `n`.
fn scaled(n: usize, fraction: f64) -> usize {
    let value = (n as f64 * fraction).round_ties_even();
    (value.max(0.0) as usize).min(n)
}

/// Shuffle `items` in place.
///
/// With a seed the order is reproducible: the same list and seed always
/// give the same permutation. Without one the generator is seeded from
/// system entropy. Only a local generator is used.
pub fn shuffle<T>(items: &mut [T], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    items.shuffle(&mut rng);
}

/// Select the slice of an already shuffled list that belongs to `mode`.
pub fn slice<T: Clone>(shuffled: &[T], fractions: &SplitFractions, mode: Mode) -> Vec<T> {
    shuffled[fractions.range(shuffled.len(), mode)].to_vec()
}

/// Shuffle `items` with `seed` and return the part assigned to `mode`.
pub fn assign<T: Clone>(
    mut items: Vec<T>,
    fractions: &SplitFractions,
    mode: Mode,
    seed: Option<u64>,
) -> Vec<T> {
    shuffle(&mut items, seed);
    slice(&items, fractions, mode)
}
