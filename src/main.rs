use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordset::{AudioDataset, DatasetConfig, LabelVocabulary, Mode};

const USAGE: &str = "usage: wordset <base_path> [train|val|test] [seed] [out_dir]";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let base_path = args.next().ok_or(USAGE)?;
    let mode: Mode = args.next().as_deref().unwrap_or("train").parse()?;
    let mut config = DatasetConfig::new(base_path).with_mode(mode);
    if let Some(seed) = args.next() {
        config = config.with_seed(seed.parse()?);
    }
    let out_dir = args.next().map(PathBuf::from);

    let dataset = AudioDataset::new(&config, Arc::new(LabelVocabulary::speech_commands()))?;
    for (label, count) in dataset.index().label_counts() {
        info!(label, count, "corpus label");
    }

    let Some(out_dir) = out_dir else {
        return Ok(());
    };
    fs::create_dir_all(&out_dir)?;

    let pb = ProgressBar::new(dataset.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{msg} {bar:40} {pos}/{len} ETA {eta}")?);
    let mut failed = 0usize;
    for (i, result) in dataset.iter().enumerate() {
        match result.and_then(|sample| sample.write_npz(out_dir.join(format!("{mode}_{i:06}.npz"))))
        {
            Ok(()) => {}
            Err(e) => {
                warn!(index = i, error = %e, "skipping sample");
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    info!(
        exported = dataset.len() - failed,
        failed,
        out_dir = %out_dir.display(),
        "export finished"
    );
    Ok(())
}
