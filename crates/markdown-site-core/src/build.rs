use std::path::PathBuf;

/// Overrides applied to a single build run.
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Write pages here instead of the configured output directory.
    pub output_dir: Option<PathBuf>,
}

/// What happened to one configured document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DocumentStatus {
    Written { source: PathBuf, output: PathBuf },
    Skipped { source: PathBuf },
}

/// Per-document results in configuration order.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    pub output_dir: PathBuf,
    pub documents: Vec<DocumentStatus>,
}

impl BuildOutcome {
    pub fn written(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf)> {
        self.documents.iter().filter_map(|status| match status {
            DocumentStatus::Written { source, output } => Some((source, output)),
            DocumentStatus::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PathBuf> {
        self.documents.iter().filter_map(|status| match status {
            DocumentStatus::Skipped { source } => Some(source),
            DocumentStatus::Written { .. } => None,
        })
    }
}
