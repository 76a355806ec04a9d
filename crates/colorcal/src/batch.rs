//! Apply one recipe to every image of a directory.

use crate::io::{load_image, save_image, ImageIoError};
use crate::recipe::{CorrectionRecipe, RecipeError};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Extensions processed when none are configured.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Setup failures that stop a batch before any file is touched.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("cannot read source directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create destination directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("destination {} is the source directory; refusing to overwrite the inputs", path.display())]
    SameDirectory { path: PathBuf },
}

/// Why a single file was skipped.
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("source path has no file name")]
    NoFileName,
    #[error(transparent)]
    Decode(ImageIoError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),
    #[error(transparent)]
    Encode(ImageIoError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutput {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: FileError,
}

/// Outcome of [`BatchCorrector::run`], sorted by source path.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<BatchOutput>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Corrects every matching image in a directory with one recipe.
#[derive(Clone, Debug)]
pub struct BatchCorrector {
    recipe: CorrectionRecipe,
    extensions: Vec<String>,
}

impl BatchCorrector {
    pub fn new(recipe: CorrectionRecipe) -> Self {
        Self {
            recipe,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the extension filter. Matching ignores case and a leading dot.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn recipe(&self) -> &CorrectionRecipe {
        &self.recipe
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
    }

    /// Regular files in `src_dir` with a matching extension, sorted by name.
    pub fn list_sources(&self, src_dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
        let read_err = |source| BatchError::ReadDir {
            path: src_dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(src_dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if path.is_file() && self.accepts(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Correct one file into `dst_dir` under the same file name.
    ///
    /// The output is written only after decoding and mapping succeed, and is
    /// removed again if encoding fails halfway.
    pub fn correct_file(&self, source: &Path, dst_dir: &Path) -> Result<PathBuf, FileError> {
        let name = source.file_name().ok_or(FileError::NoFileName)?;
        let output = dst_dir.join(name);

        let image = load_image(source).map_err(FileError::Decode)?;
        let corrected = self.recipe.correct(&image)?;
        drop(image);

        if let Err(e) = save_image(&corrected, &output) {
            if output.exists() {
                let _ = fs::remove_file(&output);
            }
            return Err(FileError::Encode(e));
        }
        Ok(output)
    }

    /// Correct every matching file of `src_dir` into `dst_dir`.
    ///
    /// `dst_dir` is created when missing. Files that already exist there
    /// under the same name are overwritten. A file that fails is logged,
    /// recorded in [`BatchReport::failures`] and the batch moves on.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(src = %src_dir.display(), dst = %dst_dir.display()))
    )]
    pub fn run(&self, src_dir: &Path, dst_dir: &Path) -> Result<BatchReport, BatchError> {
        let sources = self.list_sources(src_dir)?;
        fs::create_dir_all(dst_dir).map_err(|source| BatchError::CreateDir {
            path: dst_dir.to_path_buf(),
            source,
        })?;
        if same_directory(src_dir, dst_dir) {
            return Err(BatchError::SameDirectory {
                path: dst_dir.to_path_buf(),
            });
        }
        log::info!(
            "correcting {} file(s) from {} into {}",
            sources.len(),
            src_dir.display(),
            dst_dir.display()
        );

        #[cfg(feature = "parallel")]
        let results: Vec<_> = sources
            .par_iter()
            .map(|s| (s.clone(), self.correct_file(s, dst_dir)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = sources
            .iter()
            .map(|s| (s.clone(), self.correct_file(s, dst_dir)))
            .collect();

        let mut report = BatchReport::default();
        for (source, result) in results {
            match result {
                Ok(output) => {
                    log::debug!("wrote {}", output.display());
                    report.written.push(BatchOutput { source, output });
                }
                Err(error) => {
                    log::warn!("skipping {}: {error}", source.display());
                    report.failures.push(FileFailure { source, error });
                }
            }
        }
        report.written.sort_by(|a, b| a.source.cmp(&b.source));
        report.failures.sort_by(|a, b| a.source.cmp(&b.source));

        log::info!(
            "batch done: {} written, {} failed",
            report.written.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
