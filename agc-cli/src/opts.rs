use std::fmt::Display;
use std::path::{Path, PathBuf};

use agc::matrix::SubstitutionMatrix;
use anyhow::Context;
use log::info;

#[derive(Debug, Clone)]
pub struct AmpliconFile {
    path: PathBuf,
}

impl Display for AmpliconFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AmpliconFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn amplicon_file(path: &str) -> Result<AmpliconFile, String> {
    let path = Path::new(path);
    if path.is_dir() {
        return Err(format!("{} is a directory", path.display()));
    }
    if !path.is_file() {
        return Err(format!("{} does not exist.", path.display()));
    }

    let result = AmpliconFile {
        path: path.to_path_buf(),
    };
    Ok(result)
}

pub fn identity_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if !(0.0..=100.0).contains(&threshold) {
        return Err(format!("{} is not within 0..=100", threshold));
    }

    Ok(threshold)
}

/// Loads the substitution matrix at given path, or the bundled NUC.4.4
/// matrix if no path is given.
pub fn load_matrix(path: Option<&Path>) -> anyhow::Result<SubstitutionMatrix> {
    let matrix = match path {
        Some(path) => {
            let matrix = SubstitutionMatrix::from_path(path).with_context(|| {
                format!(
                    "Failed to load the substitution matrix from {}",
                    path.display()
                )
            })?;
            info!("Substitution matrix: {}", path.display());
            matrix
        }
        None => {
            info!("Substitution matrix: bundled NUC.4.4");
            SubstitutionMatrix::nuc_4_4()
        }
    };

    Ok(matrix)
}
