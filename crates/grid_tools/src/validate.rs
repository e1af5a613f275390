//! Data validation utilities.

use std::path::{Path, PathBuf};

use grid_core::data::TemplateRegistry;

use crate::error::{Result, ToolError};

/// Outcome of validating a directory of template files.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Files that loaded cleanly, with their template count.
    pub passed: Vec<(PathBuf, usize)>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// True if every file loaded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Templates across all passing files.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.passed.iter().map(|(_, count)| count).sum()
    }
}

/// Load and validate one footprint template file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any template is invalid.
pub fn validate_template_file(path: &Path) -> Result<TemplateRegistry> {
    if !path.is_file() {
        return Err(ToolError::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let registry = TemplateRegistry::from_ron_str(&text, &path.display().to_string())?;
    Ok(registry)
}

/// Validate every `.ron` template file in a directory, in name order.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be read; per-file
/// failures are collected in the report.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport> {
    if !path.is_dir() {
        return Err(ToolError::NotFound(path.display().to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut report = ValidationReport::default();
    for file in files {
        match validate_template_file(&file) {
            Ok(registry) => {
                tracing::debug!(file = %file.display(), templates = registry.len(), "Valid");
                report.passed.push((file, registry.len()));
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), "Invalid: {e}");
                report.failed.push((file, e.to_string()));
            }
        }
    }
    Ok(report)
}
