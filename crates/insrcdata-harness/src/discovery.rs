//! Sample discovery: probe a samples root for testable projects.
//!
//! A directory under the root is a sample when at least one configured
//! language variant has its build descriptor on disk. Probing is read-only
//! and directories without any descriptor are silently skipped. Results
//! come back in directory-listing order; the order carries no meaning and
//! nothing may depend on it.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::sample::LanguageVariant;

/// Enumerate sample names under `samples_root`.
///
/// # Errors
///
/// Fails when the root itself is missing or unreadable. Unreadable
/// entries inside the root are skipped.
pub fn discover_samples(
    samples_root: &Path,
    variants: &[&dyn LanguageVariant],
) -> Result<Vec<String>> {
    if !samples_root.is_dir() {
        return Err(HarnessError::SamplesRootMissing {
            path: samples_root.to_owned(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(samples_root)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };

        let available = variants
            .iter()
            .any(|v| v.build_descriptor(&path, &name).is_file());
        if available {
            names.push(name);
        } else {
            debug!(candidate = %path.display(), "no build descriptor, skipping");
        }
    }
    Ok(names)
}

// ── Tests ────────────────────────────────────────────────────────────────
