//! `tablebind init` — starter manifest scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tablebind_ffi::BindingManifest;

/// Write a starter manifest for `module` at `path`.
pub fn run(path: &Path, module: &str) -> Result<()> {
    if path.exists() {
        bail!("'{}' already exists", path.display());
    }

    let content = BindingManifest::template(module);
    // Reject module names the manifest loader would refuse.
    BindingManifest::parse(&content).context("module name")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, &content).with_context(|| format!("writing {}", path.display()))?;

    println!("Created binding manifest {}", path.display());
    Ok(())
}
