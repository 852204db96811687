//! `tablebind generate` — manifest to C module.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tablebind_ffi::manifest::validate_variants;
use tablebind_ffi::{generate_module_with_variants, render_module, BatchReport, BindingManifest};

/// Run the `tablebind generate <manifest>` workflow.
///
/// Loads the manifest, generates every declaration for every variant, and
/// writes the rendered module to `output` (or stdout). Any failed declaration
/// makes the command fail; with `keep_going` the successful bindings are
/// still written first.
pub fn run(
    manifest_path: &Path,
    output: Option<&str>,
    variants: &[String],
    keep_going: bool,
) -> Result<()> {
    let report = build(manifest_path, variants)?;

    for failure in &report.failures {
        log::error!("{failure}");
    }
    let failed = report.failures.len();
    if failed > 0 && !keep_going {
        bail!("{failed} declaration(s) failed; nothing written");
    }

    let text = render_module(&report.module);
    match output {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            log::info!(
                "Generated {} bindings for module '{}' → {}",
                report.module.bindings.len(),
                report.module.module,
                path.display()
            );
        }
        None => print!("{text}"),
    }

    if failed > 0 {
        bail!("{failed} declaration(s) failed");
    }
    Ok(())
}

/// Load a manifest and generate its bindings, without writing anything.
pub(crate) fn build(manifest_path: &Path, variants: &[String]) -> Result<BatchReport> {
    if !manifest_path.is_file() {
        bail!("binding manifest not found: {}", manifest_path.display());
    }
    let manifest = BindingManifest::load(manifest_path)
        .with_context(|| format!("loading {}", manifest_path.display()))?;

    let variants = if variants.is_empty() {
        manifest.variants.clone()
    } else {
        validate_variants(variants).context("--variant")?;
        variants.to_vec()
    };

    let active = manifest.active_functions().len();
    if active == 0 {
        log::warn!("no active functions in {}", manifest_path.display());
    }
    log::debug!("{active} declarations x {} variants", variants.len());

    Ok(generate_module_with_variants(&manifest, &variants))
}
