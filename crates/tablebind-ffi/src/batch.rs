//! Whole-module generation with per-declaration failure isolation.

use std::collections::HashMap;

use crate::csig::Declaration;
use crate::emit::{generate_binding, EmittedBinding};
use crate::error::BindError;
use crate::manifest::{validate_variants, BindingManifest};
use crate::marshal;

/// A declaration that could not be turned into a binding.
#[derive(Debug)]
pub struct GenerationFailure {
    /// Declaration text as written in the manifest.
    pub declaration: String,
    /// The variant being generated, when the failure is variant-specific.
    pub variant: Option<String>,
    pub error: BindError,
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "[{variant}] {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// The bindings that make up one runtime module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBindings {
    pub module: String,
    pub header: Option<String>,
    pub bindings: Vec<EmittedBinding>,
}

/// Outcome of generating a whole manifest.
#[derive(Debug)]
pub struct BatchReport {
    pub module: ModuleBindings,
    pub failures: Vec<GenerationFailure>,
}

impl BatchReport {
    /// Whether every declaration produced its bindings.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Generate every active declaration of `manifest` for every manifest variant.
pub fn generate_module(manifest: &BindingManifest) -> BatchReport {
    generate_module_with_variants(manifest, &manifest.variants)
}

/// Generate every active declaration of `manifest` for the given variants.
///
/// Declarations are processed independently: a failure is recorded and the
/// remaining declarations are still generated. A declaration whose name has
/// no variant slot is generated once. An empty or invalid variant list fails
/// every active declaration.
pub fn generate_module_with_variants(manifest: &BindingManifest, variants: &[String]) -> BatchReport {
    let config = manifest.emit_config();
    let mut bindings: Vec<EmittedBinding> = Vec::new();
    let mut failures = Vec::new();

    if let Err(detail) = check_variants(variants) {
        for func in manifest.active_functions() {
            log::warn!("skipping `{}`: {detail}", func.signature.trim());
            failures.push(GenerationFailure {
                declaration: func.signature.clone(),
                variant: None,
                error: BindError::InvalidManifest { detail: detail.clone() },
            });
        }
        return report(manifest, bindings, failures);
    }
    // binding name -> index of the declaration that produced it
    let mut owners: HashMap<String, usize> = HashMap::new();

    for (index, func) in manifest.active_functions().into_iter().enumerate() {
        let decl = match Declaration::parse(&func.signature)
            .and_then(|decl| marshal::plan(&decl).map(|_| decl))
        {
            Ok(decl) => decl,
            Err(error) => {
                log::warn!("skipping `{}`: {error}", func.signature.trim());
                failures.push(GenerationFailure {
                    declaration: func.signature.clone(),
                    variant: None,
                    error,
                });
                continue;
            }
        };

        let targets = if decl.is_template() { variants } else { &variants[..variants.len().min(1)] };
        for variant in targets {
            let result = generate_binding(&decl, variant, &config).and_then(|binding| {
                match owners.get(&binding.name) {
                    Some(&owner) if owner != index => Err(BindError::malformed(
                        &decl.source,
                        format!("binding '{}' is already generated by another declaration", binding.name),
                    )),
                    _ => Ok(binding),
                }
            });
            match result {
                Ok(binding) => {
                    owners.insert(binding.name.clone(), index);
                    bindings.push(binding);
                }
                Err(error) => {
                    log::warn!("skipping `{}` for {variant}: {error}", func.signature.trim());
                    failures.push(GenerationFailure {
                        declaration: func.signature.clone(),
                        variant: Some(variant.clone()),
                        error,
                    });
                }
            }
        }
    }

    report(manifest, bindings, failures)
}

fn check_variants(variants: &[String]) -> Result<(), String> {
    if variants.is_empty() {
        return Err("no variants to generate".to_string());
    }
    validate_variants(variants).map_err(|e| e.to_string())
}

fn report(
    manifest: &BindingManifest,
    bindings: Vec<EmittedBinding>,
    failures: Vec<GenerationFailure>,
) -> BatchReport {
    log::debug!(
        "module {}: {} bindings, {} failures",
        manifest.module.name,
        bindings.len(),
        failures.len()
    );

    BatchReport {
        module: ModuleBindings {
            module: manifest.module.name.clone(),
            header: manifest.module.header.clone(),
            bindings,
        },
        failures,
    }
}
