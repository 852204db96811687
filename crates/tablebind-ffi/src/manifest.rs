//! Binding manifest (`.bind.toml`) parsing.
//!
//! A manifest names the runtime module, the native declarations to wrap,
//! the key-type variants to instantiate them with, and optionally the
//! runtime primitive names the generated code should call.

use serde::{Deserialize, Serialize};

use crate::emit::{EmitConfig, RuntimeApi};
use crate::error::{BindError, Result};

/// The key-type family every index operation is generated for by default.
pub const DEFAULT_VARIANTS: [&str; 5] = ["idx64", "idx128", "idx256", "idx_double", "idx_long_double"];

/// A complete binding manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingManifest {
    /// Target runtime module.
    pub module: ModuleConfig,
    /// Runtime value-layer primitive names.
    #[serde(default)]
    pub runtime: RuntimeApi,
    /// Key-type variants substituted into each name template.
    #[serde(default = "default_variants")]
    pub variants: Vec<String>,
    /// Native declarations to wrap.
    #[serde(default)]
    pub functions: Vec<BoundFunction>,
}

/// The runtime module the bindings are registered in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Script-visible module name (e.g., "db").
    pub name: String,
    /// Header to include ahead of the generated wrappers.
    #[serde(default)]
    pub header: Option<String>,
    /// Prefix for every native call (e.g., "get_vm_api()->").
    #[serde(default, alias = "call-prefix")]
    pub call_prefix: Option<String>,
}

fn default_variants() -> Vec<String> {
    DEFAULT_VARIANTS.iter().map(|v| v.to_string()).collect()
}

/// A single native declaration entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundFunction {
    /// Declaration text, e.g. `void db_{0}_remove(int iterator)`.
    pub signature: String,
    /// Whether this declaration is skipped.
    #[serde(default)]
    pub excluded: bool,
}

impl BindingManifest {
    /// Parse a manifest from a TOML string.
    pub fn parse(input: &str) -> Result<Self> {
        let manifest: BindingManifest = toml::from_str(input).map_err(BindError::Toml)?;

        if !is_symbol(&manifest.module.name) {
            return Err(BindError::InvalidManifest {
                detail: format!("module.name '{}' is not a valid identifier", manifest.module.name),
            });
        }
        if manifest.variants.is_empty() {
            return Err(BindError::InvalidManifest {
                detail: "variants must not be empty".to_string(),
            });
        }
        validate_variants(&manifest.variants)?;

        Ok(manifest)
    }

    /// Parse a manifest from a file path.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Return only the non-excluded functions.
    pub fn active_functions(&self) -> Vec<&BoundFunction> {
        self.functions.iter().filter(|f| !f.excluded).collect()
    }

    /// Emission settings derived from the manifest.
    pub fn emit_config(&self) -> EmitConfig {
        EmitConfig {
            runtime: self.runtime.clone(),
            call_prefix: self.module.call_prefix.clone().unwrap_or_default(),
        }
    }

    /// A starter manifest covering the index operations.
    pub fn template(module: &str) -> String {
        format!(
            r#"variants = ["idx64", "idx128", "idx256", "idx_double", "idx_long_double"]

[module]
name = "{module}"
# header = "vm_api.h"
# call-prefix = "get_vm_api()->"

[[functions]]
signature = "int db_{{0}}_store( uint64_t scope, uint64_t table, uint64_t payer, uint64_t id, const char* data, size_t data_len )"

[[functions]]
signature = "void db_{{0}}_update( int iterator, uint64_t payer, const char* data, size_t data_len )"

[[functions]]
signature = "void db_{{0}}_remove( int iterator )"

[[functions]]
signature = "int db_{{0}}_find_primary( uint64_t code, uint64_t scope, uint64_t table, char* data, size_t data_len, uint64_t primary )"

[[functions]]
signature = "int db_{{0}}_end( uint64_t code, uint64_t scope, uint64_t table )"

# uint64_t* out-parameters are not marshaled yet.
[[functions]]
signature = "int db_{{0}}_next( int iterator, uint64_t* primary )"
excluded = true
"#
        )
    }
}

/// Validate that every variant is usable inside a C identifier.
pub fn validate_variants(variants: &[String]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for variant in variants {
        if variant.is_empty() || !variant.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(BindError::InvalidManifest {
                detail: format!("variant '{variant}' is not a valid identifier fragment"),
            });
        }
        if !seen.insert(variant.as_str()) {
            return Err(BindError::InvalidManifest {
                detail: format!("variant '{variant}' is listed twice"),
            });
        }
    }
    Ok(())
}

fn is_symbol(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
