//! Marshaling binding generation for native multi-index table operations.
//!
//! Turns restricted C declarations of the table engine's `db_*` entry points
//! into MicroPython wrapper code, once per key-type variant.
//!
//! ## Modules
//!
//! - [`normalize`] — Whitespace normalization of raw declaration text
//! - [`csig`] — Declaration parser over a closed set of native types
//! - [`marshal`] — Native type → marshal strategy mapping and planning
//! - [`emit`] — Binding body emission for one declaration and variant
//! - [`manifest`] — `.bind.toml` manifest parsing
//! - [`batch`] — Whole-module generation with failure isolation
//! - [`module`] — C translation unit rendering

pub mod batch;
pub mod csig;
pub mod emit;
pub mod error;
pub mod manifest;
pub mod marshal;
pub mod module;
pub mod normalize;

// Re-export key types for convenience
pub use batch::{generate_module, generate_module_with_variants, BatchReport, ModuleBindings};
pub use csig::{Declaration, NativeType, Parameter, ReturnType};
pub use emit::{generate, generate_binding, EmitConfig, EmittedBinding, RuntimeApi};
pub use error::BindError;
pub use manifest::BindingManifest;
pub use marshal::MarshalStrategy;
pub use module::render_module;
pub use normalize::normalize_declaration;
