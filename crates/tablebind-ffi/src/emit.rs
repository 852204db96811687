//! Binding body emission.
//!
//! Turns a parsed declaration and a key-type variant into the body of one
//! runtime wrapper: argument extractions, the native call, and the result
//! conversion.

use serde::{Deserialize, Serialize};

use crate::csig::{Declaration, ReturnType};
use crate::error::Result;
use crate::marshal::{self, local_name, MarshalStep, MarshalStrategy};

/// Local holding the native call's result.
pub const RESULT_LOCAL: &str = "ret";

/// Names of the runtime value-layer primitives the emitted code calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeApi {
    /// `uint64_t f(value)`
    #[serde(default = "default_get_uint")]
    pub get_uint: String,
    /// `const char* f(value, size_t* len)`
    #[serde(default = "default_get_buffer")]
    pub get_buffer: String,
    /// `value f(int)`
    #[serde(default = "default_new_int")]
    pub new_int: String,
    /// The no-value sentinel.
    #[serde(default = "default_none")]
    pub none: String,
}

fn default_get_uint() -> String {
    "mp_obj_get_uint".to_string()
}

fn default_get_buffer() -> String {
    "mp_obj_str_get_data".to_string()
}

fn default_new_int() -> String {
    "mp_obj_new_int".to_string()
}

fn default_none() -> String {
    "mp_const_none".to_string()
}

impl Default for RuntimeApi {
    fn default() -> Self {
        Self {
            get_uint: default_get_uint(),
            get_buffer: default_get_buffer(),
            new_int: default_new_int(),
            none: default_none(),
        }
    }
}

/// Emission settings shared by every binding of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitConfig {
    pub runtime: RuntimeApi,
    /// Prepended to every native call, e.g. `get_vm_api()->`.
    pub call_prefix: String,
}

/// The emitted body of one wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedBinding {
    /// Concrete native function name; also the script-visible name.
    pub name: String,
    pub variant: String,
    /// Minimum number of script arguments the wrapper reads.
    pub arity: usize,
    pub extractions: Vec<String>,
    /// The native call statement.
    pub call: String,
    /// The final return statement.
    pub conversion: String,
}

impl EmittedBinding {
    /// Body lines in emission order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.extractions.clone();
        lines.push(self.call.clone());
        lines.push(self.conversion.clone());
        lines
    }
}

/// Parse `declaration` and emit its binding for `variant` with the default
/// MicroPython runtime names.
pub fn generate(declaration: &str, variant: &str) -> Result<EmittedBinding> {
    let decl = Declaration::parse(declaration)?;
    generate_binding(&decl, variant, &EmitConfig::default())
}

/// Emit the binding for one declaration instantiated with one variant.
pub fn generate_binding(
    decl: &Declaration,
    variant: &str,
    config: &EmitConfig,
) -> Result<EmittedBinding> {
    let plan = marshal::plan(decl)?;
    let name = decl.instantiate_name(variant);
    let api = &config.runtime;

    let extractions: Vec<String> = plan
        .steps
        .iter()
        .filter_map(|step| extraction(step, api))
        .collect();

    let call = format!(
        "{}{}({})",
        config.call_prefix,
        name,
        plan.call_arguments().join(", ")
    );
    let (call, conversion) = match decl.return_type {
        ReturnType::Integer32 => (
            format!("int {RESULT_LOCAL} = {call};"),
            format!("return {}({RESULT_LOCAL});", api.new_int),
        ),
        ReturnType::Void => (format!("{call};"), format!("return {};", api.none)),
    };

    log::debug!(
        "emitted {name} ({} extractions, arity {})",
        extractions.len(),
        plan.arity
    );

    Ok(EmittedBinding {
        name,
        variant: variant.to_string(),
        arity: plan.arity,
        extractions,
        call,
        conversion,
    })
}

fn extraction(step: &MarshalStep, api: &RuntimeApi) -> Option<String> {
    let local = local_name(&step.param);
    let slot = step.slot;
    match (step.strategy, &step.length) {
        (MarshalStrategy::UInt64, _) => Some(format!(
            "uint64_t {local} = {}(args[{slot}]);",
            api.get_uint
        )),
        (MarshalStrategy::Buffer { mutable }, Some(length)) => {
            let len = local_name(length);
            let (ty, cast) = if mutable { ("char*", "(char*)") } else { ("const char*", "") };
            Some(format!(
                "size_t {len}; {ty} {local} = {cast}{}(args[{slot}], &{len});",
                api.get_buffer
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIND_PRIMARY: &str = "int db_idx64_find_primary( uint64_t code, uint64_t scope, uint64_t table, char* data, size_t data_len, uint64_t primary );";

    #[test]
    fn find_primary_scenario() {
        let binding = generate(FIND_PRIMARY, "idx128").unwrap();
        assert_eq!(binding.name, "db_idx64_find_primary");
        assert_eq!(
            binding.lines(),
            [
                "uint64_t _code = mp_obj_get_uint(args[0]);",
                "uint64_t _scope = mp_obj_get_uint(args[1]);",
                "uint64_t _table = mp_obj_get_uint(args[2]);",
                "size_t _data_len; char* _data = (char*)mp_obj_str_get_data(args[3], &_data_len);",
                "uint64_t _primary = mp_obj_get_uint(args[5]);",
                "int ret = db_idx64_find_primary(_code, _scope, _table, _data, _data_len, _primary);",
                "return mp_obj_new_int(ret);",
            ]
        );
        assert_eq!(binding.arity, 6);
    }

    #[test]
    fn remove_scenario() {
        let binding = generate("void db_{0}_remove( int iterator );", "idx128").unwrap();
        assert!(binding.extractions.is_empty());
        assert_eq!(binding.call, "db_idx128_remove();");
        assert_eq!(binding.conversion, "return mp_const_none;");
        assert_eq!(binding.arity, 1);
    }

    #[test]
    fn void_never_references_result() {
        let binding = generate(
            "void db_{0}_update( int iterator, uint64_t payer, const char* data, size_t data_len );",
            "idx256",
        )
        .unwrap();
        assert_eq!(
            binding.lines(),
            [
                "uint64_t _payer = mp_obj_get_uint(args[1]);",
                "size_t _data_len; const char* _data = mp_obj_str_get_data(args[2], &_data_len);",
                "db_idx256_update(_payer, _data, _data_len);",
                "return mp_const_none;",
            ]
        );
        assert!(binding
            .lines()
            .iter()
            .all(|l| !l.contains("int ret") && !l.contains("(ret)")));
    }

    #[test]
    fn integer_result_converted_once() {
        let binding = generate(
            "int db_{0}_end( uint64_t code, uint64_t scope, uint64_t table );",
            "idx_double",
        )
        .unwrap();
        let lines = binding.lines();
        let captures = lines.iter().filter(|l| l.starts_with("int ret = ")).count();
        let conversions = lines.iter().filter(|l| l.contains("mp_obj_new_int(ret)")).count();
        assert_eq!(captures, 1);
        assert_eq!(conversions, 1);
        assert_eq!(binding.call, "int ret = db_idx_double_end(_code, _scope, _table);");
    }

    #[test]
    fn buffer_length_named_after_length_parameter() {
        let binding = generate(
            "int db_{0}_store( uint64_t scope, uint64_t table, uint64_t payer, uint64_t id, const char* secondary , size_t len);",
            "idx64",
        )
        .unwrap();
        assert_eq!(
            binding.extractions[4],
            "size_t _len; const char* _secondary = mp_obj_str_get_data(args[4], &_len);"
        );
        assert!(binding.call.ends_with("(_scope, _table, _payer, _id, _secondary, _len);"));
    }

    #[test]
    fn custom_runtime_and_prefix() {
        let config = EmitConfig {
            runtime: RuntimeApi {
                get_uint: "rt_get_u64".to_string(),
                get_buffer: "rt_get_bytes".to_string(),
                new_int: "rt_new_int".to_string(),
                none: "rt_none".to_string(),
            },
            call_prefix: "get_vm_api()->".to_string(),
        };
        let decl =
            Declaration::parse("int db_{0}_find_primary(uint64_t code, const char* data, size_t data_len)")
                .unwrap();
        let binding = generate_binding(&decl, "idx128", &config).unwrap();
        assert_eq!(
            binding.lines(),
            [
                "uint64_t _code = rt_get_u64(args[0]);",
                "size_t _data_len; const char* _data = rt_get_bytes(args[1], &_data_len);",
                "int ret = get_vm_api()->db_idx128_find_primary(_code, _data, _data_len);",
                "return rt_new_int(ret);",
            ]
        );
    }

    #[test]
    fn zero_parameter_binding() {
        let binding = generate("int db_{0}_count()", "idx64").unwrap();
        assert_eq!(binding.lines(), ["int ret = db_idx64_count();", "return mp_obj_new_int(ret);"]);
        assert_eq!(binding.arity, 0);
    }

    #[test]
    fn deterministic() {
        let a = generate(FIND_PRIMARY, "idx64").unwrap();
        let b = generate(FIND_PRIMARY, "idx64").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn errors_propagate_unchanged() {
        assert!(matches!(
            generate("int db_{0}_next( int iterator, uint64_t* primary );", "idx64").unwrap_err(),
            crate::error::BindError::UnsupportedParameterType { .. }
        ));
        assert!(matches!(
            generate("int f(uint64_t a, size_t n)", "idx64").unwrap_err(),
            crate::error::BindError::MalformedDeclaration { .. }
        ));
    }

    #[test]
    fn serializes_for_export() {
        let binding = generate("void db_{0}_remove(int iterator)", "idx64").unwrap();
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["name"], "db_idx64_remove");
        assert_eq!(json["arity"], 1);
        assert_eq!(json["conversion"], "return mp_const_none;");
    }
}
