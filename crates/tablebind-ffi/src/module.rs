//! C module rendering.
//!
//! Wraps each emitted body in a variadic MicroPython function, declares its
//! function object with the binding's arity, and registers every binding in
//! the module's globals table.

use crate::batch::ModuleBindings;
use crate::emit::EmittedBinding;

const INDENT: &str = "    ";

/// Name of the C wrapper function for a binding.
pub fn wrapper_name(binding: &EmittedBinding) -> String {
    format!("mod_{}", binding.name)
}

/// Render one wrapper function and its function-object declaration.
pub fn render_wrapper(binding: &EmittedBinding) -> String {
    let wrapper = wrapper_name(binding);
    let mut lines = Vec::new();
    lines.push(format!(
        "STATIC mp_obj_t {wrapper}(size_t n_args, const mp_obj_t *args) {{"
    ));
    for line in binding.lines() {
        lines.push(format!("{INDENT}{line}"));
    }
    lines.push("}".to_string());
    lines.push(format!(
        "STATIC MP_DEFINE_CONST_FUN_OBJ_VAR({wrapper}_obj, {}, {wrapper});",
        binding.arity
    ));
    lines.join("\n")
}

/// Render a complete C translation unit for a module.
pub fn render_module(module: &ModuleBindings) -> String {
    let name = &module.module;
    let mut out = Vec::new();

    out.push(format!("// Generated bindings for module '{name}'."));
    if let Some(header) = &module.header {
        out.push(format!("#include <{header}>"));
    }
    out.push(String::new());

    for binding in &module.bindings {
        out.push(render_wrapper(binding));
        out.push(String::new());
    }

    out.push(format!(
        "STATIC const mp_rom_map_elem_t mp_module_{name}_globals_table[] = {{"
    ));
    out.push(format!(
        "{INDENT}{{ MP_ROM_QSTR(MP_QSTR___name__), MP_ROM_QSTR(MP_QSTR_{name}) }},"
    ));
    for binding in &module.bindings {
        out.push(format!(
            "{INDENT}{{ MP_ROM_QSTR(MP_QSTR_{}), MP_ROM_PTR(&{}_obj) }},",
            binding.name,
            wrapper_name(binding)
        ));
    }
    out.push("};".to_string());
    out.push(String::new());
    out.push(format!(
        "STATIC MP_DEFINE_CONST_DICT(mp_module_{name}_globals, mp_module_{name}_globals_table);"
    ));
    out.push(String::new());
    out.push(format!("const mp_obj_module_t mp_module_{name} = {{"));
    out.push(format!("{INDENT}.base = {{ &mp_type_module }},"));
    out.push(format!(
        "{INDENT}.globals = (mp_obj_dict_t*)&mp_module_{name}_globals,"
    ));
    out.push("};".to_string());

    let mut text = out.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::generate;

    fn module_with(bindings: Vec<EmittedBinding>) -> ModuleBindings {
        ModuleBindings {
            module: "db".to_string(),
            header: Some("vm_api.h".to_string()),
            bindings,
        }
    }

    #[test]
    fn wrapper_layout() {
        let binding = generate("void db_{0}_remove( int iterator )", "idx64").unwrap();
        assert_eq!(
            render_wrapper(&binding),
            "STATIC mp_obj_t mod_db_idx64_remove(size_t n_args, const mp_obj_t *args) {\n\
             \x20   db_idx64_remove();\n\
             \x20   return mp_const_none;\n\
             }\n\
             STATIC MP_DEFINE_CONST_FUN_OBJ_VAR(mod_db_idx64_remove_obj, 1, mod_db_idx64_remove);"
        );
    }

    #[test]
    fn module_registers_every_binding() {
        let store = generate(
            "int db_{0}_store( uint64_t scope, uint64_t table, uint64_t payer, uint64_t id, const char* data, size_t data_len )",
            "idx128",
        )
        .unwrap();
        let end = generate("int db_{0}_end( uint64_t code, uint64_t scope, uint64_t table )", "idx128")
            .unwrap();
        let text = render_module(&module_with(vec![store, end]));

        assert!(text.starts_with("// Generated bindings for module 'db'.\n#include <vm_api.h>\n"));
        assert!(text.contains("STATIC MP_DEFINE_CONST_FUN_OBJ_VAR(mod_db_idx128_store_obj, 5, mod_db_idx128_store);"));
        assert!(text.contains("STATIC MP_DEFINE_CONST_FUN_OBJ_VAR(mod_db_idx128_end_obj, 3, mod_db_idx128_end);"));
        assert!(text.contains(
            "    { MP_ROM_QSTR(MP_QSTR_db_idx128_store), MP_ROM_PTR(&mod_db_idx128_store_obj) },"
        ));
        assert!(text.contains("    { MP_ROM_QSTR(MP_QSTR___name__), MP_ROM_QSTR(MP_QSTR_db) },"));
        assert!(text.contains("STATIC MP_DEFINE_CONST_DICT(mp_module_db_globals, mp_module_db_globals_table);"));
        assert!(text.ends_with("    .globals = (mp_obj_dict_t*)&mp_module_db_globals,\n};\n"));

        let store_at = text.find("mod_db_idx128_store(size_t").unwrap();
        let end_at = text.find("mod_db_idx128_end(size_t").unwrap();
        assert!(store_at < end_at);
    }

    #[test]
    fn module_without_header() {
        let mut module = module_with(Vec::new());
        module.header = None;
        let text = render_module(&module);
        assert!(!text.contains("#include"));
        assert!(text.contains("mp_module_db_globals_table[] = {"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let build = || {
            let binding = generate("void db_{0}_remove( int iterator )", "idx256").unwrap();
            render_module(&module_with(vec![binding]))
        };
        assert_eq!(build(), build());
    }
}
