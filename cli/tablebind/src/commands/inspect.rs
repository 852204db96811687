//! `tablebind inspect` — show the marshaling of one declaration.

use anyhow::{bail, Result};
use serde_json::json;
use tablebind_ffi::marshal::{self, MarshalStrategy};
use tablebind_ffi::{generate_binding, Declaration, EmitConfig};

/// Run `tablebind inspect <declaration>`.
pub fn run(declaration: &str, variant: &str, export: Option<&str>) -> Result<()> {
    let text = render(declaration, variant, export.unwrap_or("text"))?;
    print!("{text}");
    Ok(())
}

pub(crate) fn render(declaration: &str, variant: &str, format: &str) -> Result<String> {
    let decl = Declaration::parse(declaration)?;
    let plan = marshal::plan(&decl)?;
    let binding = generate_binding(&decl, variant, &EmitConfig::default())?;

    match format {
        "json" => {
            let value = json!({
                "declaration": decl,
                "plan": plan,
                "binding": binding,
                "lines": binding.lines(),
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&value)?))
        }
        "text" => {
            let mut lines = vec![
                format!("declaration: {decl}"),
                format!("binding:     {} (arity {})", binding.name, binding.arity),
                "arguments:".to_string(),
            ];
            for step in &plan.steps {
                let how = match step.strategy {
                    MarshalStrategy::UInt64 => "uint64".to_string(),
                    MarshalStrategy::Buffer { mutable } => format!(
                        "{} buffer + {}",
                        if mutable { "mutable" } else { "const" },
                        step.length.as_deref().unwrap_or("?")
                    ),
                    MarshalStrategy::Unbound => "not extracted".to_string(),
                    MarshalStrategy::Length => "length".to_string(),
                };
                lines.push(format!("  args[{}] {}: {how}", step.slot, step.param));
            }
            lines.push("body:".to_string());
            for line in binding.lines() {
                lines.push(format!("    {line}"));
            }
            let mut out = lines.join("\n");
            out.push('\n');
            Ok(out)
        }
        other => bail!("unknown export format '{other}' (expected text or json)"),
    }
}
