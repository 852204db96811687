//! Native table declaration parser.
//!
//! Handles the restricted grammar `<return> <name>(<type> <name>, ...)` used
//! to describe the table engine's `db_*` entry points. The set of recognized
//! type spellings is closed; anything else is rejected rather than guessed.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{BindError, Result};
use crate::normalize::normalize_declaration;

/// Substitution slot in a name template, replaced by the key-type variant.
pub const VARIANT_PLACEHOLDER: &str = "{0}";

/// Return type of a native table operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Void,
    /// Signed 32-bit result (iterator handle or status).
    Integer32,
}

impl ReturnType {
    fn from_spelling(spelling: &str) -> Option<Self> {
        match spelling {
            "void" => Some(ReturnType::Void),
            "int" => Some(ReturnType::Integer32),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnType::Void => write!(f, "void"),
            ReturnType::Integer32 => write!(f, "int"),
        }
    }
}

/// Recognized native parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeType {
    /// `uint64_t`
    UInt64,
    /// `const char*`
    ConstCharPointer,
    /// `char*`
    MutableCharPointer,
    /// `int`, used for iterator handles.
    Int32,
    /// `size_t`, the length half of a buffer pair.
    SizeT,
}

impl NativeType {
    /// Map a canonical type spelling to a native type.
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        match spelling {
            "uint64_t" => Some(NativeType::UInt64),
            "const char*" => Some(NativeType::ConstCharPointer),
            "char*" => Some(NativeType::MutableCharPointer),
            "int" => Some(NativeType::Int32),
            "size_t" => Some(NativeType::SizeT),
            _ => None,
        }
    }

    /// The C spelling of this type.
    pub fn spelling(&self) -> &'static str {
        match self {
            NativeType::UInt64 => "uint64_t",
            NativeType::ConstCharPointer => "const char*",
            NativeType::MutableCharPointer => "char*",
            NativeType::Int32 => "int",
            NativeType::SizeT => "size_t",
        }
    }

    /// Whether this is a data pointer that must be paired with a length.
    pub fn is_buffer(&self) -> bool {
        matches!(self, NativeType::ConstCharPointer | NativeType::MutableCharPointer)
    }

    /// Whether this is a length carrier.
    pub fn is_length(&self) -> bool {
        matches!(self, NativeType::SizeT)
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spelling())
    }
}

/// A parsed declaration parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub native_type: NativeType,
    pub name: String,
}

/// A parsed native function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The declaration text as given, trimmed.
    pub source: String,
    pub return_type: ReturnType,
    /// Function name, possibly containing [`VARIANT_PLACEHOLDER`].
    pub name_template: String,
    pub parameters: Vec<Parameter>,
}

impl Declaration {
    /// Parse a declaration.
    ///
    /// Examples:
    /// - `"void db_{0}_remove(int iterator);"`
    /// - `"int db_{0}_store(uint64_t scope, uint64_t table, uint64_t payer,
    ///   uint64_t id, const char* data, size_t data_len);"`
    pub fn parse(input: &str) -> Result<Self> {
        let source = input.trim();
        let text = normalize_declaration(source);
        if text.is_empty() {
            return Err(BindError::malformed(source, "empty declaration"));
        }

        let open = text
            .find('(')
            .ok_or_else(|| BindError::malformed(source, "missing '('"))?;
        let close = text
            .rfind(')')
            .filter(|&close| close > open)
            .ok_or_else(|| BindError::malformed(source, "missing ')'"))?;

        let trailing = text[close + 1..].trim();
        if !trailing.is_empty() && trailing != ";" {
            return Err(BindError::malformed(
                source,
                format!("unexpected '{trailing}' after ')'"),
            ));
        }

        let (return_type, name_template) = parse_head(source, text[..open].trim())?;
        let parameters = parse_params(source, &text[open + 1..close])?;

        Ok(Declaration {
            source: source.to_string(),
            return_type,
            name_template,
            parameters,
        })
    }

    /// Whether the name template has a variant slot.
    pub fn is_template(&self) -> bool {
        self.name_template.contains(VARIANT_PLACEHOLDER)
    }

    /// Concrete native function name for a key-type variant.
    pub fn instantiate_name(&self, variant: &str) -> String {
        self.name_template.replace(VARIANT_PLACEHOLDER, variant)
    }
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name_template)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param.native_type, param.name)?;
        }
        write!(f, ")")
    }
}

/// Parse `<return type> <name template>` from the text before `(`.
fn parse_head(source: &str, head: &str) -> Result<(ReturnType, String)> {
    let words: Vec<&str> = head.split(' ').filter(|w| !w.is_empty()).collect();
    let [ret, name] = words.as_slice() else {
        return Err(BindError::malformed(
            source,
            format!("expected '<return type> <name>' before '(', found '{head}'"),
        ));
    };

    let return_type =
        ReturnType::from_spelling(ret).ok_or_else(|| BindError::UnsupportedReturnType {
            declaration: source.to_string(),
            type_name: ret.to_string(),
        })?;

    if !is_identifier(&name.replace(VARIANT_PLACEHOLDER, "_")) {
        return Err(BindError::malformed(
            source,
            format!("invalid function name '{name}'"),
        ));
    }

    Ok((return_type, name.to_string()))
}

/// Parse the parameter list between `(` and `)`.
fn parse_params(source: &str, list: &str) -> Result<Vec<Parameter>> {
    let list = list.trim();
    if list.is_empty() || list == "void" {
        return Ok(Vec::new());
    }

    let mut params: Vec<Parameter> = Vec::new();
    let mut seen = HashSet::new();
    for (i, part) in list.split(',').enumerate() {
        let param = parse_param(source, i, part.trim())?;
        if !seen.insert(param.name.clone()) {
            return Err(BindError::malformed(
                source,
                format!("duplicate parameter name '{}'", param.name),
            ));
        }
        params.push(param);
    }
    Ok(params)
}

/// Parse one `<type> <name>` pair, splitting at the last space.
fn parse_param(source: &str, position: usize, part: &str) -> Result<Parameter> {
    if part.is_empty() {
        return Err(BindError::malformed(
            source,
            format!("empty parameter at position {position}"),
        ));
    }

    let Some(split) = part.rfind(' ') else {
        return Err(BindError::malformed(
            source,
            format!("parameter '{part}' has no name"),
        ));
    };

    // `char *data` binds the star to the type
    let raw_name = &part[split + 1..];
    let name = raw_name.trim_start_matches('*');
    let stars = raw_name.len() - name.len();
    let spelling = canonical_type(&part[..split], stars);

    if !is_identifier(name) {
        return Err(BindError::malformed(
            source,
            format!("invalid parameter name '{raw_name}'"),
        ));
    }

    let native_type =
        NativeType::from_spelling(&spelling).ok_or_else(|| BindError::UnsupportedParameterType {
            declaration: source.to_string(),
            type_name: spelling.clone(),
        })?;

    Ok(Parameter {
        native_type,
        name: name.to_string(),
    })
}

/// Canonical type spelling: single spaces, `*` attached to the preceding word.
fn canonical_type(ty: &str, extra_stars: usize) -> String {
    let mut spelling = normalize_declaration(ty).replace(" *", "*");
    spelling.push_str(&"*".repeat(extra_stars));
    spelling
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
