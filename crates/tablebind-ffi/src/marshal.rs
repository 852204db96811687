//! Data marshaling between native table types and script values.
//!
//! Maps each native parameter type to a strategy, then walks a declaration's
//! parameters with an explicit cursor so that a buffer and its length are
//! planned as one script argument.

use serde::Serialize;

use crate::csig::{Declaration, NativeType};
use crate::error::{BindError, Result};

/// Strategy for moving one logical parameter across the runtime boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarshalStrategy {
    /// Read the script argument as an unsigned 64-bit integer.
    UInt64,
    /// Read the script argument as a byte buffer, passing pointer then length.
    Buffer { mutable: bool },
    /// Length half of a buffer pair; only valid right after a buffer.
    Length,
    /// Not bound to a script argument and not passed to the native call.
    ///
    /// Iterator handles currently land here: nothing is extracted from the
    /// script argument at their position.
    Unbound,
}

/// Select the marshal strategy for a native type.
pub fn select_strategy(native: NativeType) -> MarshalStrategy {
    match native {
        NativeType::UInt64 => MarshalStrategy::UInt64,
        NativeType::ConstCharPointer => MarshalStrategy::Buffer { mutable: false },
        NativeType::MutableCharPointer => MarshalStrategy::Buffer { mutable: true },
        NativeType::SizeT => MarshalStrategy::Length,
        NativeType::Int32 => MarshalStrategy::Unbound,
    }
}

/// Local variable name bound to a parameter in the emitted body.
pub fn local_name(param: &str) -> String {
    format!("_{param}")
}

/// One logical parameter of a planned binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarshalStep {
    pub strategy: MarshalStrategy,
    /// Index of the script argument this step reads: the parameter's
    /// position in the declaration, length parameters included.
    pub slot: usize,
    /// Source parameter name.
    pub param: String,
    /// Name of the length parameter consumed with a buffer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

impl MarshalStep {
    /// Native call arguments contributed by this step, in call order.
    pub fn call_arguments(&self) -> Vec<String> {
        match (&self.strategy, &self.length) {
            (MarshalStrategy::UInt64, _) => vec![local_name(&self.param)],
            (MarshalStrategy::Buffer { .. }, Some(length)) => {
                vec![local_name(&self.param), local_name(length)]
            }
            _ => Vec::new(),
        }
    }

    /// Whether this step reads its script argument.
    pub fn extracts(&self) -> bool {
        matches!(
            self.strategy,
            MarshalStrategy::UInt64 | MarshalStrategy::Buffer { .. }
        )
    }
}

/// Marshaling plan for a whole declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarshalPlan {
    pub steps: Vec<MarshalStep>,
    /// Minimum number of script arguments, one past the highest slot.
    pub arity: usize,
}

impl MarshalPlan {
    /// All native call arguments, in declaration order.
    pub fn call_arguments(&self) -> Vec<String> {
        self.steps.iter().flat_map(MarshalStep::call_arguments).collect()
    }
}

/// Plan how every parameter of `decl` crosses the runtime boundary.
pub fn plan(decl: &Declaration) -> Result<MarshalPlan> {
    let params = &decl.parameters;
    let mut steps = Vec::new();
    let mut cursor = 0;

    while cursor < params.len() {
        let param = &params[cursor];
        let strategy = select_strategy(param.native_type);
        let slot = cursor;

        let length = match strategy {
            MarshalStrategy::Buffer { .. } => match params.get(cursor + 1) {
                Some(next) if next.native_type.is_length() => {
                    cursor += 1;
                    Some(next.name.clone())
                }
                _ => {
                    return Err(BindError::malformed(
                        &decl.source,
                        format!(
                            "buffer parameter '{}' is not followed by a size_t length",
                            param.name
                        ),
                    ));
                }
            },
            MarshalStrategy::Length => {
                return Err(BindError::malformed(
                    &decl.source,
                    format!(
                        "length parameter '{}' does not follow a buffer parameter",
                        param.name
                    ),
                ));
            }
            MarshalStrategy::UInt64 | MarshalStrategy::Unbound => None,
        };

        steps.push(MarshalStep {
            strategy,
            slot,
            param: param.name.clone(),
            length,
        });
        cursor += 1;
    }

    let arity = steps.last().map_or(0, |step: &MarshalStep| step.slot + 1);
    Ok(MarshalPlan { steps, arity })
}
