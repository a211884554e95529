//! Pairwise option constraints declared on commands.

use crate::error::{NgsiError, Result};

use super::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// At most one of the two flags may be set.
    Nand,
    /// Exactly one of the two flags must be set.
    Xnor,
    /// Always rejected.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFlag {
    pub mode: ValidationMode,
    pub flags: [String; 2],
}

impl ValidationFlag {
    pub fn new(mode: ValidationMode, a: &str, b: &str) -> Self {
        Self {
            mode,
            flags: [a.to_string(), b.to_string()],
        }
    }

    pub fn nand(a: &str, b: &str) -> Self {
        Self::new(ValidationMode::Nand, a, b)
    }

    pub fn xnor(a: &str, b: &str) -> Self {
        Self::new(ValidationMode::Xnor, a, b)
    }
}

/// Check `rule` against the flags parsed into `ctx`. No rule always passes.
pub fn validation(rule: Option<&ValidationFlag>, ctx: &Context<'_>) -> Result<()> {
    const FUNC: &str = "validation";

    let Some(rule) = rule else {
        return Ok(());
    };
    let [a, b] = &rule.flags;
    let either = || format!("specify either --{} or --{}", a, b);

    match rule.mode {
        ValidationMode::Nand if ctx.is_set(a) && ctx.is_set(b) => {
            Err(NgsiError::new(FUNC, 2, either()))
        }
        ValidationMode::Xnor if ctx.is_set(a) == ctx.is_set(b) => {
            Err(NgsiError::new(FUNC, 3, either()))
        }
        ValidationMode::Unsupported => Err(NgsiError::new(FUNC, 1, "validation mode error")),
        _ => Ok(()),
    }
}
