//! Semantic checker for parsed policies
//!
//! Enforces the structural rules the grammar cannot express. The walk
//! is an exhaustive match over the AST sum types and aborts at the
//! first violation.
//!
//! Two modes:
//! - `Strict` — whole-policy validation: statement-local rules plus
//!   document-level rules (at least one allow, no duplicates, no
//!   allow/deny conflicts).
//! - `Relaxed` — single-snippet validation: statement-local rules
//!   only. Document-level rules make no sense for one fragment.

use crate::parser::ast::*;
use std::collections::HashMap;
use thiserror::Error;

/// Action verbs the policy language accepts.
pub const KNOWN_ACTIONS: [&str; 8] = [
    "read", "write", "create", "delete", "update", "execute", "list", "manage",
];

/// Checker mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Strict,
    Relaxed,
}

/// Errors raised by semantic validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckError {
    #[error("unknown action '{action}'")]
    UnknownAction { action: String, line: usize },

    #[error("unconditional wildcard allow is not permitted")]
    UnboundedAllow { line: usize },

    #[error("operator '{op}' requires a {expected} operand for attribute '{attr}'")]
    OperandTypeMismatch {
        op: String,
        expected: String,
        attr: String,
        line: usize,
    },

    #[error("membership list for '{attr}' is empty")]
    EmptyMembershipList { attr: String, line: usize },

    #[error("membership list for '{attr}' mixes value types")]
    MixedMembershipList { attr: String, line: usize },

    #[error("policy contains no allow statement")]
    NoAllowStatement,

    #[error("duplicate statement")]
    DuplicateStatement { line: usize },

    #[error("allow and deny conflict on the same subject, action, and resource")]
    ConflictingStatements { line: usize },
}

impl CheckError {
    /// Best-effort source line of the violation.
    pub fn line(&self) -> Option<usize> {
        match self {
            CheckError::UnknownAction { line, .. }
            | CheckError::UnboundedAllow { line }
            | CheckError::OperandTypeMismatch { line, .. }
            | CheckError::EmptyMembershipList { line, .. }
            | CheckError::MixedMembershipList { line, .. }
            | CheckError::DuplicateStatement { line }
            | CheckError::ConflictingStatements { line } => Some(*line),
            CheckError::NoAllowStatement => None,
        }
    }
}

/// Check a complete policy document.
pub fn check_policy(ast: &PolicyAst, mode: CheckMode) -> Result<(), CheckError> {
    let mut seen: HashMap<String, Effect> = HashMap::new();
    let mut has_allow = false;

    for stmt in &ast.statements {
        check_statement(stmt)?;

        if stmt.effect == Effect::Allow {
            has_allow = true;
        }

        if mode == CheckMode::Strict {
            let line = stmt.span.line;
            match seen.get(&stmt.target_signature()) {
                Some(effect) if *effect == stmt.effect => {
                    return Err(CheckError::DuplicateStatement { line });
                }
                Some(_) => {
                    return Err(CheckError::ConflictingStatements { line });
                }
                None => {
                    seen.insert(stmt.target_signature(), stmt.effect);
                }
            }
        }
    }

    if mode == CheckMode::Strict && !has_allow {
        return Err(CheckError::NoAllowStatement);
    }

    Ok(())
}

/// Check a single snippet fragment in relaxed mode.
pub fn check_fragment(fragment: &Fragment) -> Result<(), CheckError> {
    match fragment {
        Fragment::Statement(stmt) => check_statement(stmt),
        Fragment::Guard(guard) => check_condition(&guard.condition, guard.span.line),
    }
}

/// Statement-local rules, enforced in both modes.
fn check_statement(stmt: &Statement) -> Result<(), CheckError> {
    let line = stmt.span.line;

    if !KNOWN_ACTIONS
        .iter()
        .any(|verb| verb.eq_ignore_ascii_case(&stmt.action))
    {
        return Err(CheckError::UnknownAction {
            action: stmt.action.clone(),
            line,
        });
    }

    if stmt.effect == Effect::Allow
        && stmt.subject.is_unbounded()
        && stmt.resource.is_unbounded()
        && stmt.condition.is_none()
    {
        return Err(CheckError::UnboundedAllow { line });
    }

    if let Some(condition) = &stmt.condition {
        check_condition(condition, line)?;
    }

    Ok(())
}

/// Condition typing rules. Exhaustive over every expression variant.
fn check_condition(expr: &CondExpr, line: usize) -> Result<(), CheckError> {
    match expr {
        CondExpr::Compare { attr, op, value } => match op {
            CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
                if !matches!(value, CondValue::Num(_)) {
                    return Err(CheckError::OperandTypeMismatch {
                        op: op.to_string(),
                        expected: "numeric".to_string(),
                        attr: attr.clone(),
                        line,
                    });
                }
                Ok(())
            }
            CompareOp::Contains => {
                if !matches!(value, CondValue::Str(_)) {
                    return Err(CheckError::OperandTypeMismatch {
                        op: op.to_string(),
                        expected: "string".to_string(),
                        attr: attr.clone(),
                        line,
                    });
                }
                Ok(())
            }
            CompareOp::Eq | CompareOp::Ne => Ok(()),
        },
        CondExpr::Membership { attr, values } => {
            let mut variants = values.iter().map(std::mem::discriminant);
            match variants.next() {
                None => Err(CheckError::EmptyMembershipList {
                    attr: attr.clone(),
                    line,
                }),
                Some(first) => {
                    if variants.all(|d| d == first) {
                        Ok(())
                    } else {
                        Err(CheckError::MixedMembershipList {
                            attr: attr.clone(),
                            line,
                        })
                    }
                }
            }
        }
        CondExpr::And(left, right) | CondExpr::Or(left, right) => {
            check_condition(left, line)?;
            check_condition(right, line)
        }
        CondExpr::Not(inner) => check_condition(inner, line),
    }
}
