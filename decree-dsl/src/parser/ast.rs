//! Abstract Syntax Tree types

use crate::lexer::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The root AST node for a complete policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyAst {
    pub statements: Vec<Statement>,
}

/// A single access-control statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub effect: Effect,
    pub subject: Entity,
    pub action: String,
    pub resource: Entity,
    pub condition: Option<CondExpr>,
    pub span: Span,
}

impl Statement {
    /// Canonical text form of subject, action, resource, and condition,
    /// position-independent and effect-free. Two statements with the
    /// same target signature are duplicates (same effect) or a
    /// conflict (opposite effects).
    pub fn target_signature(&self) -> String {
        let mut out = format!(
            "{} {} on {}",
            self.subject,
            self.action.to_lowercase(),
            self.resource
        );
        if let Some(cond) = &self.condition {
            out.push_str(" when ");
            out.push_str(&cond.to_string());
        }
        out
    }
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => write!(f, "allow"),
            Effect::Deny => write!(f, "deny"),
        }
    }
}

/// A subject or resource reference: `*`, `name`, `kind:name`, `kind:*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: Option<String>,
    pub name: Pattern,
}

impl Entity {
    /// True when the entity matches anything at all (`*` with no kind).
    pub fn is_unbounded(&self) -> bool {
        self.kind.is_none() && self.name == Pattern::Any
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = &self.kind {
            write!(f, "{}:{}", kind, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Entity name: a literal name or the `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    Any,
    Exact(String),
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Any => write!(f, "*"),
            Pattern::Exact(name) => write!(f, "{}", name),
        }
    }
}

/// Condition expression in a `when` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CondExpr {
    Compare {
        attr: String,
        op: CompareOp,
        value: CondValue,
    },
    Membership {
        attr: String,
        values: Vec<CondValue>,
    },
    And(Box<CondExpr>, Box<CondExpr>),
    Or(Box<CondExpr>, Box<CondExpr>),
    Not(Box<CondExpr>),
}

impl fmt::Display for CondExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondExpr::Compare { attr, op, value } => write!(f, "{} {} {}", attr, op, value),
            CondExpr::Membership { attr, values } => {
                write!(f, "{} in (", attr)?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
            CondExpr::And(left, right) => write!(f, "({} and {})", left, right),
            CondExpr::Or(left, right) => write!(f, "({} or {})", left, right),
            CondExpr::Not(inner) => write!(f, "(not {})", inner),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Contains => "contains",
        };
        write!(f, "{}", symbol)
    }
}

/// A value on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CondValue {
    Str(String),
    Num(f64),
    Ident(String),
}

impl fmt::Display for CondValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CondValue::Str(s) => write!(f, "\"{}\"", s),
            CondValue::Num(n) => write!(f, "{}", n),
            CondValue::Ident(s) => write!(f, "{}", s),
        }
    }
}

/// A bare `when` clause accepted as a snippet: the continuation of a
/// statement started on an earlier line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    pub condition: CondExpr,
    pub span: Span,
}

/// A single statement-level fragment, as produced by the snippet
/// start rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Fragment {
    Statement(Statement),
    Guard(Guard),
}
