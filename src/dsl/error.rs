use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use super::ast::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum ParseErrorKind {
    UnexpectedToken,
    InvalidExpression,
    MissingToken,
    InvalidStatement,
}

impl ParseErrorKind {
    fn label(self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::InvalidExpression => "invalid expression",
            ParseErrorKind::MissingToken => "missing token",
            ParseErrorKind::InvalidStatement => "invalid statement",
        }
    }
}

/// A syntactic failure with source location. Returned from `parse`, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, TS)]
#[error("[parser] line {}:{}: {message}", .position.line, .position.column)]
#[ts(export)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }

    pub fn unexpected_token(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::UnexpectedToken, message, position)
    }

    pub fn invalid_expression(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::InvalidExpression, message, position)
    }

    pub fn missing_token(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::MissingToken, message, position)
    }

    pub fn invalid_statement(message: impl Into<String>, position: Position) -> Self {
        Self::new(ParseErrorKind::InvalidStatement, message, position)
    }

    /// Format the error with the offending source line and a caret under the column.
    pub fn format_with_source(&self, source: &str) -> String {
        format!("{self} ({})\n{}", self.kind.label(), caret(source, self.position))
    }
}

/// The source line at `position` with a caret under its column.
fn caret(source: &str, position: Position) -> String {
    let line = source.lines().nth(position.line.saturating_sub(1)).unwrap_or("");
    let marker = " ".repeat(position.column.saturating_sub(1));
    format!("{line}\n{marker}^")
}

/// Failures inside the scope resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("'{0}' is already defined in this scope")]
    AlreadyDefined(String),
    #[error("cannot exit the global scope")]
    ExitGlobalScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum GenerateErrorKind {
    DuplicateDeclaration,
    UnresolvedReference,
    MalformedExpression,
    ScopeUnderflow,
}

/// A semantic failure raised by the generator. Generation produces no partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, TS)]
#[serde(tag = "kind")]
#[ts(export)]
pub enum GenerateError {
    #[error("[generate] line {}:{}: '{name}' is already declared", .position.line, .position.column)]
    DuplicateDeclaration { name: String, position: Position },
    #[error("[generate] line {}:{}: '{name}' is not defined", .position.line, .position.column)]
    UnresolvedReference { name: String, position: Position },
    #[error("[generate] line {}:{}: {message}", .position.line, .position.column)]
    MalformedExpression { message: String, position: Position },
    /// Unbalanced scope handling inside the generator itself.
    #[error("[generate] internal error: scope exit without matching enter")]
    ScopeUnderflow,
}

impl GenerateError {
    pub fn kind(&self) -> GenerateErrorKind {
        match self {
            GenerateError::DuplicateDeclaration { .. } => GenerateErrorKind::DuplicateDeclaration,
            GenerateError::UnresolvedReference { .. } => GenerateErrorKind::UnresolvedReference,
            GenerateError::MalformedExpression { .. } => GenerateErrorKind::MalformedExpression,
            GenerateError::ScopeUnderflow => GenerateErrorKind::ScopeUnderflow,
        }
    }

    pub fn malformed(message: impl Into<String>, position: Position) -> Self {
        GenerateError::MalformedExpression {
            message: message.into(),
            position,
        }
    }

    /// Attach a position to a scope failure.
    pub fn from_scope(err: ScopeError, position: Position) -> Self {
        match err {
            ScopeError::AlreadyDefined(name) => GenerateError::DuplicateDeclaration { name, position },
            ScopeError::ExitGlobalScope => GenerateError::ScopeUnderflow,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            GenerateError::DuplicateDeclaration { position, .. }
            | GenerateError::UnresolvedReference { position, .. }
            | GenerateError::MalformedExpression { position, .. } => Some(*position),
            GenerateError::ScopeUnderflow => None,
        }
    }
}

/// Either tier, for callers that run the whole pipeline at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl CompileError {
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Parse(e) => Some(e.position),
            CompileError::Generate(e) => e.position(),
        }
    }

    /// Display text followed by a caret excerpt when the error has a location.
    pub fn format_with_source(&self, source: &str) -> String {
        match self {
            CompileError::Parse(e) => e.format_with_source(source),
            CompileError::Generate(_) => match self.position() {
                Some(position) => format!("{self}\n{}", caret(source, position)),
                None => self.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::missing_token("Expected ⏹️ (stop)", Position::new(2, 5));
        assert_eq!(err.to_string(), "[parser] line 2:5: Expected ⏹️ (stop)");
    }

    #[test]
    fn format_with_source_points_at_column() {
        let err = ParseError::unexpected_token("bad", Position::new(2, 3));
        let text = err.format_with_source("📢 1️⃣\n🍉 abc");
        assert_eq!(text, "[parser] line 2:3: bad (unexpected token)\n🍉 abc\n  ^");
    }

    #[test]
    fn scope_errors_map_to_generate_errors() {
        let pos = Position::new(1, 1);
        let dup = GenerateError::from_scope(ScopeError::AlreadyDefined("🍉".into()), pos);
        assert_eq!(dup.kind(), GenerateErrorKind::DuplicateDeclaration);
        assert_eq!(dup.position(), Some(pos));
        let underflow = GenerateError::from_scope(ScopeError::ExitGlobalScope, pos);
        assert_eq!(underflow, GenerateError::ScopeUnderflow);
        assert_eq!(underflow.position(), None);
    }

    #[test]
    fn compile_error_is_transparent() {
        let err: CompileError = GenerateError::UnresolvedReference {
            name: "🐙".into(),
            position: Position::new(4, 2),
        }
        .into();
        assert_eq!(err.to_string(), "[generate] line 4:2: '🐙' is not defined");
        assert_eq!(err.position(), Some(Position::new(4, 2)));
    }

    #[test]
    fn compile_error_excerpt_uses_position() {
        let source = "📢 1️⃣\n🫑 🐙 👉 🍴";
        let err: CompileError = GenerateError::UnresolvedReference {
            name: "🐙".into(),
            position: Position::new(2, 3),
        }
        .into();
        assert_eq!(
            err.format_with_source(source),
            "[generate] line 2:3: '🐙' is not defined\n🫑 🐙 👉 🍴\n  ^"
        );
        let underflow = CompileError::from(GenerateError::ScopeUnderflow);
        assert_eq!(underflow.format_with_source(source), underflow.to_string());
    }
}
