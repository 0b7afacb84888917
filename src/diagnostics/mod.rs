//! Diagnostics — compiler problem records and the appendable sink.
//!
//! Recoverable problems never abort tree construction: the offending
//! node is marked invalid for code generation, a [`Problem`] is
//! appended here, and the walk continues so one pass surfaces every
//! independent problem in a document. Structural-invariant violations
//! are NOT diagnostics; see [`crate::tree::StructuralError`].

use std::fmt;

use crate::base::SourceSpan;

// ============================================================================
// PROBLEM KINDS
// ============================================================================

/// The closed catalog of recoverable problem kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// A required attribute is absent from the tag.
    RequiredAttributeMissing,
    /// A required attribute is present but empty.
    EmptyAttribute,
    /// An attribute this tag kind does not allow.
    UnexpectedAttribute,
    /// A child tag this tag kind does not allow.
    UnexpectedTag,
    /// Non-whitespace text where this tag kind allows none.
    UnexpectedText,
    /// A tag whose prefix is not bound to any namespace.
    UnknownNamespace,
    /// An attribute in a foreign namespace.
    PrivateAttribute,
    /// A namespace declaration for a language namespace other than the
    /// document's own.
    OtherLanguageNamespace,
    /// An `id` value that is not a single valid identifier.
    InvalidIdentifierName,
    /// A second specifier with the same name on one instance.
    DuplicateSpecifier,
    /// A tag that resolves to neither a language tag nor a class.
    UnresolvedTag,
    /// A qualified name that the project cannot resolve to a class.
    UnresolvedType,
    /// Attribute or body text that fails to parse as an expression.
    InvalidExpression,
    /// An `@Directive(...)` value with malformed call syntax.
    InvalidDirectiveSyntax,
    /// A directive call missing a required argument.
    RequiredArgumentMissing,
}

impl ProblemKind {
    /// Stable problem code, for tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequiredAttributeMissing => "A0001",
            Self::EmptyAttribute => "A0002",
            Self::UnexpectedAttribute => "A0003",
            Self::UnexpectedTag => "A0004",
            Self::UnexpectedText => "A0005",
            Self::UnknownNamespace => "A0006",
            Self::PrivateAttribute => "A0007",
            Self::OtherLanguageNamespace => "A0008",
            Self::InvalidIdentifierName => "A0009",
            Self::DuplicateSpecifier => "A0010",
            Self::UnresolvedTag => "A0011",
            Self::UnresolvedType => "A0012",
            Self::InvalidExpression => "A0013",
            Self::InvalidDirectiveSyntax => "A0014",
            Self::RequiredArgumentMissing => "A0015",
        }
    }

    /// Default severity for this kind.
    pub fn severity(&self) -> Severity {
        match self {
            Self::PrivateAttribute => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Severity level of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

// ============================================================================
// PROBLEM RECORDS
// ============================================================================

/// One recorded problem: kind, severity, span, rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub span: SourceSpan,
    pub message: String,
}

impl Problem {
    pub fn new(kind: ProblemKind, span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            self.severity.as_str(),
            self.kind.code(),
            self.message
        )
    }
}

// ============================================================================
// SINK
// ============================================================================

/// The appendable problem sink for one document build.
///
/// The tree builder only ever appends; reporting and presentation
/// belong to the caller.
#[derive(Debug, Default)]
pub struct Diagnostics {
    problems: Vec<Problem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a problem record.
    pub fn report(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Count of error-severity problems.
    pub fn error_count(&self) -> usize {
        self.problems
            .iter()
            .filter(|p| p.severity.is_error())
            .count()
    }

    /// All problems of one kind, for tests and tooling.
    pub fn of_kind(&self, kind: ProblemKind) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(move |p| p.kind == kind)
    }
}
