use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    /// Rejects the theme file.
    Error,
}

/// Every condition the validator can report about a theme file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The file could not be read at all.
    ReadFailure,
    /// Wrong token count for a metadata or role line.
    MalformedLine,
    /// The `name` metadata key is absent.
    MissingRequiredMetadata,
    MissingParserVersion,
    UnknownParserVersion,
    /// The `icon`/`avatar` image does not exist or is a directory.
    MissingAsset,
    /// Role id not present in the guild; the line is skipped.
    UnresolvableRole,
    /// Role id declared more than once; the last declaration wins.
    DuplicateRole,
    /// No role line resolved.
    NoRoles,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::ReadFailure
            | DiagnosticKind::MalformedLine
            | DiagnosticKind::MissingRequiredMetadata
            | DiagnosticKind::MissingAsset => Severity::Error,
            DiagnosticKind::MissingParserVersion
            | DiagnosticKind::UnknownParserVersion
            | DiagnosticKind::UnresolvableRole
            | DiagnosticKind::DuplicateRole
            | DiagnosticKind::NoRoles => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line number, when the diagnostic concerns a single line.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Outcome of validating one theme file.
///
/// Diagnostics are logged as they are pushed, prefixed with the file name.
/// A file is accepted when no diagnostic of [`Severity::Error`] was raised.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    file: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => log::error!("[{}] {}", self.file_name(), diagnostic),
            Severity::Warning => log::warn!("[{}] {}", self.file_name(), diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn is_accepted(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_reject() {
        let mut report = ValidationReport::new("themes/a.dat");
        report.push(Diagnostic::new(DiagnosticKind::NoRoles, "no roles"));
        report.push(Diagnostic::new(
            DiagnosticKind::MissingParserVersion,
            "no parser",
        ));
        assert!(report.is_accepted());
        assert_eq!(report.warnings().count(), 2);
        assert_eq!(report.errors().count(), 0);
    }

    #[test]
    fn test_any_error_rejects() {
        let mut report = ValidationReport::new("themes/a.dat");
        report.push(Diagnostic::new(DiagnosticKind::DuplicateRole, "dup").at_line(3));
        report.push(Diagnostic::new(DiagnosticKind::MalformedLine, "bad").at_line(4));
        assert!(!report.is_accepted());
        assert!(report.has(DiagnosticKind::MalformedLine));
        assert_eq!(report.count(DiagnosticKind::DuplicateRole), 1);
        assert_eq!(report.file_name(), "a.dat");
    }

    #[test]
    fn test_display_includes_line() {
        let diagnostic = Diagnostic::new(DiagnosticKind::MalformedLine, "Invalid line").at_line(7);
        assert_eq!(diagnostic.to_string(), "line 7: Invalid line");
        assert_eq!(
            Diagnostic::new(DiagnosticKind::NoRoles, "No roles").to_string(),
            "No roles"
        );
    }
}
