//! Theme files: tokenizing, validating, parsing, registering, exporting
//! and applying.
//!
//! A theme file is line oriented. Lines starting with `/` or `#` are
//! comments, `MetaData:<key>:<value>` lines set metadata and every other
//! line is `<roleId>:<newRoleName>`. Files are always validated before they
//! are parsed; only accepted files reach the [`ThemeRegistry`].

pub mod applier;
pub mod diagnostics;
pub mod exporter;
pub mod line;
pub mod parser;
pub mod registry;
pub mod types;
pub mod validator;

pub use applier::{ApplyReport, SkipReason, SkippedStep, ThemeApplier};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, ValidationReport};
pub use exporter::ThemeExporter;
pub use line::ThemeLine;
pub use parser::{ThemeParser, theme_name};
pub use registry::ThemeRegistry;
pub use types::{
    METADATA_PREFIX, ParserVersion, RoleRemap, THEME_EXTENSION, ThemeToken, ThemeTokenBuilder,
    keys,
};
pub use validator::ThemeValidator;
