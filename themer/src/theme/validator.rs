use super::diagnostics::{Diagnostic, DiagnosticKind, ValidationReport};
use super::line::ThemeLine;
use super::types::{ParserVersion, keys};
use crate::assets::{check_asset, resolve_asset_path};
use crate::platform::RoleResolver;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Decides whether a theme file is safe to parse.
///
/// Validation never aborts on the first problem: every line is checked and
/// every post-scan condition is evaluated, so one report lists all of a
/// file's problems.
#[derive(Debug, Clone)]
pub struct ThemeValidator {
    themes_root: PathBuf,
}

impl ThemeValidator {
    pub fn new(themes_root: impl Into<PathBuf>) -> Self {
        Self {
            themes_root: themes_root.into(),
        }
    }

    pub fn themes_root(&self) -> &Path {
        &self.themes_root
    }

    pub fn validate<R: RoleResolver + ?Sized>(&self, file: &Path, roles: &R) -> ValidationReport {
        match std::fs::read_to_string(file) {
            Ok(content) => self.validate_str(file, &content, roles),
            Err(e) => {
                let mut report = ValidationReport::new(file);
                report.push(Diagnostic::new(
                    DiagnosticKind::ReadFailure,
                    format!("Unable to read theme file: {e}"),
                ));
                report
            }
        }
    }

    /// Validate already-read content; `file` is used for asset resolution
    /// and log prefixes.
    pub fn validate_str<R: RoleResolver + ?Sized>(
        &self,
        file: &Path,
        content: &str,
        roles: &R,
    ) -> ValidationReport {
        let mut report = ValidationReport::new(file);
        let mut metadata: HashMap<&str, &str> = HashMap::new();
        let mut seen_roles: HashSet<&str> = HashSet::new();

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            match ThemeLine::classify(line) {
                ThemeLine::Skip => {}
                ThemeLine::MetaData(tokens) => match tokens.as_slice() {
                    [_, key, value] => {
                        if !keys::ALL.contains(key) {
                            log::debug!(
                                "[{}] Unknown metadata key '{}' is ignored",
                                report.file_name(),
                                key
                            );
                        }
                        metadata.insert(*key, *value);
                    }
                    _ => report.push(malformed(line_no, line, "MetaData:<key>:<value>")),
                },
                ThemeLine::Role(tokens) => match tokens.as_slice() {
                    [role_id, _] => {
                        if roles.resolve_role(role_id).is_none() {
                            report.push(
                                Diagnostic::new(
                                    DiagnosticKind::UnresolvableRole,
                                    format!("Invalid Role ID: {role_id}! This line will not be parsed."),
                                )
                                .at_line(line_no),
                            );
                            continue;
                        }
                        if !seen_roles.insert(*role_id) {
                            report.push(
                                Diagnostic::new(
                                    DiagnosticKind::DuplicateRole,
                                    format!(
                                        "Role ID {role_id} is declared more than once; the last declaration wins"
                                    ),
                                )
                                .at_line(line_no),
                            );
                        }
                    }
                    _ => report.push(malformed(line_no, line, "<roleId>:<newRoleName>")),
                },
            }
        }

        if seen_roles.is_empty() {
            report.push(Diagnostic::new(
                DiagnosticKind::NoRoles,
                "Theme contains no valid roles!",
            ));
        }

        if !metadata.contains_key(keys::NAME) {
            report.push(Diagnostic::new(
                DiagnosticKind::MissingRequiredMetadata,
                "Theme is missing the required 'name' metadata",
            ));
        }

        match metadata.get(keys::PARSER) {
            None => report.push(Diagnostic::new(
                DiagnosticKind::MissingParserVersion,
                format!(
                    "Theme does not declare a parser version; using {}",
                    ParserVersion::CURRENT
                ),
            )),
            Some(tag) if !ParserVersion::is_version(tag) => report.push(Diagnostic::new(
                DiagnosticKind::UnknownParserVersion,
                format!(
                    "Unknown parser version '{tag}'; using {}",
                    ParserVersion::CURRENT
                ),
            )),
            Some(_) => {}
        }

        for (key, label) in [(keys::ICON, "server icon"), (keys::AVATAR, "avatar")] {
            if let Some(value) = metadata.get(key) {
                let path = resolve_asset_path(&self.themes_root, file, value);
                if let Err(e) = check_asset(&path) {
                    report.push(Diagnostic::new(
                        DiagnosticKind::MissingAsset,
                        format!(
                            "Invalid {label} image ({e}). Prefix the value with '/' to resolve it under the theme root."
                        ),
                    ));
                }
            }
        }

        if report.is_accepted() {
            log::debug!("[{}] Theme passed validation", report.file_name());
        }
        report
    }
}

fn malformed(line_no: usize, line: &str, expected: &str) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::MalformedLine,
        format!("Invalid line '{line}', expected {expected}"),
    )
    .at_line(line_no)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Role;

    struct Known(&'static [&'static str]);

    impl RoleResolver for Known {
        fn resolve_role(&self, id: &str) -> Option<Role> {
            self.0
                .contains(&id)
                .then(|| Role::new(id, format!("role-{id}"), 1))
        }
    }

    fn validate(content: &str) -> ValidationReport {
        ThemeValidator::new("/nonexistent-themes").validate_str(
            Path::new("/nonexistent-themes/test.dat"),
            content,
            &Known(&["1", "2"]),
        )
    }

    #[test]
    fn test_minimal_theme_is_accepted() {
        let report = validate("MetaData:name:Test\nMetaData:parser:2.0\n1:Red\n");
        assert!(report.is_accepted());
        assert!(report.diagnostics().is_empty());
    }

    #[test]
    fn test_metadata_with_colon_in_value_is_malformed() {
        let report = validate("MetaData:name:Test\nMetaData:title:a:b\n1:Red\n");
        assert!(!report.is_accepted());
        let error = report.errors().next().unwrap();
        assert_eq!(error.kind, DiagnosticKind::MalformedLine);
        assert_eq!(error.line, Some(2));
    }

    #[test]
    fn test_empty_metadata_value_is_malformed() {
        let report = validate("MetaData:name:\n1:Red\n");
        assert!(report.has(DiagnosticKind::MalformedLine));
        assert!(report.has(DiagnosticKind::MissingRequiredMetadata));
    }

    #[test]
    fn test_role_line_token_counts() {
        assert!(validate("MetaData:name:T\n1\n").has(DiagnosticKind::MalformedLine));
        assert!(validate("MetaData:name:T\n1:a:b\n").has(DiagnosticKind::MalformedLine));
        assert!(validate("MetaData:name:T\n1:\n").has(DiagnosticKind::MalformedLine));
    }

    #[test]
    fn test_unresolvable_role_is_warning_only() {
        let report = validate("MetaData:name:T\n1:Red\n999:Ghost\n");
        assert!(report.is_accepted());
        assert!(report.has(DiagnosticKind::UnresolvableRole));
    }

    #[test]
    fn test_no_valid_roles_warns() {
        let report = validate("MetaData:name:T\n999:Ghost\n");
        assert!(report.is_accepted());
        assert!(report.has(DiagnosticKind::NoRoles));
    }

    #[test]
    fn test_duplicate_role_warns() {
        let report = validate("MetaData:name:T\n1:Red\n1:Blue\n");
        assert!(report.is_accepted());
        assert_eq!(report.count(DiagnosticKind::DuplicateRole), 1);
    }

    #[test]
    fn test_parser_version_warnings() {
        assert!(validate("MetaData:name:T\n1:R\n").has(DiagnosticKind::MissingParserVersion));
        let unknown = validate("MetaData:name:T\nMetaData:parser:3.0\n1:R\n");
        assert!(unknown.is_accepted());
        assert!(unknown.has(DiagnosticKind::UnknownParserVersion));
    }

    #[test]
    fn test_missing_assets_are_errors() {
        let report = validate("MetaData:name:T\nMetaData:icon:nope\nMetaData:avatar:nada\n1:R\n");
        assert!(!report.is_accepted());
        assert_eq!(report.count(DiagnosticKind::MissingAsset), 2);
    }

    #[test]
    fn test_unreadable_file_is_rejected() {
        let report = ThemeValidator::new("/nonexistent-themes").validate(
            Path::new("/nonexistent-themes/gone.dat"),
            &Known(&[]),
        );
        assert!(!report.is_accepted());
        assert!(report.has(DiagnosticKind::ReadFailure));
    }
}
