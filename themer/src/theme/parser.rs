use super::line::ThemeLine;
use super::types::{ThemeToken, ThemeTokenBuilder};
use crate::common::ThemeError;
use crate::platform::RoleResolver;
use std::path::Path;

/// Converts a validated theme file into a [`ThemeToken`].
///
/// Callers must run [`ThemeValidator`](super::ThemeValidator) on the same
/// content first. A line the validator would have rejected surfaces as
/// [`ThemeError::UnvalidatedInput`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThemeParser;

impl ThemeParser {
    pub fn parse<R: RoleResolver + ?Sized>(
        &self,
        file: &Path,
        roles: &R,
    ) -> Result<ThemeToken, ThemeError> {
        let content = std::fs::read_to_string(file).map_err(|e| ThemeError::io(file, e))?;
        self.parse_str(file, &content, roles)
    }

    pub fn parse_str<R: RoleResolver + ?Sized>(
        &self,
        file: &Path,
        content: &str,
        roles: &R,
    ) -> Result<ThemeToken, ThemeError> {
        let name = theme_name(file);
        log::debug!("[{name}] Parsing theme");

        let mut builder = ThemeTokenBuilder::new(name.clone(), file);
        for (index, line) in content.lines().enumerate() {
            let unvalidated = || ThemeError::UnvalidatedInput {
                path: file.to_path_buf(),
                line: index + 1,
            };

            match ThemeLine::classify(line) {
                ThemeLine::Skip => {}
                ThemeLine::MetaData(tokens) => match tokens.as_slice() {
                    [_, key, value] => builder.add_metadata(key, value),
                    _ => return Err(unvalidated()),
                },
                ThemeLine::Role(tokens) => match tokens.as_slice() {
                    [role_id, new_name] => {
                        // Guild roles may have changed since validation.
                        if roles.resolve_role(role_id).is_none() {
                            log::error!("[{name}] Unparseable role line '{line}': unknown role id");
                            continue;
                        }
                        builder.add_role(role_id, new_name);
                    }
                    _ => return Err(unvalidated()),
                },
            }
        }

        let token = builder.finalize();
        log::debug!(
            "[{name}] Parsed '{}' with {} role(s), parser {}",
            token.display_name(),
            token.roles().len(),
            token.parser_version()
        );
        Ok(token)
    }
}

/// Registry key for a theme file: its file name without the extension.
pub fn theme_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
