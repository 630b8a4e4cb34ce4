use crate::common::ThemeError;

/// Core validation trait that all validators must implement.
///
/// # Type Parameters
///
/// * `T` - The type of data being validated (can be unsized like `str`)
///
/// # Examples
///
/// ```
/// use themer::validation::Validator;
///
/// struct NonEmpty;
/// impl Validator<str> for NonEmpty {
///     type Error = String;
///
///     fn validate(&self, input: &str) -> Result<(), Self::Error> {
///         if input.is_empty() {
///             Err("Input cannot be empty".to_string())
///         } else {
///             Ok(())
///         }
///     }
/// }
/// ```
pub trait Validator<T: ?Sized> {
    type Error;

    /// Validate the input and return Ok(()) if valid, or Err with validation error
    fn validate(&self, input: &T) -> Result<(), Self::Error>;
}

const MAX_THEME_NAME_LEN: usize = 50;

/// Validator for theme names that become file names on disk
pub struct ThemeNameValidator;

impl ThemeNameValidator {
    fn reject(name: &str, reason: &str) -> ThemeError {
        ThemeError::InvalidThemeName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Validator<str> for ThemeNameValidator {
    type Error = ThemeError;

    fn validate(&self, input: &str) -> Result<(), Self::Error> {
        if input.is_empty() {
            return Err(Self::reject(input, "Name cannot be empty"));
        }

        if input.chars().count() > MAX_THEME_NAME_LEN {
            return Err(Self::reject(input, "Name too long (max 50 characters)"));
        }

        // Alphanumeric, hyphens and underscores only; this also rules out
        // path separators and the ':' token delimiter.
        if !input
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Self::reject(
                input,
                "Name contains invalid characters (only alphanumeric, hyphens, and underscores allowed)",
            ));
        }

        if input.starts_with(['-', '_']) || input.ends_with(['-', '_']) {
            return Err(Self::reject(
                input,
                "Name cannot start or end with hyphens or underscores",
            ));
        }

        Ok(())
    }
}
