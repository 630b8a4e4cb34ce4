use std::path::PathBuf;
use thiserror::Error;

/// Checked failures surfaced by the theme system.
///
/// Only a handful of conditions are reported to callers through this type.
/// Everything that concerns the content of a single theme file (malformed
/// lines, unknown roles, missing metadata) is reported as a
/// [`Diagnostic`](crate::theme::Diagnostic) instead, so one bad file never
/// aborts a batch load and one failed mutation never aborts an apply.
///
/// # Error Categories
///
/// ## Registry Errors
/// - [`ThemeNotFound`] - Lookup or apply against an unregistered theme
///
/// ## Export Errors
/// - [`ThemeAlreadyExists`] - Capture refuses to overwrite an existing file
/// - [`InvalidThemeName`] - Capture name cannot be used as a file name
/// - [`ExportRejected`] - The exporter produced a file its own validator rejects
///
/// ## File and Asset Errors
/// - [`UnvalidatedInput`] - The parser was handed a file the validator would reject
/// - [`Io`] - Reading or writing a theme file or directory failed
/// - [`Asset`] - Reading, fetching or re-encoding an image failed
///
/// # Examples
///
/// ```no_run
/// use themer::ThemeError;
///
/// fn describe(error: &ThemeError) -> &'static str {
///     match error {
///         ThemeError::ThemeNotFound { .. } => "pick one of the registered themes",
///         ThemeError::ThemeAlreadyExists { .. } => "choose another export name",
///         ThemeError::ExportRejected { .. } => "exporter bug, please report it",
///         _ => "see the log for details",
///     }
/// }
/// ```
///
/// [`ThemeNotFound`]: ThemeError::ThemeNotFound
/// [`ThemeAlreadyExists`]: ThemeError::ThemeAlreadyExists
/// [`InvalidThemeName`]: ThemeError::InvalidThemeName
/// [`ExportRejected`]: ThemeError::ExportRejected
/// [`UnvalidatedInput`]: ThemeError::UnvalidatedInput
/// [`Io`]: ThemeError::Io
/// [`Asset`]: ThemeError::Asset
#[derive(Debug, Error)]
pub enum ThemeError {
    /// No theme with this name is registered.
    #[error("Invalid or un-parsed theme: '{name}'")]
    ThemeNotFound { name: String },

    /// A theme file with this name already exists in the theme directory.
    #[error("Theme file already exists: {}", path.display())]
    ThemeAlreadyExists { path: PathBuf },

    /// The requested theme name cannot be used to create a theme file.
    #[error("Invalid theme name '{name}': {reason}")]
    InvalidThemeName { name: String, reason: String },

    /// The parser met a line it cannot handle.
    ///
    /// The parser assumes its input already passed validation. Hitting this
    /// error means that precondition was broken by the caller.
    #[error("Theme file {} was not validated before parsing (line {line})", path.display())]
    UnvalidatedInput { path: PathBuf, line: usize },

    /// A freshly exported file was rejected by the validator.
    ///
    /// This signals a defect in the exporter/validator pairing rather than a
    /// user authoring error.
    #[error(
        "Exported theme {} was rejected by its own validator: {}",
        path.display(),
        diagnostics.join("; ")
    )]
    ExportRejected {
        path: PathBuf,
        diagnostics: Vec<String>,
    },

    /// File system failure on a theme file or directory.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image asset failure.
    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl ThemeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ThemeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Image asset failures (the AssetIOFailure category).
///
/// Raised while resolving, reading, fetching or re-encoding the PNG files
/// referenced by `icon` and `avatar` metadata. During apply these are logged
/// and never stop the remaining steps.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Image file does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("Image path is a directory: {}", path.display())]
    NotAFile { path: PathBuf },

    #[error("Failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {origin}: {reason}")]
    Decode { origin: String, reason: String },

    #[error("Failed to write image {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error(transparent)]
    Fetch(#[from] HttpError),
}

/// HTTP-related errors for remote image fetches.
///
/// # Error Categories
///
/// - [`ClientCreation`] - HTTP client initialization failures
/// - [`RequestFailed`] - Transport level failures with URL and reason
/// - [`Status`] - Non-success HTTP status
/// - [`InvalidResponse`] - Unexpected response body
///
/// [`ClientCreation`]: HttpError::ClientCreation
/// [`RequestFailed`]: HttpError::RequestFailed
/// [`Status`]: HttpError::Status
/// [`InvalidResponse`]: HttpError::InvalidResponse
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP client initialization failed.
    #[error("HTTP client creation failed: {reason}")]
    ClientCreation { reason: String },

    /// HTTP request execution failed before a response was received.
    #[error("Request failed: {url} - {reason}")]
    RequestFailed { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Received response doesn't match expected format.
    #[error("Invalid response: expected {expected}, got {actual}")]
    InvalidResponse { expected: String, actual: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_not_found_message_names_theme() {
        let error = ThemeError::ThemeNotFound {
            name: "halloween".to_string(),
        };
        assert!(error.to_string().contains("halloween"));
    }

    #[test]
    fn test_export_rejected_lists_diagnostics() {
        let error = ThemeError::ExportRejected {
            path: PathBuf::from("themes/snap.dat"),
            diagnostics: vec!["line 3: bad".to_string(), "no name".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("snap.dat"));
        assert!(message.contains("line 3: bad; no name"));
    }

    #[test]
    fn test_http_error_converts_into_theme_error() {
        let http = HttpError::Status {
            url: "https://cdn.example/icon.png".to_string(),
            status: 404,
        };
        let error: ThemeError = AssetError::from(http).into();
        assert!(matches!(error, ThemeError::Asset(AssetError::Fetch(_))));
        assert!(error.to_string().contains("404"));
    }
}
