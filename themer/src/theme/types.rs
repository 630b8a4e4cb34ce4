use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extension identifying theme files inside the theme directory.
pub const THEME_EXTENSION: &str = "dat";

/// First token of a metadata line, matched case-insensitively.
pub const METADATA_PREFIX: &str = "MetaData";

/// Recognized metadata keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const TITLE: &str = "title";
    pub const ICON: &str = "icon";
    pub const AVATAR: &str = "avatar";
    pub const NICKNAME: &str = "nickname";
    pub const PARSER: &str = "parser";

    pub const ALL: [&str; 6] = [NAME, TITLE, ICON, AVATAR, NICKNAME, PARSER];
}

/// Theme file dialect declared by the `parser` metadata key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserVersion {
    V1,
    V2,
}

impl ParserVersion {
    /// The newest dialect; used whenever a file omits or misstates its version.
    pub const CURRENT: ParserVersion = ParserVersion::V2;

    pub const ALL: [ParserVersion; 2] = [ParserVersion::V1, ParserVersion::V2];

    pub fn tag(&self) -> &'static str {
        match self {
            ParserVersion::V1 => "1.0",
            ParserVersion::V2 => "2.0",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }

    pub fn is_version(tag: &str) -> bool {
        Self::from_tag(tag).is_some()
    }

    /// Resolve an optional declared tag, falling back to [`Self::CURRENT`].
    pub fn resolve(tag: Option<&str>) -> Self {
        tag.and_then(Self::from_tag).unwrap_or(Self::CURRENT)
    }
}

impl fmt::Display for ParserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ParserVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// One role rename: the role to touch and the name it gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRemap {
    pub role_id: String,
    pub name: String,
}

/// Finalized, immutable form of one theme file.
///
/// Produced only by [`ThemeTokenBuilder::finalize`]. Re-parsing a file makes
/// a new token that replaces the old registry entry; tokens themselves are
/// never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeToken {
    name: String,
    display_name: String,
    server_title: Option<String>,
    icon: Option<String>,
    avatar: Option<String>,
    nickname: Option<String>,
    parser_version: ParserVersion,
    roles: Vec<RoleRemap>,
    #[serde(skip)]
    source: PathBuf,
}

impl ThemeToken {
    /// Registry key, taken from the file name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn server_title(&self) -> Option<&str> {
        self.server_title.as_deref()
    }

    /// Base file name of the server icon image.
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Base file name of the bot avatar image.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    pub fn parser_version(&self) -> ParserVersion {
        self.parser_version
    }

    /// Role renames in first-declaration order.
    pub fn roles(&self) -> &[RoleRemap] {
        &self.roles
    }

    pub fn role_name(&self, role_id: &str) -> Option<&str> {
        self.roles
            .iter()
            .find(|r| r.role_id == role_id)
            .map(|r| r.name.as_str())
    }

    /// Theme file this token was parsed from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Mutable accumulator the parser fills before finalizing a [`ThemeToken`].
#[derive(Debug)]
pub struct ThemeTokenBuilder {
    name: String,
    source: PathBuf,
    metadata: HashMap<String, String>,
    roles: Vec<RoleRemap>,
}

impl ThemeTokenBuilder {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            metadata: HashMap::new(),
            roles: Vec::new(),
        }
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Later declarations of the same role id replace the earlier name but
    /// keep its position.
    pub fn add_role(&mut self, role_id: &str, name: &str) {
        match self.roles.iter_mut().find(|r| r.role_id == role_id) {
            Some(existing) => existing.name = name.to_string(),
            None => self.roles.push(RoleRemap {
                role_id: role_id.to_string(),
                name: name.to_string(),
            }),
        }
    }

    pub fn finalize(mut self) -> ThemeToken {
        let display_name = self
            .metadata
            .remove(keys::NAME)
            .unwrap_or_else(|| self.name.clone());
        let parser_version = ParserVersion::resolve(self.metadata.get(keys::PARSER).map(|s| s.as_str()));

        ThemeToken {
            display_name,
            server_title: self.metadata.remove(keys::TITLE),
            icon: self.metadata.remove(keys::ICON),
            avatar: self.metadata.remove(keys::AVATAR),
            nickname: self.metadata.remove(keys::NICKNAME),
            parser_version,
            roles: self.roles,
            source: self.source,
            name: self.name,
        }
    }
}
