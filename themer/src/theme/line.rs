use super::types::METADATA_PREFIX;

/// Classification of one raw theme file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeLine<'a> {
    /// Comment (`/` or `#` prefix) or blank line.
    Skip,
    /// `MetaData:<key>:<value>`; tokens include the prefix.
    MetaData(Vec<&'a str>),
    /// `<roleId>:<newRoleName>`.
    Role(Vec<&'a str>),
}

impl<'a> ThemeLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.is_empty() || is_comment(line) {
            return ThemeLine::Skip;
        }

        let tokens = split_tokens(line);
        match tokens.first() {
            Some(first) if first.eq_ignore_ascii_case(METADATA_PREFIX) => {
                ThemeLine::MetaData(tokens)
            }
            _ => ThemeLine::Role(tokens),
        }
    }
}

pub fn is_comment(line: &str) -> bool {
    line.starts_with(['/', '#'])
}

/// Split on every `:` and drop trailing empty tokens.
pub fn split_tokens(line: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = line.split(':').collect();
    while tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        assert_eq!(ThemeLine::classify(""), ThemeLine::Skip);
        assert_eq!(ThemeLine::classify("// header"), ThemeLine::Skip);
        assert_eq!(ThemeLine::classify("/single"), ThemeLine::Skip);
        assert_eq!(ThemeLine::classify("# hash"), ThemeLine::Skip);
    }

    #[test]
    fn test_metadata_prefix_is_case_insensitive() {
        assert_eq!(
            ThemeLine::classify("metadata:name:Halloween"),
            ThemeLine::MetaData(vec!["metadata", "name", "Halloween"])
        );
        assert_eq!(
            ThemeLine::classify("METADATA:title:Spooky"),
            ThemeLine::MetaData(vec!["METADATA", "title", "Spooky"])
        );
    }

    #[test]
    fn test_role_lines() {
        assert_eq!(
            ThemeLine::classify("123456789012345678:Ghouls"),
            ThemeLine::Role(vec!["123456789012345678", "Ghouls"])
        );
        assert_eq!(
            ThemeLine::classify("123456789012345678"),
            ThemeLine::Role(vec!["123456789012345678"])
        );
    }

    #[test]
    fn test_trailing_empty_tokens_are_dropped() {
        assert_eq!(split_tokens("MetaData:name:"), vec!["MetaData", "name"]);
        assert_eq!(split_tokens("123:"), vec!["123"]);
        assert!(split_tokens(":::").is_empty());
        assert_eq!(split_tokens(":a"), vec!["", "a"]);
        assert_eq!(split_tokens("a::b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_only_colons_is_an_empty_role_line() {
        assert_eq!(ThemeLine::classify(":::"), ThemeLine::Role(vec![]));
    }
}
