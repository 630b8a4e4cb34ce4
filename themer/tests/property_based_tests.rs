use proptest::prelude::*;
use std::path::Path;
use themer::platform::{GuildSnapshot, Role, RoleResolver, SnapshotPlatform};
use themer::theme::{DiagnosticKind, ThemeLine, ThemeParser, ThemeValidator, line::split_tokens};

struct AnyNumeric;

impl RoleResolver for AnyNumeric {
    fn resolve_role(&self, id: &str) -> Option<Role> {
        id.parse::<u64>().ok().map(|_| Role::new(id, "existing", 1))
    }
}

fn validate(content: &str) -> themer::theme::ValidationReport {
    ThemeValidator::new("/no-such-root").validate_str(
        Path::new("/no-such-root/prop.dat"),
        content,
        &AnyNumeric,
    )
}

#[cfg(test)]
mod tokenizer_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_split_never_ends_with_empty_token(line in "[a-z:]{0,20}") {
            let tokens = split_tokens(&line);
            prop_assert!(tokens.last().is_none_or(|t| !t.is_empty()));
            prop_assert!(tokens.iter().all(|t| !t.contains(':')));
        }

        #[test]
        fn test_comment_lines_are_always_skipped(body in "[^\n]{0,30}", hash in any::<bool>()) {
            let line = format!("{}{}", if hash { "#" } else { "/" }, body);
            prop_assert_eq!(ThemeLine::classify(&line), ThemeLine::Skip);
        }
    }
}

#[cfg(test)]
mod validator_property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_missing_name_always_rejected(
            roles in prop::collection::vec((1u64..1_000_000, "[A-Za-z ]{1,12}"), 0..8),
            title in "[A-Za-z ]{1,12}"
        ) {
            let mut content = format!("MetaData:title:{title}\n");
            for (id, name) in &roles {
                content.push_str(&format!("{id}:{name}\n"));
            }
            let report = validate(&content);
            prop_assert!(!report.is_accepted());
            prop_assert!(report.has(DiagnosticKind::MissingRequiredMetadata));
        }

        #[test]
        fn test_wrong_metadata_arity_always_rejected(
            extra in prop::collection::vec("[a-z]{1,5}", 0..5)
        ) {
            prop_assume!(extra.len() != 2);
            let line = std::iter::once("MetaData".to_string())
                .chain(extra.iter().cloned())
                .collect::<Vec<_>>()
                .join(":");
            let report = validate(&format!("MetaData:name:T\n{line}\n1:R\n"));
            prop_assert!(report.has(DiagnosticKind::MalformedLine));
        }

        #[test]
        fn test_unresolvable_roles_never_reject_or_parse(
            good in prop::collection::vec((1u64..1_000, "[A-Za-z]{1,8}"), 1..5),
            bad in prop::collection::vec("[a-z]{1,7}", 1..5)
        ) {
            let mut content = String::from("MetaData:name:Prop\nMetaData:parser:2.0\n");
            for (id, name) in &good {
                content.push_str(&format!("{id}:{name}\n"));
            }
            for id in &bad {
                content.push_str(&format!("{id}:Ghost\n"));
            }

            let report = validate(&content);
            prop_assert!(report.is_accepted());
            prop_assert_eq!(report.count(DiagnosticKind::UnresolvableRole), bad.len());

            let token = ThemeParser
                .parse_str(Path::new("/no-such-root/prop.dat"), &content, &AnyNumeric)
                .unwrap();
            for id in &bad {
                prop_assert!(token.role_name(id).is_none());
            }
        }

        #[test]
        fn test_parse_is_deterministic_and_last_declared_wins(
            roles in prop::collection::vec((1u64..20, "[A-Za-z]{1,8}"), 1..12)
        ) {
            let mut content = String::from("MetaData:name:Prop\n");
            for (id, name) in &roles {
                content.push_str(&format!("{id}:{name}\n"));
            }
            let file = Path::new("/no-such-root/prop.dat");

            let first = ThemeParser.parse_str(file, &content, &AnyNumeric).unwrap();
            let second = ThemeParser.parse_str(file, &content, &AnyNumeric).unwrap();
            prop_assert_eq!(&first, &second);

            for (id, _) in &roles {
                let id = id.to_string();
                let last = roles
                    .iter()
                    .rev()
                    .find(|(other, _)| other.to_string() == id)
                    .map(|(_, name)| name.as_str());
                prop_assert_eq!(
                    first.roles().iter().filter(|r| r.role_id == id).count(),
                    1
                );
                prop_assert_eq!(first.role_name(&id), last);
            }
        }
    }
}

#[cfg(test)]
mod export_property_tests {
    use super::*;
    use std::sync::Arc;
    use themer::assets::AssetFetcher;
    use themer::theme::ThemeExporter;

    struct NoImages;

    #[async_trait::async_trait]
    impl AssetFetcher for NoImages {
        async fn fetch_png(
            &self,
            url: &str,
            _destination: &Path,
        ) -> Result<(), themer::AssetError> {
            Err(themer::AssetError::Decode {
                origin: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_exported_theme_always_validates(
            guild_name in "\\PC{0,24}",
            nickname in proptest::option::of("\\PC{0,16}"),
            role_names in prop::collection::vec("(\\PC|\n|\r|:){0,16}", 0..10)
        ) {
            let mut snapshot = GuildSnapshot::new("1", guild_name);
            for (index, name) in role_names.iter().enumerate() {
                let id = (1000 + index).to_string();
                snapshot = snapshot.with_role(Role::new(id, name.clone(), index as i64 + 1));
            }
            snapshot.bot.nickname = nickname;
            snapshot.icon_url = Some("https://cdn.example/icon.png".to_string());
            let platform = SnapshotPlatform::new(snapshot);

            let dir = tempfile::tempdir().unwrap();
            let exporter = ThemeExporter::new(dir.path(), Arc::new(NoImages));
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let path = runtime
                .block_on(exporter.capture(&platform, "prop"))
                .unwrap();

            let report = ThemeValidator::new(dir.path()).validate(&path, &platform);
            prop_assert!(report.is_accepted(), "{:?}", report.diagnostics());
        }
    }
}
