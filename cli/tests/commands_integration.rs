use claims::{assert_err, assert_ok};
use std::path::{Path, PathBuf};
use themer::platform::{BotMember, GuildPlatform, GuildSnapshot, Permission, Role, SnapshotPlatform};
use themer_cli::args::{Cli, Command};
use themer_cli::commands::{CommandStatus, run};
use themer_cli::config::AppConfig;

// Helper module for driving commands against a temporary workspace
mod command_helpers {
    use super::*;

    pub struct Workspace {
        pub dir: tempfile::TempDir,
    }

    impl Workspace {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir(dir.path().join("themes")).unwrap();
            let snapshot = GuildSnapshot::new("100", "Test Guild")
                .with_role(Role::new("222", "Bot", 10))
                .with_role(Role::new("333", "Member", 5))
                .with_bot(BotMember {
                    nickname: Some("Themer".into()),
                    avatar_url: None,
                    role_ids: vec!["222".into()],
                    permissions: vec![Permission::Administrator],
                });
            SnapshotPlatform::new(snapshot)
                .save(&dir.path().join("guild.json"))
                .unwrap();
            Self { dir }
        }

        pub fn themes(&self) -> PathBuf {
            self.dir.path().join("themes")
        }

        pub fn snapshot(&self) -> PathBuf {
            self.dir.path().join("guild.json")
        }

        pub fn write_theme(&self, file: &str, content: &str) -> PathBuf {
            let path = self.themes().join(file);
            std::fs::write(&path, content).unwrap();
            path
        }

        pub fn cli(&self, command: Command) -> Cli {
            Cli {
                config: None,
                themes_dir: Some(self.themes()),
                snapshot: self.snapshot(),
                verbose: false,
                command,
            }
        }

        pub async fn run(&self, command: Command) -> anyhow::Result<(CommandStatus, String)> {
            let mut out = Vec::new();
            let status = run(&self.cli(command), &AppConfig::default(), &mut out).await?;
            Ok((status, String::from_utf8(out).unwrap()))
        }

        pub fn reload_snapshot(&self) -> SnapshotPlatform {
            SnapshotPlatform::load(&self.snapshot()).unwrap()
        }
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }
}

use command_helpers::*;

const HALLOWEEN: &str = "MetaData:name:Halloween\nMetaData:title:Spooky\nMetaData:parser:1.0\n333:Ghouls\n";

#[tokio::test]
async fn test_list_shows_display_name_and_parser() {
    let ws = Workspace::new();
    ws.write_theme("halloween.dat", HALLOWEEN);

    let (status, output) = assert_ok!(ws.run(Command::List).await);
    assert_eq!(status, CommandStatus::Success);
    assert!(output.contains("halloween\tHalloween\t(Parser: 1.0)"));
}

#[tokio::test]
async fn test_show_prints_json_and_fails_for_unknown() {
    let ws = Workspace::new();
    ws.write_theme("halloween.dat", HALLOWEEN);

    let (_, output) = assert_ok!(
        ws.run(Command::Show {
            name: "halloween".into()
        })
        .await
    );
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["server_title"], "Spooky");
    assert_eq!(json["roles"][0]["name"], "Ghouls");

    let error = assert_err!(ws.run(Command::Show { name: "nope".into() }).await);
    assert!(error.to_string().contains("nope"));
}

#[tokio::test]
async fn test_validate_reports_rejection() {
    let ws = Workspace::new();
    let good = ws.write_theme("good.dat", HALLOWEEN);
    let bad = ws.write_theme("bad.dat", "333:Ghouls\n999:Ghost\n");

    let (status, output) = assert_ok!(ws.run(Command::Validate { file: good }).await);
    assert_eq!(status, CommandStatus::Success);
    assert!(output.contains("accepted"));

    let (status, output) = assert_ok!(ws.run(Command::Validate { file: bad }).await);
    assert_eq!(status, CommandStatus::Failure);
    assert!(output.contains("error:"));
    assert!(output.contains("warning:"));
    assert!(output.contains("rejected"));
}

#[tokio::test]
async fn test_dry_run_leaves_snapshot_untouched() {
    let ws = Workspace::new();
    ws.write_theme("halloween.dat", HALLOWEEN);

    let (_, output) = assert_ok!(
        ws.run(Command::Apply {
            name: "halloween".into(),
            dry_run: true,
            save: true,
        })
        .await
    );
    assert!(output.contains("Dry run"));
    assert!(output.contains("rename server to 'Spooky'"));
    assert_eq!(ws.reload_snapshot().server_name(), "Test Guild");
}

#[tokio::test]
async fn test_apply_with_save_persists_changes() {
    let ws = Workspace::new();
    ws.write_theme("halloween.dat", HALLOWEEN);

    let (status, output) = assert_ok!(
        ws.run(Command::Apply {
            name: "halloween".into(),
            dry_run: false,
            save: true,
        })
        .await
    );
    assert_eq!(status, CommandStatus::Success);
    assert!(output.contains("issued: rename role 333 to 'Ghouls'"));

    let platform = ws.reload_snapshot();
    assert_eq!(platform.server_name(), "Spooky");
    assert!(platform.roles().iter().any(|r| r.id == "333" && r.name == "Ghouls"));
}

#[tokio::test]
async fn test_capture_with_register() {
    let ws = Workspace::new();

    let (_, output) = assert_ok!(
        ws.run(Command::Capture {
            name: "current".into(),
            register: true,
        })
        .await
    );
    assert!(output.contains("current.dat"));
    assert!(exists(&ws.themes().join("current.dat")));

    let error = assert_err!(
        ws.run(Command::Capture {
            name: "current".into(),
            register: false,
        })
        .await
    );
    assert!(error.to_string().contains("already exists"));
}

#[tokio::test]
async fn test_missing_snapshot_is_an_error() {
    let ws = Workspace::new();
    std::fs::remove_file(ws.snapshot()).unwrap();
    let error = assert_err!(ws.run(Command::List).await);
    assert!(format!("{error:#}").contains("guild snapshot"));
}
