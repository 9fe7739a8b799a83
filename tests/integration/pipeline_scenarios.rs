//! End-to-end pipeline runs against temp directories.

use super::test_utils::{Fixture, NeverAsked, SAMPLE};
use pkgsplit::verify::VerifyStatus;
use pkgsplit::{CommitState, FixedAnswer, Pipeline, ScriptedConfirm, SplitError};
use std::collections::BTreeSet;
use std::fs;

fn flags(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_end_to_end_commit() {
    let fx = Fixture::new(SAMPLE);
    let pipeline = Pipeline::new(fx.config()).unwrap();

    let mut staged_files = Vec::new();
    let outcome = pipeline
        .run(&mut FixedAnswer(true), |prepared| {
            assert!(prepared.report.passed());
            for file in &prepared.written.files {
                staged_files.push((
                    file.file_name().unwrap().to_string_lossy().into_owned(),
                    fs::read_to_string(file).unwrap(),
                ));
            }
            Ok(())
        })
        .unwrap();

    assert_eq!(
        staged_files,
        vec![(
            "dev-lang_python".to_string(),
            "dev-lang/python X Y Z\n".to_string()
        )]
    );
    assert_eq!(outcome.state, CommitState::Committed);
    assert_eq!(outcome.report.status, VerifyStatus::Consolidated);

    assert!(fx.source.is_dir(), "original replaced by directory");
    assert_eq!(
        fs::read_to_string(fx.source.join("dev-lang_python")).unwrap(),
        "dev-lang/python X Y Z\n"
    );
    assert!(!fx.staging_dir().exists());
    assert_eq!(outcome.retained_backup, Some(fx.backup_file()));
    assert_eq!(fs::read_to_string(fx.backup_file()).unwrap(), SAMPLE);
}

#[test]
fn test_dry_run_never_prompts_and_leaves_nothing() {
    let fx = Fixture::new(SAMPLE);
    let mut config = fx.config();
    config.dry_run = true;
    let pipeline = Pipeline::new(config).unwrap();

    let mut saw_staging = false;
    let outcome = pipeline
        .run(&mut NeverAsked, |prepared| {
            saw_staging = prepared.written.dir.is_dir();
            Ok(())
        })
        .unwrap();

    assert!(saw_staging);
    assert_eq!(outcome.state, CommitState::Aborted);
    assert!(outcome.dry_run);
    assert_eq!(fs::read_to_string(&fx.source).unwrap(), SAMPLE);
    assert!(!fx.staging_dir().exists());
    assert!(!fx.backup_file().exists());
}

#[test]
fn test_abort_keeps_original_byte_identical() {
    let fx = Fixture::new(SAMPLE);
    let before = fs::read(&fx.source).unwrap();
    let pipeline = Pipeline::new(fx.config()).unwrap();

    let mut confirm = ScriptedConfirm::new(["maybe", "NO"]);
    let outcome = pipeline.run(&mut confirm, |_| Ok(())).unwrap();

    assert_eq!(confirm.asked, 2);
    assert_eq!(outcome.state, CommitState::Aborted);
    assert_eq!(fs::read(&fx.source).unwrap(), before);
    assert!(!fx.staging_dir().exists());
    assert!(!fx.backup_file().exists());
}

#[test]
fn test_malformed_lines_skipped() {
    let fx = Fixture::new("sys-apps/lonely\nsys-apps/portage ipc\n\n# c\napp-misc/foo a\n");
    let mut config = fx.config();
    config.dry_run = true;
    let outcome = Pipeline::new(config)
        .unwrap()
        .run(&mut NeverAsked, |_| Ok(()))
        .unwrap();

    assert_eq!(outcome.malformed.len(), 1);
    assert_eq!(outcome.malformed[0].line_number, 1);
    assert!(!outcome.packages.contains_key("sys-apps/lonely"));
    assert_eq!(outcome.packages["sys-apps/portage"], flags(&["ipc"]));
    assert_eq!(outcome.packages["app-misc/foo"], flags(&["a"]));
    assert!(outcome.report.passed());
}

#[test]
fn test_collision_is_fatal_and_cleaned_up() {
    let fx = Fixture::new("a/b_c x\na_b/c y\n");
    let pipeline = Pipeline::new(fx.config()).unwrap();

    let err = pipeline.run(&mut NeverAsked, |_| Ok(())).unwrap_err();

    assert!(matches!(err, SplitError::NameCollision { .. }), "{err}");
    assert_eq!(fs::read_to_string(&fx.source).unwrap(), "a/b_c x\na_b/c y\n");
    assert!(!fx.staging_dir().exists());
    assert!(!fx.backup_file().exists());
}

#[test]
fn test_presentation_error_ends_run_before_prompt() {
    let fx = Fixture::new(SAMPLE);
    let pipeline = Pipeline::new(fx.config()).unwrap();

    let err = pipeline
        .run(&mut NeverAsked, |_| {
            let broken = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            Err(SplitError::Render(broken))
        })
        .unwrap_err();

    assert!(matches!(err, SplitError::Render(_)), "{err}");
    assert_eq!(fs::read_to_string(&fx.source).unwrap(), SAMPLE);
    assert!(!fx.staging_dir().exists());
    assert!(!fx.backup_file().exists());
}

#[test]
fn test_missing_source_is_not_found() {
    let fx = Fixture::new("");
    fs::remove_file(&fx.source).unwrap();
    let err = Pipeline::new(fx.config())
        .unwrap()
        .run(&mut NeverAsked, |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, SplitError::NotFound(_)));
}

#[test]
fn test_already_converted_source_rejected() {
    let fx = Fixture::new(SAMPLE);
    Pipeline::new(fx.config())
        .unwrap()
        .run(&mut FixedAnswer(true), |_| Ok(()))
        .unwrap();

    // Second run sees a directory; the retained backup must survive it.
    let err = Pipeline::new(fx.config())
        .unwrap()
        .run(&mut NeverAsked, |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, SplitError::InvalidInput { .. }));
    assert!(fx.backup_file().exists());
}

#[test]
fn test_stale_artifacts_replaced() {
    let fx = Fixture::new(SAMPLE);
    fs::create_dir_all(fx.staging_dir()).unwrap();
    fs::write(fx.staging_dir().join("leftover"), "old/pkg z\n").unwrap();
    fs::write(fx.backup_file(), "old backup").unwrap();

    let mut config = fx.config();
    config.dry_run = true;
    let outcome = Pipeline::new(config)
        .unwrap()
        .run(&mut NeverAsked, |prepared| {
            assert!(!prepared.written.dir.join("leftover").exists());
            Ok(())
        })
        .unwrap();

    assert!(outcome.report.passed());
    assert!(!fx.staging_dir().exists());
}

#[test]
fn test_existing_staging_without_clean_stale_is_fatal() {
    let fx = Fixture::new(SAMPLE);
    fs::create_dir_all(fx.staging_dir()).unwrap();
    fs::write(fx.staging_dir().join("keep-me"), "x").unwrap();

    let mut config = fx.config();
    config.clean_stale = false;
    let err = Pipeline::new(config)
        .unwrap()
        .run(&mut NeverAsked, |_| Ok(()))
        .unwrap_err();

    assert!(matches!(err, SplitError::TargetExists(_)));
    assert!(
        fx.staging_dir().join("keep-me").exists(),
        "pre-existing directory is not ours to delete"
    );
    assert!(!fx.backup_file().exists());
    assert_eq!(fs::read_to_string(&fx.source).unwrap(), SAMPLE);
}

#[test]
fn test_commit_without_keeping_backup() {
    let fx = Fixture::new(SAMPLE);
    let mut config = fx.config();
    config.keep_backup = false;
    let outcome = Pipeline::new(config)
        .unwrap()
        .run(&mut FixedAnswer(true), |_| Ok(()))
        .unwrap();

    assert_eq!(outcome.state, CommitState::Committed);
    assert!(outcome.retained_backup.is_none());
    assert!(!fx.backup_file().exists());
    assert!(fx.source.is_dir());
}

#[cfg(unix)]
#[test]
fn test_permission_failure_on_commit_keeps_original() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new(SAMPLE);
    let etc = fx.source.parent().unwrap().to_path_buf();
    fs::set_permissions(&etc, fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore directory modes; nothing to test then.
    let writable = etc.join(".writable");
    if fs::write(&writable, "").is_ok() {
        fs::remove_file(&writable).ok();
        fs::set_permissions(&etc, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = Pipeline::new(fx.config())
        .unwrap()
        .run(&mut FixedAnswer(true), |_| Ok(()));
    fs::set_permissions(&etc, fs::Permissions::from_mode(0o755)).unwrap();

    let err = result.unwrap_err();
    assert!(matches!(err, SplitError::PermissionDenied { .. }), "{err}");
    assert_eq!(fs::read_to_string(&fx.source).unwrap(), SAMPLE);
    assert!(!fx.staging_dir().exists());
    assert!(!fx.backup_file().exists());
}
