//! End-to-end tests for the covert CLI.
//!
//! These run the compiled binary against fabricated store layouts in temp
//! directories. Paths that would shell out to gpg or pass are avoided;
//! everything here exercises validation, authorization, registry handling,
//! and error surfacing.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ALICE: &str = "alice@example.com";

/// A covert command rooted in an isolated fake Git repository.
fn covert(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("covert").unwrap();
    cmd.current_dir(tmp.path());
    cmd.env_remove("COVERT_SECRETS_DIR");
    cmd.env_remove("COVERT_EMAIL");
    cmd
}

fn repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    // Pin the git root so the secrets dir resolves inside the tempdir
    fs::create_dir(tmp.path().join(".git")).unwrap();
    tmp
}

/// Fabricate an initialized store with one vault owned by alice.
fn seeded_store(tmp: &TempDir) {
    let secrets = tmp.path().join(".secrets");
    fs::create_dir_all(secrets.join("keys")).unwrap();
    fs::create_dir_all(secrets.join("vaults/dev/.password-store")).unwrap();
    fs::write(
        secrets.join("config.toml"),
        format!(
            "version = \"1\"\nowner = \"{}\"\nallow_unauthenticated_fallback = true\n",
            ALICE
        ),
    )
    .unwrap();
    fs::write(
        secrets.join("vaults/dev/vault.toml"),
        format!(
            "name = \"dev\"\ndescription = \"Development secrets\"\n\
             members = [\"{}\"]\n\
             created_at = \"2026-01-01T00:00:00Z\"\n\
             updated_at = \"2026-01-01T00:00:00Z\"\n",
            ALICE
        ),
    )
    .unwrap();
}

fn fake_blob(tmp: &TempDir, name: &str) {
    let blob = tmp
        .path()
        .join(".secrets/vaults/dev/.password-store")
        .join(format!("{}.gpg", name));
    fs::create_dir_all(blob.parent().unwrap()).unwrap();
    fs::write(blob, b"\x85\x01fake").unwrap();
}

#[test]
fn uninitialized_store_reports_and_hints() {
    let tmp = repo();

    covert(&tmp)
        .args(["vault", "list"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secrets store not found"))
        .stderr(predicate::str::contains("covert init"));
}

#[test]
fn init_outside_git_repository_fails() {
    let tmp = TempDir::new().unwrap();
    // No .git here; skip if the tempdir itself sits under some repo
    if tmp.path().ancestors().any(|p| p.join(".git").exists()) {
        return;
    }

    covert(&tmp)
        .arg("init")
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not inside a git repository"));
}

#[test]
fn vault_create_rejects_traversal_names() {
    let tmp = repo();
    seeded_store(&tmp);

    for bad in ["../evil", "a/b", "back\\slash", "-flag"] {
        covert(&tmp)
            .args(["vault", "create"])
            .arg(bad)
            .args(["--email", ALICE])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid identifier"));
    }
}

#[test]
fn set_rejects_escaping_secret_name_without_side_effects() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["set", "dev", "../escape", "x"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid identifier"));

    // Nothing leaked outside the vault's storage directory
    assert!(!tmp.path().join(".secrets/vaults/escape.gpg").exists());
    assert!(!tmp.path().join(".secrets/vaults/dev/escape.gpg").exists());
}

#[test]
fn get_rejects_malformed_secret_paths() {
    let tmp = repo();
    seeded_store(&tmp);

    for bad in ["/lead", "trail/", "a//b", "a/../b", "-flag"] {
        covert(&tmp)
            .args(["get", "dev"])
            .arg(bad)
            .args(["--email", ALICE])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid identifier"));
    }
}

#[test]
fn missing_vault_is_reported() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["list", "ghost"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vault not found: ghost"));
}

#[test]
fn non_member_is_denied() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["list", "dev"])
        .args(["--email", "carol@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "access denied: you are not a member of vault dev",
        ));
}

#[test]
fn member_can_list_secrets() {
    let tmp = repo();
    seeded_store(&tmp);
    fake_blob(&tmp, "apikey");
    fake_blob(&tmp, "database/password");

    covert(&tmp)
        .args(["list", "dev", "--format", "names"])
        .args(["--email", ALICE])
        .assert()
        .success()
        .stdout(predicate::str::contains("apikey"))
        .stdout(predicate::str::contains("database/password"));
}

#[test]
fn membership_check_is_case_insensitive() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["list", "dev"])
        .args(["--email", "ALICE@Example.Com"])
        .assert()
        .success();
}

#[test]
fn empty_vault_lists_cleanly() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["list", "dev"])
        .args(["--email", ALICE])
        .assert()
        .success()
        .stdout(predicate::str::contains("No secrets in vault: dev"));
}

#[test]
fn delete_missing_secret_is_not_found() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["delete", "dev", "nope", "--force"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret not found: dev/nope"));
}

#[test]
fn add_member_requires_key_on_file() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["vault", "add-member", "dev", "bob@example.com"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no key on file for bob@example.com"))
        .stderr(predicate::str::contains("covert key add bob@example.com"));

    // Member list untouched
    let record = fs::read_to_string(tmp.path().join(".secrets/vaults/dev/vault.toml")).unwrap();
    assert!(!record.contains("bob@example.com"));
}

#[test]
fn remove_last_member_is_rejected() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["vault", "remove-member", "dev", ALICE])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "cannot remove the last member from vault dev",
        ));

    let record = fs::read_to_string(tmp.path().join(".secrets/vaults/dev/vault.toml")).unwrap();
    assert!(record.contains(ALICE));
}

#[test]
fn remove_non_member_is_rejected() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["vault", "remove-member", "dev", "bob@example.com"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "bob@example.com is not a member of dev",
        ));
}

#[test]
fn vault_info_shows_members_and_counts() {
    let tmp = repo();
    seeded_store(&tmp);
    fake_blob(&tmp, "apikey");

    covert(&tmp)
        .args(["vault", "info", "dev"])
        .args(["--email", ALICE])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("Development secrets"))
        .stdout(predicate::str::contains(ALICE));
}

#[test]
fn vault_list_marks_access() {
    let tmp = repo();
    seeded_store(&tmp);

    covert(&tmp)
        .args(["vault", "list"])
        .args(["--email", ALICE])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev ✓"));

    covert(&tmp)
        .args(["vault", "list"])
        .args(["--email", "carol@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev ✗"));
}

#[test]
fn vault_delete_requires_confirmation() {
    let tmp = repo();
    seeded_store(&tmp);

    // Without --force and no TTY the prompt declines
    covert(&tmp)
        .args(["vault", "delete", "dev"])
        .args(["--email", ALICE])
        .assert()
        .failure();
    assert!(tmp.path().join(".secrets/vaults/dev").exists());

    covert(&tmp)
        .args(["vault", "delete", "dev", "--force"])
        .args(["--email", ALICE])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted vault: dev"));
    assert!(!tmp.path().join(".secrets/vaults/dev").exists());
}

#[test]
fn unauthenticated_fallback_flag_fails_closed_when_disabled() {
    let tmp = repo();
    seeded_store(&tmp);
    fs::write(
        tmp.path().join(".secrets/config.toml"),
        format!(
            "version = \"1\"\nowner = \"{}\"\nallow_unauthenticated_fallback = false\n",
            ALICE
        ),
    )
    .unwrap();

    // Force an empty identity: no flag, no env, no git config in this repo
    covert(&tmp)
        .args(["list", "dev"])
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_SYSTEM", "/dev/null")
        .env("GNUPGHOME", tmp.path().join("no-keyring").to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("access denied"));
}

#[test]
fn secrets_dir_flag_overrides_default() {
    let tmp = repo();

    covert(&tmp)
        .args(["vault", "list"])
        .args(["--secrets-dir", "custom-secrets"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom-secrets"));
}

#[test]
fn completions_generate_without_a_store() {
    let tmp = TempDir::new().unwrap();

    covert(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("covert"));
}

#[test]
fn errors_go_to_stderr_not_stdout() {
    let tmp = repo();

    covert(&tmp)
        .args(["get", "dev", "apikey"])
        .args(["--email", ALICE])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

/// Scenario E guard at the filesystem level: nothing under the store root
/// besides the expected layout after a rejected traversal attempt.
#[test]
fn rejected_names_leave_store_tree_untouched() {
    let tmp = repo();
    seeded_store(&tmp);

    let before = walk(tmp.path());
    covert(&tmp)
        .args(["set", "dev", "../../escape", "x"])
        .args(["--email", ALICE])
        .assert()
        .failure();
    let after = walk(tmp.path());

    assert_eq!(before, after);
}

fn walk(root: &Path) -> Vec<String> {
    let mut entries = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            entries.push(path.display().to_string());
            if path.is_dir() {
                stack.push(path);
            }
        }
    }
    entries.sort();
    entries
}
