//! Black-box CLI tests for gb.
//!
//! These drive the binary the way external tooling does: a temp working
//! directory, a build file, and assertions on exit codes, stderr wording,
//! and the files left behind.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the gb binary.
fn gb_cmd() -> Command {
  cargo_bin_cmd!("gb")
}

fn write(temp: &TempDir, name: &str, content: &str) {
  std::fs::write(temp.path().join(name), content).unwrap();
}

/// The build file from the original harness: one rule, one edge, driven by
/// a real subprocess.
const CAPITALIZE: &str =
  "rule capitalize\n  command = dd if=$in of=$out conv=ucase\n\nbuild loremipsum.txt.u: capitalize loremipsum.txt\n";

const COPY: &str = "rule copy\n  command = cp $in $out\n";

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  gb_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  gb_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("gb"));
}

// =============================================================================
// Build file loading
// =============================================================================

#[test]
fn fails_with_no_build_file() {
  let temp = TempDir::new().unwrap();

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: build file not found"));
}

#[test]
fn fails_with_empty_build_file() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", "");

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: no targets to build"));
}

#[test]
fn fails_with_malformed_build_file() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", "rule broken\n");

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("rule 'broken' has no command"));
}

#[test]
fn file_flag_selects_another_build_file() {
  let temp = TempDir::new().unwrap();
  write(&temp, "other.ninja", "");

  gb_cmd()
    .current_dir(temp.path())
    .args(["-f", "other.ninja"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: no targets to build"));
}

// =============================================================================
// Graph validation
// =============================================================================

#[test]
fn missing_input_reports_exact_diagnostic() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", CAPITALIZE);

  gb_cmd().current_dir(temp.path()).assert().failure().stderr(predicate::str::contains(
    "error: 'loremipsum.txt', needed by 'loremipsum.txt.u', missing and no known rule to make it",
  ));
}

#[test]
fn unknown_rule_fails() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", "build a: nosuchrule b\n");

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: unknown rule 'nosuchrule'"));
}

#[test]
fn duplicate_output_fails_deterministically() {
  let temp = TempDir::new().unwrap();
  write(
    &temp,
    "build.ninja",
    &format!("{COPY}build out.txt: copy one\nbuild out.txt: copy two\n"),
  );

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: multiple rules generate 'out.txt'"));
}

#[test]
fn cycle_fails_before_any_command_runs() {
  let temp = TempDir::new().unwrap();
  write(
    &temp,
    "build.ninja",
    &format!("{COPY}build a.txt: copy b.txt\nbuild b.txt: copy a.txt\n"),
  );

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: dependency cycle"));

  assert!(!temp.path().join("a.txt").exists());
  assert!(!temp.path().join("b.txt").exists());
}

#[test]
fn unknown_target_fails() {
  let temp = TempDir::new().unwrap();
  write(&temp, "src", "x");
  write(&temp, "build.ninja", &format!("{COPY}build out: copy src\n"));

  gb_cmd()
    .current_dir(temp.path())
    .arg("nope")
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: unknown target 'nope'"));
}

// =============================================================================
// Building
// =============================================================================

#[test]
#[cfg(unix)]
fn simple_transform_capitalizes_the_input() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", CAPITALIZE);
  write(&temp, "loremipsum.txt", "lorem ipsum");

  gb_cmd().current_dir(temp.path()).assert().success();

  let out = std::fs::read_to_string(temp.path().join("loremipsum.txt.u")).unwrap();
  assert_eq!(out, "LOREM IPSUM");
}

#[test]
#[cfg(unix)]
fn second_run_does_no_work() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", CAPITALIZE);
  write(&temp, "loremipsum.txt", "lorem ipsum");

  gb_cmd().current_dir(temp.path()).assert().success();

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("no work to do"));
}

#[test]
#[cfg(unix)]
fn explicit_target_builds_only_that_target() {
  let temp = TempDir::new().unwrap();
  write(&temp, "src", "x");
  write(
    &temp,
    "build.ninja",
    &format!("{COPY}build one.txt: copy src\nbuild two.txt: copy src\n"),
  );

  gb_cmd().current_dir(temp.path()).arg("one.txt").assert().success();

  assert!(temp.path().join("one.txt").exists());
  assert!(!temp.path().join("two.txt").exists());
}

#[test]
#[cfg(unix)]
fn default_declaration_selects_targets() {
  let temp = TempDir::new().unwrap();
  write(&temp, "src", "x");
  write(
    &temp,
    "build.ninja",
    &format!("{COPY}build one.txt: copy src\nbuild two.txt: copy src\ndefault two.txt\n"),
  );

  gb_cmd().current_dir(temp.path()).assert().success();

  assert!(!temp.path().join("one.txt").exists());
  assert!(temp.path().join("two.txt").exists());
}

#[test]
#[cfg(unix)]
fn dependency_chain_builds_in_order() {
  let temp = TempDir::new().unwrap();
  write(&temp, "src", "payload");
  write(
    &temp,
    "build.ninja",
    &format!("{COPY}build mid.txt: copy src\nbuild final.txt: copy mid.txt\n"),
  );

  gb_cmd().current_dir(temp.path()).assert().success();

  assert_eq!(std::fs::read_to_string(temp.path().join("final.txt")).unwrap(), "payload");
}

#[test]
#[cfg(unix)]
fn failing_command_fails_the_run_and_skips_dependents() {
  let temp = TempDir::new().unwrap();
  write(&temp, "src", "x");
  write(
    &temp,
    "build.ninja",
    &format!("rule fail\n  command = exit 7\n{COPY}build mid.txt: fail src\nbuild final.txt: copy mid.txt\n"),
  );

  gb_cmd()
    .current_dir(temp.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("error: command failed"));

  assert!(!temp.path().join("final.txt").exists());
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn dry_run_prints_commands_without_running_them() {
  let temp = TempDir::new().unwrap();
  write(&temp, "build.ninja", CAPITALIZE);
  write(&temp, "loremipsum.txt", "lorem ipsum");

  gb_cmd()
    .current_dir(temp.path())
    .arg("-n")
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "dd if=loremipsum.txt of=loremipsum.txt.u conv=ucase",
    ));

  assert!(!temp.path().join("loremipsum.txt.u").exists());
}

// =============================================================================
// Parallelism
// =============================================================================

#[test]
#[cfg(unix)]
fn jobs_flag_limits_concurrency_but_builds_everything() {
  let temp = TempDir::new().unwrap();
  write(
    &temp,
    "build.ninja",
    "rule mk\n  command = touch $out\nbuild a: mk\nbuild b: mk\nbuild c: mk\nbuild d: mk\n",
  );

  gb_cmd().current_dir(temp.path()).args(["-j", "1"]).assert().success();

  for name in ["a", "b", "c", "d"] {
    assert!(temp.path().join(name).exists());
  }
}
