//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nbcritic() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("nbcritic").unwrap()
}

const VALID_RUBRIC: &str = r#"questions:
  - name: clarity
    version: "1"
    question: How clear is the notebook?
    rubric:
      - score: 1
        description: bad
      - score: 5
        description: good
  - name: depth
    version: "1"
    question: How deep is the analysis?
    rubric:
      - score: 1
        description: shallow
      - score: 5
        description: thorough
"#;

const MOCK_CONFIG: &str = r#"default_provider = "mock"

[providers.mock]
type = "mock"
response = "fine"
"#;

#[test]
fn validate_valid_rubric() {
    let dir = TempDir::new().unwrap();
    let rubric = dir.path().join("rubric.yml");
    std::fs::write(&rubric, VALID_RUBRIC).unwrap();

    nbcritic()
        .arg("validate")
        .arg("--rubric")
        .arg(&rubric)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 questions"))
        .stdout(predicate::str::contains("clarity v1"))
        .stdout(predicate::str::contains("Rubric valid."));
}

#[test]
fn validate_missing_file() {
    nbcritic()
        .arg("validate")
        .arg("--rubric")
        .arg("nonexistent.yml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_rubric_missing_version() {
    let dir = TempDir::new().unwrap();
    let rubric = dir.path().join("rubric.yml");
    std::fs::write(
        &rubric,
        r#"questions:
  - name: clarity
    question: How clear?
    rubric:
      - score: 1
        description: bad
"#,
    )
    .unwrap();

    nbcritic()
        .arg("validate")
        .arg("--rubric")
        .arg(&rubric)
        .assert()
        .failure()
        .stderr(predicate::str::contains("version"));
}

#[test]
fn validate_duplicate_question_identity() {
    let dir = TempDir::new().unwrap();
    let rubric = dir.path().join("rubric.yml");
    std::fs::write(
        &rubric,
        r#"questions:
  - name: clarity
    version: "1"
    question: a
    rubric: [{score: 1, description: x}]
  - name: clarity
    version: "1"
    question: b
    rubric: [{score: 1, description: x}]
"#,
    )
    .unwrap();

    nbcritic()
        .arg("validate")
        .arg("--rubric")
        .arg(&rubric)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    nbcritic()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nbcritic.toml"))
        .stdout(predicate::str::contains("Created rubric.yml"))
        .stdout(predicate::str::contains("Created plot_rubric.yml"));

    assert!(dir.path().join("nbcritic.toml").exists());
    assert!(dir.path().join("rubric.yml").exists());
    assert!(dir.path().join("plot_rubric.yml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    nbcritic()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    nbcritic()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("nbcritic.toml already exists"));
}

#[test]
fn init_rubrics_pass_validation() {
    let dir = TempDir::new().unwrap();

    nbcritic()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    for rubric in ["rubric.yml", "plot_rubric.yml"] {
        nbcritic()
            .current_dir(dir.path())
            .arg("validate")
            .arg("--rubric")
            .arg(rubric)
            .assert()
            .success()
            .stdout(predicate::str::contains("Rubric valid."));
    }
}

#[test]
fn critique_requires_a_target_source() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nbcritic.toml");
    std::fs::write(&config, MOCK_CONFIG).unwrap();

    nbcritic()
        .current_dir(dir.path())
        .arg("critique")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--notebooks or --notebook"));
}

#[test]
fn notebooks_and_notebook_conflict() {
    nbcritic()
        .arg("critique")
        .arg("--notebooks")
        .arg("somewhere")
        .arg("--notebook")
        .arg("one.ipynb")
        .assert()
        .failure();
}

#[test]
fn rate_requires_existing_rubric() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nbcritic.toml");
    std::fs::write(&config, MOCK_CONFIG).unwrap();

    nbcritic()
        .current_dir(dir.path())
        .arg("rate")
        .arg("--notebooks")
        .arg(dir.path())
        .arg("--rubric")
        .arg("missing.yml")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rubric"));
}
