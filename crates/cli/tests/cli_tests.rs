//! Integration tests for the bookbank CLI

use assert_cmd::Command;
use tempfile::TempDir;

/// A CLI invocation with default settings and no config files
fn bookbank_defaults(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookbank").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("BOOKBANK_DATABASE__BACKEND")
        .env_remove("BOOKBANK_DATABASE__PATH")
        .env("BOOKBANK_ENV", "local")
        .env("BOOKBANK_CONFIG_DIR", dir.path())
        .env("RUST_LOG", "error");
    cmd
}

/// A CLI invocation backed by a throwaway JSON catalog
fn bookbank(dir: &TempDir) -> Command {
    let mut cmd = bookbank_defaults(dir);
    cmd.env("BOOKBANK_DATABASE__BACKEND", "file")
        .env("BOOKBANK_DATABASE__PATH", dir.path().join("books.json"));
    cmd
}

fn stderr_of_failure(cmd: &mut Command) -> String {
    let output = cmd.assert().failure().get_output().stderr.clone();
    String::from_utf8(output).unwrap()
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let stdout = stdout_of(bookbank(&dir).arg("--help"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("books"));
}

#[test]
fn test_add_then_request_until_exhausted() {
    let dir = TempDir::new().unwrap();

    let added = stdout_of(bookbank(&dir).args([
        "books",
        "add",
        "--title",
        "Dune",
        "--author",
        "Frank Herbert",
        "--category",
        "Fiction",
        "--copies",
        "1",
    ]));
    assert!(added.contains("Book added successfully"));

    let lent = stdout_of(bookbank(&dir).args(["books", "request", "Dune"]));
    assert!(lent.contains("You have successfully requested \"Dune\"."));
    assert!(lent.contains("15 days"));

    let waiting = stdout_of(bookbank(&dir).args(["books", "request", "Dune"]));
    assert!(waiting.contains("will be available in 15 days"));
}

#[test]
fn test_seed_and_list() {
    let dir = TempDir::new().unwrap();

    let seeded = stdout_of(bookbank(&dir).args(["books", "seed"]));
    assert!(seeded.contains("Seeded 4 books"));

    let again = stdout_of(bookbank(&dir).args(["books", "seed"]));
    assert!(again.contains("Seeded 0 books"));

    let listed = stdout_of(bookbank(&dir).args(["books", "list"]));
    assert!(listed.contains("The Great Gatsby | F. Scott Fitzgerald | Fiction | copies: 5"));
}

#[test]
fn test_unknown_title_fails() {
    let dir = TempDir::new().unwrap();

    let stderr = stderr_of_failure(bookbank(&dir).args(["books", "request", "nonexistent-title"]));
    assert!(stderr.contains("Book not found"));
}

#[test]
fn test_blank_title_is_rejected() {
    let dir = TempDir::new().unwrap();

    let stderr = stderr_of_failure(bookbank(&dir).args(["books", "request", "   "]));
    assert!(stderr.contains("Book title is required"));
}

#[test]
fn test_books_commands_refuse_memory_backend() {
    let dir = TempDir::new().unwrap();

    let stderr = stderr_of_failure(bookbank_defaults(&dir).args([
        "books",
        "add",
        "--title",
        "Dune",
        "--author",
        "Frank Herbert",
        "--category",
        "Fiction",
        "--copies",
        "2",
    ]));
    assert!(stderr.contains("persistent catalog"));

    let stderr = stderr_of_failure(bookbank_defaults(&dir).args(["books", "list"]));
    assert!(stderr.contains("BOOKBANK_DATABASE__BACKEND=file"));
    assert!(!dir.path().join("books.json").exists());
}

#[test]
fn test_add_rejects_zero_copies() {
    let dir = TempDir::new().unwrap();

    bookbank(&dir)
        .args([
            "books",
            "add",
            "--title",
            "Dune",
            "--author",
            "Frank Herbert",
            "--category",
            "Fiction",
            "--copies",
            "0",
        ])
        .assert()
        .failure();
}
