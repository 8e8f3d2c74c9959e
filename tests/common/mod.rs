#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the binary in `cwd` with `args`, feeding `stdin` and returning
/// `(exit code, stdout, stderr)`.
pub fn run_cli_in(cwd: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_issuetrail"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Run the binary in a fresh empty directory so no stray
/// `issuetrail.toml` is picked up.
pub fn run_cli(args: &[&str], stdin: &str) -> (i32, String, String) {
    let dir = tempfile::tempdir().unwrap();
    run_cli_in(dir.path(), args, stdin)
}

/// An issue where Carol assigns Alice, Bob moves it into work, Alice
/// comments and Carol moves it into review.
pub const ISSUE: &str = r#"{
    "id": "2-17",
    "idReadable": "WEB-17",
    "summary": "Checkout button does nothing",
    "customFields": [
        { "name": "Assignee", "value": { "$type": "User", "id": "1-1", "name": "Alice Smith", "fullName": "Alice Smith", "login": "alice" } },
        { "name": "Stage", "value": { "name": "QA In Progress" } }
    ],
    "activities": [
        {
            "$type": "CustomFieldActivityItem",
            "id": "a1",
            "timestamp": 1709251200000,
            "author": { "id": "1-3", "fullName": "Carol White", "login": "carol" },
            "field": { "name": "Assignee" },
            "added": [{ "$type": "User", "id": "1-1", "name": "Alice Smith", "login": "alice" }],
            "removed": []
        },
        {
            "$type": "CustomFieldActivityItem",
            "id": "a2",
            "timestamp": 1709254800000,
            "author": { "id": "1-2", "fullName": "Bob Jones", "login": "bob" },
            "field": { "name": "Stage" },
            "added": [{ "name": "In Progress" }],
            "removed": [{ "name": "Open" }]
        },
        {
            "$type": "CustomFieldActivityItem",
            "id": "a3",
            "timestamp": 1709262000000,
            "author": { "id": "1-3", "fullName": "Carol White", "login": "carol" },
            "field": { "name": "Stage" },
            "added": { "name": "QA In Progress" },
            "removed": [{ "name": "In Progress" }]
        }
    ],
    "comments": [
        {
            "id": "c1",
            "text": "The click handler was never bound.",
            "author": { "id": "1-1", "fullName": "Alice Smith", "login": "alice" },
            "created": 1709258400000
        }
    ]
}"#;
