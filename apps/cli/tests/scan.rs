use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("themecheck")?)
}

#[test]
fn scan_prints_one_line_per_span() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "const x = 1;\n")?;

    cli()?
        .current_dir(workspace.path())
        .args(["scan", "tiny.ts"])
        .assert()
        .success()
        .stdout(
            "1:1-6 keyword \"const\"\n\
             1:7-8 variable \"x\"\n\
             1:9-10 operator \"=\"\n\
             1:11-12 number \"1\"\n\
             1:12-13 punctuation \";\"\n",
        );
    Ok(())
}

#[test]
fn scan_json_lists_spans_in_order() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(
        workspace.path().join("doc.ts"),
        "/** Docs */\nexport const MAX_SIZE = 10;\n",
    )?;

    let output = cli()?
        .current_dir(workspace.path())
        .args(["scan", "doc.ts", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let spans: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let spans = spans.as_array().ok_or("array of spans")?;
    assert_eq!(spans[0]["line"], 1);
    assert_eq!(spans[0]["category"], "doc comment");
    assert_eq!(spans[0]["columns"], serde_json::json!({ "start": 1, "end": 12 }));

    let constant = spans
        .iter()
        .find(|span| span["text"] == "MAX_SIZE")
        .ok_or("MAX_SIZE span")?;
    assert_eq!(constant["line"], 2);
    assert_eq!(constant["category"], "constant");
    Ok(())
}

#[test]
fn scan_honours_catalog_overrides() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    fs::write(
        workspace.path().join("answer.json"),
        r##"{ "categories": [ { "name": "answer", "color": "#FFCC00", "pattern": "42" } ] }"##,
    )?;

    cli()?
        .current_dir(workspace.path())
        .args(["scan", "tiny.ts", "--catalog", "answer.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1:8-10 answer \"42\""));
    Ok(())
}

#[test]
fn scan_reports_ambiguous_catalogs() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    fs::write(
        workspace.path().join("twins.json"),
        r##"{ "categories": [
            { "name": "answer", "color": "#FFCC00", "pattern": "42", "specificity": 150 },
            { "name": "meaning", "color": "#00CCFF", "pattern": "4\\d", "specificity": 150 }
        ] }"##,
    )?;

    cli()?
        .current_dir(workspace.path())
        .args(["scan", "tiny.ts", "--catalog", "twins.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "line 1, column 8: '42' is ambiguous between answer, meaning",
        ));
    Ok(())
}
