use std::error::Error;
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("themecheck")?)
}

fn sample_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample-code.ts")
}

#[test]
fn sample_fixture_fails_on_shared_colors() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli()?
        .current_dir(workspace.path())
        .arg("check")
        .arg(sample_fixture())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("seen 34/34 categories"))
        .stdout(predicate::str::contains("missing: none"))
        .stdout(predicate::str::contains("  interface ~ type alias (dE 0.00)"))
        .stdout(predicate::str::ends_with("result: FAIL\n"));
    Ok(())
}

#[test]
fn distinct_colors_let_the_sample_pass() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let exported = workspace.path().join("catalog.json");
    cli()?
        .current_dir(workspace.path())
        .args(["catalog", "export", "--output"])
        .arg(&exported)
        .assert()
        .success();

    let mut catalog: serde_json::Value = serde_json::from_str(&fs::read_to_string(&exported)?)?;
    let categories = catalog["categories"]
        .as_array_mut()
        .ok_or("categories array")?;
    for (index, category) in categories.iter_mut().enumerate() {
        let step = index as u32 * 7;
        category["color"] = format!("#{:02X}{:02X}{:02X}", step, 255 - step, (step * 5) % 256).into();
    }
    fs::write(&exported, serde_json::to_string_pretty(&catalog)?)?;

    cli()?
        .current_dir(workspace.path())
        .arg("check")
        .arg(sample_fixture())
        .arg("--catalog")
        .arg(&exported)
        .arg("--threshold=0")
        .assert()
        .success()
        .stdout(predicate::str::contains("color collisions: none"))
        .stdout(predicate::str::ends_with("result: PASS\n"));
    Ok(())
}

#[test]
fn json_format_emits_one_summary_per_fixture() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let output = cli()?
        .current_dir(workspace.path())
        .args(["check", "--format", "json"])
        .arg(sample_fixture())
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let summaries = summaries.as_array().ok_or("array of summaries")?;
    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert!(summary["fixture"]
        .as_str()
        .is_some_and(|fixture| fixture.ends_with("sample-code.ts")));
    assert_eq!(summary["seenCount"], 34);
    assert_eq!(summary["missingCategories"], serde_json::json!([]));
    assert_eq!(summary["annotationMismatches"], serde_json::json!([]));
    assert_eq!(summary["passed"], false);
    Ok(())
}

#[test]
fn directories_are_walked_for_fixture_extensions() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let fixtures = workspace.path().join("fixtures");
    fs::create_dir_all(fixtures.join("nested"))?;
    fs::write(fixtures.join("a.ts"), "const x = 1;\n")?;
    fs::write(fixtures.join("nested").join("b.jsx"), "let y = 2;\n")?;
    fs::write(fixtures.join("notes.md"), "# not a fixture\n")?;

    let output = cli()?
        .current_dir(workspace.path())
        .args(["check", "--format", "json", "fixtures"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let summaries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let names: Vec<&str> = summaries
        .as_array()
        .ok_or("array of summaries")?
        .iter()
        .filter_map(|summary| summary["fixture"].as_str())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names[0].ends_with("a.ts"));
    assert!(names[1].ends_with("b.jsx"));
    Ok(())
}

#[test]
fn report_can_be_written_to_a_file() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    let report = workspace.path().join("out").join("report.txt");

    cli()?
        .current_dir(workspace.path())
        .args(["check", "tiny.ts", "--output"])
        .arg(&report)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Wrote report to"));

    let contents = fs::read_to_string(&report)?;
    assert!(contents.starts_with("fixture: tiny.ts\nseen 3/34 categories in 3 spans\n"));
    Ok(())
}

#[test]
fn unterminated_string_is_an_error() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("broken.ts"), "const x = \"abc\n")?;

    cli()?
        .current_dir(workspace.path())
        .args(["check", "broken.ts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to scan broken.ts"))
        .stderr(predicate::str::contains("line 1: unterminated string"));
    Ok(())
}

#[test]
fn missing_fixture_is_an_error() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    cli()?
        .current_dir(workspace.path())
        .args(["check", "nowhere.ts"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("fixture nowhere.ts does not exist"));
    Ok(())
}

#[test]
fn negative_threshold_is_rejected() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    cli()?
        .current_dir(workspace.path())
        .args(["check", "tiny.ts", "--threshold=-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("threshold must be a non-negative number"));
    Ok(())
}

#[test]
fn settings_file_supplies_the_catalog() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    fs::write(
        workspace.path().join("extra.json"),
        r##"{ "categories": [ { "name": "answer", "color": "#FFCC00", "pattern": "42", "specificity": 120 } ] }"##,
    )?;
    fs::write(
        workspace.path().join("themecheck.json"),
        r#"{ "fixtures": { "catalog": "extra.json" } }"#,
    )?;

    cli()?
        .current_dir(workspace.path())
        .args(["check", "tiny.ts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("seen 3/35 categories in 3 spans"))
        .stdout(predicate::str::contains(", number,"));
    Ok(())
}

#[test]
fn settings_catalog_resolves_next_to_the_settings_file() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let conf = workspace.path().join("conf");
    fs::create_dir(&conf)?;
    fs::write(workspace.path().join("tiny.ts"), "return 42;\n")?;
    fs::write(
        conf.join("extra.json"),
        r##"{ "categories": [ { "name": "answer", "color": "#FFCC00", "pattern": "42", "specificity": 120 } ] }"##,
    )?;
    fs::write(
        conf.join("themecheck.json"),
        r#"{ "fixtures": { "catalog": "extra.json" } }"#,
    )?;

    cli()?
        .current_dir(workspace.path())
        .args(["--config", "conf/themecheck.json", "check", "tiny.ts"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("seen 3/35 categories in 3 spans"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn unreadable_directory_stops_the_run() -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;

    let workspace = tempdir()?;
    let fixtures = workspace.path().join("fixtures");
    let locked = fixtures.join("locked");
    fs::create_dir_all(&locked)?;
    fs::write(fixtures.join("ok.ts"), "const a = 1;\n")?;
    fs::write(locked.join("hidden.ts"), "const b = 2;\n")?;
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

    // Privileged users read through the mode bits.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
        return Ok(());
    }

    let assert = cli()?
        .current_dir(workspace.path())
        .args(["check", "fixtures"])
        .assert();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;
    assert
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to walk fixtures"));
    Ok(())
}
