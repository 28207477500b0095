use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, stderr, stdout};

fn json_file(test: &CliTest, path: &str) -> Result<Value> {
    Ok(serde_json::from_str(&test.read_file(path)?)?)
}

#[test]
fn test_fill_is_dry_run_by_default() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"greet": "Hi"}"#),
        ("locales/de.json", "{}"),
    ])?;

    let output = test.run(&["fill", "greet"])?;
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "would add 'greet' to locales/de.json (de)\nRun with --apply to write the entries.\n"
    );
    assert_eq!(test.read_file("locales/de.json")?, "{}");

    Ok(())
}

#[test]
fn test_fill_apply_uses_default_locale_value() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"greet": "Hi"}"#),
        ("locales/de.json", "{}"),
        ("locales/fr.yaml", "# greetings\nother: Autre\n"),
    ])?;

    let output = test.run(&["fill", "greet", "--apply"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "\u{2713} Added 'greet' in 2 locales\n");

    assert_eq!(json_file(&test, "locales/de.json")?, json!({"greet": "Hi"}));
    let yaml = test.read_file("locales/fr.yaml")?;
    assert!(yaml.starts_with("# greetings\nother: Autre\n"));
    assert!(yaml.ends_with("greet: \"Hi\"\n"));

    Ok(())
}

#[test]
fn test_fill_selected_locales_with_value() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"greet": "Hi"}"#),
        ("locales/de.json", "{}"),
        ("locales/fr.json", "{}"),
    ])?;

    let output = test.run(&["fill", "greet", "--locales", "fr", "--value", "TODO", "--apply"])?;
    assert!(output.status.success());
    assert_eq!(json_file(&test, "locales/fr.json")?, json!({"greet": "TODO"}));
    assert_eq!(test.read_file("locales/de.json")?, "{}");

    Ok(())
}

#[test]
fn test_fill_unknown_key_defaults_to_empty_value() -> Result<()> {
    let test = CliTest::with_files(&[("locales/en.json", "{}")])?;

    let output = test.run(&["fill", "greet", "--apply"])?;
    assert!(output.status.success());
    assert_eq!(json_file(&test, "locales/en.json")?, json!({"greet": ""}));

    Ok(())
}

#[test]
fn test_rename_files_and_call_sites() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"old": "Old"}"#),
        ("locales/de.json", r#"{"old": "Alt"}"#),
        ("src/app.tsx", "export const label = t(\"old\");\n"),
    ])?;

    let output = test.run(&["rename", "old", "fresh"])?;
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        concat!(
            "would rename 'old' to 'fresh' in:\n",
            "  locales/de.json\n",
            "  locales/en.json\n",
            "  src/app.tsx\n",
            "  src/app.tsx:1  old\n",
            "Run with --apply to rename.\n",
        )
    );
    assert_eq!(test.read_file("locales/en.json")?, r#"{"old": "Old"}"#);

    let output = test.run(&["rename", "old", "fresh", "--apply"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\u{2713} Renamed 'old' to 'fresh' in 3 files (1 call site)\n"
    );
    assert_eq!(test.read_file("locales/en.json")?, r#"{"fresh": "Old"}"#);
    assert_eq!(test.read_file("locales/de.json")?, r#"{"fresh": "Alt"}"#);
    assert_eq!(
        test.read_file("src/app.tsx")?,
        "export const label = t(\"fresh\");\n"
    );

    Ok(())
}

#[test]
fn test_rename_blocked_by_existing_key() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"old": "Old"}"#),
        ("locales/de.json", r#"{"old": "Alt", "fresh": "Neu"}"#),
    ])?;

    let output = test.run(&["rename", "old", "fresh", "--apply"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("the new key already exists in: de"));
    assert_eq!(test.read_file("locales/en.json")?, r#"{"old": "Old"}"#);

    Ok(())
}
