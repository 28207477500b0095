use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

fn project() -> Result<CliTest> {
    CliTest::with_files(&[
        ("locales/en/common.json", r#"{"greet": "Hi", "bye": "Bye"}"#),
        ("locales/de/common.yaml", "greet: Hallo\n"),
        ("locales/en/errors.toml", "[http]\nnot_found = \"Not found\"\n"),
        (
            "src/app.tsx",
            "const a = t('common.greet');\nconst b = t(\"common.bye\");\n",
        ),
    ])
}

#[test]
fn test_keys_are_sorted() -> Result<()> {
    let test = project()?;

    let output = test.run(&["keys"])?;
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "common.bye\ncommon.greet\nerrors.http.not_found\n"
    );

    Ok(())
}

#[test]
fn test_keys_with_prefix() -> Result<()> {
    let test = project()?;

    let output = test.run(&["keys", "--prefix", "errors."])?;
    assert_eq!(stdout(&output), "errors.http.not_found\n");

    Ok(())
}

#[test]
fn test_show_every_locale() -> Result<()> {
    let test = project()?;

    let output = test.run(&["show", "common.greet"])?;
    assert!(output.status.success());
    let stdout = stdout(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("de  Hallo  locales/de/common.yaml:1"));
    assert!(lines[1].starts_with("en  Hi  locales/en/common.json:1"));

    Ok(())
}

#[test]
fn test_show_falls_back_to_default_locale() -> Result<()> {
    let test = project()?;

    let output = test.run(&["show", "common.bye", "--locale", "de"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Bye"));

    let output = test.run(&["show", "common.bye", "--locale", "de", "--strict"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'common.bye' has no value for de"));

    Ok(())
}

#[test]
fn test_show_unknown_key() -> Result<()> {
    let test = project()?;

    let output = test.run(&["show", "nope"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'nope' is not defined"));

    Ok(())
}

#[test]
fn test_locales_mark_default() -> Result<()> {
    let test = project()?;

    let output = test.run(&["locales"])?;
    assert_eq!(stdout(&output), "de\nen (default)\n");

    Ok(())
}

#[test]
fn test_files_list_format_and_prefix() -> Result<()> {
    let test = project()?;

    let output = test.run(&["files"])?;
    assert_eq!(
        stdout(&output),
        concat!(
            "locales/de/common.yaml  de  yaml  1 key  prefix=common\n",
            "locales/en/common.json  en  json  2 keys  prefix=common\n",
            "locales/en/errors.toml  en  toml  1 key  prefix=errors\n",
        )
    );

    Ok(())
}

#[test]
fn test_usages() -> Result<()> {
    let test = project()?;

    let output = test.run(&["usages", "common.bye"])?;
    assert!(output.status.success());
    assert_eq!(stdout(&output), "src/app.tsx:2  common.bye\n");

    Ok(())
}

#[test]
fn test_root_option() -> Result<()> {
    let test = CliTest::with_files(&[("web/locales/en.json", r#"{"a": "A"}"#)])?;

    let output = test.run(&["keys", "--root", "web"])?;
    assert_eq!(stdout(&output), "a\n");

    let output = test.run(&["keys", "--root", "missing"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing is not a directory"));

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&[])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));

    Ok(())
}
