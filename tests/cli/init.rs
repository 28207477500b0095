use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;
    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .keyscoperc.json"));

    let content = test.read_file(".keyscoperc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["defaultLocale"], "en");
    assert_eq!(parsed["debounceMillis"], 400);
    assert!(parsed["i18nDirs"].as_array().is_some_and(|dirs| !dirs.is_empty()));

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_files(&[(".keyscoperc.json", "{}")])?;

    let output = test.run(&["init"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".keyscoperc.json already exists"));
    assert_eq!(test.read_file(".keyscoperc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.run(&["init"])?;
    test.write_file("locales/en.json", r#"{"greet": "Hi"}"#)?;

    let output = test.run(&["check"])?;
    assert!(
        output.status.success(),
        "check should work with the generated config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_files(&[(".keyscoperc.json", r#"{"debounceMillis": 1}"#)])?;

    let output = test.run(&["keys"])?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("debounceMillis"));

    Ok(())
}
