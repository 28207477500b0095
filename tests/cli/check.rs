use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stdout};

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"a": "A"}"#),
        ("locales/de.yaml", "a: A\n"),
    ])?;

    let output = test.run(&["check"])?;
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "\u{2713} Checked 2 translation files in 2 locales - no issues found\n"
    );

    Ok(())
}

#[test]
fn test_missing_translation() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", "{\n  \"a\": \"A\",\n  \"b\": \"B\"\n}\n"),
        ("locales/de.json", "{\n  \"a\": \"A\"\n}\n"),
    ])?;

    let output = test.run(&["check"])?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        concat!(
            "warning: \"b\"  missing-translation\n",
            "  --> locales/en.json:3:3\n",
            "  |\n",
            "3 |   \"b\": \"B\"\n",
            "  |   ^\n",
            "  = note: missing in: de\n",
            "\n",
            "\u{2718} 1 problem (0 errors, 1 warning)\n",
        )
    );

    Ok(())
}

#[test]
fn test_parse_error_is_reported() -> Result<()> {
    let test = CliTest::with_files(&[
        ("locales/en.json", r#"{"a": "A"}"#),
        ("locales/fr.json", r#"{"a": "#),
    ])?;

    let output = test.run(&["check"])?;
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout(&output);
    assert!(stdout.starts_with("error: \"locales/fr.json\"  parse-error\n  --> locales/fr.json\n"));
    assert!(stdout.contains("1 problem (1 error, 0 warnings)"));

    Ok(())
}
