use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Context, Result};
use keyscope::config::Config;
use keyscope::core::{
    consistency::{BlockReason, ConsistencyEngine, RenameOutcome},
    index::{IndexState, TranslationIndex},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Project {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        let project = Self {
            _temp_dir: temp_dir,
            root,
        };
        for (path, content) in files {
            project.write_file(path, content)?;
        }
        Ok(project)
    }

    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))
    }

    fn read_file(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.root.join(path)).context("Failed to read file")
    }

    fn index(&self) -> TranslationIndex {
        let index = TranslationIndex::builder(&self.root).build();
        index.initialize();
        index
    }

    fn index_with(&self, config: Config) -> TranslationIndex {
        let index = TranslationIndex::builder(&self.root).config(config).build();
        index.initialize();
        index
    }
}

fn values(index: &TranslationIndex, key: &str) -> BTreeMap<String, String> {
    index
        .snapshot()
        .get_all_translations(key)
        .into_iter()
        .map(|(locale, entry)| (locale, entry.value.clone()))
        .collect()
}

fn locales(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[test]
fn test_yaml_and_toml_end_to_end() -> Result<()> {
    let project = Project::with_files(&[
        ("src/locales/en/common.yaml", "hello: 'Hello'\n"),
        ("src/locales/zh/common.toml", "hello = \"你好\"\n"),
    ])?;
    let index = project.index();

    assert_eq!(
        values(&index, "common.hello"),
        BTreeMap::from([
            ("en".to_string(), "Hello".to_string()),
            ("zh".to_string(), "你好".to_string()),
        ])
    );

    let engine = ConsistencyEngine::new(index);
    let created =
        engine.fill_missing_translations("common.hello", &locales(&["en", "zh", "fr"]), |_| {
            "Bonjour".to_string()
        });
    assert_eq!(created, 0);
    assert!(
        engine
            .index()
            .snapshot()
            .get_translation_strict("common.hello", "fr")
            .is_none()
    );

    Ok(())
}

#[test]
fn test_fill_counts_only_locales_with_a_target() -> Result<()> {
    let project = Project::with_files(&[
        ("locales/en/common.json", r#"{"hello": "Hello"}"#),
        ("locales/de/common.yaml", "bye: Tschüss\n"),
        ("locales/es/common.toml", "bye = \"Adiós\"\n"),
    ])?;
    let engine = ConsistencyEngine::new(project.index());

    let created = engine.fill_missing_translations(
        "common.hello",
        &locales(&["en", "de", "es", "fr"]),
        |locale| format!("hello ({})", locale),
    );
    assert_eq!(created, 2);
    assert_eq!(
        values(engine.index(), "common.hello"),
        BTreeMap::from([
            ("de".to_string(), "hello (de)".to_string()),
            ("en".to_string(), "Hello".to_string()),
            ("es".to_string(), "hello (es)".to_string()),
        ])
    );

    insta::assert_snapshot!(project.read_file("locales/de/common.yaml")?, @r#"
    bye: Tschüss
    hello: "hello (de)"
    "#);
    insta::assert_snapshot!(project.read_file("locales/es/common.toml")?, @r#"
    bye = "Adiós"
    hello = "hello (es)"
    "#);

    Ok(())
}

#[test]
fn test_create_nested_key_keeps_comments() -> Result<()> {
    let project = Project::with_files(&[
        ("locales/en.yaml", "nav:\n  home: Home\n  about: About\n"),
        (
            "locales/de.yaml",
            "# Navigation\nnav:\n  home: Start # landing page\n",
        ),
    ])?;
    let engine = ConsistencyEngine::new(project.index());

    let entry = engine
        .create_missing_translation("nav.about", "de", "Über uns")
        .context("entry should be created")?;
    assert_eq!(entry.value, "Über uns");
    assert_eq!(entry.line, 4);

    insta::assert_snapshot!(project.read_file("locales/de.yaml")?, @r#"
    # Navigation
    nav:
      home: Start # landing page
      about: "Über uns"
    "#);

    Ok(())
}

#[test]
fn test_create_is_idempotent() -> Result<()> {
    let project = Project::with_files(&[
        ("locales/en/common.json", r#"{"greet": "Hi"}"#),
        ("locales/de/common.json", "{}"),
    ])?;
    let engine = ConsistencyEngine::new(project.index());

    let first = engine
        .create_missing_translation("common.greet", "de", "Hallo")
        .context("entry should be created")?;
    let content = project.read_file("locales/de/common.json")?;
    let published = engine.index().published_count();

    let second = engine
        .create_missing_translation("common.greet", "de", "Servus")
        .context("entry should exist")?;
    assert_eq!(second, first);
    assert_eq!(second.value, "Hallo");
    assert_eq!(project.read_file("locales/de/common.json")?, content);
    assert_eq!(engine.index().published_count(), published);
    assert_eq!(engine.index().snapshot().get_entries("common.greet").len(), 2);

    Ok(())
}

#[test]
fn test_rename_blocked_leaves_files_unchanged() -> Result<()> {
    let files = [
        ("locales/en/common.json", r#"{"greet": "Hi", "welcome": "Welcome"}"#),
        ("locales/de/common.json", r#"{"greet": "Hallo"}"#),
        ("src/page.tsx", "const t = useTranslations('common');\nt('greet');\n"),
    ];
    let project = Project::with_files(&files)?;
    let engine = ConsistencyEngine::new(project.index());

    let outcome = engine.rename("common.greet", "common.welcome");
    assert_eq!(
        outcome,
        RenameOutcome::Blocked(BlockReason::TargetExists {
            locales: vec!["en".to_string()]
        })
    );
    for (path, content) in files {
        assert_eq!(project.read_file(path)?, content);
    }
    assert!(engine.index().snapshot().contains_key("common.greet"));

    Ok(())
}

#[test]
fn test_rename_through_namespace_binding() -> Result<()> {
    let project = Project::with_files(&[
        ("locales/en/common.json", "{\n  \"greet\": \"Hi\"\n}\n"),
        ("locales/de/common.yaml", "greet: Hallo # informal\n"),
        (
            "src/page.tsx",
            "export function Page() {\n  const t = useTranslations('common');\n  return t('greet');\n}\n",
        ),
    ])?;
    let engine = ConsistencyEngine::new(project.index());

    let outcome = engine.rename("common.greet", "common.hello");
    let RenameOutcome::Renamed { files, usages } = outcome.clone() else {
        panic!("rename should succeed: {:?}", outcome);
    };
    assert_eq!(usages, 1);
    let files: Vec<String> = files.iter().map(|f| relative(&project.root, f)).collect();
    assert_eq!(
        files,
        vec![
            "locales/de/common.yaml",
            "locales/en/common.json",
            "src/page.tsx"
        ]
    );

    assert_eq!(
        project.read_file("locales/en/common.json")?,
        "{\n  \"hello\": \"Hi\"\n}\n"
    );
    assert_eq!(
        project.read_file("locales/de/common.yaml")?,
        "hello: Hallo # informal\n"
    );
    assert!(project.read_file("src/page.tsx")?.contains("return t('hello');"));

    let snapshot = engine.index().snapshot();
    assert!(!snapshot.contains_key("common.greet"));
    assert_eq!(
        snapshot.get_translation_strict("common.hello", "de").map(|e| e.value.clone()),
        Some("Hallo".to_string())
    );

    Ok(())
}

#[test]
fn test_module_scoping() -> Result<()> {
    let project = Project::with_files(&[
        ("packages/admin/locales/en.json", r#"{"admin.title": "Admin"}"#),
        ("packages/shared/locales/en.json", r#"{"shared.ok": "OK"}"#),
        ("packages/shop/locales/en.json", r#"{"shop.cart": "Cart"}"#),
    ])?;
    let config = Config {
        modules: BTreeMap::from([("admin".to_string(), vec!["shared".to_string()])]),
        ..Config::default()
    };
    let index = project.index_with(config);
    let snapshot = index.snapshot();

    assert_eq!(
        snapshot
            .get_translation_for_module("admin", "shared.ok", "en")
            .map(|e| e.value.clone()),
        Some("OK".to_string())
    );
    assert_eq!(
        snapshot.all_keys_for_module("admin"),
        vec!["admin.title", "shared.ok"]
    );
    assert_eq!(snapshot.all_keys_for_module("shop"), vec!["shop.cart"]);
    assert_eq!(
        snapshot.all_keys(),
        vec!["admin.title", "shared.ok", "shop.cart"]
    );

    Ok(())
}

#[test]
fn test_dispose_is_terminal() -> Result<()> {
    let project = Project::with_files(&[("locales/en.json", r#"{"a": "A"}"#)])?;
    let index = project.index();
    assert_eq!(index.state(), IndexState::Ready);

    index.dispose();
    index.initialize();
    index.refresh();
    assert_eq!(index.state(), IndexState::Disposed);
    assert!(index.snapshot().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_refresh_burst_coalesces() -> Result<()> {
    let project = Project::with_files(&[("locales/en.json", r#"{"a": "A"}"#)])?;
    let signals = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&signals);
    let index = TranslationIndex::builder(&project.root)
        .refresh_signal(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    index.initialize();
    index.settled().await;
    assert_eq!(index.published_count(), 1);

    project.write_file("locales/en.json", r#"{"a": "A", "b": "B"}"#)?;
    for _ in 0..10 {
        index.refresh();
    }
    index.settled().await;

    assert_eq!(index.published_count(), 2);
    assert_eq!(signals.load(Ordering::SeqCst), 2);
    assert_eq!(index.snapshot().all_keys(), vec!["a", "b"]);
    assert_eq!(index.state(), IndexState::Ready);

    index.dispose();
    Ok(())
}

#[tokio::test]
async fn test_document_changes_are_debounced() -> Result<()> {
    let project = Project::with_files(&[("locales/en.json", r#"{"a": "A"}"#)])?;
    let config = Config {
        debounce_millis: 50,
        ..Config::default()
    };
    let index = TranslationIndex::builder(&project.root).config(config).build();
    index.initialize();
    index.settled().await;

    let changed = project.root.join("locales/en.json");
    project.write_file("locales/en.json", r#"{"z": "Z"}"#)?;
    assert!(index.document_changed(&changed));
    assert!(index.document_changed(&changed));
    assert!(!index.document_changed(&project.root.join("src/app.ts")));
    assert_eq!(index.published_count(), 1);

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    index.settled().await;
    assert_eq!(index.published_count(), 2);
    assert_eq!(index.snapshot().all_keys(), vec!["z"]);

    index.dispose();
    Ok(())
}
