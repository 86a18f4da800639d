use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use markdown_site_config::{Config, ConfigError, ConfigSourceKind, LoadOptions};
use markdown_site_template::{NavLink, PageType, DEFAULT_STYLESHEET};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.site.name, "NumPy Crash Notes");
    assert_eq!(config.site.output_dir, working_dir.join("docs"));
    assert_eq!(config.site.stylesheet, DEFAULT_STYLESHEET);
    assert!(config.site.stylesheet_path.is_none());

    assert_eq!(config.documents.len(), 2);
    assert_eq!(config.documents[0].source, working_dir.join("README.md"));
    assert_eq!(config.documents[0].output, "readme.html");
    assert_eq!(config.documents[0].title, "NumPy Tutorial");
    assert_eq!(config.documents[0].page_type, PageType::Readme);
    assert_eq!(
        config.documents[1].source,
        working_dir.join("QUICK_REFERENCE.md")
    );
    assert_eq!(config.documents[1].output, "quick-reference.html");
    assert_eq!(config.documents[1].page_type, PageType::QuickReference);

    assert_eq!(config.navigation.len(), 5);
    assert_eq!(config.sources.working_directory, working_dir);
    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(".markdown-site.toml"),
        r#"
        [site]
        name = "Root Notes"
        copyright = "root"
        output_dir = "public"

        [[footer]]
        label = "Root"
        href = "root.html"
        "#,
    );

    let workspace = git_root.join("workspace");
    fs::create_dir(&workspace).expect("create workspace");

    write_file(
        workspace.join(".markdown-site.toml"),
        r#"
        [site]
        name = "Workspace Notes"

        [[documents]]
        source = "guide.md"
        output = "guide.html"
        title = "Guide"
        page_type = "notebook"
        "#,
    );

    let override_path = workspace.join("override.toml");
    write_file(
        &override_path,
        r#"
        [site]
        brand_icon = "!"

        [[navigation]]
        label = "Upstream"
        href = "https://example.com"
        external = true
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&workspace)
            .with_override_path(&override_path),
    )
    .expect("load layered config");

    assert_eq!(config.site.name, "Workspace Notes");
    assert_eq!(config.site.copyright, "root");
    assert_eq!(config.site.brand_icon, "!");
    assert_eq!(config.site.output_dir, git_root.join("public"));

    assert_eq!(config.documents.len(), 1);
    assert_eq!(config.documents[0].source, workspace.join("guide.md"));
    assert_eq!(config.documents[0].page_type, PageType::Notebook);

    assert_eq!(
        config.navigation,
        vec![NavLink::external("Upstream", "https://example.com")]
    );
    assert_eq!(config.footer, vec![NavLink::internal("Root", "root.html")]);

    let kinds: Vec<ConfigSourceKind> = config.sources.layers.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override,
        ]
    );
}

#[test]
fn reads_stylesheet_relative_to_config() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    fs::create_dir(working_dir.join("theme")).expect("create theme dir");
    write_file(working_dir.join("theme/site.css"), "body { color: teal; }\n");
    write_file(
        working_dir.join(".markdown-site.toml"),
        r#"
        [site]
        stylesheet = "theme/site.css"
        "#,
    );

    let config =
        Config::load(LoadOptions::default().with_working_dir(&working_dir)).expect("load config");

    assert_eq!(config.site.stylesheet, "body { color: teal; }\n");
    assert_eq!(
        config.site.stylesheet_path,
        Some(working_dir.join("theme/site.css"))
    );
    assert_eq!(config.to_template().stylesheet, "body { color: teal; }\n");
}

#[test]
fn missing_stylesheet_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-site.toml"),
        r#"
        [site]
        stylesheet = "absent.css"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect_err("stylesheet must exist");

    assert!(matches!(err, ConfigError::Stylesheet { .. }));
}

#[test]
fn missing_override_is_an_error() {
    let temp = TempDir::new().expect("tempdir");

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(temp.path())
            .with_override_path("nope.toml"),
    )
    .expect_err("override must exist");

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn parse_errors_name_the_file() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path().join(".markdown-site.toml"), "[site\nname = 1");

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect_err("invalid toml");

    match err {
        ConfigError::Parse { path, .. } => {
            assert!(path.ends_with(".markdown-site.toml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn collects_every_validation_problem() {
    let temp = TempDir::new().expect("tempdir");
    write_file(
        temp.path().join(".markdown-site.toml"),
        r#"
        [site]
        name = "  "

        [[documents]]
        source = "a.md"
        output = "pages/a.html"
        title = "A"

        [[documents]]
        source = "b.md"
        output = "b.html"
        title = "B"
        page_type = "content"

        [[documents]]
        source = "c.md"
        output = "c.html"
        title = "C"

        [[documents]]
        source = "d.md"
        output = "c.html"
        title = "D"

        [[navigation]]
        label = ""
        href = "x.html"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect_err("invalid config");

    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages.len(), 5, "{messages:#?}");
    assert!(messages[0].starts_with("site.name: cannot be empty"));
    assert!(messages[1].contains("documents[0]: output 'pages/a.html' must be a file name"));
    assert!(messages[2].contains("documents[1]: unknown page_type 'content'"));
    assert!(messages[3].contains("documents[3]: output 'c.html' is used more than once"));
    assert!(messages[4].contains("navigation[0]: label cannot be empty"));
}

#[test]
fn empty_document_list_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path().join(".markdown-site.toml"), "documents = []\n");

    let err = Config::load(LoadOptions::default().with_working_dir(temp.path()))
        .expect_err("documents required");

    assert!(err.to_string().contains("at least one document is required"));
}
