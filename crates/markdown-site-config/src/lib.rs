//! Configuration primitives and loader for markdown-site.
//!
//! Settings resolve through a precedence stack:
//! override flag → working directory → git root → built-in defaults.
//! Scalar site settings merge field by field; the document, navigation and
//! footer lists are replaced wholesale by the highest layer that sets them.
//! Relative paths resolve against the directory of the layer that set them.

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use markdown_site_template::{
    NavLink, PageType, SiteTemplate, DEFAULT_FONT_HREF, DEFAULT_STYLESHEET,
};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = ".markdown-site.toml";
const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteSettings,
    pub documents: Vec<DocumentSpec>,
    pub navigation: Vec<NavLink>,
    pub footer: Vec<NavLink>,
    pub sources: ConfigSources,
}

/// Presentation and output settings shared by every page.
#[derive(Clone, Debug)]
pub struct SiteSettings {
    pub name: String,
    pub brand_icon: String,
    pub font_href: String,
    pub copyright: String,
    /// File the stylesheet was read from; `None` for the built-in sheet.
    pub stylesheet_path: Option<PathBuf>,
    pub stylesheet: String,
    pub output_dir: PathBuf,
}

/// One Markdown input and the page it becomes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocumentSpec {
    pub source: PathBuf,
    /// Plain file name inside the output directory.
    pub output: String,
    pub title: String,
    pub page_type: PageType,
}

impl Config {
    /// Build the immutable template handed to the page assembler.
    pub fn to_template(&self) -> SiteTemplate {
        SiteTemplate {
            site_name: self.site.name.clone(),
            brand_icon: self.site.brand_icon.clone(),
            font_href: self.site.font_href.clone(),
            stylesheet: self.site.stylesheet.clone(),
            navigation: self.navigation.clone(),
            footer: self.footer.clone(),
            copyright: self.site.copyright.clone(),
        }
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to read stylesheet {path}: {source}")]
    Stylesheet { path: PathBuf, source: io::Error },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;

        let stylesheet = match &resolved.stylesheet_path {
            Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::Stylesheet {
                path: path.clone(),
                source,
            })?,
            None => DEFAULT_STYLESHEET.to_owned(),
        };

        Ok(Config {
            site: SiteSettings {
                name: resolved.name,
                brand_icon: resolved.brand_icon,
                font_href: resolved.font_href,
                copyright: resolved.copyright,
                stylesheet_path: resolved.stylesheet_path,
                stylesheet,
                output_dir: resolved.output_dir,
            },
            documents: resolved.documents,
            navigation: resolved.navigation,
            footer: resolved.footer,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let defaults = SiteTemplate::default();

    let site = SitePartial {
        name: Some(Located::new(defaults.site_name, source.clone())),
        brand_icon: Some(Located::new(defaults.brand_icon, source.clone())),
        font_href: Some(Located::new(DEFAULT_FONT_HREF.to_owned(), source.clone())),
        copyright: Some(Located::new(defaults.copyright, source.clone())),
        stylesheet: None,
        output_dir: Some(Located::new(
            PathBuf::from(DEFAULT_OUTPUT_DIR),
            source.clone(),
        )),
    };

    let documents = vec![
        RawDocument {
            source: PathBuf::from("README.md"),
            output: "readme.html".into(),
            title: "NumPy Tutorial".into(),
            page_type: PageType::Readme.as_str().into(),
        },
        RawDocument {
            source: PathBuf::from("QUICK_REFERENCE.md"),
            output: "quick-reference.html".into(),
            title: "Quick Reference".into(),
            page_type: PageType::QuickReference.as_str().into(),
        },
    ];

    PartialConfig {
        site,
        documents: Some(Located::new(documents, source.clone())),
        navigation: Some(Located::new(raw_links(&defaults.navigation), source.clone())),
        footer: Some(Located::new(raw_links(&defaults.footer), source)),
    }
}

fn raw_links(links: &[NavLink]) -> Vec<RawLink> {
    links
        .iter()
        .map(|link| RawLink {
            label: link.label.clone(),
            href: link.href.clone(),
            external: link.external,
        })
        .collect()
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    site: SitePartial,
    documents: Option<Located<Vec<RawDocument>>>,
    navigation: Option<Located<Vec<RawLink>>>,
    footer: Option<Located<Vec<RawLink>>>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        self.site.merge(other.site);
        if other.documents.is_some() {
            self.documents = other.documents;
        }
        if other.navigation.is_some() {
            self.navigation = other.navigation;
        }
        if other.footer.is_some() {
            self.footer = other.footer;
        }
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();

        let name = required_text(self.site.name, "site.name", &mut errors);
        let brand_icon = self.site.brand_icon.map(|v| v.value).unwrap_or_default();
        let font_href = self
            .site
            .font_href
            .map(|v| v.value)
            .unwrap_or_else(|| DEFAULT_FONT_HREF.to_owned());
        let copyright = self.site.copyright.map(|v| v.value).unwrap_or_default();
        let stylesheet_path = self.site.stylesheet.as_ref().map(resolve_path);
        let output_dir = self
            .site
            .output_dir
            .as_ref()
            .map(resolve_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let documents = self
            .documents
            .map(|located| finalize_documents(located, &mut errors))
            .unwrap_or_default();
        if documents.is_empty() && errors.is_empty() {
            errors.push(ConfigValidationError::new(
                None,
                "at least one document is required".into(),
            ));
        }

        let navigation = self
            .navigation
            .map(|located| finalize_links(located, "navigation", &mut errors))
            .unwrap_or_default();
        let footer = self
            .footer
            .map(|located| finalize_links(located, "footer", &mut errors))
            .unwrap_or_default();

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            name,
            brand_icon,
            font_href,
            copyright,
            stylesheet_path,
            output_dir,
            documents,
            navigation,
            footer,
        })
    }
}

fn required_text(
    located: Option<Located<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> String {
    match located {
        Some(located) if !located.value.trim().is_empty() => located.value,
        Some(located) => {
            errors.push(
                ConfigValidationError::new(Some(located.source), "cannot be empty".into())
                    .with_context(context),
            );
            String::new()
        }
        None => {
            errors.push(
                ConfigValidationError::new(None, "must be set".into()).with_context(context),
            );
            String::new()
        }
    }
}

fn finalize_documents(
    located: Located<Vec<RawDocument>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<DocumentSpec> {
    let source = located.source;
    let mut seen_outputs = HashSet::new();
    let mut documents = Vec::new();

    for (idx, raw) in located.value.into_iter().enumerate() {
        let context = format!("documents[{idx}]");
        let mut problems = Vec::new();

        if raw.source.as_os_str().is_empty() {
            problems.push("source cannot be empty".to_owned());
        }
        if raw.title.trim().is_empty() {
            problems.push("title cannot be empty".to_owned());
        }
        if raw.output.trim().is_empty() {
            problems.push("output cannot be empty".to_owned());
        } else if raw.output.contains(['/', '\\']) {
            problems.push(format!(
                "output '{}' must be a file name, not a path",
                raw.output
            ));
        } else if !seen_outputs.insert(raw.output.clone()) {
            problems.push(format!("output '{}' is used more than once", raw.output));
        }

        let page_type = match raw.page_type.parse::<PageType>() {
            Ok(page_type) => Some(page_type),
            Err(()) => {
                let known: Vec<&str> = PageType::ALL.iter().map(|p| p.as_str()).collect();
                problems.push(format!(
                    "unknown page_type '{}' (expected one of: {})",
                    raw.page_type,
                    known.join(", ")
                ));
                None
            }
        };

        if !problems.is_empty() {
            for message in problems {
                errors.push(
                    ConfigValidationError::new(Some(source.clone()), message)
                        .with_context(context.clone()),
                );
            }
            continue;
        }

        if let Some(page_type) = page_type {
            documents.push(DocumentSpec {
                source: make_absolute(&raw.source, &source.base_dir),
                output: raw.output,
                title: raw.title,
                page_type,
            });
        }
    }

    documents
}

fn finalize_links(
    located: Located<Vec<RawLink>>,
    section: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<NavLink> {
    let mut links = Vec::new();
    for (idx, raw) in located.value.into_iter().enumerate() {
        let context = format!("{section}[{idx}]");
        if raw.label.trim().is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    "label cannot be empty".into(),
                )
                .with_context(context.clone()),
            );
        }
        if raw.href.trim().is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    "href cannot be empty".into(),
                )
                .with_context(context),
            );
        }
        links.push(NavLink {
            label: raw.label,
            href: raw.href,
            external: raw.external,
        });
    }
    links
}

#[derive(Clone, Debug, Default)]
struct SitePartial {
    name: Option<Located<String>>,
    brand_icon: Option<Located<String>>,
    font_href: Option<Located<String>>,
    copyright: Option<Located<String>>,
    stylesheet: Option<Located<PathBuf>>,
    output_dir: Option<Located<PathBuf>>,
}

impl SitePartial {
    fn merge(&mut self, other: SitePartial) {
        if other.name.is_some() {
            self.name = other.name;
        }
        if other.brand_icon.is_some() {
            self.brand_icon = other.brand_icon;
        }
        if other.font_href.is_some() {
            self.font_href = other.font_href;
        }
        if other.copyright.is_some() {
            self.copyright = other.copyright;
        }
        if other.stylesheet.is_some() {
            self.stylesheet = other.stylesheet;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    make_absolute(&located.value, &located.source.base_dir)
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    name: String,
    brand_icon: String,
    font_href: String,
    copyright: String,
    stylesheet_path: Option<PathBuf>,
    output_dir: PathBuf,
    documents: Vec<DocumentSpec>,
    navigation: Vec<NavLink>,
    footer: Vec<NavLink>,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    site: Option<RawSite>,
    #[serde(default)]
    documents: Option<Vec<RawDocument>>,
    #[serde(default)]
    navigation: Option<Vec<RawLink>>,
    #[serde(default)]
    footer: Option<Vec<RawLink>>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            site: self
                .site
                .map(|site| site.into_partial(source.clone()))
                .unwrap_or_default(),
            documents: self
                .documents
                .map(|value| Located::new(value, source.clone())),
            navigation: self
                .navigation
                .map(|value| Located::new(value, source.clone())),
            footer: self.footer.map(|value| Located::new(value, source)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSite {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    brand_icon: Option<String>,
    #[serde(default)]
    font_href: Option<String>,
    #[serde(default)]
    copyright: Option<String>,
    #[serde(default)]
    stylesheet: Option<PathBuf>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

impl RawSite {
    fn into_partial(self, source: ConfigSource) -> SitePartial {
        SitePartial {
            name: self.name.map(|value| Located::new(value, source.clone())),
            brand_icon: self
                .brand_icon
                .map(|value| Located::new(value, source.clone())),
            font_href: self
                .font_href
                .map(|value| Located::new(value, source.clone())),
            copyright: self
                .copyright
                .map(|value| Located::new(value, source.clone())),
            stylesheet: self
                .stylesheet
                .map(|value| Located::new(value, source.clone())),
            output_dir: self.output_dir.map(|value| Located::new(value, source)),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawDocument {
    source: PathBuf,
    output: String,
    title: String,
    #[serde(default = "default_page_type")]
    page_type: String,
}

fn default_page_type() -> String {
    PageType::Readme.as_str().to_owned()
}

#[derive(Clone, Debug, Deserialize)]
struct RawLink {
    label: String,
    href: String,
    #[serde(default)]
    external: bool,
}
