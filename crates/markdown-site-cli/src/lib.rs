use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use markdown_site_config::{Config, LoadOptions};
use markdown_site_convert::markdown_to_html;
use markdown_site_core::{BuildOptions, BuildOutcome, MarkdownSite, PageType};
use serde_json::json;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        None => handle_build(&load_site(cli.config)?, BuildArgs::default()),
        Some(Command::Build(args)) => handle_build(&load_site(cli.config)?, args),
        Some(Command::Convert(args)) => handle_convert(args),
        Some(Command::Page(args)) => handle_page(&load_site(cli.config)?, args),
    }
}

/// Resolve configuration for the commands that render pages.
fn load_site(config_path: Option<PathBuf>) -> Result<MarkdownSite> {
    let mut options = LoadOptions::default();
    if let Some(path) = config_path {
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    Ok(MarkdownSite::bootstrap(config))
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    let _ = builder.try_init();
}

fn handle_build(site: &MarkdownSite, args: BuildArgs) -> Result<i32> {
    let BuildArgs {
        output_dir,
        quiet,
        json,
    } = args;

    let outcome = site.build(&BuildOptions { output_dir })?;

    if json {
        emit(&serde_json::to_string_pretty(&summary(site.config(), &outcome))?)?;
    } else if !quiet {
        emit(&status_report(&outcome))?;
    }

    Ok(0)
}

fn status_report(outcome: &BuildOutcome) -> String {
    let mut report = String::new();
    for (_, output) in outcome.written() {
        let name = output.file_name().unwrap_or(output.as_os_str());
        report.push_str(&format!("✅ Created {}\n", Path::new(name).display()));
    }
    report.push_str("\n✨ All HTML files generated successfully!\n");
    report
}

fn summary(config: &Config, outcome: &BuildOutcome) -> serde_json::Value {
    json!({
        "config": {
            "working_directory": config.sources.working_directory,
            "layers": config
                .sources
                .layers
                .iter()
                .map(|layer| json!({ "kind": layer.kind.to_string(), "path": layer.path }))
                .collect::<Vec<_>>(),
        },
        "output_dir": outcome.output_dir,
        "written": outcome
            .written()
            .map(|(source, output)| json!({ "source": source, "output": output }))
            .collect::<Vec<_>>(),
        "skipped": outcome
            .skipped()
            .map(|source| json!({ "source": source }))
            .collect::<Vec<_>>(),
    })
}

fn handle_convert(args: ConvertArgs) -> Result<i32> {
    let markdown = read_input(&args.path)?;
    emit(&markdown_to_html(&markdown))?;
    Ok(0)
}

fn handle_page(site: &MarkdownSite, args: PageArgs) -> Result<i32> {
    let PageArgs {
        path,
        title,
        page_type,
    } = args;

    let markdown = read_input(&path)?;
    let title = title.unwrap_or_else(|| default_title(&path));
    let page_type = page_type.map(PageType::from).unwrap_or(PageType::Readme);

    emit(&site.render_page(&title, &markdown, page_type))?;
    Ok(0)
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .filter(|_| path != Path::new("-"))
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_owned())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut buffer)
            .context("Unable to read Markdown from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Unable to read Markdown at path: {}", path.display()))
    }
}

fn emit(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match write_terminated(&mut handle, content) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err).context("Failed to write to stdout"),
    }
}

fn write_terminated(out: &mut impl Write, content: &str) -> io::Result<()> {
    out.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Render Markdown documents into standalone HTML pages",
    propagate_version = true
)]
struct Cli {
    /// Configuration file taking precedence over discovered `.markdown-site.toml` files
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Raise diagnostic logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render every configured document (default)
    Build(BuildArgs),
    /// Print the HTML fragment for one Markdown file
    Convert(ConvertArgs),
    /// Print the full page for one Markdown file
    Page(PageArgs),
}

#[derive(Args, Default)]
struct BuildArgs {
    /// Write pages to this directory instead of the configured one
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Suppress per-file status lines
    #[arg(long, conflicts_with = "json")]
    quiet: bool,
    /// Emit a machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Markdown file, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

#[derive(Args)]
struct PageArgs {
    /// Markdown file, or `-` for stdin
    #[arg(value_name = "FILE")]
    path: PathBuf,
    /// Page title (defaults to the file stem)
    #[arg(long)]
    title: Option<String>,
    /// Page type tag
    #[arg(long = "page-type", value_enum)]
    page_type: Option<PageTypeValue>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageTypeValue {
    Readme,
    QuickReference,
    Notebook,
    Index,
}

impl From<PageTypeValue> for PageType {
    fn from(value: PageTypeValue) -> Self {
        match value {
            PageTypeValue::Readme => PageType::Readme,
            PageTypeValue::QuickReference => PageType::QuickReference,
            PageTypeValue::Notebook => PageType::Notebook,
            PageTypeValue::Index => PageType::Index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_site_core::DocumentStatus;

    #[test]
    fn default_title_uses_file_stem() {
        assert_eq!(default_title(Path::new("docs/QUICK_REFERENCE.md")), "QUICK_REFERENCE");
        assert_eq!(default_title(Path::new("-")), "Untitled");
    }

    #[test]
    fn status_report_lists_file_names_then_closing_line() {
        let outcome = BuildOutcome {
            output_dir: PathBuf::from("docs"),
            documents: vec![
                DocumentStatus::Written {
                    source: PathBuf::from("README.md"),
                    output: PathBuf::from("docs/readme.html"),
                },
                DocumentStatus::Skipped {
                    source: PathBuf::from("QUICK_REFERENCE.md"),
                },
            ],
        };

        assert_eq!(
            status_report(&outcome),
            "✅ Created readme.html\n\n✨ All HTML files generated successfully!\n"
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
