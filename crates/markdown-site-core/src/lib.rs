//! Core orchestration layer for markdown-site.
//!
//! Each configured document is read, converted, assembled into a page and
//! written out. Documents are independent: a missing source only skips that
//! document, while any other I/O failure aborts the build.

mod build;
mod error;

pub use build::{BuildOptions, BuildOutcome, DocumentStatus};
pub use error::{SiteError, SiteResult};
pub use markdown_site_config::{Config, DocumentSpec};
pub use markdown_site_template::PageType;

use markdown_site_convert::Converter;
use markdown_site_template::Assembler;
use markdown_site_utils::{atomic_write, read_optional};

/// Entry point for higher-level consumers (CLI, tests).
pub struct MarkdownSite {
    config: Config,
    converter: Converter,
    assembler: Assembler,
}

impl MarkdownSite {
    /// Bootstrap the site engine from configuration.
    pub fn bootstrap(config: Config) -> Self {
        let assembler = Assembler::new(config.to_template());
        Self {
            config,
            converter: Converter::new(),
            assembler,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert Markdown into an HTML fragment.
    pub fn convert(&self, markdown: &str) -> String {
        self.converter.convert(markdown)
    }

    /// Convert Markdown and wrap it into a full page.
    pub fn render_page(&self, title: &str, markdown: &str, page_type: PageType) -> String {
        let fragment = self.converter.convert(markdown);
        self.assembler.assemble(title, &fragment, page_type)
    }

    pub fn render_document(&self, document: &DocumentSpec, markdown: &str) -> String {
        self.render_page(&document.title, markdown, document.page_type)
    }

    /// Render every configured document whose source exists.
    pub fn build(&self, options: &BuildOptions) -> SiteResult<BuildOutcome> {
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| self.config.site.output_dir.clone());

        let mut documents = Vec::with_capacity(self.config.documents.len());
        for document in &self.config.documents {
            let Some(markdown) =
                read_optional(&document.source).map_err(SiteError::io(&document.source))?
            else {
                log::info!("skipping {}: source not found", document.source.display());
                documents.push(DocumentStatus::Skipped {
                    source: document.source.clone(),
                });
                continue;
            };

            let page = self.render_document(document, &markdown);
            let output = output_dir.join(&document.output);
            atomic_write(&output, &page).map_err(SiteError::io(&output))?;
            log::debug!(
                "wrote {} ({} bytes) from {}",
                output.display(),
                page.len(),
                document.source.display()
            );

            documents.push(DocumentStatus::Written {
                source: document.source.clone(),
                output,
            });
        }

        Ok(BuildOutcome {
            output_dir,
            documents,
        })
    }
}
