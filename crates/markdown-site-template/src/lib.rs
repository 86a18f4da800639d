//! Page template for markdown-site.
//!
//! [`assemble`] embeds a converted fragment into a standalone HTML document
//! with navigation, footer, inline stylesheet and the active-link script.
//! Neither the title nor the fragment is escaped: pages are built from
//! authored documents, and the converter already escapes code block contents.

mod page_type;

pub use page_type::PageType;

use std::fmt;

/// Stylesheet embedded in every page unless the configuration supplies one.
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/site.css");

pub const DEFAULT_FONT_HREF: &str = "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;600;700;900&family=Fira+Code:wght@400;500;700&display=swap";

/// A navigation or footer link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    /// Opens in a new tab.
    pub external: bool,
}

impl NavLink {
    pub fn internal(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            external: false,
        }
    }

    pub fn external(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            external: true,
        }
    }
}

/// Immutable presentation data shared by every page of a site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SiteTemplate {
    pub site_name: String,
    pub brand_icon: String,
    pub font_href: String,
    pub stylesheet: String,
    pub navigation: Vec<NavLink>,
    pub footer: Vec<NavLink>,
    /// Inserted verbatim, so entities such as `&copy;` are allowed.
    pub copyright: String,
}

impl SiteTemplate {
    /// Navigation used by the default site: home, tutorial, quick reference,
    /// notebook, and the upstream repository.
    pub fn default_links() -> Vec<NavLink> {
        vec![
            NavLink::internal("Home", "index.html"),
            NavLink::internal("Tutorial", "readme.html"),
            NavLink::internal("Quick Reference", "quick-reference.html"),
            NavLink::internal("Interactive Code", "notebook.html"),
            NavLink::external("GitHub", "https://github.com/DhruvilThummar/Numpy"),
        ]
    }
}

impl Default for SiteTemplate {
    fn default() -> Self {
        Self {
            site_name: "NumPy Crash Notes".to_owned(),
            brand_icon: "📊".to_owned(),
            font_href: DEFAULT_FONT_HREF.to_owned(),
            stylesheet: DEFAULT_STYLESHEET.to_owned(),
            navigation: Self::default_links(),
            footer: Self::default_links(),
            copyright: "&copy; 2024 NumPy Crash Notes. Built for learners everywhere.".to_owned(),
        }
    }
}

/// Assembler bound to one site template.
#[derive(Clone, Debug)]
pub struct Assembler {
    template: SiteTemplate,
}

impl Assembler {
    pub fn new(template: SiteTemplate) -> Self {
        Self { template }
    }

    pub fn assemble(&self, title: &str, fragment: &str, page_type: PageType) -> String {
        assemble(&self.template, title, fragment, page_type)
    }
}

/// Wrap `fragment` into a complete HTML document titled `title`.
pub fn assemble(
    template: &SiteTemplate,
    title: &str,
    fragment: &str,
    page_type: PageType,
) -> String {
    log::debug!("assembling {page_type} page '{title}'");
    Page {
        template,
        title,
        fragment,
    }
    .to_string()
}

const ACTIVE_LINK_SCRIPT: &str = r#"    <script>
        // Active navigation link
        document.addEventListener('DOMContentLoaded', function() {
            const currentPage = window.location.pathname.split('/').pop() || 'index.html';
            document.querySelectorAll('.nav-link').forEach(link => {
                if (link.getAttribute('href') === currentPage) {
                    link.classList.add('active');
                }
            });
        });
    </script>"#;

struct Page<'a> {
    template: &'a SiteTemplate,
    title: &'a str,
    fragment: &'a str,
}

impl Page<'_> {
    fn write_head(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let site = &self.template.site_name;
        let title = self.title;
        writeln!(f, "<head>")?;
        writeln!(f, "    <meta charset=\"UTF-8\">")?;
        writeln!(
            f,
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(
            f,
            "    <meta name=\"description\" content=\"{title} - {site}\">"
        )?;
        writeln!(f, "    <title>{title} - {site}</title>")?;
        writeln!(
            f,
            "    <link rel=\"preconnect\" href=\"https://fonts.googleapis.com\">"
        )?;
        writeln!(
            f,
            "    <link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin>"
        )?;
        writeln!(
            f,
            "    <link href=\"{}\" rel=\"stylesheet\">",
            self.template.font_href
        )?;
        writeln!(f, "    <style>")?;
        for line in self.template.stylesheet.lines() {
            if line.trim().is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, "        {line}")?;
            }
        }
        writeln!(f, "    </style>")?;
        writeln!(f, "</head>")
    }

    fn write_nav(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    <!-- Navigation -->")?;
        writeln!(f, "    <nav class=\"navbar\">")?;
        writeln!(f, "        <div class=\"nav-container\">")?;
        writeln!(f, "            <a href=\"index.html\" class=\"nav-brand\">")?;
        writeln!(
            f,
            "                <span class=\"nav-icon\">{}</span>",
            self.template.brand_icon
        )?;
        writeln!(f, "                {}", self.template.site_name)?;
        writeln!(f, "            </a>")?;
        writeln!(f, "            <div class=\"nav-links\">")?;
        for link in &self.template.navigation {
            let target = if link.external { " target=\"_blank\"" } else { "" };
            writeln!(
                f,
                "                <a href=\"{}\"{target} class=\"nav-link\">{}</a>",
                link.href, link.label
            )?;
        }
        writeln!(f, "            </div>")?;
        writeln!(f, "        </div>")?;
        writeln!(f, "    </nav>")
    }

    fn write_footer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    <!-- Footer -->")?;
        writeln!(f, "    <footer>")?;
        writeln!(f, "        <div class=\"footer-container\">")?;
        writeln!(f, "            <div class=\"footer-links\">")?;
        for link in &self.template.footer {
            let target = if link.external { " target=\"_blank\"" } else { "" };
            writeln!(
                f,
                "                <a href=\"{}\"{target}>{}</a>",
                link.href, link.label
            )?;
        }
        writeln!(f, "            </div>")?;
        writeln!(f, "            <div class=\"footer-bottom\">")?;
        writeln!(f, "                <p>{}</p>", self.template.copyright)?;
        writeln!(f, "            </div>")?;
        writeln!(f, "        </div>")?;
        writeln!(f, "    </footer>")
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html lang=\"en\">")?;
        self.write_head(f)?;
        writeln!(f, "<body>")?;
        self.write_nav(f)?;
        writeln!(f)?;
        writeln!(f, "    <!-- Main Content -->")?;
        writeln!(f, "    <main>")?;
        writeln!(f, "        <article class=\"markdown-content\">")?;
        writeln!(f, "{}", self.fragment)?;
        writeln!(f, "        </article>")?;
        writeln!(f, "    </main>")?;
        writeln!(f)?;
        self.write_footer(f)?;
        writeln!(f)?;
        writeln!(f, "{ACTIVE_LINK_SCRIPT}")?;
        writeln!(f, "</body>")?;
        write!(f, "</html>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stylesheet_is_embedded() {
        assert!(DEFAULT_STYLESHEET.contains("nav.navbar"));
        assert!(!DEFAULT_STYLESHEET.contains("{{"));
    }

    #[test]
    fn stylesheet_lines_are_indented() {
        let template = SiteTemplate {
            stylesheet: "body {\n    color: red;\n}\n\np { margin: 0; }".to_owned(),
            ..SiteTemplate::default()
        };
        let page = assemble(&template, "T", "", PageType::Index);
        assert!(page.contains("    <style>\n        body {\n            color: red;\n        }\n\n        p { margin: 0; }\n    </style>"));
    }
}
