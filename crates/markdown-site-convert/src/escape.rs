/// Escape the HTML metacharacters that matter inside element content and
/// double-quoted attributes.
///
/// ```
/// use markdown_site_convert::escape_html;
///
/// assert_eq!(escape_html("a < b && \"c\""), "a &lt; b &amp;&amp; &quot;c&quot;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_entities_are_escaped_again() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn single_quotes_pass_through() {
        assert_eq!(escape_html("it's"), "it's");
    }
}
