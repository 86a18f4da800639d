/// Split Markdown text into lines on `\n`, dropping a trailing `\r` from each.
///
/// A trailing newline yields a final empty line, so joining the result with
/// `\n` reproduces the input minus carriage returns.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn strips_carriage_returns() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn empty_input_is_one_empty_line() {
        assert_eq!(split_lines(""), vec![""]);
    }
}
