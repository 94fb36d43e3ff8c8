//! Heredoc terminator matching and indent stripping.
//!
//! PHP 7.3 allows the closing label to be indented; the matched indentation
//! is then stripped from every body line. Indent comparison works on the
//! longest common byte prefix, so mixed tabs/spaces strip only what actually
//! matches.

/// A heredoc declaration waiting for its body.
#[derive(Debug, Clone)]
pub struct PendingHeredoc {
    /// Exact terminator label.
    pub label: String,
    /// True for `<<<'LABEL'` (no interpolation; body stays literal).
    pub is_nowdoc: bool,
    /// True once the newline ending the opener line has been emitted; the
    /// body starts on the following line.
    pub seen_newline: bool,
}

/// A successful terminator match at a line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminatorMatch {
    /// Bytes of horizontal whitespace before the label.
    pub indent_len: usize,
    /// Bytes of indent plus label.
    pub total_len: usize,
}

/// Check whether `rest` (positioned at a line start) begins with the
/// terminator for `label`: optional horizontal whitespace, the label, then a
/// newline, `;`, or end of input.
pub fn match_terminator(rest: &str, label: &str) -> Option<TerminatorMatch> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let after = i + label.len();
    if !rest[i..].starts_with(label) {
        return None;
    }
    match bytes.get(after) {
        None | Some(b'\n') | Some(b'\r') | Some(b';') => {
            Some(TerminatorMatch { indent_len: i, total_len: after })
        }
        _ => None,
    }
}

/// Strip the terminator's indentation from each body line and drop the final
/// line terminator before the closing label.
///
/// Only the longest common byte prefix with `indent` is removed per line, so
/// lines indented differently keep their remainder intact.
pub fn strip_body_indent(body: &str, indent: &str) -> String {
    let body = body
        .strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .or_else(|| body.strip_suffix('\r'))
        .unwrap_or(body);
    if indent.is_empty() {
        return body.to_string();
    }
    let mut out = String::with_capacity(body.len());
    for line in body.split_inclusive('\n') {
        let strip = common_prefix_len(line.as_bytes(), indent.as_bytes());
        out.push_str(&line[strip..]);
    }
    out
}

/// Length of the common byte prefix between two slices.
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len());
    let mut i = 0;
    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminator_at_line_start() {
        let m = match_terminator("EOT\nrest", "EOT");
        assert_eq!(m, Some(TerminatorMatch { indent_len: 0, total_len: 3 }));
    }

    #[test]
    fn test_terminator_with_semicolon() {
        let m = match_terminator("EOT;", "EOT");
        assert_eq!(m, Some(TerminatorMatch { indent_len: 0, total_len: 3 }));
    }

    #[test]
    fn test_terminator_indented() {
        let m = match_terminator("    EOT\n", "EOT");
        assert_eq!(m, Some(TerminatorMatch { indent_len: 4, total_len: 7 }));
    }

    #[test]
    fn test_terminator_rejects_longer_identifier() {
        assert_eq!(match_terminator("EOTX\n", "EOT"), None);
        assert_eq!(match_terminator("EO\n", "EOT"), None);
    }

    #[test]
    fn test_terminator_at_eof() {
        assert!(match_terminator("EOT", "EOT").is_some());
    }

    #[test]
    fn test_strip_indent() {
        let body = "    line one\n      line two\n";
        assert_eq!(strip_body_indent(body, "    "), "line one\n  line two");
    }

    #[test]
    fn test_strip_indent_partial_match() {
        // A line with less indentation loses only what matches
        let body = "    a\n  b\n";
        assert_eq!(strip_body_indent(body, "    "), "a\n  b");
    }

    #[test]
    fn test_strip_no_indent_trims_final_newline() {
        assert_eq!(strip_body_indent("hello\nworld\n", ""), "hello\nworld");
        assert_eq!(strip_body_indent("hello\r\n", ""), "hello");
    }
}
