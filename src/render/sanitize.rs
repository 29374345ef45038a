//! Neutralizing text before it reaches a display surface.
//!
//! Assistant replies come from a remote service and user text is untrusted
//! input echoed back. Neither may smuggle terminal control sequences or HTML
//! into the transcript.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// CSI (`\x1b[...X`), OSC (`\x1b]...BEL` / `\x1b]...ST`) and charset
/// designation (`\x1b(B`) sequences.
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?|\x1b[()][A-B0-2]")
        .expect("ANSI regex must compile")
});

/// URL schemes that execute code when followed.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:", "file:"];

/// Remove escape sequences and stray control characters from remote text.
///
/// Newlines and tabs survive; everything else below `0x20` (and DEL) is
/// dropped.
pub fn strip_controls(text: &str) -> Cow<'_, str> {
    let stripped = ANSI_RE.replace_all(text, "");
    if !stripped.chars().any(is_unsafe_control) {
        return stripped;
    }
    Cow::Owned(stripped.chars().filter(|c| !is_unsafe_control(*c)).collect())
}

/// Make user text printable verbatim: control characters are shown in
/// escaped form (`\u{1b}`) instead of being interpreted by the terminal.
pub fn literal(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_unsafe_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_unsafe_control(c) {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a link target is safe to keep in rendered markup.
pub fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    !UNSAFE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn is_unsafe_control(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_and_title_sequences() {
        let text = "\x1b[31mred\x1b[0m and \x1b]0;pwned\x07title";
        assert_eq!(strip_controls(text), "red and title");
    }

    #[test]
    fn strips_bare_controls_but_keeps_layout() {
        assert_eq!(strip_controls("a\rb\x08c\n\td"), "abc\n\td");
        assert!(matches!(strip_controls("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn literal_shows_escapes_verbatim() {
        assert_eq!(literal("hi\x1b[2J"), "hi\\u{1b}[2J");
        assert_eq!(literal("line\nnext"), "line\nnext");
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn unsafe_schemes_are_rejected() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("/dashboard"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url(" JavaScript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,xx"));
    }
}
