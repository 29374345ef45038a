//! Markdown rendering of assistant replies.
//!
//! Input is sanitized first ([`sanitize::strip_controls`]); raw HTML inside
//! the markdown is never passed through, it is shown as text. Links with
//! script-capable schemes are neutralized.

use colored::Colorize;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::sanitize;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Render markdown to an HTML fragment that is safe to embed.
pub fn to_html(markdown: &str) -> String {
    let clean = sanitize::strip_controls(markdown);
    let mut options = options();
    options.insert(Options::ENABLE_TABLES);

    let events = Parser::new_ext(&clean, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !sanitize::is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !sanitize::is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Render markdown to styled terminal text.
pub fn to_terminal(markdown: &str) -> String {
    let clean = sanitize::strip_controls(markdown);
    let mut writer = TerminalWriter::default();
    for event in Parser::new_ext(&clean, options()) {
        writer.event(event);
    }
    writer.finish()
}

#[derive(Default)]
struct TerminalWriter {
    out: String,
    strong: usize,
    emphasis: usize,
    heading: usize,
    code_block: bool,
    /// Open lists; `Some(n)` is an ordered list whose next number is `n`.
    lists: Vec<Option<u64>>,
    links: Vec<String>,
}

impl TerminalWriter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.out.push_str(&code.cyan().to_string()),
            Event::Html(raw) | Event::InlineHtml(raw) => self.text(&raw),
            Event::SoftBreak | Event::HardBreak => self.out.push('\n'),
            Event::Rule => {
                self.line_start();
                self.out.push_str(&"─".repeat(24).dimmed().to_string());
                self.out.push('\n');
            }
            Event::TaskListMarker(done) => self.out.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.line_start();
                self.heading += 1;
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::CodeBlock(_) => {
                self.line_start();
                self.code_block = true;
            }
            Tag::List(first) => {
                self.line_start();
                self.lists.push(first);
            }
            Tag::Item => {
                self.line_start();
                let depth = self.lists.len().saturating_sub(1);
                self.out.push_str(&"  ".repeat(depth));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => "• ".to_string(),
                };
                self.out.push_str(&bullet);
            }
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.heading = self.heading.saturating_sub(1);
                self.out.push_str("\n\n");
            }
            TagEnd::Paragraph => {
                self.out.push('\n');
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.out.push('\n');
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.line_start();
                if self.lists.is_empty() {
                    self.out.push('\n');
                }
            }
            TagEnd::Item => self.line_start(),
            TagEnd::Link => {
                if let Some(dest) = self.links.pop()
                    && !dest.is_empty()
                    && sanitize::is_safe_url(&dest)
                {
                    self.out
                        .push_str(&format!(" ({dest})").dimmed().to_string());
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code_block {
            for line in text.lines() {
                self.out.push_str("    ");
                self.out.push_str(&line.dimmed().to_string());
                self.out.push('\n');
            }
            return;
        }

        let mut styled = text.normal();
        if self.strong > 0 || self.heading > 0 {
            styled = styled.bold();
        }
        if self.emphasis > 0 {
            styled = styled.italic();
        }
        self.out.push_str(&styled.to_string());
    }

    /// Make sure the next output starts on a fresh line.
    fn line_start(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn html_escapes_raw_markup() {
        let out = to_html("hello <script>alert(1)</script> **world**");
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
        assert!(out.contains("<strong>world</strong>"));
    }

    #[test]
    fn html_neutralizes_script_links() {
        let out = to_html("[click](javascript:alert(1)) and [site](https://example.com)");
        assert!(!out.contains("javascript:"));
        assert!(out.contains(r##"href="#""##));
        assert!(out.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn terminal_renders_lists_and_headings() {
        plain();
        let out = to_terminal("# Plan\n\n- walk 30 min\n- drink water\n\n1. sleep\n2. rest");
        assert_eq!(
            out,
            "Plan\n\n• walk 30 min\n• drink water\n\n1. sleep\n2. rest"
        );
    }

    #[test]
    fn terminal_drops_escape_sequences() {
        plain();
        let out = to_terminal("safe \x1b]0;title\x07text \x1b[2J<b>raw</b>");
        assert!(!out.contains('\x1b'));
        assert!(out.contains("<b>raw</b>"));
    }

    #[test]
    fn terminal_shows_safe_link_targets_only() {
        plain();
        let out = to_terminal("[docs](https://example.com) [bad](javascript:x)");
        assert_eq!(out, "docs (https://example.com) bad");
    }
}
