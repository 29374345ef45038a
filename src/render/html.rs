//! In-memory HTML transcript, used for `plancoach chat --export`.

use super::{Handle, HandleSeq, Renderer, markdown, sanitize};
use crate::chat::Role;

const STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; background: #f5f7fa; margin: 0; }
.chat-box { max-width: 760px; margin: 24px auto; padding: 16px; }
.message { display: flex; margin: 12px 0; }
.message-user { justify-content: flex-end; }
.bubble-user { background: #4dabf7; color: #fff; border-radius: 14px; padding: 10px 14px; white-space: pre-wrap; max-width: 75%; }
.bubble-ai { background: #fff; border: 1px solid #e3e8ee; border-radius: 14px; padding: 10px 14px; max-width: 75%; }
.typing-indicator span { display: inline-block; width: 6px; height: 6px; margin: 0 2px; border-radius: 50%; background: #adb5bd; }
.toast { max-width: 760px; margin: 0 auto; color: #198754; font-size: 13px; }
"#;

struct Node {
    handle: Handle,
    placeholder: bool,
    html: String,
}

/// Collects the transcript as HTML bubbles.
///
/// User text is HTML-escaped; assistant text goes through
/// [`markdown::to_html`], which escapes any raw HTML in the reply.
pub struct HtmlRenderer {
    handles: HandleSeq,
    nodes: Vec<Node>,
    toasts: Vec<String>,
    markdown: bool,
}

impl HtmlRenderer {
    pub fn new(markdown: bool) -> Self {
        Self {
            handles: HandleSeq::default(),
            nodes: Vec::new(),
            toasts: Vec::new(),
            markdown,
        }
    }

    /// The bubbles rendered so far, in order.
    pub fn fragment(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.html.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A standalone page containing the transcript and any notices.
    pub fn to_document(&self, title: &str) -> String {
        let toasts: String = self
            .toasts
            .iter()
            .map(|toast| format!("<p class=\"toast\">{}</p>\n", sanitize::escape_html(toast)))
            .collect();
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"chat-box\">\n{body}\n</div>\n{toasts}</body>\n</html>\n",
            title = sanitize::escape_html(title),
            body = self.fragment(),
        )
    }

    pub fn toasts(&self) -> &[String] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Renderer for HtmlRenderer {
    fn render_turn(&mut self, role: Role, content: &str) -> Handle {
        let handle = self.handles.next_handle();
        let html = match role {
            Role::User => format!(
                "<div class=\"message message-user\"><div class=\"bubble-user\">{}</div></div>",
                sanitize::escape_html(&sanitize::literal(content))
            ),
            Role::Assistant => {
                let body = if self.markdown {
                    markdown::to_html(content)
                } else {
                    sanitize::escape_html(&sanitize::strip_controls(content))
                };
                format!("<div class=\"message message-ai\"><div class=\"bubble-ai\">{body}</div></div>")
            }
        };
        self.nodes.push(Node {
            handle,
            placeholder: false,
            html,
        });
        handle
    }

    fn render_placeholder(&mut self) -> Handle {
        let handle = self.handles.next_handle();
        self.nodes.push(Node {
            handle,
            placeholder: true,
            html: format!(
                "<div class=\"message message-ai\" id=\"composing-{}\"><div class=\"bubble-ai\"><div class=\"typing-indicator\"><span></span><span></span><span></span></div></div></div>",
                handle.id()
            ),
        });
        handle
    }

    fn remove_placeholder(&mut self, handle: Handle) {
        self.nodes
            .retain(|node| !(node.placeholder && node.handle == handle));
    }

    fn notify(&mut self, message: &str) {
        self.toasts.push(message.to_string());
    }
}
