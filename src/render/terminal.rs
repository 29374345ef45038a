//! Transcript rendering to a terminal (or any writer).

use std::collections::HashSet;
use std::io::{self, IsTerminal, Write};

use colored::Colorize;

use super::{Handle, HandleSeq, Renderer, markdown, sanitize};
use crate::chat::Role;

const USER_LABEL: &str = "you";
const ASSISTANT_LABEL: &str = "coach";

/// Writes chat bubbles as labelled, indented blocks.
///
/// Every insertion is flushed immediately so the newest content is always on
/// screen. When `live` is set the composing placeholder is drawn on the
/// current line without a newline and erased in place on removal; otherwise
/// it is not drawn at all (e.g. when stdout is piped).
pub struct TerminalRenderer<W: Write> {
    out: W,
    handles: HandleSeq,
    markdown: bool,
    live: bool,
    placeholders: HashSet<Handle>,
    /// Placeholder still occupying the current, unterminated line.
    on_line: Option<Handle>,
}

impl TerminalRenderer<io::Stdout> {
    /// Render to stdout, drawing the placeholder only on a real terminal.
    pub fn stdout(markdown: bool) -> Self {
        let live = io::stdout().is_terminal();
        Self::new(io::stdout(), markdown).live(live)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, markdown: bool) -> Self {
        Self {
            out,
            handles: HandleSeq::default(),
            markdown,
            live: false,
            placeholders: HashSet::new(),
            on_line: None,
        }
    }

    /// Draw and erase the composing placeholder in place.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Terminate a placeholder line before printing anything else over it.
    fn release_line(&mut self) {
        if self.on_line.take().is_some() {
            let _ = writeln!(self.out);
        }
    }

    fn body(&self, role: Role, content: &str) -> String {
        match role {
            Role::User => sanitize::literal(content).into_owned(),
            Role::Assistant if self.markdown => markdown::to_terminal(content),
            Role::Assistant => sanitize::strip_controls(content).into_owned(),
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_turn(&mut self, role: Role, content: &str) -> Handle {
        self.release_line();

        let label = match role {
            Role::User => USER_LABEL.green().bold(),
            Role::Assistant => ASSISTANT_LABEL.cyan().bold(),
        };
        let body = self.body(role, content);

        let _ = writeln!(self.out, "{label}");
        for line in body.lines() {
            let _ = writeln!(self.out, "  {line}");
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();

        self.handles.next_handle()
    }

    fn render_placeholder(&mut self) -> Handle {
        self.release_line();
        let handle = self.handles.next_handle();
        self.placeholders.insert(handle);

        if self.live {
            let _ = write!(
                self.out,
                "{} {}",
                ASSISTANT_LABEL.cyan().bold(),
                "is typing…".dimmed()
            );
            let _ = self.out.flush();
            self.on_line = Some(handle);
        }

        handle
    }

    fn remove_placeholder(&mut self, handle: Handle) {
        if !self.placeholders.remove(&handle) {
            return;
        }
        if self.on_line == Some(handle) {
            self.on_line = None;
            let _ = write!(self.out, "\r\x1b[2K");
            let _ = self.out.flush();
        }
    }

    fn notify(&mut self, message: &str) {
        self.release_line();
        let _ = writeln!(
            self.out,
            "{} {}\n",
            "✔".green().bold(),
            sanitize::strip_controls(message).green()
        );
        let _ = self.out.flush();
    }
}
