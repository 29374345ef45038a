//! Transcript rendering surfaces.
//!
//! A [`Renderer`] appends chat bubbles and a transient "composing"
//! placeholder to some display surface and keeps the newest content in
//! view. Two implementations ship with the crate:
//!
//! - [`terminal::TerminalRenderer`]: styled text on any `io::Write`
//! - [`html::HtmlRenderer`]: an in-memory HTML transcript for export
//!
//! Content rules every renderer follows: assistant text is markdown from a
//! remote service and is sanitized before it is interpreted; user text is
//! shown literally and never interpreted as markup.

pub mod html;
pub mod markdown;
pub mod sanitize;
pub mod terminal;

use std::collections::HashMap;

use crate::chat::Role;

/// Opaque reference to something a renderer has inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Sequential handle source for renderer implementations.
#[derive(Debug, Default)]
pub struct HandleSeq(u64);

impl HandleSeq {
    pub fn next_handle(&mut self) -> Handle {
        self.0 += 1;
        Handle(self.0)
    }
}

/// A display surface for one chat transcript.
///
/// Methods are infallible: a surface that fails to draw must not leave the
/// session locked, so implementations swallow their own I/O errors.
pub trait Renderer {
    /// Append a bubble for `content` spoken by `role`.
    fn render_turn(&mut self, role: Role, content: &str) -> Handle;

    /// Append the "assistant is composing" indicator.
    fn render_placeholder(&mut self) -> Handle;

    /// Remove a placeholder. Unknown or already removed handles are ignored.
    fn remove_placeholder(&mut self, handle: Handle);

    /// Show a short-lived notice. Nothing is returned or tracked.
    fn notify(&mut self, message: &str);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render_turn(&mut self, role: Role, content: &str) -> Handle {
        (**self).render_turn(role, content)
    }

    fn render_placeholder(&mut self) -> Handle {
        (**self).render_placeholder()
    }

    fn remove_placeholder(&mut self, handle: Handle) {
        (**self).remove_placeholder(handle)
    }

    fn notify(&mut self, message: &str) {
        (**self).notify(message)
    }
}

/// Mirrors every call onto two renderers, e.g. the terminal plus an HTML
/// export. Only placeholder handles are mapped to their counterparts, and
/// only until they are removed.
pub struct Tee<A, B> {
    first: A,
    second: B,
    handles: HandleSeq,
    placeholders: HashMap<Handle, (Handle, Handle)>,
}

impl<A: Renderer, B: Renderer> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            handles: HandleSeq::default(),
            placeholders: HashMap::new(),
        }
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Renderer, B: Renderer> Renderer for Tee<A, B> {
    fn render_turn(&mut self, role: Role, content: &str) -> Handle {
        self.first.render_turn(role, content);
        self.second.render_turn(role, content);
        self.handles.next_handle()
    }

    fn render_placeholder(&mut self) -> Handle {
        let first = self.first.render_placeholder();
        let second = self.second.render_placeholder();
        let handle = self.handles.next_handle();
        self.placeholders.insert(handle, (first, second));
        handle
    }

    fn remove_placeholder(&mut self, handle: Handle) {
        if let Some((first, second)) = self.placeholders.remove(&handle) {
            self.first.remove_placeholder(first);
            self.second.remove_placeholder(second);
        }
    }

    fn notify(&mut self, message: &str) {
        self.first.notify(message);
        self.second.notify(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_forwards_placeholder_removal_to_both_sides() {
        let mut tee = Tee::new(html::HtmlRenderer::new(false), html::HtmlRenderer::new(false));
        tee.render_turn(Role::User, "hi");
        let placeholder = tee.render_placeholder();
        tee.remove_placeholder(placeholder);
        tee.notify("synced");

        let (first, second) = tee.into_parts();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second.toasts(), ["synced".to_string()]);
    }

    #[test]
    fn tee_forgets_turns_and_removed_placeholders() {
        let mut tee = Tee::new(html::HtmlRenderer::new(false), html::HtmlRenderer::new(false));
        for i in 0..50 {
            tee.render_turn(Role::User, &format!("turn {i}"));
            let placeholder = tee.render_placeholder();
            tee.remove_placeholder(placeholder);
            tee.render_turn(Role::Assistant, "ok");
        }
        assert!(tee.placeholders.is_empty());

        let pending = tee.render_placeholder();
        assert_eq!(tee.placeholders.len(), 1);
        tee.remove_placeholder(pending);
        assert!(tee.placeholders.is_empty());
        assert_eq!(tee.into_parts().1.len(), 100);
    }
}
