//! State of the message entry field.

/// The chat entry field: its text buffer and whether it accepts input.
///
/// The session locks it while a request is in flight and unlocks it, with
/// focus restored, once the response has been reconciled.
#[derive(Debug, Clone)]
pub struct InputBox {
    buffer: String,
    enabled: bool,
    focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            buffer: String::new(),
            enabled: true,
            focused: true,
        }
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer contents. Ignored while the box is locked.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.enabled {
            self.buffer = text.into();
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub(crate) fn lock(&mut self) {
        self.enabled = false;
        self.focused = false;
    }

    pub(crate) fn unlock(&mut self) {
        self.enabled = true;
        self.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_box_rejects_text() {
        let mut input = InputBox::new();
        input.set_text("draft");
        input.lock();
        input.set_text("ignored");
        assert_eq!(input.text(), "draft");
        assert!(!input.is_enabled());
        assert!(!input.has_focus());

        input.unlock();
        assert!(input.is_enabled());
        assert!(input.has_focus());
    }
}
