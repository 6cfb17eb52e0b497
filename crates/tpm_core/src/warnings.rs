//! Non-fatal diagnostics.
//!
//! Decoding and reference resolution report recoverable problems through a
//! [`WarningSink`] instead of failing. Callers choose what happens to them:
//! collect them, forward them to the log, or hand them to a closure.

/// Receiver for non-fatal messages.
pub trait WarningSink {
    /// Report a single warning.
    fn warn(&mut self, message: &str);
}

impl<F> WarningSink for F
where
    F: FnMut(&str),
{
    fn warn(&mut self, message: &str) {
        self(message)
    }
}

/// Stores every warning in the order it was reported.
#[derive(Clone, Debug, Default)]
pub struct CollectWarnings {
    messages: Vec<String>,
}

impl CollectWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings reported so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl WarningSink for CollectWarnings {
    fn warn(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Forwards every warning to `log::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWarnings;

impl WarningSink for LogWarnings {
    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}
