//! Display preparation: reflow bot text, render it, and never fail.

use crate::core::latex;
use crate::core::message::{Message, MessageKind, MessageSource};
use crate::core::render::{MathRenderer, RenderInputError, RendererHandle};
use crate::core::spacing;

/// Prefix for inline warnings shown instead of a failed render.
pub const WARNING_PREFIX: &str = "⚠️ Unable to render content";

/// How the display layer should style a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStyle {
    User,
    Bot,
    Error,
}

/// A message ready to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub label: String,
    pub style: DisplayStyle,
    /// Rendered output, or the raw message text when rendering failed.
    pub body: String,
    pub warning: Option<String>,
}

/// Text handed to the renderer: bot replies are re-spaced, user input is left alone.
pub fn prepare_text(text: &str, is_bot: bool) -> String {
    if is_bot {
        spacing::normalize(text)
    } else {
        text.to_string()
    }
}

/// Header label and style for a message source.
pub fn label_for(source: MessageSource) -> (String, DisplayStyle) {
    match source {
        MessageSource::User => ("User".to_string(), DisplayStyle::User),
        MessageSource::Backend | MessageSource::Data | MessageSource::Gemini => {
            (format!("[Source: {}]", source), DisplayStyle::Bot)
        }
        MessageSource::Error => (format!("[Source: {}]", source), DisplayStyle::Error),
    }
}

fn fallback(message: &Message, error: &RenderInputError) -> (String, Option<String>) {
    log::warn!("Rendering message {} failed: {}", message.id(), error);
    (
        message.text().to_string(),
        Some(format!("{}: {}", WARNING_PREFIX, error)),
    )
}

/// Prepare and render a message. Render errors become a warning plus the raw text.
pub fn present(message: &Message, renderer: &dyn MathRenderer) -> DisplayMessage {
    let (label, style) = label_for(message.source());
    let (body, warning) = match message.kind() {
        MessageKind::Image => (message.text().to_string(), None),
        MessageKind::Text => {
            let prepared = prepare_text(message.text(), message.is_bot());
            match renderer.render(&prepared) {
                Ok(body) => (body, None),
                Err(e) => fallback(message, &e),
            }
        }
    };
    DisplayMessage {
        label,
        style,
        body,
        warning,
    }
}

/// Like [`present`], waiting for the renderer to become ready first.
pub async fn present_when_ready(message: &Message, handle: &mut RendererHandle) -> DisplayMessage {
    match handle.ready().await {
        Ok(renderer) => present(message, renderer.as_ref()),
        Err(e) => {
            let (label, style) = label_for(message.source());
            let (body, warning) = fallback(message, &e);
            DisplayMessage {
                label,
                style,
                body,
                warning,
            }
        }
    }
}

/// Split text into display lines respecting its newlines, wrapping each to `width`
/// columns. A width of 0 disables wrapping. Lines carrying math spans are kept whole.
pub fn wrap_message(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() || width == 0 || !latex::math_spans(line).is_empty() {
            out.push(line.to_string());
        } else {
            out.extend(textwrap::wrap(line, width).into_iter().map(|c| c.into_owned()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::render::{self, ValidatingRenderer};

    #[test]
    fn bot_text_is_normalized() {
        assert_eq!(prepare_text("a\n- x\nb", true), "a\n\n- x\n\nb");
    }

    #[test]
    fn user_text_passes_through() {
        assert_eq!(prepare_text("a\n- x\nb", false), "a\n- x\nb");
    }

    #[test]
    fn labels_per_source() {
        assert_eq!(label_for(MessageSource::User).0, "User");
        assert_eq!(
            label_for(MessageSource::Gemini),
            ("[Source: gemini]".to_string(), DisplayStyle::Bot)
        );
        assert_eq!(label_for(MessageSource::Error).1, DisplayStyle::Error);
    }

    #[test]
    fn present_renders_bot_message() {
        let msg = Message::bot("Steps:\n- one\n- two", MessageSource::Backend);
        let shown = present(&msg, &ValidatingRenderer);
        assert_eq!(shown.body, "Steps:\n\n- one\n- two\n");
        assert_eq!(shown.warning, None);
        assert_eq!(shown.style, DisplayStyle::Bot);
    }

    #[test]
    fn render_failure_degrades_to_warning_and_raw_text() {
        let raw = "Proof:\n\\begin{align*}\nx &= 1";
        let msg = Message::bot(raw, MessageSource::Backend);
        let shown = present(&msg, &ValidatingRenderer);
        assert_eq!(shown.body, raw);
        let warning = shown.warning.unwrap();
        assert!(warning.starts_with(WARNING_PREFIX));
        assert!(warning.contains("never closed"));
    }

    #[test]
    fn image_messages_skip_rendering() {
        let msg = Message::user("data:image/png;base64,AAAA").with_kind(MessageKind::Image);
        let shown = present(&msg, &ValidatingRenderer);
        assert_eq!(shown.body, "data:image/png;base64,AAAA");
        assert_eq!(shown.warning, None);
    }

    #[tokio::test]
    async fn present_when_ready_waits_for_install() {
        let (installer, mut handle) = render::channel();
        installer.install(Arc::new(ValidatingRenderer));
        let msg = Message::user("$x$");
        let shown = present_when_ready(&msg, &mut handle).await;
        assert_eq!(shown.body, "$x$");
    }

    #[tokio::test]
    async fn present_when_renderer_missing() {
        let (installer, mut handle) = render::channel();
        drop(installer);
        let msg = Message::bot("$x$", MessageSource::Backend);
        let shown = present_when_ready(&msg, &mut handle).await;
        assert_eq!(shown.body, "$x$");
        assert!(shown.warning.is_some());
    }

    #[test]
    fn wrap_message_preserves_newlines() {
        assert_eq!(wrap_message("line1\nline2", 100), ["line1", "line2"]);
    }

    #[test]
    fn wrap_message_wraps_long_line() {
        assert_eq!(wrap_message("hello world test", 8), ["hello", "world", "test"]);
    }

    #[test]
    fn wrap_message_keeps_blank_lines() {
        assert_eq!(wrap_message("a\n\nb", 100), ["a", "", "b"]);
    }

    #[test]
    fn wrap_message_keeps_math_lines_whole() {
        let line = "so $x^2 + y^2 = z^2$ holds";
        assert_eq!(wrap_message(line, 8), [line]);
        assert_eq!(
            wrap_message("plain words here\n$a + b$", 6),
            ["plain", "words", "here", "$a + b$"]
        );
    }

    #[test]
    fn wrap_message_zero_width() {
        assert_eq!(wrap_message("hello world", 0), ["hello world"]);
    }
}
