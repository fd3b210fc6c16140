//! Math renderer capability.
//!
//! Typesetting lives outside this crate. The host installs a [`MathRenderer`]
//! through a [`RendererInstaller`] once its engine is ready; consumers hold a
//! [`RendererHandle`] and await [`RendererHandle::ready`] instead of polling.

use std::sync::Arc;

use tokio::sync::watch;

use crate::core::latex;

/// Render input the math/Markdown renderer cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderInputError {
    #[error("Render error ({0})")]
    Unbalanced(String),
    #[error("Math renderer is not available")]
    Unavailable,
}

/// Markdown+math rendering capability.
pub trait MathRenderer: Send + Sync {
    /// Render prepared Markdown. The output format is up to the implementation.
    fn render(&self, markdown: &str) -> Result<String, RenderInputError>;
}

type Slot = Option<Arc<dyn MathRenderer>>;

/// Producer side: installs the renderer once it is initialized.
pub struct RendererInstaller {
    tx: watch::Sender<Slot>,
}

/// Consumer side: resolves to the renderer once installed. Cheap to clone.
#[derive(Clone)]
pub struct RendererHandle {
    rx: watch::Receiver<Slot>,
}

/// Create a connected installer/handle pair with no renderer yet.
pub fn channel() -> (RendererInstaller, RendererHandle) {
    let (tx, rx) = watch::channel(None);
    (RendererInstaller { tx }, RendererHandle { rx })
}

impl RendererInstaller {
    /// Install the renderer and wake every waiting handle.
    pub fn install(self, renderer: Arc<dyn MathRenderer>) {
        self.tx.send_replace(Some(renderer));
        log::debug!("Math renderer installed");
    }
}

impl RendererHandle {
    /// A handle that is ready immediately.
    pub fn ready_with(renderer: Arc<dyn MathRenderer>) -> Self {
        let (installer, handle) = channel();
        installer.install(renderer);
        handle
    }

    /// The renderer if already installed.
    pub fn current(&self) -> Option<Arc<dyn MathRenderer>> {
        self.rx.borrow().clone()
    }

    /// Wait until a renderer is installed. Fails with [`RenderInputError::Unavailable`]
    /// if the installer is dropped without installing one.
    pub async fn ready(&mut self) -> Result<Arc<dyn MathRenderer>, RenderInputError> {
        let slot = self.rx.wait_for(Option::is_some).await.map_err(|_| {
            log::warn!("Math renderer installer dropped before installing a renderer");
            RenderInputError::Unavailable
        })?;
        (*slot).clone().ok_or(RenderInputError::Unavailable)
    }
}

/// Renderer that checks math delimiters and environments, passing text through.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidatingRenderer;

impl MathRenderer for ValidatingRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderInputError> {
        latex::check_balance(markdown).map_err(RenderInputError::Unbalanced)?;
        Ok(markdown.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validating_renderer_passes_balanced_text() {
        let text = "$$x$$\n\\begin{align*}\na\n\\end{align*}";
        assert_eq!(ValidatingRenderer.render(text).unwrap(), text);
    }

    #[test]
    fn validating_renderer_rejects_unclosed_environment() {
        let err = ValidatingRenderer.render("\\begin{align*}\nx").unwrap_err();
        assert!(matches!(err, RenderInputError::Unbalanced(_)));
        assert!(err.to_string().starts_with("Render error ("));
    }

    #[test]
    fn current_is_none_until_installed() {
        let (installer, handle) = channel();
        assert!(handle.current().is_none());
        installer.install(Arc::new(ValidatingRenderer));
        assert!(handle.current().is_some());
    }

    #[tokio::test]
    async fn ready_resolves_after_install() {
        let (installer, mut handle) = channel();
        let waiter = tokio::spawn(async move { handle.ready().await.map(|_| ()) });
        installer.install(Arc::new(ValidatingRenderer));
        assert_eq!(waiter.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn ready_fails_when_installer_dropped() {
        let (installer, mut handle) = channel();
        drop(installer);
        assert_eq!(
            handle.ready().await.map(|_| ()),
            Err(RenderInputError::Unavailable)
        );
    }

    #[tokio::test]
    async fn ready_with_is_immediate() {
        let mut handle = RendererHandle::ready_with(Arc::new(ValidatingRenderer));
        assert!(handle.ready().await.is_ok());
    }
}
