use super::CredentialResponse;
use crate::AuthError;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug)]
pub enum ProviderEvent {
    Credential(CredentialResponse),
    Failed(AuthError),
}

/// Creates the callback handed to the provider SDK and the stream the session
/// manager consumes.
#[must_use]
pub fn credential_channel() -> (CredentialSender, CredentialReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CredentialSender { tx }, CredentialReceiver { rx })
}

/// Callback side. Holds nothing but the channel, so the SDK can call it from
/// any context without awaiting.
#[derive(Clone, Debug)]
pub struct CredentialSender {
    tx: mpsc::UnboundedSender<ProviderEvent>,
}

impl CredentialSender {
    pub fn deliver(&self, response: CredentialResponse) {
        self.send(ProviderEvent::Credential(response));
    }

    pub fn fail(&self, error: AuthError) {
        self.send(ProviderEvent::Failed(error));
    }

    fn send(&self, event: ProviderEvent) {
        if self.tx.send(event).is_err() {
            debug!("credential receiver dropped, provider event discarded");
        }
    }
}

#[derive(Debug)]
pub struct CredentialReceiver {
    rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl CredentialReceiver {
    /// Next provider event, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        self.rx.recv().await
    }
}
