use super::{CredentialResponse, CredentialSender, ProviderSdk};
use crate::AuthError;

/// Provider SDK for environments without an interactive sign-in button: the
/// credential is obtained out of band (e.g. passed on the command line) and
/// delivered as soon as the SDK is initialized.
#[derive(Clone, Default)]
pub struct ManualSdk {
    credential: Option<String>,
}

impl ManualSdk {
    #[must_use]
    pub fn new(credential: Option<&str>) -> Self {
        Self {
            credential: credential.map(str::to_string),
        }
    }
}

impl ProviderSdk for ManualSdk {
    fn initialize(&self, client_id: &str, callback: CredentialSender) -> Result<(), String> {
        if client_id.trim().is_empty() {
            return Err("client id is empty".to_string());
        }

        match &self.credential {
            Some(credential) => callback.deliver(CredentialResponse::new(credential)),
            None => callback.fail(AuthError::Credential),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{credential_channel, ProviderEvent};

    #[tokio::test]
    async fn missing_credential_reports_failure() {
        let (sender, mut receiver) = credential_channel();
        let sdk = ManualSdk::new(None);
        assert!(sdk.initialize("client-1", sender).is_ok());
        assert!(matches!(
            receiver.recv().await,
            Some(ProviderEvent::Failed(AuthError::Credential))
        ));
    }

    #[test]
    fn blank_client_id_is_rejected() {
        let (sender, _receiver) = credential_channel();
        assert!(ManualSdk::new(Some("cred1")).initialize(" ", sender).is_err());
    }
}
