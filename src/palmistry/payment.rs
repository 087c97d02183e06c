use async_trait::async_trait;
use tracing::debug;

/// Confirms that a session has been paid for.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, session_id: &str, payment_token: &str) -> anyhow::Result<bool>;
}

/// Demo verifier: every session counts as paid.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPaymentVerifier;

#[async_trait]
impl PaymentVerifier for StubPaymentVerifier {
    async fn verify(&self, session_id: &str, payment_token: &str) -> anyhow::Result<bool> {
        debug!(session_id, has_token = !payment_token.is_empty(), "stub payment accepted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_accepts_without_token() {
        assert!(StubPaymentVerifier.verify("session-0001", "").await.unwrap());
    }
}
