use async_trait::async_trait;

/// Outbound mail seam. Delivery mechanics are out of scope; the default
/// implementation writes the message to the log so the reset flow stays
/// usable in development.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(to, subject, body, "outbound mail");
        Ok(())
    }
}
