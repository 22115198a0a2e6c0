use std::io::Read;
use std::sync::Arc;

use anyhow::Context;

use remail::config::ForwarderConfig;
use remail::event::TriggerEvent;
use remail::fs_store::FsMessageStore;
use remail::pipeline::{ForwardingPipeline, MailSender, MessageStore};
use remail::smtp::{SmtpConfig, SmtpMailSender};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ForwarderConfig::from_env().context("forwarder configuration")?;

    let store: Arc<dyn MessageStore> = Arc::new(
        FsMessageStore::from_env()
            .context("REMAIL_STORE_DIR not set")?,
    );

    let smtp_config = SmtpConfig::from_env().context("REMAIL_SMTP_HOST not set")?;
    let sender: Arc<dyn MailSender> =
        Arc::new(SmtpMailSender::new(&smtp_config).context("SMTP transport")?);

    // The trigger event arrives as JSON: a file path argument, or stdin
    // when no argument (or "-") is given.
    let event_json = match std::env::args().nth(1).as_deref() {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading event from stdin")?;
            buf
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading event {path}"))?
        }
    };
    let event = TriggerEvent::from_json(&event_json)?;

    let pipeline = ForwardingPipeline::new(config, store, sender);
    let outcome = pipeline.run(event).await?;
    tracing::info!(outcome = outcome.label(), "Done");

    Ok(())
}
