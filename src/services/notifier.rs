// src/services/notifier.rs

//! Notification delivery.
//!
//! One [`Notifier`] is chosen per platform at startup via
//! [`platform_notifier`]. Platforms without a desktop channel get
//! [`LogNotifier`], which only writes to the log.

use async_trait::async_trait;

use crate::error::Result;

/// Delivers a composed notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` under `title`. Callers treat errors as non-fatal.
    async fn deliver(&self, title: &str, message: &str) -> Result<()>;
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    open_url: Option<String>,
}

impl LogNotifier {
    pub fn new(open_url: impl Into<String>) -> Self {
        Self {
            open_url: Some(open_url.into()),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, title: &str, message: &str) -> Result<()> {
        log::info!("{}", title);
        for line in message.lines() {
            log::info!("    {}", line);
        }
        if let Some(url) = &self.open_url {
            log::info!("    {}", url);
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
pub use macos::MacNotifier;

#[cfg(target_os = "macos")]
mod macos {
    use async_trait::async_trait;
    use tokio::process::Command;

    use super::Notifier;
    use crate::error::{AppError, Result};

    /// Posts a Notification Center banner through `osascript`.
    #[derive(Debug, Clone)]
    pub struct MacNotifier {
        open_url: String,
    }

    impl MacNotifier {
        pub fn new(open_url: impl Into<String>) -> Self {
            Self {
                open_url: open_url.into(),
            }
        }

        fn script(&self, title: &str, message: &str) -> String {
            format!(
                "display notification {} with title {} subtitle {} sound name \"default\"",
                quote(message),
                quote(title),
                quote(&self.open_url)
            )
        }
    }

    /// AppleScript string literal.
    fn quote(s: &str) -> String {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }

    #[async_trait]
    impl Notifier for MacNotifier {
        async fn deliver(&self, title: &str, message: &str) -> Result<()> {
            let status = Command::new("osascript")
                .arg("-e")
                .arg(self.script(title, message))
                .status()
                .await?;
            if !status.success() {
                return Err(AppError::notify(format!("osascript exited with {status}")));
            }
            Ok(())
        }
    }

}

/// Select the notifier for the current platform.
pub fn platform_notifier(open_url: &str) -> Box<dyn Notifier> {
    #[cfg(target_os = "macos")]
    {
        Box::new(MacNotifier::new(open_url))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(LogNotifier::new(open_url))
    }
}
