//! Console-based email sender for development

use super::EmailSender;

/// Email sender that logs to console (for development)
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailSender for ConsoleEmailSender {
    fn send_magic_link(&self, email: &str, link: &str) -> Result<(), String> {
        println!();
        println!("========================================");
        println!("  MAGIC LINK FOR: {}", email);
        println!("  {}", link);
        println!("========================================");
        println!();

        tracing::info!(email = %email, "Magic link sent");

        Ok(())
    }
}
