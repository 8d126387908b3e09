//! Email sending abstractions

pub mod console;
pub mod smtp;

pub use console::ConsoleEmailSender;
pub use smtp::{SmtpConfig, SmtpEmailSender};

/// Trait for sending magic-link login emails
pub trait EmailSender: Send + Sync {
    /// Send a magic-link login URL to an email address
    fn send_magic_link(&self, email: &str, link: &str) -> Result<(), String>;
}

/// Allow using Box<dyn EmailSender> as an EmailSender
impl EmailSender for Box<dyn EmailSender> {
    fn send_magic_link(&self, email: &str, link: &str) -> Result<(), String> {
        (**self).send_magic_link(email, link)
    }
}
