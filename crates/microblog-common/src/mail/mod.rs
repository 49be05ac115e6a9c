//! Outgoing account mail
//!
//! Composition is shared; delivery is pluggable. Development logs messages,
//! tests capture them in memory, production relays through SMTP.

mod message;
mod transport;

pub use message::{MailComposer, MailKind, MailMessage};
pub use transport::{
    mailer_from_config, AccountMailer, LogTransport, MailTransport, MemoryTransport,
    SmtpTransport,
};
