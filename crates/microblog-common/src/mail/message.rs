//! Account mail composition

use microblog_core::User;

/// What an outgoing message is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    AccountActivation,
    PasswordReset,
}

/// A rendered plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub kind: MailKind,
    pub to: String,
    pub to_name: String,
    pub subject: String,
    /// The link embedded in the body
    pub link: String,
    pub body: String,
}

/// Renders account mail with links pointing at `base_url`
#[derive(Debug, Clone)]
pub struct MailComposer {
    app_name: String,
    base_url: String,
}

impl MailComposer {
    pub fn new(app_name: impl Into<String>, base_url: &str) -> Self {
        Self {
            app_name: app_name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn link(&self, resource: &str, token: &str, email: &str) -> String {
        format!(
            "{}/{resource}/{token}/edit?email={}",
            self.base_url,
            urlencoding::encode(email)
        )
    }

    pub fn account_activation(&self, user: &User, token: &str) -> MailMessage {
        let link = self.link("account_activations", token, &user.email);
        let body = format!(
            "Hi {},\n\nWelcome to {}! Click on the link below to activate your account:\n\n{link}\n",
            user.name, self.app_name
        );
        MailMessage {
            kind: MailKind::AccountActivation,
            to: user.email.clone(),
            to_name: user.name.clone(),
            subject: "Account activation".to_string(),
            link,
            body,
        }
    }

    pub fn password_reset(&self, user: &User, token: &str) -> MailMessage {
        let link = self.link("password_resets", token, &user.email);
        let body = format!(
            "To reset your password click the link below:\n\n{link}\n\n\
             This link will expire in two hours.\n\n\
             If you did not request your password to be reset, please ignore this email and \
             your password will stay as it is.\n"
        );
        MailMessage {
            kind: MailKind::PasswordReset,
            to: user.email.clone(),
            to_name: user.name.clone(),
            subject: "Password reset".to_string(),
            link,
            body,
        }
    }
}
