use tracing::debug;
use vellum_crypto::Password;

/// A password change requested during the session but not yet persisted.
#[derive(Debug, PartialEq)]
pub enum PasswordChange {
    Set(Password),
    Remove,
}

/// Per-document secret state.
///
/// Holds the password the document was opened with and any change the user
/// has asked for since. A pending change takes effect for the next save and
/// becomes the active password only once that save is committed, so a
/// cancelled or failed save leaves the session exactly as it was.
#[derive(Debug, Default)]
pub struct Session {
    password: Option<Password>,
    pending: Option<PasswordChange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(password: Password) -> Self {
        Self {
            password: Some(password),
            pending: None,
        }
    }

    pub fn password(&self) -> Option<&Password> {
        self.password.as_ref()
    }

    /// Queue a password change for the next save. `None` removes encryption.
    pub fn request_password_change(&mut self, password: Option<Password>) {
        debug!(remove = password.is_none(), "password change requested");
        self.pending = Some(match password {
            Some(p) => PasswordChange::Set(p),
            None => PasswordChange::Remove,
        });
    }

    pub fn pending_change(&self) -> Option<&PasswordChange> {
        self.pending.as_ref()
    }

    pub fn discard_pending_change(&mut self) {
        self.pending = None;
    }

    /// Password the next save encrypts with.
    pub fn effective_password(&self) -> Option<&Password> {
        match &self.pending {
            Some(PasswordChange::Set(p)) => Some(p),
            Some(PasswordChange::Remove) => None,
            None => self.password.as_ref(),
        }
    }

    /// Promote the pending change to the active password.
    pub(crate) fn adopt_pending(&mut self) {
        match self.pending.take() {
            Some(PasswordChange::Set(p)) => self.password = Some(p),
            Some(PasswordChange::Remove) => self.password = None,
            None => {}
        }
    }

    /// Drop all secrets. `Password` zeroizes its buffer on drop.
    pub fn close(&mut self) {
        self.password = None;
        self.pending = None;
    }

    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.pending.is_none()
    }
}
