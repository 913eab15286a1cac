use std::cell::RefCell;
use std::collections::HashMap;

use super::{AuthError, AuthResult, IdentityCallback, IdentityHub, IdentityProvider};
use crate::models::Identity;

/// Scriptable identity provider for tests.
#[derive(Default)]
pub(crate) struct MemoryIdentity {
    hub: IdentityHub,
    accounts: RefCell<HashMap<String, (String, Identity)>>,
    interactive: RefCell<Option<AuthResult<Identity>>>,
}

impl MemoryIdentity {
    pub fn with_account(self, email: &str, password: &str, uid: &str) -> Self {
        let mut identity = Identity::new(uid);
        identity.email = Some(email.to_string());
        self.accounts
            .borrow_mut()
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    /// Result the next `sign_in_interactive` call returns.
    pub fn script_interactive(&self, result: AuthResult<Identity>) {
        *self.interactive.borrow_mut() = Some(result);
    }
}

impl IdentityProvider for MemoryIdentity {
    fn observe(&self, callback: IdentityCallback) {
        self.hub.subscribe(callback);
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let found = self.accounts.borrow().get(email).cloned();
        let identity = match found {
            Some((expected, identity)) if expected == password => identity,
            Some(_) => return Err(AuthError::new("auth/wrong-password")),
            None => return Err(AuthError::new("auth/user-not-found")),
        };
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        if self.accounts.borrow().contains_key(email) {
            return Err(AuthError::new("auth/email-already-in-use"));
        }
        let mut identity = Identity::new(format!("uid-{email}"));
        identity.email = Some(email.to_string());
        self.accounts.borrow_mut().insert(
            email.to_string(),
            (password.to_string(), identity.clone()),
        );
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_interactive(&self) -> AuthResult<Identity> {
        let scripted = self.interactive.borrow_mut().take();
        let identity = scripted.unwrap_or_else(|| Err(AuthError::new("auth/popup-closed-by-user")))?;
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }
}
