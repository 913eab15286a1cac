mod firebase;
#[cfg(test)]
mod memory;

pub(crate) use firebase::FirebaseAuth;
#[cfg(test)]
pub(crate) use memory::MemoryIdentity;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::models::Identity;

/// Provider failure, carrying the provider's code (`auth/wrong-password`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{code}")]
pub(crate) struct AuthError {
    pub code: String,
}

impl AuthError {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

pub(crate) type AuthResult<T> = Result<T, AuthError>;

pub(crate) type IdentityCallback = Rc<dyn Fn(Option<Identity>)>;

#[allow(async_fn_in_trait)]
pub(crate) trait IdentityProvider {
    /// Register for identity changes. The callback also fires with the
    /// current identity if the provider already knows it.
    fn observe(&self, callback: IdentityCallback);
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity>;
    /// Federated sign-in. Also used to switch accounts.
    async fn sign_in_interactive(&self) -> AuthResult<Identity>;
}

/// Fan-out of identity changes to registered observers.
#[derive(Clone, Default)]
pub(crate) struct IdentityHub {
    inner: Rc<HubInner>,
}

#[derive(Default)]
struct HubInner {
    /// `None` until the first publish.
    current: RefCell<Option<Option<Identity>>>,
    observers: RefCell<Vec<IdentityCallback>>,
}

impl IdentityHub {
    pub fn subscribe(&self, callback: IdentityCallback) {
        self.inner.observers.borrow_mut().push(callback.clone());
        let known = self.inner.current.borrow().clone();
        if let Some(identity) = known {
            callback(identity);
        }
    }

    pub fn publish(&self, identity: Option<Identity>) {
        *self.inner.current.borrow_mut() = Some(identity.clone());
        // Snapshot so observers may subscribe or publish re-entrantly.
        let observers = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(identity.clone());
        }
    }
}
