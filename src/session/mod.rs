use crate::models::Identity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionStatus {
    /// The provider has not reported yet.
    Pending,
    SignedOut,
    SignedIn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    Authenticated(Identity),
    Unauthenticated,
}

/// Tracks the current identity and turns provider notifications into transitions.
#[derive(Debug)]
pub(crate) struct SessionGate {
    status: SessionStatus,
    identity: Option<Identity>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self {
            status: SessionStatus::Pending,
            identity: None,
        }
    }
}

impl SessionGate {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Record a provider notification. Returns an event only when the
    /// signed-in user actually changed; profile-only updates are absorbed.
    pub fn observe(&mut self, identity: Option<Identity>) -> Option<SessionEvent> {
        match identity {
            Some(next) => {
                let same_user = self.status == SessionStatus::SignedIn
                    && self.identity.as_ref().is_some_and(|cur| cur.uid == next.uid);
                self.status = SessionStatus::SignedIn;
                self.identity = Some(next.clone());
                (!same_user).then_some(SessionEvent::Authenticated(next))
            }
            None => {
                if self.status == SessionStatus::SignedOut {
                    return None;
                }
                self.status = SessionStatus::SignedOut;
                self.identity = None;
                Some(SessionEvent::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_pending() {
        let gate = SessionGate::default();
        assert_eq!(gate.status(), SessionStatus::Pending);
        assert!(gate.identity().is_none());
    }

    #[test]
    fn first_report_of_no_user_emits_unauthenticated_once() {
        let mut gate = SessionGate::default();
        assert_eq!(gate.observe(None), Some(SessionEvent::Unauthenticated));
        assert_eq!(gate.observe(None), None);
        assert_eq!(gate.status(), SessionStatus::SignedOut);
    }

    #[test]
    fn sign_in_then_profile_refresh_emits_once() {
        let mut gate = SessionGate::default();
        let u = Identity::new("u1");
        assert_eq!(
            gate.observe(Some(u.clone())),
            Some(SessionEvent::Authenticated(u.clone()))
        );

        let mut refreshed = u.clone();
        refreshed.photo_url = Some("https://example.com/a.png".into());
        assert_eq!(gate.observe(Some(refreshed.clone())), None);
        assert_eq!(gate.identity(), Some(&refreshed));
    }

    #[test]
    fn switching_accounts_emits_authenticated() {
        let mut gate = SessionGate::default();
        gate.observe(Some(Identity::new("a")));
        let b = Identity::new("b");
        assert_eq!(
            gate.observe(Some(b.clone())),
            Some(SessionEvent::Authenticated(b))
        );
    }

    #[test]
    fn sign_out_clears_identity() {
        let mut gate = SessionGate::default();
        gate.observe(Some(Identity::new("a")));
        assert_eq!(gate.observe(None), Some(SessionEvent::Unauthenticated));
        assert!(gate.identity().is_none());
    }
}
