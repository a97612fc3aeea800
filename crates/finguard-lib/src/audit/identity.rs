//! Who is acting: the identity collaborator consulted for every audit entry.
use async_trait::async_trait;
use parking_lot::RwLock;

/// Looks up the currently signed-in user.
///
/// Must not fail; `None` means the event is anonymous.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user_id(&self) -> Option<String>;
}

/// Provider for contexts where nobody is ever signed in
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityProvider for AnonymousIdentity {
    async fn current_user_id(&self) -> Option<String> {
        None
    }
}

/// Identity of the local session, updated by the auth gateway
#[derive(Debug, Default)]
pub struct SessionIdentity {
    user_id: RwLock<Option<String>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user that just signed in
    pub fn set(&self, user_id: impl Into<String>) {
        *self.user_id.write() = Some(user_id.into());
    }

    /// Forget the current user
    pub fn clear(&self) {
        *self.user_id.write() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.user_id.read().clone()
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current_user_id(&self) -> Option<String> {
        self.get()
    }
}
