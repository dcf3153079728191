use crate::core::Profile;

/// The signed-in user, handed explicitly to whatever needs "who am I"
#[derive(Debug, Clone)]
pub struct Session {
    user: Profile,
}

impl Session {
    pub fn new(user: Profile) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn profile(&self) -> &Profile {
        &self.user
    }
}
