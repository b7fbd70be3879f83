use std::collections::HashMap;

/// Gate in front of the app. Implementations decide what a valid login is;
/// this is a UI gate, not an access control boundary for the relay.
pub trait Authenticator: Send + Sync {
    fn validate(&self, user: &str, password: &str) -> bool;
}

/// Fixed user/password table supplied by the deployment.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new<I, U, P>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(user, password)| (user.into(), password.into()))
                .collect(),
        }
    }
}

impl Authenticator for StaticCredentials {
    fn validate(&self, user: &str, password: &str) -> bool {
        self.users
            .get(user)
            .is_some_and(|expected| expected == password)
    }
}
