use std::fmt;

/// A chat platform user, as returned by username resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub real_name: Option<String>,
    pub is_bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            real_name: None,
            is_bot: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_real_name(mut self, name: impl Into<String>) -> Self {
        self.real_name = Some(name.into());
        self
    }

    /// Username if known, then real name, then the raw id
    pub fn display_name(&self) -> String {
        if let Some(ref username) = self.username {
            username.clone()
        } else if let Some(ref name) = self.real_name {
            name.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_username() {
        let user = User::new("U123").with_real_name("Alice Liddell").with_username("alice");
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(User::new("U123").display_name(), "U123");
        assert_eq!(User::new("U123").with_real_name("Alice").to_string(), "Alice");
    }
}
