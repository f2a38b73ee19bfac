use std::fmt;

use serde::{Deserialize, Serialize};

/// A platform user. Two users are the same user when their ids match.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        User { id: id.into(), name: name.into(), bot: false }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        User { id: id.into(), name: name.into(), bot: true }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

/// Users render as mentions so they can be dropped straight into replies.
impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.id)
    }
}

/// An inbound channel message, as seen by collectors and commands.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    pub author: User,
    pub content: String,
}

impl ChatMessage {
    /// Lower-cased, trimmed content; what every game compares against.
    pub fn normalized(&self) -> String {
        self.content.trim().to_lowercase()
    }

    pub fn is_from(&self, user: &User) -> bool {
        self.author == *user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_compare_by_id_only() {
        let a = User::new("1", "alice");
        let renamed = User::new("1", "alice2");
        assert_eq!(a, renamed);
        assert_ne!(a, User::new("2", "alice"));
        assert_eq!(a.to_string(), "<@1>");
    }

    #[test]
    fn normalized_content_ignores_case_and_padding() {
        let msg = ChatMessage {
            id: "m".to_string(),
            channel_id: "c".to_string(),
            author: User::new("1", "alice"),
            content: "  VrOoM ".to_string(),
        };
        assert_eq!(msg.normalized(), "vroom");
    }
}
