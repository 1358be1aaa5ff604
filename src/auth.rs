use std::fmt;

/// Jenkins API token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Basic-auth pair sent with every request (`user:api-token`).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub token: Token,
}

impl Credentials {
    /// Builds credentials only when both halves are present.
    pub fn from_parts(user: Option<String>, token: Option<Token>) -> Option<Self> {
        match (user, token) {
            (Some(user), Some(token)) => Some(Self { user, token }),
            _ => None,
        }
    }
}
