use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque backend-issued token binding all remote calls for one interview
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interviewer seniority profile offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Junior,
    Pleno,
    Senior,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Junior => "junior",
            Profile::Pleno => "pleno",
            Profile::Senior => "senior",
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Pleno
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "junior" => Ok(Profile::Junior),
            "pleno" => Ok(Profile::Pleno),
            "senior" => Ok(Profile::Senior),
            other => Err(format!("unknown profile: {}", other)),
        }
    }
}

/// A live interview bound to a backend session token.
///
/// Created on a successful start call; the id is immutable once set. Reset
/// drops the whole value and constructs a fresh one on the next start
/// instead of mutating fields in place.
#[derive(Debug, Clone)]
pub struct Session {
    /// Backend-issued session token
    pub id: SessionId,

    /// Interviewer profile chosen at start
    pub profile: Profile,

    /// Free-text technology stack label (e.g. "backend")
    pub stack: String,
}

impl Session {
    pub fn new(id: SessionId, profile: Profile, stack: impl Into<String>) -> Self {
        Self {
            id,
            profile,
            stack: stack.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!("Pleno".parse::<Profile>().unwrap(), Profile::Pleno);
        assert_eq!(" senior ".parse::<Profile>().unwrap(), Profile::Senior);
        assert!("staff".parse::<Profile>().is_err());
    }

    #[test]
    fn profile_serializes_lowercase() {
        let json = serde_json::to_string(&Profile::Junior).unwrap();
        assert_eq!(json, "\"junior\"");
    }

    #[test]
    fn session_id_is_transparent_on_the_wire() {
        let id = SessionId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.as_str(), "abc");
    }
}
