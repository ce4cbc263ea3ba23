use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Narrative role of a character. Only used to pick a vertex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Victim,
    Perpetrator,
    Rescuer,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?} (expected Victim, Perpetrator, Rescuer or Neutral)")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Self::Victim, Self::Perpetrator, Self::Rescuer, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Victim => "Victim",
            Self::Perpetrator => "Perpetrator",
            Self::Rescuer => "Rescuer",
            Self::Neutral => "Neutral",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Exact, case-sensitive match on the role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One metadata row: a character and its annotations.
///
/// `name` is stored trimmed and lowercased so it can be matched directly
/// against scene tokens. `role` keeps the raw text from the metadata file;
/// it is validated when the graph is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMeta {
    pub name: String,
    pub quality: String,
    pub object: String,
    pub role: String,
}

impl CharacterMeta {
    pub fn new(name: &str, quality: &str, object: &str, role: &str) -> Self {
        Self {
            name: normalize_name(name),
            quality: quality.to_string(),
            object: object.to_string(),
            role: role.to_string(),
        }
    }

    /// Parse the raw role text.
    pub fn parsed_role(&self) -> Result<Role, UnknownRole> {
        self.role.parse()
    }
}

/// Trim and lowercase a character name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_exact_names() {
        assert_eq!("Victim".parse::<Role>(), Ok(Role::Victim));
        assert_eq!("Perpetrator".parse::<Role>(), Ok(Role::Perpetrator));
        assert_eq!("Rescuer".parse::<Role>(), Ok(Role::Rescuer));
        assert_eq!("Neutral".parse::<Role>(), Ok(Role::Neutral));
    }

    #[test]
    fn role_rejects_unknown_and_miscased() {
        assert_eq!(
            "Bystander".parse::<Role>(),
            Err(UnknownRole("Bystander".to_string()))
        );
        assert!("victim".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn name_is_normalized() {
        let meta = CharacterMeta::new("  Laurie ", "resourceful", "knitting needle", "Rescuer");
        assert_eq!(meta.name, "laurie");
        assert_eq!(meta.parsed_role(), Ok(Role::Rescuer));
    }
}
