//! UserProfile domain model.
//!
//! The profile is derived entirely from the user's e-mail address.

use serde::{Deserialize, Serialize};

/// E-mail used before anyone has logged in.
pub const DEFAULT_USER_EMAIL: &str = "producer@talesofecho.ai";

/// Display information for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    /// Local part split on `.`, `_` and `-`, each word capitalized
    pub display_name: String,
    /// `@` followed by the lowercase alphanumeric local part
    pub handle: String,
    /// Two uppercase letters for avatars
    pub initials: String,
}

impl UserProfile {
    pub fn from_email(email: &str) -> Self {
        let local = email.split('@').next().unwrap_or_default();

        let display_name = local
            .split(['.', '_', '-'])
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");

        let handle = format!(
            "@{}",
            local
                .to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                .collect::<String>()
        );

        let initials = initials_of(&display_name);

        Self {
            email: email.to_string(),
            display_name,
            handle,
            initials,
        }
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::from_email(DEFAULT_USER_EMAIL)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn initials_of(name: &str) -> String {
    let words: Vec<&str> = name.split(' ').collect();
    let initials: String = if words.len() > 1 {
        words
            .iter()
            .take(2)
            .filter_map(|w| w.chars().next())
            .collect()
    } else {
        name.chars().take(2).collect()
    };
    initials.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.display_name, "Producer");
        assert_eq!(profile.handle, "@producer");
        assert_eq!(profile.initials, "PR");
    }

    #[test]
    fn test_multi_word_local_part() {
        let profile = UserProfile::from_email("jane.doe-smith@studio.io");
        assert_eq!(profile.display_name, "Jane Doe Smith");
        assert_eq!(profile.handle, "@janedoesmith");
        assert_eq!(profile.initials, "JD");
    }

    #[test]
    fn test_handle_strips_symbols() {
        let profile = UserProfile::from_email("DJ_K+2000@x.com");
        assert_eq!(profile.handle, "@djk2000");
        assert_eq!(profile.display_name, "DJ K+2000");
        assert_eq!(profile.initials, "DK");
    }
}
