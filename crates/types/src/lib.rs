//! Validated text types shared by every MedBot layer.
//!
//! These wrappers are constructed at the API edge so that the core never has to re-check
//! for blank user identifiers or blank chat messages.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Identifier of the person a session belongs to.
///
/// Identifiers are trimmed on construction. Callers that accept an optional identifier
/// (the chat and feedback endpoints) fall back to a fixed default through [`UserId::or_default`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Identifier used for chat requests that do not carry one.
    pub const ANONYMOUS: &'static str = "anonymous";

    /// Identifier used for feedback submissions that do not carry one.
    pub const FEEDBACK: &'static str = "feedback";

    /// Creates a `UserId` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Resolves an optional identifier, using `fallback` when it is missing or blank.
    pub fn or_default(input: Option<&str>, fallback: &'static str) -> Self {
        input
            .and_then(|raw| Self::new(raw).ok())
            .unwrap_or_else(|| Self(fallback.to_owned()))
    }

    /// The anonymous identifier.
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A chat message that contains at least one non-whitespace character.
///
/// Unlike [`UserId`], the message keeps its original spacing: answers to follow-up
/// questions are stored exactly as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// Creates a `MessageText`, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the input is empty or whitespace only.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let text = input.into();
        if text.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserId::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_is_trimmed() {
        let id = UserId::new("  alice ").unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn test_user_id_rejects_blank() {
        assert_eq!(UserId::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn test_or_default_falls_back_for_missing_and_blank() {
        assert_eq!(UserId::or_default(None, UserId::ANONYMOUS).as_str(), "anonymous");
        assert_eq!(UserId::or_default(Some(" "), UserId::FEEDBACK).as_str(), "feedback");
        assert_eq!(UserId::or_default(Some("bob"), UserId::ANONYMOUS).as_str(), "bob");
    }

    #[test]
    fn test_message_text_keeps_original_spacing() {
        let msg = MessageText::new("  2 days ").unwrap();
        assert_eq!(msg.as_str(), "  2 days ");
    }

    #[test]
    fn test_message_text_rejects_whitespace() {
        assert!(MessageText::new("\n\t ").is_err());
    }

    #[test]
    fn test_user_id_deserialize_rejects_blank() {
        let ok: UserId = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(ok.as_str(), "carol");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
