//! Outbound delivery channels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Native messaging handler a finished message is handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "mail" => Ok(Self::Email),
            "sms" | "text" => Ok(Self::Sms),
            other => Err(format!("Unknown channel '{}' (email, sms)", other)),
        }
    }
}

/// A message rewritten for one channel
///
/// `subject` is optional for every channel, and always absent for SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

impl FormattedMessage {
    /// The unmodified content with no subject
    pub fn unformatted(content: impl Into<String>) -> Self {
        Self {
            subject: None,
            body: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!("EMAIL".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!(" sms ".parse::<Channel>().unwrap(), Channel::Sms);
        assert!("fax".parse::<Channel>().is_err());
    }

    #[test]
    fn test_unformatted() {
        let msg = FormattedMessage::unformatted("hello");
        assert_eq!(msg.subject, None);
        assert_eq!(msg.body, "hello");
    }
}
