//! Handing a finished message to the outside world
//!
//! Display transforms for the final dashboard, `mailto:`/`sms:` composition
//! URLs for native messaging handlers, and clipboard copy via OSC 52.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

/// Subject used when formatting produced none
pub const DEFAULT_SUBJECT: &str = "Message from WhisperWall";

/// Playful display transform of the selected message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Base64,
    Rot13,
    Reverse,
}

impl Cipher {
    pub const ALL: [Cipher; 3] = [Self::Base64, Self::Rot13, Self::Reverse];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Rot13 => "rot13",
            Self::Reverse => "reverse",
        }
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Base64 => STANDARD.encode(text.as_bytes()),
            Self::Rot13 => rot13(text),
            Self::Reverse => text.chars().rev().collect(),
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cipher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown cipher '{}' (base64, rot13, reverse)", s))
    }
}

fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

/// Percent-encode everything outside the URI-component unreserved set
pub fn encode_uri_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Pre-filled email composition URL
pub fn mailto_url(subject: &str, body: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        encode_uri_component(subject),
        encode_uri_component(body)
    )
}

/// Pre-filled SMS composition URL; iOS handlers expect `&` before `body`
pub fn sms_url(body: &str, ios: bool) -> String {
    let separator = if ios { '&' } else { '?' };
    format!("sms:{}body={}", separator, encode_uri_component(body))
}

/// Terminal escape that asks the emulator to place `text` on the clipboard
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

/// Write `text` to the clipboard through the terminal
pub fn copy_to_clipboard(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    debug!(len = text.len(), "copy_to_clipboard: called");
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}

/// Open a composition URL with the platform handler; fire-and-forget
pub fn open_url(url: &str) -> std::io::Result<()> {
    debug!(%url, "open_url: called");
    open::that_detached(url)
}
