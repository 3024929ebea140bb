//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Draft generation prompt with the content policy
pub const DRAFTS: &str = include_str!("../../prompts/drafts.pmt");

/// System instruction for draft generation
pub const DRAFTS_SYSTEM: &str = include_str!("../../prompts/drafts-system.pmt");

/// Missions, topics and relationship score
pub const EXTRAS: &str = include_str!("../../prompts/extras.pmt");

/// Email/SMS reformatting
pub const CHANNEL: &str = include_str!("../../prompts/channel.pmt");

/// Every embedded template name
pub const NAMES: [&str; 4] = ["drafts", "drafts-system", "extras", "channel"];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "drafts" => Some(DRAFTS),
        "drafts-system" => Some(DRAFTS_SYSTEM),
        "extras" => Some(EXTRAS),
        "channel" => Some(CHANNEL),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
