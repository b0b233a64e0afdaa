//! Social platforms a campaign can target.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A social platform a proposed post targets.
///
/// The platform is the immutable key of a proposed post within its
/// campaign. Each platform maps to a network identifier on the
/// scheduling provider's side; the two vocabularies are not identical
/// (`meta` is `facebook` over the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Meta,
    Instagram,
    Linkedin,
    X,
    Gmb,
}

impl Platform {
    /// All supported platforms, in campaign display order.
    pub const ALL: [Platform; 5] = [
        Platform::Meta,
        Platform::Instagram,
        Platform::Linkedin,
        Platform::X,
        Platform::Gmb,
    ];

    /// The scheduling provider's network identifier for this platform.
    #[must_use]
    pub fn network(&self) -> &'static str {
        match self {
            Platform::Meta => "facebook",
            Platform::Instagram => "instagram",
            Platform::Linkedin => "linkedin",
            Platform::X => "twitter",
            Platform::Gmb => "gmb",
        }
    }

    /// Map a provider network identifier back to a platform.
    #[must_use]
    pub fn from_network(network: &str) -> Option<Platform> {
        match network.to_lowercase().as_str() {
            "facebook" => Some(Platform::Meta),
            "instagram" => Some(Platform::Instagram),
            "linkedin" => Some(Platform::Linkedin),
            "twitter" => Some(Platform::X),
            "gmb" => Some(Platform::Gmb),
            _ => None,
        }
    }

    /// Whether a scheduler entry tagged with `network` can satisfy this
    /// platform. An entry with no network tag matches any platform.
    #[must_use]
    pub fn matches_network(&self, network: Option<&str>) -> bool {
        network.map_or(true, |n| n.eq_ignore_ascii_case(self.network()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Meta => write!(f, "meta"),
            Platform::Instagram => write!(f, "instagram"),
            Platform::Linkedin => write!(f, "linkedin"),
            Platform::X => write!(f, "x"),
            Platform::Gmb => write!(f, "gmb"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "meta" => Ok(Platform::Meta),
            "instagram" => Ok(Platform::Instagram),
            "linkedin" => Ok(Platform::Linkedin),
            "x" => Ok(Platform::X),
            "gmb" => Ok(Platform::Gmb),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}
