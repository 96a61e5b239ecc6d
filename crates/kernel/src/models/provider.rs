//! Provider record and plan tier.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription level of a provider.
///
/// Variants are declared in ascending order so the derived `Ord` gives
/// `Free < Pro < Premium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Premium,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Premium => "premium",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "premium" => Ok(PlanTier::Premium),
            other => Err(format!("unknown plan tier: {other}")),
        }
    }
}

/// A tradesperson listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Business or trading name.
    pub name: String,

    /// Free-text description shown on the profile.
    #[serde(default)]
    pub description: Option<String>,

    /// Trade tags, e.g. `plumber`, `electrician`.
    #[serde(default)]
    pub trades: BTreeSet<String>,

    /// Service-area tags, e.g. `north-end`.
    #[serde(default)]
    pub areas: BTreeSet<String>,

    /// Mean of non-deleted review ratings, 0.0 to 5.0.
    #[serde(default)]
    pub average_rating: f64,

    /// Number of non-deleted reviews.
    #[serde(default)]
    pub review_count: u32,

    #[serde(default)]
    pub plan: PlanTier,

    #[serde(default)]
    pub featured: bool,

    /// Whether the tradesperson has claimed the listing.
    #[serde(default)]
    pub claimed: bool,

    #[serde(default)]
    pub available_now: bool,

    /// Unix timestamp when the listing was created.
    pub created: i64,

    /// Contact phone as entered by the provider.
    #[serde(default)]
    pub phone: Option<String>,

    /// WhatsApp number, when different from `phone`.
    #[serde(default)]
    pub whatsapp: Option<String>,

    /// Call-out fee in minor currency units.
    #[serde(default)]
    pub call_out_fee: Option<i64>,
}

impl ProviderRecord {
    /// Whether the record carries the given trade tag.
    pub fn has_trade(&self, trade: &str) -> bool {
        tag_set_contains(&self.trades, trade)
    }

    /// Whether the record covers the given service area.
    pub fn has_area(&self, area: &str) -> bool {
        tag_set_contains(&self.areas, area)
    }

    /// Case-insensitive substring match on name and description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }

    /// The number to use for WhatsApp, falling back to the main phone.
    pub fn whatsapp_number(&self) -> Option<&str> {
        self.whatsapp.as_deref().or(self.phone.as_deref())
    }
}

fn tag_set_contains(tags: &BTreeSet<String>, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    tags.iter().any(|t| t.trim().to_lowercase() == wanted)
}
