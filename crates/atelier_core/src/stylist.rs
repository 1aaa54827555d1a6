//! Structured results produced by the stylist backend.
//!
//! Field names follow the camelCase JSON the backend is asked to return.
//! Every field defaults so a partially filled reply still deserializes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Category;

/// Tags the backend assigns to a single clothing photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCategorization {
    /// Category as written by the model
    pub category: String,
    /// Dominant color
    pub color: String,
    /// Suitable seasons
    pub season: Vec<String>,
    /// Suitable occasions
    pub occasion: Vec<String>,
    /// Free-form tags
    pub tags: Vec<String>,
}

impl ItemCategorization {
    /// The category, if the model named one we know.
    pub fn category(&self) -> Option<Category> {
        Category::from_str(self.category.trim()).ok()
    }
}

/// One garment detected in a multi-item photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    /// Tags for the detected garment
    #[serde(flatten)]
    pub tags: ItemCategorization,
    /// The photo it was detected in
    pub image: String,
}

/// Source document backing a grounded answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingSource {
    /// Link to the source
    pub uri: String,
    /// Title of the source
    pub title: String,
}

/// A web or maps citation attached to a grounded reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingChunk {
    /// Web search result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<GroundingSource>,
    /// Maps place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<GroundingSource>,
}

impl GroundingChunk {
    /// Whichever source this chunk carries, preferring maps.
    pub fn source(&self) -> Option<&GroundingSource> {
        self.maps.as_ref().or(self.web.as_ref())
    }
}

/// Summary of a wardrobe's style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleProfile {
    /// Colors that dominate the wardrobe
    pub dominant_colors: Vec<String>,
    /// Occasions the wardrobe serves best
    pub top_occasions: Vec<String>,
    /// One-line aesthetic
    pub core_aesthetic: String,
}

/// A category the wardrobe is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardrobeGap {
    /// Missing category
    pub category: String,
    /// Why it matters
    pub reason: String,
}

/// A recommended purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemSuggestion {
    /// Kind of item
    pub item_type: String,
    /// Why it fits the wardrobe
    pub why_it_fits: String,
    /// How to wear it
    pub styling_idea: String,
}

/// A brand matching the wardrobe's aesthetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandMatch {
    /// Brand name
    pub name: String,
    /// Brand style
    pub style: String,
    /// Shop link
    pub url: String,
}

/// Shopping analysis of a wardrobe, grounded in web search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShoppingRecommendation {
    /// Narrative analysis
    pub wardrobe_analysis: String,
    /// Style DNA
    pub style_profile: StyleProfile,
    /// Missing categories
    pub gaps: Vec<WardrobeGap>,
    /// Suggested investments
    pub suggestions: Vec<ItemSuggestion>,
    /// Matching brands
    pub brand_matches: Vec<BrandMatch>,
    /// Search results backing the answer
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<GroundingChunk>,
}

/// Nearby boutiques and tailors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoutiqueReport {
    /// Model's answer
    pub text: String,
    /// Places cited by the answer
    pub places: Vec<GroundingChunk>,
}

/// Geographic coordinate used for local grounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// Suggested outfits, each a list of wardrobe item ids.
pub type OutfitSuggestions = Vec<Vec<String>>;
