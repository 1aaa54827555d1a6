//! Core data types for the Atelier wardrobe assistant.
//!
//! This crate holds the wardrobe catalogue types, the structured results the
//! stylist backend produces, and the logging bootstrap shared by binaries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod logging;
mod stylist;
mod wardrobe;

pub use logging::{LoggingConfig, init_logging};
pub use stylist::{
    BoutiqueReport, BrandMatch, DetectedItem, GroundingChunk, GroundingSource, ItemCategorization,
    ItemSuggestion, LatLng, OutfitSuggestions, ShoppingRecommendation, StyleProfile, WardrobeGap,
};
pub use wardrobe::{Category, ClothingItem, Occasion, Outfit, Wardrobe};
