//! Wardrobe catalogue: clothing items and the outfits composed from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ItemCategorization;

/// Garment category.
///
/// # Examples
///
/// ```
/// use atelier_core::Category;
/// use std::str::FromStr;
///
/// assert_eq!(Category::from_str("outerwear").unwrap(), Category::Outerwear);
/// assert_eq!(Category::Dresses.to_string(), "Dresses");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    /// Shirts, blouses, knitwear
    Tops,
    /// Trousers, skirts, shorts
    Bottoms,
    /// Footwear
    Shoes,
    /// Bags, jewellery, belts, hats
    Accessories,
    /// Coats and jackets
    Outerwear,
    /// Dresses and jumpsuits
    Dresses,
}

/// Occasion an outfit is composed for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Occasion {
    /// Everyday wear
    Casual,
    /// Office
    Work,
    /// Formal events
    Formal,
    /// Evening out
    #[serde(rename = "Night Out")]
    #[strum(serialize = "Night Out")]
    NightOut,
    /// Training
    Gym,
    /// Date night
    #[serde(rename = "Date Night")]
    #[strum(serialize = "Date Night")]
    DateNight,
    /// At home
    Lounge,
    /// Anything else
    Other,
}

/// A catalogued clothing photo with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    /// Stable identifier
    pub id: String,
    /// Image as a data URL or raw base64 JPEG
    pub image_url: String,
    /// Garment category
    pub category: Category,
    /// Dominant color
    pub color: String,
    /// Seasons the item suits
    #[serde(default)]
    pub season: Vec<String>,
    /// Occasions the item suits
    #[serde(default)]
    pub occasion: Vec<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the item was added
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Marked as favourite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

impl ClothingItem {
    /// Catalogue a photo using the categorization returned by the stylist.
    ///
    /// Unknown categories fall back to [`Category::Tops`].
    pub fn from_categorization(image_url: impl Into<String>, tags: ItemCategorization) -> Self {
        let category = tags.category().unwrap_or(Category::Tops);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image_url: image_url.into(),
            category,
            color: tags.color,
            season: tags.season,
            occasion: tags.occasion,
            tags: tags.tags,
            created_at: Utc::now(),
            is_liked: None,
        }
    }
}

/// A named combination of wardrobe items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outfit {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Items in the outfit, by id
    pub item_ids: Vec<String>,
    /// Intended occasion
    pub occasion: Occasion,
    /// When the outfit was saved
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Canvas background color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Canvas background image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    /// Decorative stickers placed on the canvas
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stickers: Vec<String>,
    /// Reusable template rather than a saved look
    #[serde(default)]
    pub is_template: bool,
}

/// The whole local wardrobe, as exported to JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wardrobe {
    /// Catalogued items
    #[serde(default)]
    pub items: Vec<ClothingItem>,
    /// Saved outfits
    #[serde(default)]
    pub outfits: Vec<Outfit>,
}

impl Wardrobe {
    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&ClothingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resolve outfit item ids, skipping ids that are not in the wardrobe.
    pub fn resolve<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a ClothingItem> + 'a {
        ids.iter().filter_map(move |id| self.item(id))
    }

    /// One `category: color (tag, tag)` line per item, used as style context.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_core::{Category, ClothingItem, Wardrobe};
    ///
    /// let item = ClothingItem {
    ///     id: "a".to_string(),
    ///     image_url: String::new(),
    ///     category: Category::Tops,
    ///     color: "navy".to_string(),
    ///     season: vec![],
    ///     occasion: vec![],
    ///     tags: vec!["linen".to_string(), "oversized".to_string()],
    ///     created_at: chrono::Utc::now(),
    ///     is_liked: None,
    /// };
    /// let wardrobe = Wardrobe { items: vec![item], outfits: vec![] };
    /// assert_eq!(wardrobe.context_lines(), "Tops: navy (linen, oversized)");
    /// ```
    pub fn context_lines(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{}: {} ({})", item.category, item.color, item.tags.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One `ID:<id>, <category>, <color>` line per item, used for outfit picking.
    pub fn inventory_lines(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("ID:{}, {}, {}", item.id, item.category, item.color))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
