//! Traffic classes sharing the request lane.

use serde::{Deserialize, Serialize};

/// Model tier a request targets.
///
/// Each class has its own cooldown window; both share one execution lane.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TrafficClass {
    /// "pro" tier models: deep reasoning, image and video generation
    HighCapability,
    /// "flash" tier models: quick analysis and edits
    Fast,
}
