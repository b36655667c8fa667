//! Festival artwork for the landing hero, chosen from an explicit date.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageVariant {
    Default,
    Rakhi,
    Gaijatra,
}

impl ImageVariant {
    pub fn asset(&self) -> &'static str {
        match self {
            ImageVariant::Default => "hero-bg.jpg",
            ImageVariant::Rakhi => "rakhi.jpg",
            ImageVariant::Gaijatra => "gaijatra.jpg",
        }
    }

    /// Festival art is shown full-bleed, without the tagline overlay.
    pub fn shows_tagline(&self) -> bool {
        matches!(self, ImageVariant::Default)
    }
}

const FESTIVAL_DAYS: &[((i32, u32, u32), ImageVariant)] = &[
    ((2025, 8, 9), ImageVariant::Rakhi),
    ((2025, 8, 10), ImageVariant::Gaijatra),
];

pub fn select_background(date: NaiveDate) -> ImageVariant {
    let key = (date.year(), date.month(), date.day());
    FESTIVAL_DAYS
        .iter()
        .find(|(day, _)| *day == key)
        .map(|(_, variant)| *variant)
        .unwrap_or(ImageVariant::Default)
}
