//! Tavern theme constants shared by hosts.
//!
//! # Responsibility
//! - Name the fixed palette used by wish notes and accents.
//! - Hold the background presets and celebration overlay copy.
//!
//! # Invariants
//! - Palette string ids are stable; hosts map them to concrete styles.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sticky-note paper color for one wish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishColor {
    Slate,
    Amber,
    Orange,
    Emerald,
    Stone,
}

// String ids shared with hosts.
pub const WISH_COLOR_SLATE: &str = "slate";
pub const WISH_COLOR_AMBER: &str = "amber";
pub const WISH_COLOR_ORANGE: &str = "orange";
pub const WISH_COLOR_EMERALD: &str = "emerald";
pub const WISH_COLOR_STONE: &str = "stone";

const ALL_WISH_COLORS: [WishColor; 5] = [
    WishColor::Slate,
    WishColor::Amber,
    WishColor::Orange,
    WishColor::Emerald,
    WishColor::Stone,
];

impl WishColor {
    /// Every note color in palette order.
    pub fn all() -> &'static [WishColor] {
        &ALL_WISH_COLORS
    }

    /// Picks one note color uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ALL_WISH_COLORS[rng.gen_range(0..ALL_WISH_COLORS.len())]
    }

    /// Stable string id used across the FFI boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slate => WISH_COLOR_SLATE,
            Self::Amber => WISH_COLOR_AMBER,
            Self::Orange => WISH_COLOR_ORANGE,
            Self::Emerald => WISH_COLOR_EMERALD,
            Self::Stone => WISH_COLOR_STONE,
        }
    }
}

/// Accent colors of the tavern skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeColor {
    Gold,
    Red,
    Blue,
    Purple,
}

impl ThemeColor {
    pub fn all() -> &'static [ThemeColor] {
        &[Self::Gold, Self::Red, Self::Blue, Self::Purple]
    }

    /// CSS hex value.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Gold => "#FFD700",
            Self::Red => "#FF4D4D",
            Self::Blue => "#4D96FF",
            Self::Purple => "#BD93F9",
        }
    }
}

/// Background photographs offered in the settings panel.
///
/// Order matters: index 0 is the session default.
pub const BACKGROUND_PRESETS: &[&str] = &[
    // dim bar
    "https://images.unsplash.com/photo-1514362545857-3bc16c4c7d1b?q=80&w=2070&auto=format&fit=crop",
    // old library
    "https://images.unsplash.com/photo-1543007630-9710e4a00a20?q=80&w=1935&auto=format&fit=crop",
    // brass lamps
    "https://images.unsplash.com/photo-1551218372-a248e60f793b?q=80&w=1974&auto=format&fit=crop",
    // tavern corner
    "https://images.unsplash.com/photo-1560624052-449f5ddf0c31?q=80&w=2070&auto=format&fit=crop",
];

/// Headline shown on the celebration overlay.
pub const CELEBRATION_HEADLINE: &str = "2026";
/// Tagline shown under the headline.
pub const CELEBRATION_TAGLINE: &str = "A NEW ERA BEGINS AT WATA";
/// Motto tags shown at the bottom of the overlay.
pub const CELEBRATION_MOTTOS: &[&str] = &["RATIONALITY", "ELEGANCE", "COMMUNITY"];

#[cfg(test)]
mod tests {
    use super::{ThemeColor, WishColor, BACKGROUND_PRESETS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn wish_color_ids_are_unique() {
        let mut ids = WishColor::all()
            .iter()
            .map(|color| color.as_str())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), WishColor::all().len());
    }

    #[test]
    fn random_color_stays_in_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(WishColor::all().contains(&WishColor::random(&mut rng)));
        }
    }

    #[test]
    fn accent_hex_values_are_css_colors() {
        assert_eq!(ThemeColor::Gold.hex(), "#FFD700");
        assert!(ThemeColor::all()
            .iter()
            .all(|color| color.hex().len() == 7 && color.hex().starts_with('#')));
    }

    #[test]
    fn presets_are_https_urls() {
        assert_eq!(BACKGROUND_PRESETS.len(), 4);
        assert!(BACKGROUND_PRESETS.iter().all(|url| url.starts_with("https://")));
    }
}
