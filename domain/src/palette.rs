//! The host site's fixed paint palette.
//!
//! Id 0 on the site is "transparent" and has no color of its own, so the table
//! starts at 1. The sentinel color never appears here.

use crate::color::{RgbColor, SENTINEL_RGB};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub id: u8,
    pub name: &'static str,
    pub rgb: RgbColor,
    pub premium: bool,
}

const fn entry(id: u8, name: &'static str, r: u8, g: u8, b: u8, premium: bool) -> PaletteEntry {
    PaletteEntry {
        id,
        name,
        rgb: RgbColor::new(r, g, b),
        premium,
    }
}

static ENTRIES: [PaletteEntry; 63] = [
    entry(1, "Black", 0, 0, 0, false),
    entry(2, "Dark Gray", 60, 60, 60, false),
    entry(3, "Gray", 120, 120, 120, false),
    entry(4, "Light Gray", 210, 210, 210, false),
    entry(5, "White", 255, 255, 255, false),
    entry(6, "Deep Red", 96, 0, 24, false),
    entry(7, "Red", 237, 28, 36, false),
    entry(8, "Orange", 255, 127, 39, false),
    entry(9, "Gold", 246, 170, 9, false),
    entry(10, "Yellow", 249, 221, 59, false),
    entry(11, "Light Yellow", 255, 250, 188, false),
    entry(12, "Dark Green", 14, 185, 104, false),
    entry(13, "Green", 19, 230, 123, false),
    entry(14, "Light Green", 135, 255, 94, false),
    entry(15, "Dark Teal", 12, 129, 110, false),
    entry(16, "Teal", 16, 174, 166, false),
    entry(17, "Light Teal", 19, 225, 190, false),
    entry(18, "Dark Blue", 40, 80, 158, false),
    entry(19, "Blue", 64, 147, 228, false),
    entry(20, "Cyan", 96, 247, 242, false),
    entry(21, "Indigo", 107, 80, 246, false),
    entry(22, "Light Indigo", 153, 177, 251, false),
    entry(23, "Dark Purple", 120, 12, 153, false),
    entry(24, "Purple", 170, 56, 185, false),
    entry(25, "Light Purple", 224, 159, 249, false),
    entry(26, "Dark Pink", 203, 0, 122, false),
    entry(27, "Pink", 236, 31, 128, false),
    entry(28, "Light Pink", 243, 141, 169, false),
    entry(29, "Dark Brown", 104, 70, 52, false),
    entry(30, "Brown", 149, 104, 42, false),
    entry(31, "Beige", 248, 178, 119, false),
    entry(32, "Medium Gray", 170, 170, 170, true),
    entry(33, "Dark Red", 165, 14, 30, true),
    entry(34, "Light Red", 250, 128, 114, true),
    entry(35, "Dark Orange", 228, 92, 26, true),
    entry(36, "Light Tan", 214, 181, 148, true),
    entry(37, "Dark Goldenrod", 156, 132, 49, true),
    entry(38, "Goldenrod", 197, 173, 49, true),
    entry(39, "Light Goldenrod", 232, 212, 95, true),
    entry(40, "Dark Olive", 74, 107, 58, true),
    entry(41, "Olive", 90, 148, 74, true),
    entry(42, "Light Olive", 132, 197, 115, true),
    entry(43, "Dark Cyan", 15, 121, 159, true),
    entry(44, "Light Cyan", 187, 250, 242, true),
    entry(45, "Light Blue", 125, 199, 255, true),
    entry(46, "Dark Indigo", 77, 49, 184, true),
    entry(47, "Dark Slate Blue", 74, 66, 132, true),
    entry(48, "Slate Blue", 122, 113, 196, true),
    entry(49, "Light Slate Blue", 181, 174, 241, true),
    entry(50, "Light Brown", 219, 164, 99, true),
    entry(51, "Dark Beige", 209, 128, 81, true),
    entry(52, "Light Beige", 255, 197, 165, true),
    entry(53, "Dark Peach", 155, 82, 73, true),
    entry(54, "Peach", 209, 128, 120, true),
    entry(55, "Light Peach", 250, 182, 164, true),
    entry(56, "Dark Tan", 123, 99, 82, true),
    entry(57, "Tan", 156, 132, 107, true),
    entry(58, "Dark Slate", 51, 57, 65, true),
    entry(59, "Slate", 109, 117, 141, true),
    entry(60, "Light Slate", 179, 185, 209, true),
    entry(61, "Dark Stone", 109, 100, 63, true),
    entry(62, "Stone", 148, 140, 107, true),
    entry(63, "Light Stone", 205, 197, 158, true),
];

#[must_use]
pub fn entries() -> &'static [PaletteEntry] {
    &ENTRIES
}

#[must_use]
pub fn lookup_exact(rgb: RgbColor) -> Option<&'static PaletteEntry> {
    ENTRIES.iter().find(|entry| entry.rgb == rgb)
}

#[must_use]
pub fn lookup_by_id(id: u8) -> Option<&'static PaletteEntry> {
    ENTRIES.iter().find(|entry| entry.id == id)
}

/// Closest entry by squared RGB distance; ties resolve to the lowest id.
#[must_use]
pub fn lookup_nearest(rgb: RgbColor) -> &'static PaletteEntry {
    let [first, rest @ ..] = &ENTRIES;
    rest.iter().fold(first, |best, entry| {
        if entry.rgb.distance_squared(&rgb) < best.rgb.distance_squared(&rgb) {
            entry
        } else {
            best
        }
    })
}

#[must_use]
pub fn is_sentinel(rgb: RgbColor) -> bool {
    rgb == SENTINEL_RGB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn colors_are_unique_and_never_the_sentinel() {
        let mut seen = HashSet::new();
        for entry in entries() {
            assert!(seen.insert(entry.rgb), "duplicate color {}", entry.rgb);
            assert!(!is_sentinel(entry.rgb));
        }
    }

    #[test]
    fn ids_are_sequential() {
        for (index, entry) in entries().iter().enumerate() {
            assert_eq!(usize::from(entry.id), index + 1);
        }
    }

    #[test]
    fn exact_lookup() {
        let red = lookup_exact(RgbColor::new(237, 28, 36)).unwrap();
        assert_eq!(red.name, "Red");
        assert!(!red.premium);
        assert!(lookup_exact(RgbColor::new(237, 28, 37)).is_none());
        assert!(lookup_exact(SENTINEL_RGB).is_none());
        assert_eq!(lookup_by_id(32).map(|e| e.name), Some("Medium Gray"));
    }

    #[test]
    fn nearest_lookup() {
        assert_eq!(lookup_nearest(RgbColor::new(1, 1, 1)).name, "Black");
        assert_eq!(lookup_nearest(RgbColor::new(250, 250, 250)).name, "White");
        assert_eq!(lookup_nearest(RgbColor::new(237, 28, 36)).name, "Red");
        assert!(!is_sentinel(lookup_nearest(SENTINEL_RGB).rgb));
    }
}
