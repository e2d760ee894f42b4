use eframe::egui::Color32;

/// Visual mood for a focus session: an accent for the ring and label,
/// a near-black backdrop tint, and an emoji badge.
#[derive(Debug, Clone, Copy)]
pub struct FocusTheme {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub accent: Color32,
    pub backdrop: Color32,
}

pub const FOCUS_THEMES: [FocusTheme; 15] = [
    FocusTheme {
        id: "coffee",
        name: "Coffee Brewing",
        icon: "\u{2615}",
        accent: Color32::from_rgb(0x8D, 0x6E, 0x63),
        backdrop: Color32::from_rgb(0x1A, 0x12, 0x0B),
    },
    FocusTheme {
        id: "campfire",
        name: "Campfire",
        icon: "\u{1F525}",
        accent: Color32::from_rgb(0xFF, 0x70, 0x43),
        backdrop: Color32::from_rgb(0x1B, 0x0A, 0x00),
    },
    FocusTheme {
        id: "dog",
        name: "Dog",
        icon: "\u{1F436}",
        accent: Color32::from_rgb(0xFF, 0xCC, 0x80),
        backdrop: Color32::from_rgb(0x14, 0x11, 0x0F),
    },
    FocusTheme {
        id: "cat",
        name: "Cat",
        icon: "\u{1F431}",
        accent: Color32::from_rgb(0xF4, 0x8F, 0xB1),
        backdrop: Color32::from_rgb(0x13, 0x0F, 0x14),
    },
    FocusTheme {
        id: "ocean",
        name: "Ocean Waves",
        icon: "\u{1F30A}",
        accent: Color32::from_rgb(0x4F, 0xC3, 0xF7),
        backdrop: Color32::from_rgb(0x00, 0x0B, 0x14),
    },
    FocusTheme {
        id: "forest",
        name: "Forest",
        icon: "\u{1F333}",
        accent: Color32::from_rgb(0x81, 0xC7, 0x84),
        backdrop: Color32::from_rgb(0x08, 0x14, 0x08),
    },
    FocusTheme {
        id: "night",
        name: "Night Sky",
        icon: "\u{1F30C}",
        accent: Color32::from_rgb(0x95, 0x75, 0xCD),
        backdrop: Color32::from_rgb(0x05, 0x05, 0x14),
    },
    FocusTheme {
        id: "sun",
        name: "Sunrise",
        icon: "\u{1F305}",
        accent: Color32::from_rgb(0xFF, 0xD5, 0x4F),
        backdrop: Color32::from_rgb(0x14, 0x0F, 0x00),
    },
    FocusTheme {
        id: "candle",
        name: "Meditation",
        icon: "\u{1F56F}",
        accent: Color32::from_rgb(0xFF, 0xB7, 0x4D),
        backdrop: Color32::from_rgb(0x0F, 0x0A, 0x00),
    },
    FocusTheme {
        id: "snow",
        name: "Snowfall",
        icon: "\u{2744}",
        accent: Color32::from_rgb(0xE1, 0xF5, 0xFE),
        backdrop: Color32::from_rgb(0x0D, 0x10, 0x1A),
    },
    FocusTheme {
        id: "chocolate",
        name: "Chocolate",
        icon: "\u{1F36B}",
        accent: Color32::from_rgb(0xA1, 0x88, 0x7F),
        backdrop: Color32::from_rgb(0x0F, 0x09, 0x00),
    },
    FocusTheme {
        id: "study",
        name: "Study Desk",
        icon: "\u{1F4DA}",
        accent: Color32::from_rgb(0x90, 0xA4, 0xAE),
        backdrop: Color32::from_rgb(0x0F, 0x11, 0x12),
    },
    FocusTheme {
        id: "art",
        name: "Art Focus",
        icon: "\u{1F3A8}",
        accent: Color32::from_rgb(0xCE, 0x93, 0xD8),
        backdrop: Color32::from_rgb(0x12, 0x0F, 0x14),
    },
    FocusTheme {
        id: "aquarium",
        name: "Aquarium",
        icon: "\u{1F420}",
        accent: Color32::from_rgb(0x4D, 0xD0, 0xE1),
        backdrop: Color32::from_rgb(0x00, 0x12, 0x14),
    },
    FocusTheme {
        id: "sakura",
        name: "Cherry Blossom",
        icon: "\u{1F338}",
        accent: Color32::from_rgb(0xF8, 0xBB, 0xD0),
        backdrop: Color32::from_rgb(0x14, 0x0D, 0x0F),
    },
];

/// Palette for the world clock face. `ring` carries alpha for the
/// faint seconds track behind the sweep.
#[derive(Debug, Clone, Copy)]
pub struct ClockTheme {
    pub id: &'static str,
    pub name: &'static str,
    pub backdrop: Color32,
    pub hand: Color32,
    pub accent: Color32,
    pub marker: Color32,
    pub text: Color32,
    pub ring: Color32,
}

pub const CLOCK_THEMES: [ClockTheme; 3] = [
    ClockTheme {
        id: "midnight",
        name: "Midnight",
        backdrop: Color32::from_rgb(0x0A, 0x0A, 0x0C),
        hand: Color32::WHITE,
        accent: Color32::from_rgb(0x3B, 0x82, 0xF6),
        marker: Color32::from_rgb(0x27, 0x27, 0x2A),
        text: Color32::from_rgb(0xF4, 0xF4, 0xF5),
        ring: Color32::from_rgba_premultiplied(13, 13, 13, 13),
    },
    ClockTheme {
        id: "calm",
        name: "Calm",
        backdrop: Color32::from_rgb(0x1C, 0x1C, 0x1E),
        hand: Color32::from_rgb(0xD4, 0xD4, 0xD8),
        accent: Color32::from_rgb(0xF9, 0x73, 0x16),
        marker: Color32::from_rgb(0x3F, 0x3F, 0x46),
        text: Color32::from_rgb(0xE4, 0xE4, 0xE7),
        ring: Color32::from_rgba_premultiplied(50, 23, 4, 51),
    },
    ClockTheme {
        id: "oceanic",
        name: "Oceanic",
        backdrop: Color32::from_rgb(0x00, 0x12, 0x19),
        hand: Color32::from_rgb(0xA5, 0xF3, 0xFC),
        accent: Color32::from_rgb(0x22, 0xD3, 0xEE),
        marker: Color32::from_rgb(0x08, 0x33, 0x44),
        text: Color32::from_rgb(0xEC, 0xFE, 0xFF),
        ring: Color32::from_rgba_premultiplied(7, 42, 48, 51),
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn focus_catalog_ids_are_unique() {
        let ids: HashSet<&str> = FOCUS_THEMES.iter().map(|theme| theme.id).collect();
        assert_eq!(ids.len(), FOCUS_THEMES.len());
    }

    #[test]
    fn clock_catalog_has_three_faces() {
        assert_eq!(CLOCK_THEMES.len(), 3);
        assert_eq!(CLOCK_THEMES[0].id, "midnight");
    }
}
