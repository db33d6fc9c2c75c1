//! Console model detection
//!
//! The laptop system ROM leaves its font tiles in VRAM when it hands
//! control to a cartridge. The Spanish and German character sets differ
//! in the two tiles at 0x8D00, which identifies the model. A plain
//! handheld has neither pattern there. Only meaningful right after boot,
//! before anything overwrites tile memory.

use megaduck_hal::VideoMemory;

/// First tile checked; the second follows at 0x8D10
pub const MODEL_TILE_ADDR: u16 = 0x8D00;

/// Upside-down question mark and exclamation point
pub const SPANISH_TILES: [u8; 32] = [
    0x00, 0x00, 0x18, 0x18, 0x00, 0x00, 0x38, 0x38, 0x70, 0x70, 0x72, 0x72, 0x76, 0x76, 0x3C, 0x3C,
    0x00, 0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x3C, 0x3C, 0x3C, 0x3C, 0x3C, 0x3C, 0x18, 0x18,
];

/// Two pixel underscore and an inverted 0 on dark grey
pub const GERMAN_TILES: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    0x00, 0xFF, 0x00, 0xC3, 0x00, 0x99, 0x00, 0x99, 0x00, 0x99, 0x00, 0x99, 0x00, 0xC3, 0x00, 0xFF,
];

/// Console model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Model {
    /// Handheld without the laptop base
    #[default]
    HandheldStandard,
    LaptopSpanish,
    LaptopGerman,
}

impl Model {
    /// Identify the model from the font tiles left in VRAM
    pub fn detect<V: VideoMemory + ?Sized>(vram: &mut V) -> Self {
        if vram.matches(MODEL_TILE_ADDR, &SPANISH_TILES) {
            Model::LaptopSpanish
        } else if vram.matches(MODEL_TILE_ADDR, &GERMAN_TILES) {
            Model::LaptopGerman
        } else {
            Model::HandheldStandard
        }
    }

    pub fn is_laptop(self) -> bool {
        self != Model::HandheldStandard
    }
}
