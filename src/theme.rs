//! Ship colour themes and the player profile that unlocks them

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, PersistenceError, load_or_default, save_json};

/// Colour pair applied to the ship, its bullets and its trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    /// Unlock cost in credits
    pub price: u64,
    /// Main bullet and unpowered trail
    pub primary: u32,
    /// Side bullets and powered trail
    pub secondary: u32,
}

pub const NEON: Theme = Theme {
    id: "NEON",
    name: "CYBER DEFAULT",
    price: 0,
    primary: 0x00f3ff,
    secondary: 0xff003c,
};

pub const VOID: Theme = Theme {
    id: "VOID",
    name: "VOID WALKER",
    price: 2000,
    primary: 0x8b5cf6,
    secondary: 0x4c1d95,
};

pub const MATRIX: Theme = Theme {
    id: "MATRIX",
    name: "SYSTEM ROOT",
    price: 3500,
    primary: 0x00ff00,
    secondary: 0x003300,
};

pub const GOLD: Theme = Theme {
    id: "GOLD",
    name: "MIDAS TOUCH",
    price: 10_000,
    primary: 0xffd700,
    secondary: 0xffffff,
};

pub const CATALOG: [Theme; 4] = [NEON, VOID, MATRIX, GOLD];

impl Default for Theme {
    fn default() -> Self {
        NEON
    }
}

impl Theme {
    pub fn by_id(id: &str) -> Option<Theme> {
        CATALOG.iter().copied().find(|t| t.id == id)
    }
}

/// Why a theme could not be equipped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
    #[error("Insufficient credits: need {price}, have {credits}")]
    InsufficientCredits { price: u64, credits: u64 },
}

/// Persistent player profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub credits: u64,
    pub active_theme: String,
    pub unlocked: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            credits: 0,
            active_theme: NEON.id.to_string(),
            unlocked: vec![NEON.id.to_string()],
        }
    }
}

impl Profile {
    const CREDITS_KEY: &'static str = "credits";
    const ACTIVE_THEME_KEY: &'static str = "active_theme";
    const UNLOCKED_KEY: &'static str = "unlocked_themes";

    /// Load each field independently; a bad field falls back on its own
    pub fn load(store: &impl KeyValueStore) -> Self {
        let default = Self::default();
        let credits = load_or_default(store, Self::CREDITS_KEY);

        let active_theme: Option<String> = load_or_default(store, Self::ACTIVE_THEME_KEY);
        let active_theme = active_theme
            .filter(|id| Theme::by_id(id).is_some())
            .unwrap_or(default.active_theme);

        let mut unlocked: Vec<String> = load_or_default(store, Self::UNLOCKED_KEY);
        unlocked.retain(|id| Theme::by_id(id).is_some());
        if !unlocked.iter().any(|id| id == NEON.id) {
            unlocked.insert(0, NEON.id.to_string());
        }

        let mut profile = Self {
            credits,
            active_theme,
            unlocked,
        };
        if !profile.is_unlocked(&profile.active_theme) {
            log::warn!("Active theme {} is locked; reverting", profile.active_theme);
            profile.active_theme = NEON.id.to_string();
        }
        profile
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), PersistenceError> {
        save_json(store, Self::CREDITS_KEY, &self.credits)?;
        save_json(store, Self::ACTIVE_THEME_KEY, &self.active_theme)?;
        save_json(store, Self::UNLOCKED_KEY, &self.unlocked)?;
        Ok(())
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    pub fn theme(&self) -> Theme {
        Theme::by_id(&self.active_theme).unwrap_or_default()
    }

    /// Equip an unlocked theme, or buy and equip a locked one
    pub fn buy_or_equip(&mut self, id: &str) -> Result<Theme, ShopError> {
        let theme = Theme::by_id(id).ok_or_else(|| ShopError::UnknownTheme(id.to_string()))?;
        if !self.is_unlocked(id) {
            if self.credits < theme.price {
                return Err(ShopError::InsufficientCredits {
                    price: theme.price,
                    credits: self.credits,
                });
            }
            self.credits -= theme.price;
            self.unlocked.push(theme.id.to_string());
            log::info!("Unlocked theme {}", theme.name);
        }
        self.active_theme = theme.id.to_string();
        Ok(theme)
    }
}
