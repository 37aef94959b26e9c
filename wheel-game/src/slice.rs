//! Slice definitions and the shared slice pool zones are filled from.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Kind of reward a slice grants when the wheel lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    #[default]
    None,
    Points,
    Chest,
    Item,
    Currency,
}

impl RewardKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Points => "points",
            Self::Chest => "chest",
            Self::Item => "item",
            Self::Currency => "currency",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single wedge of the wheel. Authored as content and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub id: String,
    pub name: String,
    /// Icon reference resolved by the rendering layer.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub reward_kind: RewardKind,
    #[serde(default)]
    pub reward_value: u32,
    #[serde(default)]
    pub is_bomb: bool,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub description: String,
}

impl Slice {
    /// Build a point slice worth `value`.
    #[must_use]
    pub fn points(id: &str, value: u32) -> Self {
        Self {
            id: id.to_string(),
            name: format!("{value} Points"),
            icon: "ui_icon_points".to_string(),
            reward_kind: RewardKind::Points,
            reward_value: value,
            is_bomb: false,
            is_special: false,
            description: String::new(),
        }
    }

    /// Build a chest slice worth `value`.
    #[must_use]
    pub fn chest(id: &str, value: u32) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            icon: "ui_icon_chest".to_string(),
            reward_kind: RewardKind::Chest,
            reward_value: value,
            is_bomb: false,
            is_special: false,
            description: String::new(),
        }
    }

    /// Build the bomb slice.
    #[must_use]
    pub fn bomb(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Bomb".to_string(),
            icon: "ui_icon_bomb".to_string(),
            reward_kind: RewardKind::None,
            reward_value: 0,
            is_bomb: true,
            is_special: false,
            description: String::new(),
        }
    }

    /// Mark the slice as the designated special reward.
    #[must_use]
    pub fn special(mut self) -> Self {
        self.is_special = true;
        self
    }
}

/// Errors raised when slice content is malformed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("slice catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("slice '{id}' is listed as {pool} but is flagged as a bomb")]
    BombInRewardPool { id: String, pool: &'static str },
    #[error("bomb slice '{id}' is not flagged as a bomb")]
    BombNotFlagged { id: String },
    #[error("slice id '{id}' appears more than once")]
    DuplicateId { id: String },
    #[error("{pool} pool is empty")]
    EmptyPool { pool: &'static str },
}

/// Fixed pool of reward definitions shared by every zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceCatalog {
    #[serde(default)]
    point_slices: Vec<Slice>,
    #[serde(default)]
    chest_slices: Vec<Slice>,
    #[serde(default)]
    bomb_slice: Option<Slice>,
}

impl SliceCatalog {
    /// Build and validate a catalog from explicit pools.
    ///
    /// # Errors
    ///
    /// Returns an error when a pool is empty, ids collide, or bomb flags are inconsistent.
    pub fn new(
        point_slices: Vec<Slice>,
        chest_slices: Vec<Slice>,
        bomb_slice: Option<Slice>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            point_slices,
            chest_slices,
            bomb_slice,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the pools fail validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog bundled with the crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded content is malformed; covered by tests.
    #[must_use]
    pub fn load_default() -> Self {
        default_catalog().clone()
    }

    #[must_use]
    pub fn point_slices(&self) -> &[Slice] {
        &self.point_slices
    }

    #[must_use]
    pub fn chest_slices(&self) -> &[Slice] {
        &self.chest_slices
    }

    #[must_use]
    pub const fn bomb_slice(&self) -> Option<&Slice> {
        self.bomb_slice.as_ref()
    }

    /// First chest flagged as the special reward, if any.
    #[must_use]
    pub fn special_chest(&self) -> Option<&Slice> {
        self.chest_slices.iter().find(|slice| slice.is_special)
    }

    /// Look up a slice by id across all pools.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Slice> {
        self.iter().find(|slice| slice.id == id)
    }

    /// Iterate every slice in the catalog: points, then chests, then the bomb.
    pub fn iter(&self) -> impl Iterator<Item = &Slice> {
        self.point_slices
            .iter()
            .chain(self.chest_slices.iter())
            .chain(self.bomb_slice.iter())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.point_slices.is_empty() {
            return Err(CatalogError::EmptyPool { pool: "point" });
        }
        if self.chest_slices.is_empty() {
            return Err(CatalogError::EmptyPool { pool: "chest" });
        }
        for (pool, slices) in [("point", &self.point_slices), ("chest", &self.chest_slices)] {
            if let Some(slice) = slices.iter().find(|slice| slice.is_bomb) {
                return Err(CatalogError::BombInRewardPool {
                    id: slice.id.clone(),
                    pool,
                });
            }
        }
        if let Some(bomb) = self.bomb_slice.as_ref()
            && !bomb.is_bomb
        {
            return Err(CatalogError::BombNotFlagged {
                id: bomb.id.clone(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for slice in self.iter() {
            if !seen.insert(slice.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: slice.id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn default_catalog() -> &'static SliceCatalog {
    static CATALOG: OnceLock<SliceCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        SliceCatalog::from_json(include_str!("../data/slices.json"))
            .expect("valid bundled slice catalog")
    })
}
