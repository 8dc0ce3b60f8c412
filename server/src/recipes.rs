//! Crafting recipes for glitch tokens, loaded from `recipes.toml`.
//!
//! ```toml
//! [shapes]
//! TELEPORT = ["EPE", "PNP", "EPE"]
//!
//! [items]
//! E = "minecraft:ender_pearl"
//! P = "PURPUR_BLOCK"
//! N = "NETHER_STAR"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use log::{info, warn};
use serde::Deserialize;
use glitch_shared::{GlitchKind, GlitchToken};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
struct RecipeFile {
    #[serde(default)]
    shapes: BTreeMap<String, Vec<String>>,
    items: Option<BTreeMap<String, String>>,
}

/// One shaped recipe producing a glitch token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub kind: GlitchKind,
    pub shape: [String; 3],
    /// Symbol to upper-case material name
    pub ingredients: BTreeMap<char, String>,
}

impl Recipe {
    pub fn output(&self) -> GlitchToken {
        GlitchToken::for_kind(self.kind)
    }
}

#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: HashMap<GlitchKind, Recipe>,
}

impl RecipeBook {
    /// Load recipes from disk. Problems are logged and yield fewer (or no) recipes.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(source) => {
                let err = ConfigError::Io { path: path.display().to_string(), source };
                warn!("{}; no glitch recipes registered", err);
                return Self::default();
            }
        };
        match Self::from_toml(&contents, path) {
            Ok(book) => book,
            Err(e) => {
                warn!("{}; no glitch recipes registered", e);
                Self::default()
            }
        }
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: RecipeFile = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: RecipeFile) -> Self {
        let mut recipes = HashMap::new();

        let Some(items) = file.items else {
            if !file.shapes.is_empty() {
                warn!("No items section found in recipes file");
            }
            return Self { recipes };
        };
        let ingredients = parse_ingredients(&items);

        for (key, rows) in file.shapes {
            let Some(kind) = GlitchKind::from_key(&key) else {
                warn!("Unknown glitch type {} in recipes file", key);
                continue;
            };
            let Ok(shape) = <[String; 3]>::try_from(rows) else {
                warn!("Invalid recipe shape for {}: expected 3 rows", key);
                continue;
            };
            if shape.iter().any(|row| row.chars().count() > 3) {
                warn!("Invalid recipe shape for {}: rows are at most 3 wide", key);
                continue;
            }

            info!("Registered crafting recipe for {}", kind.display_name());
            recipes.insert(kind, Recipe { kind, shape, ingredients: ingredients.clone() });
        }

        info!("Registered {} glitch crafting recipes", recipes.len());
        Self { recipes }
    }

    pub fn get(&self, kind: GlitchKind) -> Option<&Recipe> {
        self.recipes.get(&kind)
    }

    pub fn has_recipe(&self, kind: GlitchKind) -> bool {
        self.recipes.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn parse_ingredients(items: &BTreeMap<String, String>) -> BTreeMap<char, String> {
    let mut ingredients = BTreeMap::new();
    for (symbol, id) in items {
        let mut chars = symbol.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            warn!("Recipe symbol {:?} must be a single character", symbol);
            continue;
        };
        match parse_material(id) {
            Some(material) => {
                ingredients.insert(c, material);
            }
            None => warn!("Could not parse material from {} for key {}", id, symbol),
        }
    }
    ingredients
}

/// `"minecraft:ender_pearl"` or `"ENDER_PEARL"` to `ENDER_PEARL`
pub fn parse_material(id: &str) -> Option<String> {
    let name = match id.split_once(':') {
        Some((_, name)) => name,
        None => id,
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(toml: &str) -> RecipeBook {
        RecipeBook::from_toml(toml, Path::new("recipes.toml")).unwrap()
    }

    #[test]
    fn test_parse_material_formats() {
        assert_eq!(parse_material("minecraft:ender_pearl"), Some("ENDER_PEARL".to_string()));
        assert_eq!(parse_material("DIAMOND"), Some("DIAMOND".to_string()));
        assert_eq!(parse_material("minecraft:"), None);
        assert_eq!(parse_material("not a block"), None);
    }

    #[test]
    fn test_loads_valid_recipe() {
        let book = book(
            r#"
            [shapes]
            TELEPORT = ["EPE", "PNP", "EPE"]

            [items]
            E = "minecraft:ender_pearl"
            P = "purpur_block"
            N = "NETHER_STAR"
            "#,
        );
        let recipe = book.get(GlitchKind::Teleport).unwrap();
        assert_eq!(recipe.shape[1], "PNP");
        assert_eq!(recipe.ingredients[&'E'], "ENDER_PEARL");
        assert_eq!(recipe.ingredients[&'P'], "PURPUR_BLOCK");
        assert_eq!(recipe.output().kind(), Some(GlitchKind::Teleport));
    }

    #[test]
    fn test_skips_bad_shapes_and_kinds() {
        let book = book(
            r#"
            [shapes]
            TELEPORT = ["EE", "EE"]
            IMMUNITY = ["EEEE", "E", "E"]
            NOT_A_GLITCH = ["E", "E", "E"]
            invisibility = ["E E", " E ", "E E"]

            [items]
            E = "minecraft:ender_eye"
            XY = "DIRT"
            "#,
        );
        assert_eq!(book.len(), 1);
        assert!(book.has_recipe(GlitchKind::Invisibility));
        assert!(!book.has_recipe(GlitchKind::Teleport));
        let recipe = book.get(GlitchKind::Invisibility).unwrap();
        assert_eq!(recipe.ingredients.len(), 1);
    }

    #[test]
    fn test_missing_items_table() {
        let book = book("[shapes]\nTELEPORT = [\"E\", \"E\", \"E\"]\n");
        assert!(book.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        assert!(RecipeBook::load(Path::new("/no/such/recipes.toml")).is_empty());
    }
}
