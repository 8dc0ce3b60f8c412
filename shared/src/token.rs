//! Glitch tokens: the item stacks that grant a glitch when used.

use serde::{Deserialize, Serialize};
use crate::catalog::GlitchKind;

/// Material marker every glitch token carries
pub const TOKEN_MATERIAL: &str = "NETHER_STAR";

/// Label formatting prefix (light purple)
const LABEL_PREFIX: &str = "§d";

/// An item stack that can be consumed to obtain a glitch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlitchToken {
    pub material: String,
    /// Display label, may contain `§x` formatting codes
    pub label: String,
    pub lore: Vec<String>,
    pub count: u32,
}

impl GlitchToken {
    /// Build a single token granting `kind`
    pub fn for_kind(kind: GlitchKind) -> Self {
        Self {
            material: TOKEN_MATERIAL.into(),
            label: format!("{}{}", LABEL_PREFIX, kind.display_name()),
            lore: vec![
                format!("§7{}", kind.description()),
                String::new(),
                "§eRight-click to equip this glitch".into(),
                "§eUse /glitch list to see your glitches".into(),
            ],
            count: 1,
        }
    }

    /// Whether this stack looks like a glitch token at all
    pub fn is_glitch_token(&self) -> bool {
        self.material == TOKEN_MATERIAL && self.label.contains("Glitch")
    }

    /// The glitch this token grants, if the label names a known one
    pub fn kind(&self) -> Option<GlitchKind> {
        if !self.is_glitch_token() {
            return None;
        }
        GlitchKind::from_display_name(&self.label)
    }

    /// Consume one token from the stack. Returns false when the stack is empty.
    pub fn consume_one(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_resolves_kind() {
        let token = GlitchToken::for_kind(GlitchKind::Invisibility);
        assert!(token.is_glitch_token());
        assert_eq!(token.kind(), Some(GlitchKind::Invisibility));
    }

    #[test]
    fn test_wrong_material_is_not_a_token() {
        let mut token = GlitchToken::for_kind(GlitchKind::Immunity);
        token.material = "DIAMOND".into();
        assert!(!token.is_glitch_token());
        assert_eq!(token.kind(), None);
    }

    #[test]
    fn test_unknown_label() {
        let mut token = GlitchToken::for_kind(GlitchKind::Immunity);
        token.label = "§dMystery Glitch".into();
        assert!(token.is_glitch_token());
        assert_eq!(token.kind(), None);
    }

    #[test]
    fn test_consume_one() {
        let mut token = GlitchToken::for_kind(GlitchKind::Teleport);
        token.count = 2;
        assert!(token.consume_one());
        assert!(token.consume_one());
        assert!(!token.consume_one());
        assert_eq!(token.count, 0);
    }
}
