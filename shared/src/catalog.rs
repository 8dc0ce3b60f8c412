//! Glitch catalog shared between client and server.

use serde::{Deserialize, Serialize};

// =============================================================================
// Glitch Kinds
// =============================================================================

/// Every glitch that exists. The set is fixed; entries are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlitchKind {
    Crash,
    Redstone,
    Dream,
    Dupe,
    Inventory,
    Item,
    Herobrine,
    Virus,
    FakeBlock,
    Freeze,
    Effect,
    Immunity,
    Teleport,
    Glide,
    Invisibility,
    Diffuser,
    Morph,
}

impl GlitchKind {
    /// All kinds in catalog order
    pub const ALL: [GlitchKind; 17] = [
        Self::Crash,
        Self::Redstone,
        Self::Dream,
        Self::Dupe,
        Self::Inventory,
        Self::Item,
        Self::Herobrine,
        Self::Virus,
        Self::FakeBlock,
        Self::Freeze,
        Self::Effect,
        Self::Immunity,
        Self::Teleport,
        Self::Glide,
        Self::Invisibility,
        Self::Diffuser,
        Self::Morph,
    ];

    /// Stable key used by commands and recipe files
    pub fn key(&self) -> &'static str {
        match self {
            Self::Crash => "CRASH",
            Self::Redstone => "REDSTONE",
            Self::Dream => "DREAM",
            Self::Dupe => "DUPE",
            Self::Inventory => "INVENTORY",
            Self::Item => "ITEM",
            Self::Herobrine => "HEROBRINE",
            Self::Virus => "VIRUS",
            Self::FakeBlock => "FAKE_BLOCK",
            Self::Freeze => "FREEZE",
            Self::Effect => "EFFECT",
            Self::Immunity => "IMMUNITY",
            Self::Teleport => "TELEPORT",
            Self::Glide => "GLIDE",
            Self::Invisibility => "INVISIBILITY",
            Self::Diffuser => "DIFFUSER",
            Self::Morph => "MORPH",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Crash => "Crash Glitch",
            Self::Redstone => "Redstone Glitch",
            Self::Dream => "Dream Glitch",
            Self::Dupe => "Dupe Glitch",
            Self::Inventory => "Inventory Glitch",
            Self::Item => "Item Glitch",
            Self::Herobrine => "Herobrine Glitch",
            Self::Virus => "Virus Glitch",
            Self::FakeBlock => "Fake Block Glitch",
            Self::Freeze => "Freeze Glitch",
            Self::Effect => "Effect Glitch",
            Self::Immunity => "Immunity Glitch",
            Self::Teleport => "Teleport Glitch",
            Self::Glide => "Glide Glitch",
            Self::Invisibility => "Invisibility Glitch",
            Self::Diffuser => "Diffuser Glitch",
            Self::Morph => "Morph Glitch",
        }
    }

    /// Tooltip text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Crash => "Crashes your opponent for 15s, their game reads 'CONNECTION THROTTLED' everytime they attempt to join Glitch SMP",
            Self::Redstone => "Deactivates all redstone in the world for 30s, has a secret buff nobody knows about currently except for the current owner",
            Self::Dream => "Disguises you as Dream, you have a higher tickrate in mob loot with better luck in their drops",
            Self::Dupe => "Any item in your hand is duped / doubled upon activation. This excludes items such as the dragon egg, glitches, and shulkers.",
            Self::Inventory => "Completely rearranges your inventory, scrambles it messing up your opponents hotbar, no cooldown because it's very sudden",
            Self::Item => "All weapons are deactivated and are turned null (useless). An example is when you're mid fight and the item glitch is activated, you can no longer use your sword for about 30s.",
            Self::Herobrine => "Turn your skin into herobrine, name tag disguised and you have constant speed II. Whenever you take damage there's a chance you summon lightning on all nearby entities",
            Self::Virus => "Covers your screen completely with a virus or green mirage, the only thing visible is your inventory, your hearts and saturation bars are missing when it's activated. It affects any nearby players within a 6 block radius upon activation",
            Self::FakeBlock => "When activated, the block in your hand will be placed on your player's lower half. Basically creating a fake block that you can walk through, perfect for traps and messing with players",
            Self::Freeze => "Freezes a player in place for 30s, they cant use any items in their inventory or pearl away, pure fear as they get crit out losing hearts and barely making it out (most don't). Some say it's the most powerful glitch…",
            Self::Effect => "Amplifies your effects, only t1 pot effects are allowed but this will make it twice as stronger (Ex. Strength 1 -> Strength 2). The timer also stays the same so hypothetically you could have an 8 minute strength 2, it doesn't last for long but it's strong and useful",
            Self::Immunity => "Makes you immune to all damage for 30s",
            Self::Teleport => "Teleports you to the block you look at from 20 blocks max (even air)",
            Self::Glide => "Flying in combat isn't allowed but this glitch token throws you into the sky and allows you to glide away from a fight. Very helpful for those who run out of fireworks. There's no limit to how long the glide lasts, just a long cooldown.",
            Self::Invisibility => "Turns you completely invisible, armour is also invisible along with any item you hold, lasts 30 seconds",
            Self::Diffuser => "Diffuses all glitches for 30s",
            Self::Morph => "Morphs into a selected player, copying their armour trims and skin",
        }
    }

    /// Look up a kind by key, ignoring case (`"fake_block"`, `"IMMUNITY"`)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Look up a kind by its display name.
    ///
    /// Accepts the name with or without the trailing `" Glitch"` and with
    /// `§x` formatting codes still embedded, which is how labels arrive from
    /// item stacks.
    pub fn from_display_name(name: &str) -> Option<Self> {
        let clean = strip_formatting(name);
        let base = clean.trim().trim_end_matches(" Glitch");
        Self::ALL
            .into_iter()
            .find(|kind| kind.display_name().trim_end_matches(" Glitch") == base)
    }
}

impl std::fmt::Display for GlitchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Remove `§x` formatting codes from a label
pub fn strip_formatting(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '§' {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}
