use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use crate::types::Tint;

/// How a character's model file is decoded. Fixed per variant in the profile
/// table; loaders never sniff the URL to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFormat {
    /// Single triangle mesh without materials (STL).
    Mesh,
    /// Scene graph with meshes and materials (binary glTF).
    Scene,
}

/// Playable character variants.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterVariant {
    #[default]
    FanFan,
    Rabbit,
    Tako,
}

/// Static per-variant rig configuration. Looked up, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterProfile {
    pub variant: CharacterVariant,
    /// Uniform visual scale applied after load.
    pub scale: f32,
    /// Extra height above the player's ground line.
    pub vertical_offset: f32,
    /// Base orientation as XYZ Euler angles (radians).
    pub base_rotation: Vec3,
    pub tint: Tint,
    /// Asset path relative to the model root.
    pub model_path: &'static str,
    pub format: ModelFormat,
}

const PROFILES: [CharacterProfile; 3] = [
    CharacterProfile {
        variant: CharacterVariant::FanFan,
        scale: 0.8,
        vertical_offset: 0.4,
        base_rotation: Vec3::new(-FRAC_PI_2, 0.0, FRAC_PI_2),
        tint: Tint(0xec4899),
        model_path: "models/FanFan.stl",
        format: ModelFormat::Mesh,
    },
    CharacterProfile {
        variant: CharacterVariant::Rabbit,
        scale: 0.3,
        vertical_offset: 0.5,
        base_rotation: Vec3::new(-FRAC_PI_2, 0.0, FRAC_PI_2),
        tint: Tint(0x8b5cf6),
        model_path: "models/Rabbit.stl",
        format: ModelFormat::Mesh,
    },
    CharacterProfile {
        variant: CharacterVariant::Tako,
        scale: 0.8,
        vertical_offset: 0.4,
        base_rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
        tint: Tint(0x10b981),
        model_path: "models/Tako.glb",
        format: ModelFormat::Scene,
    },
];

impl CharacterVariant {
    /// All variants in selection order.
    pub const ALL: &'static [CharacterVariant] = &[
        CharacterVariant::FanFan,
        CharacterVariant::Rabbit,
        CharacterVariant::Tako,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::FanFan => "FanFan",
            Self::Rabbit => "Rabbit",
            Self::Tako => "Tako",
        }
    }

    pub fn profile(self) -> &'static CharacterProfile {
        match self {
            Self::FanFan => &PROFILES[0],
            Self::Rabbit => &PROFILES[1],
            Self::Tako => &PROFILES[2],
        }
    }
}

impl std::fmt::Display for CharacterVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown character variant: {0}")]
pub struct UnknownVariant(pub String);

impl std::str::FromStr for CharacterVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
