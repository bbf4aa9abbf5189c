use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CharacterId);

/// A fighter record as served by the characters API.
///
/// Stats are expected in the 0-100 range but are kept exactly as received;
/// clamping is a rendering concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub image_path: String,
    pub strength: f64,
    pub speed: f64,
    pub durability: f64,
    pub power: f64,
    pub combat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Strength,
    Speed,
    Durability,
    Power,
    Combat,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Strength,
        StatKind::Speed,
        StatKind::Durability,
        StatKind::Power,
        StatKind::Combat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatKind::Strength => "Strength",
            StatKind::Speed => "Speed",
            StatKind::Durability => "Durability",
            StatKind::Power => "Power",
            StatKind::Combat => "Combat",
        }
    }
}

impl Character {
    pub fn stat(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Speed => self.speed,
            StatKind::Durability => self.durability,
            StatKind::Power => self.power,
            StatKind::Combat => self.combat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_wire_record() {
        let raw = r#"{"id":4,"name":"Goku","imagePath":"/uploads/goku.png","strength":90,"speed":85.5,"durability":70,"power":100,"combat":95}"#;
        let character: Character = serde_json::from_str(raw).expect("decode");
        assert_eq!(character.id, CharacterId(4));
        assert_eq!(character.image_path, "/uploads/goku.png");
        assert_eq!(character.stat(StatKind::Speed), 85.5);
    }

    #[test]
    fn missing_image_path_decodes_as_empty() {
        let raw = r#"{"id":1,"name":"Krillin","strength":1,"speed":2,"durability":3,"power":4,"combat":5}"#;
        let character: Character = serde_json::from_str(raw).expect("decode");
        assert!(character.image_path.is_empty());
    }

    #[test]
    fn out_of_range_stats_are_kept_verbatim() {
        let raw = r#"{"id":2,"name":"Broly","imagePath":"","strength":150,"speed":-5,"durability":0,"power":0,"combat":0}"#;
        let character: Character = serde_json::from_str(raw).expect("decode");
        assert_eq!(character.strength, 150.0);
        assert_eq!(character.speed, -5.0);
    }
}
