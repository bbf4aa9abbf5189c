use serde::{Deserialize, Serialize};

/// Image picked in the creation form: either a data URL read as text or the
/// raw file bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormImage {
    DataUrl(String),
    Bytes(Vec<u8>),
}

/// Creation form input, keyed by the form's localized field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterForm {
    pub nom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FormImage>,
    pub force: f64,
    pub vitesse: f64,
    pub endurance: f64,
    pub power: f64,
    pub combat: f64,
}

/// Body of `POST /api/characters/`, keyed by the API's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCharacter {
    pub name: String,
    pub strength: f64,
    pub speed: f64,
    pub durability: f64,
    pub power: f64,
    pub combat: f64,
}

/// Maps the form's field names onto the API's. The image is dropped: the
/// characters API has no upload path yet.
impl From<&CharacterForm> for NewCharacter {
    fn from(form: &CharacterForm) -> Self {
        Self {
            name: form.nom.clone(),
            strength: form.force,
            speed: form.vitesse,
            durability: form.endurance,
            power: form.power,
            combat: form.combat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CharacterForm {
        CharacterForm {
            nom: "Vegeta".to_string(),
            image: Some(FormImage::DataUrl("data:image/png;base64,AAAA".to_string())),
            force: 88.0,
            vitesse: 80.0,
            endurance: 75.0,
            power: 92.0,
            combat: 90.0,
        }
    }

    #[test]
    fn maps_localized_form_fields_to_api_names() {
        let payload = NewCharacter::from(&form());
        assert_eq!(payload.name, "Vegeta");
        assert_eq!(payload.strength, 88.0);
        assert_eq!(payload.speed, 80.0);
        assert_eq!(payload.durability, 75.0);
        assert_eq!(payload.power, 92.0);
        assert_eq!(payload.combat, 90.0);
    }

    #[test]
    fn payload_json_has_only_api_field_names() {
        let value = serde_json::to_value(NewCharacter::from(&form())).expect("encode");
        let object = value.as_object().expect("object");
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["combat", "durability", "name", "power", "speed", "strength"]
        );
    }

    #[test]
    fn form_decodes_from_localized_json() {
        let raw = r#"{"nom":"Gohan","image":null,"force":60,"vitesse":65,"endurance":55,"power":70,"combat":68}"#;
        let decoded: CharacterForm = serde_json::from_str(raw).expect("decode");
        assert_eq!(decoded.nom, "Gohan");
        assert!(decoded.image.is_none());
    }
}
