//! Character creation flow.
//!
//! The form's localized fields are mapped to the API's names and the mapped
//! payload is what gets posted. The form image is not uploaded.

use shared::{
    domain::Character,
    protocol::{CharacterForm, NewCharacter},
};
use tracing::{info, warn};

use crate::{error::ClientError, session::Session, CharacterApi};

/// Posts `form` as a new character.
///
/// Token presence is not checked here: an anonymous submit goes out without
/// an `Authorization` header and the server's rejection is returned.
pub async fn submit_character<A>(
    api: &A,
    session: &Session,
    form: &CharacterForm,
) -> Result<Character, ClientError>
where
    A: CharacterApi + ?Sized,
{
    if form.image.is_some() {
        warn!(name = %form.nom, "character image is not uploaded; sending name and stats only");
    }

    let payload = NewCharacter::from(form);
    match api.create_character(&payload, session.token()).await {
        Ok(created) => {
            info!(character_id = %created.id, name = %created.name, "character created");
            Ok(created)
        }
        Err(err) => {
            warn!(name = %payload.name, error = %err, "failed to create character");
            Err(err)
        }
    }
}
