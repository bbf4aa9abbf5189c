//! Presentational mapping from view state to cards, stat bars and screens.

use std::fmt;

use shared::domain::{Character, CharacterId, StatKind};

use crate::{
    controller::{CollectionSnapshot, LoadPhase},
    session::Session,
};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
pub const STAT_BAR_WIDTH: usize = 20;

/// Percentage of a bar to fill for a stat value; always within `0..=100`.
pub fn fill_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

pub fn render_bar(value: f64, width: usize) -> String {
    let filled = ((fill_percent(value) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat('█').take(filled));
    bar.extend(std::iter::repeat('░').take(width - filled));
    bar
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub label: &'static str,
    /// Value as received, shown next to the bar.
    pub value: f64,
    pub fill_percent: f64,
}

pub fn stat_lines(character: &Character) -> Vec<StatLine> {
    StatKind::ALL
        .iter()
        .map(|kind| {
            let value = character.stat(*kind);
            StatLine {
                label: kind.label(),
                value,
                fill_percent: fill_percent(value),
            }
        })
        .collect()
}

pub fn edit_route(id: CharacterId) -> String {
    format!("/modification/{id}")
}

/// Full avatar URL: the API origin followed by the record's image path.
pub fn avatar_url(api_origin: &str, image_path: &str) -> String {
    let image_path = image_path.trim();
    if image_path.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }
    let origin = api_origin.trim_end_matches('/');
    if image_path.starts_with('/') {
        format!("{origin}{image_path}")
    } else {
        format!("{origin}/{image_path}")
    }
}

/// Avatar fallback text: the first two characters of the name, uppercased.
pub fn initials(name: &str) -> String {
    name.trim().chars().take(2).collect::<String>().to_uppercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterCard {
    pub id: CharacterId,
    pub name: String,
    pub initials: String,
    pub avatar_url: String,
    pub stats: Vec<StatLine>,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl CharacterCard {
    pub fn new(character: &Character, session: &Session, api_origin: &str) -> Self {
        let authenticated = session.is_authenticated();
        Self {
            id: character.id,
            name: character.name.clone(),
            initials: initials(&character.name),
            avatar_url: avatar_url(api_origin, &character.image_path),
            stats: stat_lines(character),
            can_edit: authenticated,
            can_delete: authenticated,
        }
    }
}

impl fmt::Display for CharacterCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{} {} [{}]", self.id, self.name, self.initials)?;
        writeln!(f, "    {}", self.avatar_url)?;
        for stat in &self.stats {
            writeln!(
                f,
                "    {:<10} {:>5} {}",
                stat.label,
                stat.value,
                render_bar(stat.value, STAT_BAR_WIDTH)
            )?;
        }
        let mut actions = Vec::new();
        if self.can_edit {
            actions.push(format!("edit {}", self.id));
        }
        if self.can_delete {
            actions.push(format!("delete {}", self.id));
        }
        if !actions.is_empty() {
            writeln!(f, "    actions: {}", actions.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Failed { message: String, can_retry: bool },
    Empty { invite_to_create: bool },
    Cards(Vec<CharacterCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub show_create_button: bool,
    pub notice: Option<String>,
    pub screen: Screen,
}

pub fn render_view(
    snapshot: &CollectionSnapshot,
    session: &Session,
    api_origin: &str,
) -> CollectionView {
    let authenticated = session.is_authenticated();
    let screen = match snapshot.phase {
        LoadPhase::Idle | LoadPhase::Loading => Screen::Loading,
        LoadPhase::Errored => Screen::Failed {
            message: snapshot
                .error
                .clone()
                .unwrap_or_else(|| "Failed to retrieve characters.".to_string()),
            can_retry: snapshot.can_retry,
        },
        LoadPhase::Loaded if snapshot.characters.is_empty() => Screen::Empty {
            invite_to_create: authenticated,
        },
        LoadPhase::Loaded => Screen::Cards(
            snapshot
                .characters
                .iter()
                .map(|character| CharacterCard::new(character, session, api_origin))
                .collect(),
        ),
    };

    CollectionView {
        show_create_button: authenticated,
        notice: snapshot.action_error.clone(),
        screen,
    }
}

impl fmt::Display for CollectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The Fighters")?;
        if self.show_create_button {
            writeln!(f, "(create a new fighter with `create`)")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        match &self.screen {
            Screen::Loading => writeln!(f, "Loading...")?,
            Screen::Failed { message, can_retry } => {
                writeln!(f, "{message}")?;
                if *can_retry {
                    writeln!(f, "Run `list` again to retry.")?;
                }
            }
            Screen::Empty { invite_to_create } => {
                writeln!(f, "No characters available.")?;
                if *invite_to_create {
                    writeln!(f, "Create your first fighter to get started!")?;
                }
            }
            Screen::Cards(cards) => {
                for card in cards {
                    writeln!(f)?;
                    write!(f, "{card}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
