//! Read-only queries for whoever draws the world
//!
//! Nothing here changes state; the display layer maps image keys to its own
//! textures.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Owner, PlayerId};
use crate::objects::ObjectKind;
use crate::units::UnitVariant;
use crate::world::World;

/// Portrait shown for a selected entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayImage {
    WarriorHealthy,
    WarriorDamaged,
    WarriorDying,
    Gatherer,
    Queen,
    Worker,
    Anthill,
    AnthillRuin,
    Food,
    Scentpath,
    FoodSpawner,
}

impl DisplayImage {
    /// Texture key, before the owning player's colour is applied
    pub fn key(&self) -> &'static str {
        match self {
            DisplayImage::WarriorHealthy => "warriorDisplayHealthy",
            DisplayImage::WarriorDamaged => "warriorDisplayDamaged",
            DisplayImage::WarriorDying => "warriorDisplayDying",
            DisplayImage::Gatherer => "gathererDisplay",
            DisplayImage::Queen => "queenDisplay",
            DisplayImage::Worker => "workerDisplay",
            DisplayImage::Anthill => "anthillDisplay",
            DisplayImage::AnthillRuin => "anthillRuinDisplay",
            DisplayImage::Food => "foodDisplay",
            DisplayImage::Scentpath => "scentpathDisplay",
            DisplayImage::FoodSpawner => "spawnerDisplay",
        }
    }

    /// Warrior portrait for the given health fraction
    pub fn warrior(health: f32) -> Self {
        if health <= 0.33 {
            DisplayImage::WarriorDying
        } else if health <= 0.66 {
            DisplayImage::WarriorDamaged
        } else {
            DisplayImage::WarriorHealthy
        }
    }
}

fn unit_description(variant: UnitVariant, friendly: bool) -> Option<&'static str> {
    let text = match (variant, friendly) {
        (UnitVariant::Warrior, true) => "A good offensive unit that is able to attack enemy ants and anthills.",
        (UnitVariant::Warrior, false) => {
            "Danger! This ant can kill your ants and destroy your anthill, attack it before it attacks you!"
        }
        (UnitVariant::Gatherer, true) => "Able to pick up fruit and carry it back to your Anthill.",
        (UnitVariant::Gatherer, false) => "Helps your enemy's colony grow larger if it can find food!",
        (UnitVariant::Queen, true) => "The Queen can be used to create one new Anthill on top of old Anthill ruins!",
        (UnitVariant::Queen, false) => {
            "Oh no!  The enemy's Queen is trying to build a new Anthill for them, stop her!"
        }
        (UnitVariant::Worker, _) => return None,
    };
    Some(text)
}

impl World {
    pub fn display_image(&self, id: EntityId) -> Option<DisplayImage> {
        if let Some(unit) = self.board.unit(id) {
            return Some(match unit.variant() {
                UnitVariant::Warrior => DisplayImage::warrior(unit.stats.health_fraction()),
                UnitVariant::Gatherer => DisplayImage::Gatherer,
                UnitVariant::Queen => DisplayImage::Queen,
                UnitVariant::Worker => DisplayImage::Worker,
            });
        }

        let object = self.board.objects.get(id)?;
        Some(match object.kind {
            ObjectKind::Food { .. } => DisplayImage::Food,
            ObjectKind::Scentpath => DisplayImage::Scentpath,
            ObjectKind::Anthill(_) => DisplayImage::Anthill,
            ObjectKind::AnthillRuin => DisplayImage::AnthillRuin,
            ObjectKind::FoodSpawner { .. } => DisplayImage::FoodSpawner,
        })
    }

    /// Status text for `id` as seen by `viewer`
    pub fn description(&self, id: EntityId, viewer: PlayerId) -> Option<&str> {
        if let Some(unit) = self.board.unit(id) {
            return unit_description(unit.variant(), unit.owner.is_neutral_or_friendly(viewer));
        }

        match &self.board.objects.get(id)?.kind {
            ObjectKind::FoodSpawner { description, .. } => Some(description.as_str()),
            _ => None,
        }
    }

    pub fn name(&self, id: EntityId) -> Option<&str> {
        if let Some(unit) = self.board.unit(id) {
            return Some(unit.variant().name());
        }

        let object = self.board.objects.get(id)?;
        Some(match &object.kind {
            ObjectKind::Food { .. } => "Food",
            ObjectKind::Scentpath => "Scent Path",
            ObjectKind::Anthill(_) => "Anthill",
            ObjectKind::AnthillRuin => "Anthill Ruins",
            ObjectKind::FoodSpawner { name, .. } => name.as_str(),
        })
    }

    /// Owner of a unit or object, for tinting its portrait
    pub fn owner_of(&self, id: EntityId) -> Option<Owner> {
        self.board
            .unit(id)
            .map(|u| u.owner)
            .or_else(|| self.board.objects.get(id).map(|o| o.owner))
    }
}
