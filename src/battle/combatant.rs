//! Combat stats and the capability to be attacked

use serde::{Deserialize, Serialize};

/// Hit points and fighting numbers shared by units and structures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub current_hp: f32,
    pub max_hp: f32,
    pub attack: f32,
    pub defense: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            current_hp: 10.0,
            max_hp: 10.0,
            attack: 1.0,
            defense: 2.0,
        }
    }
}

impl CombatStats {
    /// Fresh stats at full health
    pub fn new(max_hp: f32, attack: f32, defense: f32) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            attack,
            defense,
        }
    }

    /// Remaining health in [0, 1]
    pub fn health_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.current_hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Attack degrades as the fighter weakens
    pub fn effective_attack(&self) -> f32 {
        self.attack * self.health_fraction()
    }

    pub fn is_destroyed(&self) -> bool {
        self.current_hp <= 0.0
    }

    /// Subtract hit points lost in an exchange
    pub fn lose_hp(&mut self, amount: f32) {
        self.current_hp = (self.current_hp - amount).min(self.max_hp);
    }

    /// Pull values back into a consistent range after loading
    pub fn sanitized(mut self) -> Self {
        self.max_hp = self.max_hp.max(0.0);
        self.attack = self.attack.max(0.0);
        self.defense = self.defense.max(0.0);
        self.current_hp = self.current_hp.clamp(0.0, self.max_hp);
        self
    }
}

/// Anything that can take part in a battle
pub trait Attackable {
    fn stats(&self) -> &CombatStats;

    fn stats_mut(&mut self) -> &mut CombatStats;

    /// Structures fight from a distance and carry no in-battle flag
    fn is_structure(&self) -> bool;

    /// Sprite key shown inside a combat cloud
    fn fight_sprite(&self) -> &'static str;
}
