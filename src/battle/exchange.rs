//! One round of blows between two combatants
//!
//! Both damages are rolled from the stats as they were before the round, so
//! neither side strikes first.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::combatant::CombatStats;
use crate::core::config::BattleConfig;
use crate::net::Authority;

/// Hit points each side loses in one exchange (never negative)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub damage_to_a: f32,
    pub damage_to_b: f32,
}

/// Roll the damage `attack` deals against a fighter with `defense`
fn roll_damage<R: Rng>(effective_attack: f32, defense: f32, config: &BattleConfig, rng: &mut R) -> f32 {
    let low = config.roll_low * effective_attack;
    let high = config.roll_high * effective_attack;
    let roll = if high > low { rng.gen_range(low..high) } else { low };
    (roll - defense).max(0.0)
}

/// Compute one exchange. Requires combat authority.
pub fn compute_exchange<R: Rng>(
    _authority: &Authority,
    a: &CombatStats,
    b: &CombatStats,
    config: &BattleConfig,
    rng: &mut R,
) -> Exchange {
    let attack_a = a.effective_attack();
    let attack_b = b.effective_attack();

    Exchange {
        damage_to_a: roll_damage(attack_b, a.defense, config, rng),
        damage_to_b: roll_damage(attack_a, b.defense, config, rng),
    }
}

/// Apply an exchange to both sides at once
pub fn apply_exchange(exchange: &Exchange, a: &mut CombatStats, b: &mut CombatStats) {
    a.lose_hp(exchange.damage_to_a);
    b.lose_hp(exchange.damage_to_b);
}
