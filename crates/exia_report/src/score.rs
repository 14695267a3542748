//! Score calculation and equipment aggregation.

use crate::conf::{N_SCORE_TIER_BLACK, N_SCORE_TIER_BLUE, N_SCORE_TIER_YELLOW};
use crate::spec::{EnumItemRarity, EnumStatKind, SpecCharacterEntry, SpecLimitBreak};

/// Base element advantage folded into every score.
const N_ELEM_BASE: f64 = 0.10;

/// Score tiers used for the score cell fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumScoreTier {
    Black,
    Blue,
    Yellow,
    Red,
    None,
}

/// Summed equipment effects of one character, as fractions, in stat order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpecEquipSums {
    pub values: [f64; 9],
}

impl SpecEquipSums {
    /// Summed fraction of one stat kind.
    pub fn get(&self, stat: EnumStatKind) -> f64 {
        self.values[stat.index()]
    }
}

fn coerce_finite(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Attack / element / limit-break efficiency score, unrounded.
///
/// Non-finite `atk` / `elem` count as 0.
pub fn calculate_score_raw(grade: u32, core: u32, atk: f64, elem: f64) -> f64 {
    let atk = coerce_finite(atk);
    let elem = coerce_finite(elem);
    (1.0 + 0.9 * atk)
        * (1.0 + (elem + N_ELEM_BASE))
        * (1.0 + 0.03 * f64::from(grade) + 0.02 * f64::from(core))
}

/// [`calculate_score_raw`] rounded to two decimals for display.
pub fn calculate_score(grade: u32, core: u32, atk: f64, elem: f64) -> f64 {
    round2(calculate_score_raw(grade, core, atk, elem))
}

/// Unrounded score of an entry from its limit break and equipment sums.
///
/// Tiers are picked from this value; only the written cell is rounded.
pub fn calculate_entry_score(limit_break: Option<SpecLimitBreak>, sums: &SpecEquipSums) -> f64 {
    let lb = limit_break.unwrap_or_default();
    calculate_score_raw(
        lb.grade,
        lb.core,
        sums.get(EnumStatKind::StatAtk),
        sums.get(EnumStatKind::IncElementDmg),
    )
}

/// Fill tier of a score.
pub fn derive_score_tier(score: f64) -> EnumScoreTier {
    if score >= N_SCORE_TIER_BLACK {
        EnumScoreTier::Black
    } else if score >= N_SCORE_TIER_BLUE {
        EnumScoreTier::Blue
    } else if score >= N_SCORE_TIER_YELLOW {
        EnumScoreTier::Yellow
    } else if score > 0.0 {
        EnumScoreTier::Red
    } else {
        EnumScoreTier::None
    }
}

/// Sum every equipment effect of all four slots.
pub fn derive_equip_sums(entry: &SpecCharacterEntry) -> SpecEquipSums {
    let mut sums = SpecEquipSums::default();
    for effect in entry.equipments.iter().flatten() {
        sums.values[effect.stat.index()] += effect.fraction();
    }
    sums
}

/// `true` when the entry carries no progression or gear data at all.
pub fn is_unowned(entry: &SpecCharacterEntry) -> bool {
    let if_has_lb = entry
        .limit_break
        .is_some_and(|lb| lb.grade > 0 || lb.core > 0);
    let if_has_skill = [entry.skill1_level, entry.skill2_level, entry.burst_level]
        .iter()
        .any(|lvl| lvl.is_some_and(|n| n > 0));
    let if_has_item = entry.item_rarity != EnumItemRarity::None;
    let if_has_equip = entry.equipments.iter().any(|slot| !slot.is_empty());
    !(if_has_lb || if_has_skill || if_has_item || if_has_equip)
}

/// Display text of a limit break.
pub fn derive_limit_break_str(limit_break: SpecLimitBreak) -> String {
    let SpecLimitBreak { grade, core } = limit_break;
    match grade {
        0..=2 => format!("{grade} ★"),
        3 if core >= 7 => "MAX".to_string(),
        3 if core > 0 => format!("+{core}"),
        3 => format!("{grade} ★"),
        _ => "MAX".to_string(),
    }
}

/// Display text of a favorite item level; SSR items count from 1.
pub fn derive_item_level_str(rarity: EnumItemRarity, level: Option<u32>) -> String {
    match (rarity, level) {
        (EnumItemRarity::None, _) | (_, None) => String::new(),
        (EnumItemRarity::SSR, Some(n)) => format!("{}★", n + 1),
        (_, Some(n)) => n.to_string(),
    }
}
