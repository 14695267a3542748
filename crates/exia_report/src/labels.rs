//! Bilingual label tables.

use std::collections::BTreeMap;

use crate::error::{ReportError, Result};
use crate::spec::EnumLanguage;

/// Label keys every table must provide.
pub const TUP_LABEL_KEYS_REQUIRED: [&str; 30] = [
    "playerInfo",
    "playerName",
    "synchro",
    "limitBreak",
    "skill1",
    "skill2",
    "burst",
    "item",
    "t10",
    "elementAdvantage",
    "attack",
    "ammo",
    "chargeSpeed",
    "chargeDamage",
    "critical",
    "criticalDamage",
    "hit",
    "defense",
    "atkElemLbScore",
    "total",
    "head",
    "torso",
    "arm",
    "leg",
    "cube",
    "notFound",
    "outpostLevel",
    "normalProgress",
    "hardProgress",
    "others",
];

const TUP_LABELS_EN: [(&str, &str); 30] = [
    ("playerInfo", "Player Info"),
    ("playerName", "Name"),
    ("synchro", "Synchro"),
    ("limitBreak", "LB"),
    ("skill1", "Skill 1"),
    ("skill2", "Skill 2"),
    ("burst", "Burst"),
    ("item", "Item"),
    ("t10", "T10"),
    ("elementAdvantage", "Elem"),
    ("attack", "Atk"),
    ("ammo", "Ammo"),
    ("chargeSpeed", "Chg Spd"),
    ("chargeDamage", "Chg DMG"),
    ("critical", "Crit%"),
    ("criticalDamage", "Crit DMG"),
    ("hit", "Hit%"),
    ("defense", "Def"),
    ("atkElemLbScore", "AEL"),
    ("total", "Total"),
    ("head", "Head"),
    ("torso", "Torso"),
    ("arm", "Arm"),
    ("leg", "Leg"),
    ("cube", "Cube"),
    ("notFound", "Not Found"),
    ("outpostLevel", "Outpost"),
    ("normalProgress", "Normal"),
    ("hardProgress", "Hard"),
    ("others", "Others"),
];

const TUP_LABELS_ZH: [(&str, &str); 30] = [
    ("playerInfo", "成员信息"),
    ("playerName", "名称"),
    ("synchro", "同步器"),
    ("limitBreak", "突破"),
    ("skill1", "技能1"),
    ("skill2", "技能2"),
    ("burst", "爆裂"),
    ("item", "珍藏品"),
    ("t10", "T10"),
    ("elementAdvantage", "优越"),
    ("attack", "攻击"),
    ("ammo", "弹夹"),
    ("chargeSpeed", "蓄速"),
    ("chargeDamage", "蓄伤"),
    ("critical", "暴击"),
    ("criticalDamage", "暴伤"),
    ("hit", "命中"),
    ("defense", "防御"),
    ("atkElemLbScore", "攻优突破分"),
    ("total", "总和"),
    ("head", "头"),
    ("torso", "身"),
    ("arm", "手"),
    ("leg", "腿"),
    ("cube", "魔方"),
    ("notFound", "未找到"),
    ("outpostLevel", "前哨基地"),
    ("normalProgress", "普通"),
    ("hardProgress", "困难"),
    ("others", "其他"),
];

/// Validated label table for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLanguageLabels {
    pub language: EnumLanguage,
    dict_labels: BTreeMap<String, String>,
}

impl SpecLanguageLabels {
    /// Built-in table for `language`.
    pub fn builtin(language: EnumLanguage) -> Self {
        let tup_src = match language {
            EnumLanguage::En => &TUP_LABELS_EN,
            EnumLanguage::Zh => &TUP_LABELS_ZH,
        };
        Self {
            language,
            dict_labels: tup_src
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Build a table from user-provided labels.
    ///
    /// Empty tables and tables missing a required key are rejected.
    pub fn from_map(language: EnumLanguage, dict_labels: BTreeMap<String, String>) -> Result<Self> {
        if dict_labels.is_empty() {
            return Err(ReportError::InvalidLabels("label table is empty".to_string()));
        }
        let l_missing: Vec<&str> = TUP_LABEL_KEYS_REQUIRED
            .iter()
            .copied()
            .filter(|k| !dict_labels.contains_key(*k))
            .collect();
        if !l_missing.is_empty() {
            return Err(ReportError::InvalidLabels(format!(
                "missing keys: {}",
                l_missing.join(", ")
            )));
        }
        Ok(Self {
            language,
            dict_labels,
        })
    }

    /// Label text for `key`; unknown keys echo back.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.dict_labels.get(key).map(String::as_str).unwrap_or(key)
    }
}
