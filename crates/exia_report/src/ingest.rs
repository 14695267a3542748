//! Dataset ingestion from upstream JSON.
//!
//! Normalizes legacy shapes (integer limit break, sentinel-marked
//! `showStats` arrays) so the renderer only ever sees one form. Each
//! character field decodes independently; a broken field renders blank
//! and leaves a warning.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::conf::N_EQUIP_SLOTS;
use crate::error::{ReportError, Result};
use crate::spec::{
    EnumElement, EnumItemRarity, EnumPriority, EnumStatKind, SpecCharacterDataset,
    SpecCharacterEntry, SpecCubeEntry, SpecDatasetOptions, SpecEquipEffect, SpecLimitBreak,
    SpecShowStats,
};

/// Marker inside a `showStats` array meaning the user configured it.
pub const C_SHOW_STATS_CONFIGURED: &str = "__showStatsConfigured";

////////////////////////////////////////////////////////////////////////////////
// #region RawShapes

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    synchro_level: Value,
    #[serde(default)]
    outpost_level: Value,
    #[serde(default)]
    normal_progress: Value,
    #[serde(default)]
    hard_progress: Value,
    #[serde(default)]
    elements: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    cubes: Option<Vec<Value>>,
    #[serde(default)]
    options: Option<RawDatasetOptions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatasetOptions {
    #[serde(default)]
    show_equip_details: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLimitBreak {
    Legacy(i64),
    Staged {
        #[serde(default)]
        grade: i64,
        #[serde(default)]
        core: i64,
    },
}

#[derive(Debug, Deserialize)]
struct RawEquipEffect {
    function_type: String,
    function_value: f64,
    #[serde(default)]
    level: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Number(u32),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawCubeEntry {
    #[serde(default)]
    cube_id: Value,
    #[serde(default)]
    name_cn: Option<String>,
    #[serde(default)]
    name_en: Option<String>,
    #[serde(default)]
    cube_level: Option<u32>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Normalization

fn convert_json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_json_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Map a legacy integer limit break onto `{grade, core}`.
pub fn normalize_legacy_limit_break(n: i64) -> Option<SpecLimitBreak> {
    match n {
        i64::MIN..=0 => None,
        1..=3 => Some(SpecLimitBreak {
            grade: n as u32,
            core: 0,
        }),
        4..=9 => Some(SpecLimitBreak {
            grade: 3,
            core: (n - 3) as u32,
        }),
        _ => Some(SpecLimitBreak { grade: 3, core: 7 }),
    }
}

fn normalize_limit_break(raw: RawLimitBreak) -> Option<SpecLimitBreak> {
    match raw {
        RawLimitBreak::Legacy(n) => normalize_legacy_limit_break(n),
        RawLimitBreak::Staged { grade, core } if grade >= 0 => Some(SpecLimitBreak {
            grade: u32::try_from(grade).unwrap_or(u32::MAX),
            core: u32::try_from(core.max(0)).unwrap_or(u32::MAX),
        }),
        RawLimitBreak::Staged { .. } => None,
    }
}

/// Split a raw `showStats` array into the marker flag and real keys.
pub fn normalize_show_stats(l_raw: &[Value]) -> SpecShowStats {
    let configured = l_raw
        .iter()
        .any(|v| v.as_str() == Some(C_SHOW_STATS_CONFIGURED));
    let keys: BTreeSet<String> = l_raw
        .iter()
        .filter_map(Value::as_str)
        .filter(|k| !k.starts_with("__"))
        .map(str::to_string)
        .collect();
    SpecShowStats { configured, keys }
}

/// Decode one optional field; a type mismatch blanks only that field.
fn decode_field<T>(
    value: &Value,
    key: &str,
    c_entry_id: &str,
    l_warnings: &mut Vec<String>,
) -> Option<T>
where
    T: DeserializeOwned,
{
    let value_field = value.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value_field) {
        Ok(v) => Some(v),
        Err(err) => {
            l_warnings.push(format!(
                "Character `{c_entry_id}`: field `{key}` is malformed and renders blank ({err})."
            ));
            None
        }
    }
}

fn normalize_effects(
    value_slot: &Value,
    c_entry_id: &str,
    l_warnings: &mut Vec<String>,
) -> Vec<SpecEquipEffect> {
    let Some(l_values) = value_slot.as_array() else {
        if !value_slot.is_null() {
            l_warnings.push(format!(
                "Character `{c_entry_id}`: equipment slot is not a list and renders blank."
            ));
        }
        return Vec::new();
    };

    let mut l_effects = Vec::with_capacity(l_values.len());
    for value_effect in l_values {
        let raw = match RawEquipEffect::deserialize(value_effect) {
            Ok(raw) => raw,
            Err(err) => {
                l_warnings.push(format!(
                    "Character `{c_entry_id}`: malformed equipment effect ignored ({err})."
                ));
                continue;
            }
        };
        match EnumStatKind::from_key(&raw.function_type) {
            Some(stat) => l_effects.push(SpecEquipEffect {
                stat,
                function_value: raw.function_value.round() as i64,
                level: raw.level.unwrap_or(0),
            }),
            None => l_warnings.push(format!(
                "Character `{c_entry_id}`: unknown equipment effect `{}` ignored.",
                raw.function_type
            )),
        }
    }
    l_effects
}

fn normalize_equipments(
    value_equip: &Value,
    c_entry_id: &str,
    l_warnings: &mut Vec<String>,
) -> [Vec<SpecEquipEffect>; 4] {
    let mut l_slots: [Vec<SpecEquipEffect>; 4] = Default::default();
    let l_pairs: Vec<(usize, &Value)> = match value_equip {
        Value::Null => Vec::new(),
        Value::Array(l_raw) => l_raw.iter().enumerate().collect(),
        Value::Object(dict_raw) => {
            let mut l_pairs = Vec::new();
            for (c_key, value_slot) in dict_raw {
                match c_key.trim().parse::<usize>() {
                    Ok(idx) => l_pairs.push((idx, value_slot)),
                    Err(_) => l_warnings.push(format!(
                        "Character `{c_entry_id}`: equipment slot `{c_key}` ignored."
                    )),
                }
            }
            l_pairs
        }
        _ => {
            l_warnings.push(format!(
                "Character `{c_entry_id}`: field `equipments` is malformed and renders blank."
            ));
            Vec::new()
        }
    };

    for (idx, value_slot) in l_pairs {
        if idx >= N_EQUIP_SLOTS as usize {
            if !value_slot.is_null() {
                l_warnings.push(format!(
                    "Character `{c_entry_id}`: equipment slot {idx} out of range."
                ));
            }
            continue;
        }
        l_slots[idx] = normalize_effects(value_slot, c_entry_id, l_warnings);
    }
    l_slots
}

/// Decode one character entry; never fails.
///
/// Fields decode independently: a malformed field renders blank and the
/// rest of the entry is kept.
pub fn ingest_character_entry(value: &Value, l_warnings: &mut Vec<String>) -> SpecCharacterEntry {
    let derive_text = |key: &str| value.get(key).and_then(convert_json_text);
    let c_id = derive_text("id").unwrap_or_default();
    if !value.is_object() {
        l_warnings.push(format!(
            "Character entry is not an object and renders blank: {value}"
        ));
        return SpecCharacterEntry::default();
    }

    let limit_break = decode_field::<RawLimitBreak>(value, "limit_break", &c_id, l_warnings)
        .and_then(normalize_limit_break);
    let skill1_level = decode_field::<u32>(value, "skill1_level", &c_id, l_warnings);
    let skill2_level = decode_field::<u32>(value, "skill2_level", &c_id, l_warnings);
    let burst_level = decode_field::<u32>(value, "skill_burst_level", &c_id, l_warnings);
    let item_rarity = decode_field::<String>(value, "item_rare", &c_id, l_warnings)
        .as_deref()
        .map(EnumItemRarity::from_key)
        .unwrap_or_default();
    let item_level = match decode_field::<RawLevel>(value, "item_level", &c_id, l_warnings) {
        Some(RawLevel::Number(n)) => Some(n),
        Some(RawLevel::Text(s)) => s.trim().parse().ok(),
        None => None,
    };
    let priority = decode_field::<String>(value, "priority", &c_id, l_warnings)
        .as_deref()
        .map(EnumPriority::from_key)
        .unwrap_or_default();
    let show_stats = decode_field::<Vec<Value>>(value, "showStats", &c_id, l_warnings)
        .as_deref()
        .map(normalize_show_stats);
    let equipments = match value.get("equipments") {
        Some(value_equip) => normalize_equipments(value_equip, &c_id, l_warnings),
        None => Default::default(),
    };
    let resource_id = value
        .get("resource_id")
        .or_else(|| value.get("resourceId"))
        .and_then(convert_json_text)
        .filter(|rid| !rid.is_empty());

    SpecCharacterEntry {
        name_en: derive_text("name_en"),
        name_cn: derive_text("name_cn"),
        priority,
        limit_break,
        skill1_level,
        skill2_level,
        burst_level,
        item_rarity,
        item_level,
        equipments,
        show_stats,
        resource_id,
        id: c_id,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Dataset

/// Decode a dataset from a JSON value.
///
/// Returns the dataset plus recovered warnings. A dataset without an
/// `elements` map is rejected.
pub fn ingest_dataset_value(value: Value) -> Result<(SpecCharacterDataset, Vec<String>)> {
    let raw = RawDataset::deserialize(&value)
        .map_err(|err| ReportError::InvalidDataset(err.to_string()))?;
    let c_name = convert_json_text(&raw.name).unwrap_or_default();
    let Some(dict_elements_raw) = raw.elements else {
        return Err(ReportError::MissingElements(c_name));
    };

    let mut l_warnings = Vec::new();
    let mut dict_elements = BTreeMap::new();
    for (c_key, value_chars) in dict_elements_raw {
        let Some(element) = EnumElement::from_key(&c_key) else {
            l_warnings.push(format!("Unknown element `{c_key}` ignored."));
            continue;
        };
        let l_entries = match value_chars {
            Value::Array(l_values) => l_values
                .iter()
                .map(|v| ingest_character_entry(v, &mut l_warnings))
                .collect(),
            Value::Null => Vec::new(),
            _ => {
                l_warnings.push(format!("Element `{c_key}` is not a list and renders empty."));
                Vec::new()
            }
        };
        dict_elements.insert(element, l_entries);
    }

    let mut l_cubes = Vec::new();
    for value_cube in raw.cubes.unwrap_or_default() {
        match RawCubeEntry::deserialize(&value_cube) {
            Ok(cube) => l_cubes.push(SpecCubeEntry {
                cube_id: convert_json_text(&cube.cube_id).unwrap_or_default(),
                name_en: cube.name_en,
                name_cn: cube.name_cn,
                level: cube.cube_level.unwrap_or(0),
            }),
            Err(err) => l_warnings.push(format!("Malformed cube skipped: {err}")),
        }
    }

    let dataset = SpecCharacterDataset {
        name: c_name,
        synchro_level: convert_json_u32(&raw.synchro_level).unwrap_or(0),
        outpost_level: convert_json_u32(&raw.outpost_level).unwrap_or(0),
        normal_progress: convert_json_text(&raw.normal_progress).unwrap_or_default(),
        hard_progress: convert_json_text(&raw.hard_progress).unwrap_or_default(),
        elements: Some(dict_elements),
        cubes: l_cubes,
        options: SpecDatasetOptions {
            show_equip_details: raw.options.unwrap_or_default().show_equip_details,
        },
    };
    Ok((dataset, l_warnings))
}

/// Decode a dataset from JSON text.
pub fn ingest_dataset_json(text: &str) -> Result<(SpecCharacterDataset, Vec<String>)> {
    let value: Value = serde_json::from_str(text)?;
    ingest_dataset_value(value)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_limit_break_mapping() {
        assert_eq!(normalize_legacy_limit_break(0), None);
        assert_eq!(normalize_legacy_limit_break(-2), None);
        assert_eq!(
            normalize_legacy_limit_break(2),
            Some(SpecLimitBreak { grade: 2, core: 0 })
        );
        assert_eq!(
            normalize_legacy_limit_break(5),
            Some(SpecLimitBreak { grade: 3, core: 2 })
        );
        assert_eq!(
            normalize_legacy_limit_break(10),
            Some(SpecLimitBreak { grade: 3, core: 7 })
        );
    }

    #[test]
    fn test_show_stats_marker() {
        let ss = normalize_show_stats(&[json!("__showStatsConfigured")]);
        assert!(ss.configured);
        assert!(ss.keys.is_empty());

        let ss = normalize_show_stats(&[json!("StatAtk"), json!("__other"), json!(3)]);
        assert!(!ss.configured);
        assert_eq!(ss.keys.iter().collect::<Vec<_>>(), vec!["StatAtk"]);
    }

    #[test]
    fn test_ingest_dataset() {
        let value = json!({
            "name": "Alice",
            "synchroLevel": 400,
            "outpostLevel": "80",
            "normalProgress": "30-10",
            "hardProgress": "",
            "elements": {
                "Fire": [
                    {
                        "id": 10,
                        "name_en": "Red Hood",
                        "priority": "black",
                        "limit_break": 7,
                        "skill1_level": 10,
                        "item_rare": "SSR",
                        "item_level": 2,
                        "equipments": {"0": [
                            {"function_type": "StatAtk", "function_value": 500, "level": 11},
                            {"function_type": "StatMystery", "function_value": 1, "level": 1}
                        ]},
                        "showStats": ["__showStatsConfigured", "StatAtk"]
                    },
                    {
                        "id": 11,
                        "name_en": "Partly Broken",
                        "skill1_level": "high",
                        "skill2_level": 7,
                        "limit_break": {"grade": 3, "core": 4},
                        "equipments": {"0": [
                            {"function_type": "StatAtk", "function_value": 500, "level": 3}
                        ]}
                    }
                ],
                "Aether": []
            },
            "cubes": [{"cube_id": 1, "name_en": "Assault", "cube_level": 0}],
            "options": {"showEquipDetails": false}
        });

        let (dataset, l_warnings) = ingest_dataset_value(value).unwrap();
        assert_eq!(dataset.name, "Alice");
        assert_eq!(dataset.synchro_level, 400);
        assert_eq!(dataset.outpost_level, 80);
        assert_eq!(dataset.options.show_equip_details, Some(false));
        assert_eq!(dataset.cubes.len(), 1);

        let dict_elements = dataset.elements.unwrap();
        let l_fire = &dict_elements[&EnumElement::Fire];
        assert_eq!(l_fire.len(), 2);

        let entry = &l_fire[0];
        assert_eq!(entry.id, "10");
        assert_eq!(entry.priority, EnumPriority::Black);
        assert_eq!(entry.limit_break, Some(SpecLimitBreak { grade: 3, core: 4 }));
        assert_eq!(entry.item_rarity, EnumItemRarity::SSR);
        assert_eq!(entry.equipments[0].len(), 1);
        assert_eq!(entry.equipments[0][0].function_value, 500);
        assert!(entry.show_stats.as_ref().is_some_and(|ss| ss.configured));

        let entry_partial = &l_fire[1];
        assert_eq!(entry_partial.id, "11");
        assert_eq!(entry_partial.name_en.as_deref(), Some("Partly Broken"));
        assert_eq!(entry_partial.skill1_level, None);
        assert_eq!(entry_partial.skill2_level, Some(7));
        assert_eq!(
            entry_partial.limit_break,
            Some(SpecLimitBreak { grade: 3, core: 4 })
        );
        assert_eq!(entry_partial.equipments[0].len(), 1);

        assert_eq!(l_warnings.len(), 3);
        assert!(l_warnings.iter().any(|w| w.contains("Aether")));
        assert!(l_warnings.iter().any(|w| w.contains("StatMystery")));
        assert!(l_warnings
            .iter()
            .any(|w| w.contains("`11`: field `skill1_level`")));
    }

    #[test]
    fn test_malformed_fields_blank_only_themselves() {
        let mut l_warnings = Vec::new();
        let entry = ingest_character_entry(
            &json!({
                "id": "9",
                "name_en": "X",
                "priority": 4,
                "skill1_level": "high",
                "skill2_level": 7,
                "skill_burst_level": 4,
                "limit_break": {"grade": 3, "core": 4},
                "item_rare": "SR",
                "item_level": "2",
                "equipments": {"0": [
                    {"function_type": "StatAtk", "function_value": 500, "level": 3},
                    {"function_type": "StatAtk"}
                ], "1": "oops"},
                "showStats": "StatAtk"
            }),
            &mut l_warnings,
        );
        assert_eq!(entry.limit_break, Some(SpecLimitBreak { grade: 3, core: 4 }));
        assert_eq!(entry.skill1_level, None);
        assert_eq!(entry.skill2_level, Some(7));
        assert_eq!(entry.burst_level, Some(4));
        assert_eq!(entry.item_rarity, EnumItemRarity::SR);
        assert_eq!(entry.item_level, Some(2));
        assert_eq!(entry.priority, EnumPriority::None);
        assert_eq!(entry.show_stats, None);
        assert_eq!(entry.equipments[0].len(), 1);
        assert_eq!(entry.equipments[0][0].function_value, 500);
        assert!(entry.equipments[1].is_empty());
        assert_eq!(l_warnings.len(), 5);

        let mut l_warnings = Vec::new();
        let entry = ingest_character_entry(&json!("not an entry"), &mut l_warnings);
        assert_eq!(entry, SpecCharacterEntry::default());
        assert_eq!(l_warnings.len(), 1);
    }

    #[test]
    fn test_missing_elements_is_fatal() {
        let err = ingest_dataset_json(r#"{"name": "Bob"}"#).unwrap_err();
        assert!(matches!(err, ReportError::MissingElements(name) if name == "Bob"));
    }

    #[test]
    fn test_staged_limit_break_and_slot_array() {
        let mut l_warnings = Vec::new();
        let entry = ingest_character_entry(
            &json!({
                "id": "5",
                "limit_break": {"grade": 3, "core": 2},
                "equipments": [null, [{"function_type": "StatDef", "function_value": 250}], [], [], []]
            }),
            &mut l_warnings,
        );
        assert_eq!(entry.limit_break, Some(SpecLimitBreak { grade: 3, core: 2 }));
        assert_eq!(entry.equipments[1][0].level, 0);
        assert_eq!(l_warnings.len(), 1);
        assert!(l_warnings[0].contains("slot 4"));
    }
}
