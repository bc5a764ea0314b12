use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::parse_thousands;

/// One player's line on a skill's hiscores page.
///
/// `score` is kept exactly as scraped ("13,034,431"); use [`HiscoreEntry::xp`]
/// for the numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiscoreEntry {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub score: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub rank: Option<String>,
}

impl HiscoreEntry {
    pub fn xp(&self) -> Option<i64> {
        parse_thousands(&self.score)
    }
}

/// Hiscores for every scraped skill at a single point in time.
///
/// Created once per JSON file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: NaiveDateTime,
    pub hiscores: BTreeMap<String, Vec<HiscoreEntry>>,
}

impl Snapshot {
    pub fn skill(&self, skill: &str) -> Option<&[HiscoreEntry]> {
        self.hiscores.get(skill).map(Vec::as_slice)
    }
}

/// On-disk layout of one scraped file.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFile {
    pub timestamp: String,
    #[serde(default)]
    pub data: Vec<SkillRecord>,
}

/// A single skill inside a scraped file. `skill_data` is itself a JSON
/// document (a list of [`HiscoreEntry`]) stored as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillRecord {
    pub skill: SkillName,
    pub skill_data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillName {
    pub skill: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}
