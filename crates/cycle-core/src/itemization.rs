//! Closed-category itemization normalization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CycleError, Result};
use crate::fields;
use crate::models::{Itemization, ItemizationMap};

/// End-use categories every normalized itemization carries.
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "airConditioning",
    "alwaysOn",
    "cooking",
    "electricVehicle",
    "entertainment",
    "laundry",
    "lighting",
    "other",
    "pool",
    "refrigeration",
    "spaceHeating",
    "waterHeating",
];

/// Categories folded together by the default combination rule.
pub const DEFAULT_COMBINED: [&str; 4] = ["cooking", "laundry", "other", "refrigeration"];

/// Name of the synthetic category the default rule folds into.
pub const COMBINED_CATEGORY: &str = "otherGeneralUsage";

/// Fold `members` into one synthetic category named `into`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub members: Vec<String>,
    pub into: String,
}

impl Default for Combination {
    fn default() -> Self {
        Self {
            members: DEFAULT_COMBINED.iter().map(|s| s.to_string()).collect(),
            into: COMBINED_CATEGORY.to_string(),
        }
    }
}

/// The closed category list plus an optional combination rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizationConfig {
    pub categories: Vec<String>,
    pub combine: Option<Combination>,
}

impl Default for ItemizationConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            combine: Some(Combination::default()),
        }
    }
}

impl ItemizationConfig {
    /// The same category list with combination switched off.
    pub fn without_combination(self) -> Self {
        Self {
            combine: None,
            ..self
        }
    }

    /// Output category order after combination.
    ///
    /// Combined members are removed and the synthetic category is appended
    /// at the end. Without a combination rule this is `categories` itself.
    pub fn effective_categories(&self) -> Vec<String> {
        match &self.combine {
            None => self.categories.clone(),
            Some(rule) => {
                let mut order: Vec<String> = self
                    .categories
                    .iter()
                    .filter(|c| !rule.members.contains(c) && **c != rule.into)
                    .cloned()
                    .collect();
                order.push(rule.into.clone());
                order
            }
        }
    }

    /// Normalize a raw `{category, usage, cost}` list.
    ///
    /// Entries with an empty or null category are skipped and later entries
    /// win over earlier ones for the same category. Usage and cost are
    /// truncated to integers. The result has exactly the keys of
    /// [`effective_categories`](Self::effective_categories), in that order;
    /// raw categories outside the configured list are dropped.
    pub fn normalize(&self, details: &[Value], path: &str) -> Result<ItemizationMap> {
        let mut by_category: HashMap<String, [i64; 2]> = HashMap::new();

        for (i, detail) in details.iter().enumerate() {
            let entry_path = format!("{}[{}]", path, i);
            let category = match fields::require(detail, "category", &entry_path)? {
                Value::Null => continue,
                Value::String(s) if s.is_empty() => continue,
                Value::String(s) => s.clone(),
                other => {
                    return Err(CycleError::TypeMismatch {
                        field: fields::join(&entry_path, "category"),
                        expected: "string",
                        found: fields::type_name(other),
                    })
                }
            };
            let usage = fields::require_f64(detail, "usage", &entry_path)?.trunc() as i64;
            let cost = fields::require_f64(detail, "cost", &entry_path)?.trunc() as i64;
            by_category.insert(category, [usage, cost]);
        }

        for category in &self.categories {
            by_category.entry(category.clone()).or_insert([0, 0]);
        }

        if let Some(rule) = &self.combine {
            let mut combined = [0i64, 0i64];
            for member in &rule.members {
                let [usage, cost] = by_category.remove(member).unwrap_or([0, 0]);
                combined[0] = combined[0].saturating_add(usage);
                combined[1] = combined[1].saturating_add(cost);
            }
            by_category.insert(rule.into.clone(), combined);
        }

        let entries = self
            .effective_categories()
            .into_iter()
            .map(|category| {
                let value = by_category.get(&category).copied().unwrap_or([0, 0]);
                (category, value)
            })
            .collect();
        Ok(ItemizationMap::from_entries(entries))
    }

    /// Normalize the `itemizationDetailsList` field of a raw cycle record.
    ///
    /// An absent or `null` list yields [`Itemization::Unavailable`].
    pub fn normalize_record(&self, record: &Value, path: &str) -> Result<Itemization> {
        const KEY: &str = "itemizationDetailsList";
        let Some(raw) = fields::optional(record, KEY, path)? else {
            return Ok(Itemization::Unavailable);
        };
        let list_path = fields::join(path, KEY);
        let details = raw.as_array().ok_or_else(|| CycleError::TypeMismatch {
            field: list_path.clone(),
            expected: "array",
            found: fields::type_name(raw),
        })?;
        self.normalize(details, &list_path).map(Itemization::Available)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
