//! Index definitions and their JSON configuration.
//!
//! ```json
//! {"asset_indexes": [
//!   {"NAME": "BIG_TECH", "TYPE": "MARKET_CAP", "MEMBERS": ["AAPL", "MSFT"],
//!    "MARKET_CAP": [3400, 3100], "CREATED_DATE": "2024-01-02"}
//! ]}
//! ```
//!
//! Every entry is validated on its own. A bad entry is rejected and the rest still load.

use crate::error::{IndexError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Weighting scheme tag as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightingKind {
    /// Same dollar amount per member
    EqualWeight,
    /// Same share count per member
    Constant,
    /// Dollar amount proportional to market cap
    MarketCap,
}

impl fmt::Display for WeightingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EqualWeight => "EQUAL_WEIGHT",
            Self::Constant => "CONSTANT",
            Self::MarketCap => "MARKET_CAP",
        };
        f.write_str(name)
    }
}

/// Weighting scheme with the data it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Weighting {
    /// Same dollar amount per member
    EqualWeight,
    /// Same share count per member
    Constant,
    /// Dollar amount proportional to market cap
    MarketCap {
        /// One cap per member, in member order
        market_caps: Vec<f64>,
    },
}

impl Weighting {
    /// The configuration tag of this scheme.
    pub const fn kind(&self) -> WeightingKind {
        match self {
            Self::EqualWeight => WeightingKind::EqualWeight,
            Self::Constant => WeightingKind::Constant,
            Self::MarketCap { .. } => WeightingKind::MarketCap,
        }
    }
}

/// A validated index definition.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    name: String,
    members: Vec<String>,
    weighting: Weighting,
    start_date: Option<NaiveDate>,
}

impl IndexDefinition {
    /// Create and validate a definition.
    pub fn new(
        name: impl Into<String>,
        members: Vec<String>,
        weighting: Weighting,
        start_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let definition = Self {
            name: name.into(),
            members,
            weighting,
            start_date,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Equal-weight definition without explicit start date.
    pub fn equal_weight<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self::new(name, collect(members), Weighting::EqualWeight, None)
    }

    /// Constant-share definition without explicit start date.
    pub fn constant<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        Self::new(name, collect(members), Weighting::Constant, None)
    }

    /// Market-cap definition without explicit start date.
    pub fn market_cap<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = S>,
        market_caps: Vec<f64>,
    ) -> Result<Self> {
        Self::new(
            name,
            collect(members),
            Weighting::MarketCap { market_caps },
            None,
        )
    }

    /// Set an explicit start date.
    pub const fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(IndexError::config(&self.name, reason));

        if self.name.trim().is_empty() {
            return fail("NAME must not be empty".to_string());
        }
        if self.members.is_empty() {
            return fail("MEMBERS must not be empty".to_string());
        }
        let mut seen = HashSet::new();
        for member in &self.members {
            if member.trim().is_empty() {
                return fail("MEMBERS contains an empty symbol".to_string());
            }
            if !seen.insert(member.as_str()) {
                return fail(format!("duplicate member {}", member));
            }
        }
        if let Weighting::MarketCap { market_caps } = &self.weighting {
            if market_caps.len() != self.members.len() {
                return fail(format!(
                    "MARKET_CAP has {} values for {} members",
                    market_caps.len(),
                    self.members.len()
                ));
            }
            if let Some(cap) = market_caps.iter().find(|c| !c.is_finite() || **c <= 0.0) {
                return fail(format!("MARKET_CAP values must be positive, got {}", cap));
            }
            if !market_caps.iter().sum::<f64>().is_finite() {
                return fail("MARKET_CAP total overflows".to_string());
            }
        }
        Ok(())
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member symbols in configuration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Weighting scheme.
    pub const fn weighting(&self) -> &Weighting {
        &self.weighting
    }

    /// Explicit start date, if configured.
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Market cap of `symbol` (MARKET_CAP definitions only).
    pub fn market_cap_of(&self, symbol: &str) -> Option<f64> {
        match &self.weighting {
            Weighting::MarketCap { market_caps } => self
                .members
                .iter()
                .position(|m| m == symbol)
                .map(|i| market_caps[i]),
            _ => None,
        }
    }
}

fn collect<S: Into<String>>(members: impl IntoIterator<Item = S>) -> Vec<String> {
    members.into_iter().map(Into::into).collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndexEntry {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "TYPE")]
    kind: WeightingKind,
    #[serde(rename = "MEMBERS")]
    members: Vec<String>,
    #[serde(rename = "MARKET_CAP", default)]
    market_caps: Option<Vec<f64>>,
    #[serde(rename = "CREATED_DATE", default)]
    created_date: Option<NaiveDate>,
}

impl RawIndexEntry {
    fn into_definition(self) -> Result<IndexDefinition> {
        let weighting = match (self.kind, self.market_caps) {
            (WeightingKind::MarketCap, Some(market_caps)) => Weighting::MarketCap { market_caps },
            (WeightingKind::MarketCap, None) => {
                return Err(IndexError::config(
                    self.name,
                    "MARKET_CAP weighting requires MARKET_CAP values",
                ));
            }
            (kind, Some(_)) => {
                return Err(IndexError::config(
                    self.name,
                    format!("MARKET_CAP values are not allowed for {}", kind),
                ));
            }
            (WeightingKind::EqualWeight, None) => Weighting::EqualWeight,
            (WeightingKind::Constant, None) => Weighting::Constant,
        };
        IndexDefinition::new(self.name, self.members, weighting, self.created_date)
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    asset_indexes: Vec<Value>,
}

/// An entry that failed validation.
#[derive(Debug)]
pub struct RejectedIndex {
    /// Zero-based position in `asset_indexes`
    pub position: usize,
    /// `NAME` of the entry when it has one
    pub name: Option<String>,
    /// Why the entry was rejected
    pub error: IndexError,
}

/// Ordered set of validated index definitions.
#[derive(Debug, Default)]
pub struct IndexDefinitionSet {
    definitions: Vec<IndexDefinition>,
    rejected: Vec<RejectedIndex>,
}

impl IndexDefinitionSet {
    /// Load definitions from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let set = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            loaded = set.len(),
            rejected = set.rejected.len(),
            "loaded index definitions"
        );
        Ok(set)
    }

    /// Parse definitions from JSON text.
    ///
    /// Only an unparseable document is an error; invalid entries are collected in
    /// [`rejected`](Self::rejected).
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: RawDocument = serde_json::from_str(content)?;
        let mut set = Self::default();

        for (position, entry) in document.asset_indexes.into_iter().enumerate() {
            let name = entry.get("NAME").and_then(Value::as_str).map(str::to_string);
            let label = name
                .clone()
                .unwrap_or_else(|| format!("#{}", position));

            let parsed = serde_json::from_value::<RawIndexEntry>(entry)
                .map_err(|e| IndexError::config(&label, e.to_string()))
                .and_then(RawIndexEntry::into_definition)
                .and_then(|definition| {
                    if set.get(definition.name()).is_some() {
                        Err(IndexError::config(&label, "duplicate index name"))
                    } else {
                        Ok(definition)
                    }
                });

            match parsed {
                Ok(definition) => set.definitions.push(definition),
                Err(error) => {
                    tracing::warn!(index = %label, %error, "rejected index definition");
                    set.rejected.push(RejectedIndex {
                        position,
                        name,
                        error,
                    });
                }
            }
        }

        Ok(set)
    }

    /// Build a set from already validated definitions. Later duplicates are rejected.
    pub fn from_definitions(definitions: impl IntoIterator<Item = IndexDefinition>) -> Self {
        let mut set = Self::default();
        for (position, definition) in definitions.into_iter().enumerate() {
            if set.get(definition.name()).is_some() {
                set.rejected.push(RejectedIndex {
                    position,
                    name: Some(definition.name().to_string()),
                    error: IndexError::config(definition.name(), "duplicate index name"),
                });
            } else {
                set.definitions.push(definition);
            }
        }
        set
    }

    /// Definition named `name`.
    pub fn get(&self, name: &str) -> Option<&IndexDefinition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    /// Definitions in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.definitions.iter()
    }

    /// Entries that failed validation.
    pub fn rejected(&self) -> &[RejectedIndex] {
        &self.rejected
    }

    /// Number of valid definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definition loaded.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Union of all members in first-seen order.
    pub fn all_symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.definitions
            .iter()
            .flat_map(|d| d.members())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a IndexDefinitionSet {
    type Item = &'a IndexDefinition;
    type IntoIter = std::slice::Iter<'a, IndexDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}
