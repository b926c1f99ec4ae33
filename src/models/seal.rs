//! Seal record model and its enumerations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Department a seal is taken into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Department {
    #[default]
    #[serde(rename = "Inbound Department")]
    Inbound,
    #[serde(rename = "Shipping Department")]
    Shipping,
    #[serde(rename = "Bella Canva")]
    BellaCanva,
}

impl Department {
    /// All departments in display order.
    pub const ALL: [Department; 3] = [
        Department::Inbound,
        Department::Shipping,
        Department::BellaCanva,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Inbound => "Inbound Department",
            Department::Shipping => "Shipping Department",
            Department::BellaCanva => "Bella Canva",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown department '{}'", s)))
    }
}

/// Seal status. The only transition is `InStock -> Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SealStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Applied")]
    Applied,
}

impl SealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SealStatus::InStock => "In Stock",
            SealStatus::Applied => "Applied",
        }
    }
}

impl fmt::Display for SealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SealStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Stock" => Ok(SealStatus::InStock),
            "Applied" => Ok(SealStatus::Applied),
            _ => Err(AppError::Store(format!("Unknown seal status '{}'", s))),
        }
    }
}

/// A text column read back from the store.
///
/// Writes only ever use the canonical values, but a shared table may hold
/// rows written by other clients. Those keep their raw text so the row stays
/// listed, exported and addressable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: FromStr> StoredValue<T> {
    pub fn from_raw(raw: String) -> Self {
        match raw.parse() {
            Ok(value) => StoredValue::Known(value),
            Err(_) => StoredValue::Unrecognized(raw),
        }
    }
}

impl<T: Copy> StoredValue<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            StoredValue::Known(value) => Some(*value),
            StoredValue::Unrecognized(_) => None,
        }
    }
}

impl<T> From<T> for StoredValue<T> {
    fn from(value: T) -> Self {
        StoredValue::Known(value)
    }
}

impl<T: fmt::Display> fmt::Display for StoredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Known(value) => fmt::Display::fmt(value, f),
            StoredValue::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// A persisted seal record as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealRecord {
    pub id: String,
    pub seal_id: String,
    pub department: StoredValue<Department>,
    pub status: StoredValue<SealStatus>,
    pub created_at: DateTime<Utc>,
}

/// A seal about to be inserted. `id` and `created_at` are left to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSeal {
    pub seal_id: String,
    pub department: Department,
    pub status: SealStatus,
}

impl NewSeal {
    /// Build an in-stock seal, trimming and uppercasing the serial.
    pub fn in_stock(seal_id: &str, department: Department) -> Result<Self, AppError> {
        let seal_id = normalize_seal_id(seal_id);
        if seal_id.is_empty() {
            return Err(AppError::Validation("Seal ID is required".to_string()));
        }
        Ok(Self {
            seal_id,
            department,
            status: SealStatus::InStock,
        })
    }
}

/// Canonical form of a seal serial.
pub fn normalize_seal_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Which department the list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepartmentFilter {
    #[default]
    All,
    Only(Department),
}

impl DepartmentFilter {
    /// `All` also admits departments outside the canonical set.
    pub fn matches(&self, department: &StoredValue<Department>) -> bool {
        match self {
            DepartmentFilter::All => true,
            DepartmentFilter::Only(d) => department.known() == Some(*d),
        }
    }
}

impl fmt::Display for DepartmentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepartmentFilter::All => f.write_str("All"),
            DepartmentFilter::Only(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl FromStr for DepartmentFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            Ok(DepartmentFilter::All)
        } else {
            s.parse().map(DepartmentFilter::Only)
        }
    }
}

impl Serialize for DepartmentFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DepartmentFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Request body for recording a new seal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub seal_id: String,
    #[serde(default)]
    pub department: Option<Department>,
}

/// Request body for editing the intake draft.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraftRequest {
    #[serde(default)]
    pub seal_id: Option<String>,
    #[serde(default)]
    pub department: Option<Department>,
}

/// Request body for changing the list search term and department filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateViewRequest {
    #[serde(default)]
    pub search_term: Option<String>,
    #[serde(default)]
    pub department_filter: Option<DepartmentFilter>,
}
