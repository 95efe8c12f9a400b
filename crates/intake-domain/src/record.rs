//! Record module - the canonical feature request and its stored form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a stored record based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so listing a store in id
/// order is listing it in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(uuid::Uuid);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert_eq!(id.to_string().len(), 36);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create a RecordId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }

    /// Parse a RecordId from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// let parsed = RecordId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| format!("Invalid record id '{}': {}", s, e))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The canonical feature request record
///
/// Every field is plain text. A field the source transcript could not supply is
/// the empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequestRecord {
    /// Who the customer is (name, contact)
    #[serde(default)]
    pub customer: String,

    /// The situation that triggers the need, with current pains
    #[serde(default)]
    pub when: String,

    /// The outcome the customer wants
    #[serde(default)]
    pub want: String,

    /// Success criteria for the outcome
    #[serde(default)]
    pub how: String,

    /// The overarching goal behind the outcome
    #[serde(default)]
    pub so_that: String,

    /// Explicit feature asks, one per line
    #[serde(default)]
    pub feature_requests: String,
}

/// Field selector for the six canonical fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// `customer`
    Customer,
    /// `when`
    When,
    /// `want`
    Want,
    /// `how`
    How,
    /// `soThat`
    SoThat,
    /// `featureRequests`
    FeatureRequests,
}

impl RecordField {
    /// All fields in canonical order
    pub const ALL: [RecordField; 6] = [
        RecordField::Customer,
        RecordField::When,
        RecordField::Want,
        RecordField::How,
        RecordField::SoThat,
        RecordField::FeatureRequests,
    ];

    /// Serialized (camelCase) key of the field
    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Customer => "customer",
            RecordField::When => "when",
            RecordField::Want => "want",
            RecordField::How => "how",
            RecordField::SoThat => "soThat",
            RecordField::FeatureRequests => "featureRequests",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::Customer => "Customer",
            RecordField::When => "When",
            RecordField::Want => "Want",
            RecordField::How => "How",
            RecordField::SoThat => "So that",
            RecordField::FeatureRequests => "Feature requests",
        }
    }
}

impl FeatureRequestRecord {
    /// Borrow a field by selector
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::Customer => &self.customer,
            RecordField::When => &self.when,
            RecordField::Want => &self.want,
            RecordField::How => &self.how,
            RecordField::SoThat => &self.so_that,
            RecordField::FeatureRequests => &self.feature_requests,
        }
    }

    /// Mutably borrow a field by selector
    pub fn field_mut(&mut self, field: RecordField) -> &mut String {
        match field {
            RecordField::Customer => &mut self.customer,
            RecordField::When => &mut self.when,
            RecordField::Want => &mut self.want,
            RecordField::How => &mut self.how,
            RecordField::SoThat => &mut self.so_that,
            RecordField::FeatureRequests => &mut self.feature_requests,
        }
    }

    /// True when every field is empty
    pub fn is_blank(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.field(*f).trim().is_empty())
    }
}

/// Partial update for a record; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    /// Replacement for `customer`
    pub customer: Option<String>,
    /// Replacement for `when`
    pub when: Option<String>,
    /// Replacement for `want`
    pub want: Option<String>,
    /// Replacement for `how`
    pub how: Option<String>,
    /// Replacement for `soThat`
    pub so_that: Option<String>,
    /// Replacement for `featureRequests`
    pub feature_requests: Option<String>,
}

impl RecordPatch {
    /// True if the patch would change nothing
    pub fn is_empty(&self) -> bool {
        RecordField::ALL.iter().all(|f| self.value(*f).is_none())
    }

    /// Replacement value for a field, if any
    pub fn value(&self, field: RecordField) -> Option<&String> {
        match field {
            RecordField::Customer => self.customer.as_ref(),
            RecordField::When => self.when.as_ref(),
            RecordField::Want => self.want.as_ref(),
            RecordField::How => self.how.as_ref(),
            RecordField::SoThat => self.so_that.as_ref(),
            RecordField::FeatureRequests => self.feature_requests.as_ref(),
        }
    }

    /// Apply the patch to a record in place
    pub fn apply(&self, record: &mut FeatureRequestRecord) {
        for field in RecordField::ALL {
            if let Some(value) = self.value(field) {
                *record.field_mut(field) = value.clone();
            }
        }
    }
}

/// A record as held by a store: identity and lifecycle timestamps attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Store-assigned identifier
    pub id: RecordId,

    /// The canonical fields
    #[serde(flatten)]
    pub record: FeatureRequestRecord,

    /// Creation time (seconds since Unix epoch)
    pub created_at: u64,

    /// Last update time (seconds since Unix epoch)
    pub updated_at: u64,
}

impl StoredRecord {
    /// Wrap a record with a fresh id and the current timestamp
    pub fn new(record: FeatureRequestRecord) -> Self {
        let now = current_timestamp();
        Self {
            id: RecordId::new(),
            record,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current timestamp in seconds since Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
