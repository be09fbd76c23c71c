//! Raw debt rows and aggregated client records.

/// One debt row as supplied by the input collaborator.
///
/// Several rows may share a `client_id`; the aggregator collapses them
/// into a single [`ClientRecord`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRecord {
    /// Client key, trimmed before aggregation.
    pub client_id: String,
    /// Outstanding capital of this row.
    pub capital: f64,
    /// Party currently handling the client; empty when unknown.
    pub origin_party: String,
    /// Geographic zone label.
    pub zone: String,
    /// Number of rows held by the client, filled in when absent.
    pub account_count: Option<u32>,
    /// Vintage the debt belongs to.
    pub cohort: Option<String>,
    /// Portfolio class, used by the internal advisor rotation.
    pub segment: Option<String>,
    /// Locked rows keep their current handler and skip allocation.
    pub locked: bool,
}

impl RawRecord {
    /// Creates a row with the four mandatory fields.
    pub fn new(
        client_id: impl Into<String>,
        capital: f64,
        origin_party: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            capital,
            origin_party: origin_party.into(),
            zone: zone.into(),
            ..Self::default()
        }
    }

    pub fn with_account_count(mut self, account_count: u32) -> Self {
        self.account_count = Some(account_count);
        self
    }

    pub fn with_cohort(mut self, cohort: impl Into<String>) -> Self {
        self.cohort = Some(cohort.into());
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

/// The per-client decision unit.
///
/// Invariants: one record per distinct `client_id` in a batch,
/// `capital >= 0` and `account_count >= 1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientRecord {
    pub client_id: String,
    /// Capital summed over every row of the client.
    pub capital: f64,
    pub account_count: u32,
    pub zone: String,
    pub origin_party: String,
}

impl ClientRecord {
    pub fn new(
        client_id: impl Into<String>,
        capital: f64,
        account_count: u32,
        zone: impl Into<String>,
        origin_party: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            capital: capital.max(0.0),
            account_count: account_count.max(1),
            zone: zone.into(),
            origin_party: origin_party.into(),
        }
    }

    /// Returns true if the current handler of this client is known.
    pub fn has_origin(&self) -> bool {
        !self.origin_party.is_empty()
    }
}
