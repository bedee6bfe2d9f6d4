use serde::{Deserialize, Serialize};

/// Governance proposal as reported by a chain query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Chain-assigned proposal id.
    pub proposal_id: String,
    pub title: String,
    /// Lifecycle status, e.g. `PROPOSAL_STATUS_VOTING_PERIOD` or `PROPOSAL_STATUS_PASSED`.
    pub status: String,
}

impl Proposal {
    pub fn new(
        proposal_id: impl Into<String>,
        title: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            proposal_id: proposal_id.into(),
            title: title.into(),
            status: status.into(),
        }
    }

    /// Whether the proposal is in `status`.
    pub fn has_status(&self, status: &str) -> bool {
        self.status == status
    }
}
