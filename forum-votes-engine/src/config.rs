/// Default number of times a vote operation is re-run after losing a race.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 1;

/// Tuning knobs of the [`VotingEngine`](crate::VotingEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingEngineConfig {
    /// Retries after a `ConcurrencyConflict` before it is reported to the caller.
    pub conflict_retries: u32,
}

impl Default for VotingEngineConfig {
    fn default() -> Self {
        Self { conflict_retries: DEFAULT_CONFLICT_RETRIES }
    }
}

impl VotingEngineConfig {
    pub fn with_conflict_retries(conflict_retries: u32) -> Self {
        Self { conflict_retries }
    }
}
