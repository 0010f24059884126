//! Application state for one running instance.

use crate::browser::PatientBrowser;
use crate::config::CoreConfig;
use crate::fixtures::Dataset;
use crate::notification::Notifier;
use crate::rounds::RoundBrowser;
use crate::CoreResult;

/// Both browsers, built from one dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub patients: PatientBrowser,
    pub rounds: RoundBrowser,
}

impl Session {
    pub fn from_dataset(dataset: Dataset, cfg: &CoreConfig) -> Self {
        let Dataset {
            patients,
            facilities,
            rounds,
        } = dataset;
        Self {
            patients: PatientBrowser::new(patients, Notifier::new(cfg.notification_ttl_ms())),
            rounds: RoundBrowser::new(facilities, rounds),
        }
    }

    /// Loads the configured dataset and builds a fresh session.
    pub fn load(cfg: &CoreConfig) -> CoreResult<Self> {
        Ok(Self::from_dataset(Dataset::from_config(cfg)?, cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_session_seeds_assignments() {
        let session = Session::load(&CoreConfig::default()).expect("demo session");
        assert!(!session.patients.patients().is_empty());
        assert_eq!(session.patients.notifier().ttl_ms(), 3000);

        let segment_count: usize = session.rounds.rounds().iter().map(|r| r.segments.len()).sum();
        assert_eq!(session.rounds.board().len(), segment_count);
    }
}
