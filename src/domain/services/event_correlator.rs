//! Pairing of block events with the extrinsics that emitted them

use std::collections::HashMap;

use super::call_decoder::{EventRecord, GovernanceEvent, Phase};

/// Events of one block, grouped by execution phase
#[derive(Debug, Default, Clone)]
pub struct BlockEvents {
    per_extrinsic: HashMap<u32, Vec<GovernanceEvent>>,
    initialization: Vec<GovernanceEvent>,
}

impl BlockEvents {
    /// Group decoded records by phase
    ///
    /// Finalization events belong to no extrinsic and drive no handler, so
    /// they are dropped.
    pub fn correlate(records: Vec<EventRecord>) -> Self {
        let mut events = Self::default();
        for record in records {
            match record.phase {
                Phase::ApplyExtrinsic(index) => events
                    .per_extrinsic
                    .entry(index)
                    .or_default()
                    .push(record.event),
                Phase::Initialization => events.initialization.push(record.event),
                Phase::Finalization => {}
            }
        }
        events
    }

    /// Events emitted while applying extrinsic `index`, in emission order
    pub fn for_extrinsic(&self, index: u32) -> &[GovernanceEvent] {
        self.per_extrinsic
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Events emitted during block initialization
    pub fn initialization(&self) -> &[GovernanceEvent] {
        &self.initialization
    }

    /// Whether extrinsic `index` failed
    pub fn is_failed(&self, index: u32) -> bool {
        self.for_extrinsic(index)
            .iter()
            .any(|event| matches!(event, GovernanceEvent::ExtrinsicFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(phase: Phase, event: GovernanceEvent) -> EventRecord {
        EventRecord { phase, event }
    }

    fn other(method: &str) -> GovernanceEvent {
        GovernanceEvent::Other {
            section: "system".to_string(),
            method: method.to_string(),
        }
    }

    #[test]
    fn test_events_are_grouped_by_phase() {
        let events = BlockEvents::correlate(vec![
            record(Phase::Initialization, GovernanceEvent::DemocracyTabled { proposal_index: 1 }),
            record(Phase::ApplyExtrinsic(0), other("ExtrinsicSuccess")),
            record(Phase::ApplyExtrinsic(2), GovernanceEvent::NewTip { tip_hash: "0x1".to_string() }),
            record(Phase::ApplyExtrinsic(2), other("ExtrinsicSuccess")),
            record(Phase::Finalization, other("Finalized")),
        ]);

        assert_eq!(events.initialization().len(), 1);
        assert_eq!(events.for_extrinsic(0).len(), 1);
        assert_eq!(events.for_extrinsic(1).len(), 0);
        assert_eq!(
            events.for_extrinsic(2)[0],
            GovernanceEvent::NewTip { tip_hash: "0x1".to_string() }
        );
    }

    #[test]
    fn test_failed_extrinsics_are_flagged() {
        let events = BlockEvents::correlate(vec![
            record(Phase::ApplyExtrinsic(1), GovernanceEvent::BountyProposed { bounty_id: 7 }),
            record(Phase::ApplyExtrinsic(1), GovernanceEvent::ExtrinsicFailed),
            record(Phase::ApplyExtrinsic(2), other("ExtrinsicSuccess")),
        ]);

        assert!(events.is_failed(1));
        assert!(!events.is_failed(2));
        assert!(!events.is_failed(9));
    }
}
