use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{Block, Councilor, Councilterm};
use crate::domain::services::call_decoder::{Call, GovernanceEvent};

impl ReconciliationEngine {
    /// `timestamp.set`: apply the block's initialization events
    ///
    /// The timestamp inherent appears once per block, so initialization
    /// events are applied exactly once.
    pub async fn timestamp_set(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        self.apply_initialization(ctx.block, ctx.initialization_events)
            .await
    }

    /// Apply referendum, council term and treasury award transitions
    ///
    /// Tabled proposals are handled first so that a referendum started in the
    /// same block links to the proposal it came from.
    pub async fn apply_initialization(
        &self,
        block: &Block,
        events: &[GovernanceEvent],
    ) -> Result<(), ReconcileError> {
        let mut tabled_proposal = None;
        for event in events {
            if let GovernanceEvent::DemocracyTabled { proposal_index } = event {
                let proposal_id = self.table_proposal(*proposal_index, block).await?;
                tabled_proposal.get_or_insert(proposal_id);
            }
        }

        for event in events {
            match event {
                GovernanceEvent::ReferendumStarted {
                    referendum_index,
                    threshold,
                } => {
                    self.referendum_started(*referendum_index, threshold.as_deref(), tabled_proposal, block)
                        .await?
                }
                GovernanceEvent::ReferendumClosed {
                    referendum_index,
                    status,
                } => self.referendum_closed(*referendum_index, *status, block).await?,
                GovernanceEvent::NewTerm { members } => self.new_council_term(members, block).await?,
                GovernanceEvent::TreasuryAwarded {
                    proposal_id,
                    beneficiary,
                } => self.treasury_awarded(*proposal_id, beneficiary, block).await?,
                _ => {}
            }
        }
        Ok(())
    }

    async fn new_council_term(&self, members: &[String], block: &Block) -> Result<(), ReconcileError> {
        let term = self
            .store
            .insert_councilterm(Councilterm {
                id: 0,
                chain_id: self.chain_id,
                from_block: block.id,
            })
            .await?;

        for member in members {
            let account_id = self.account_id(member).await?;
            self.store
                .insert_councilor(Councilor {
                    id: 0,
                    councilterm_id: term.id,
                    account_id,
                })
                .await?;
        }
        Ok(())
    }
}
