use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{CouncilMotion, CouncilMotionStatus, CouncilMotionVote, TreasuryProposal, TreasuryProposalStatus};
use crate::domain::services::call_decoder::{Call, GovernanceEvent};
use crate::utils::logging;

/// Outcome of a close, by precedence
fn close_outcome(events: &[GovernanceEvent]) -> Option<CouncilMotionStatus> {
    [
        CouncilMotionStatus::Approved,
        CouncilMotionStatus::Rejected,
        CouncilMotionStatus::Disapproved,
    ]
    .into_iter()
    .find(|status| {
        events
            .iter()
            .any(|event| matches!(event, GovernanceEvent::CouncilOutcome(s) if s == status))
    })
}

impl ReconciliationEngine {
    /// `council.vote`: record the signer's first vote on a motion
    pub async fn council_vote(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some(voter) = self.signer_account_id(ctx).await? else {
            logging::log_debug("Skipping unsigned council vote");
            return Ok(());
        };
        let motion_hash = call.text_arg("proposal")?;
        let approved = call.flag_arg("approve")?;

        let motion = match self.store.get_council_motion(self.chain_id, &motion_hash).await? {
            Some(motion) => motion,
            None => {
                self.store
                    .insert_council_motion(CouncilMotion::new(self.chain_id, motion_hash))
                    .await?
            }
        };

        if self
            .store
            .get_council_motion_vote(motion.id, voter)
            .await?
            .is_none()
        {
            self.store
                .insert_council_motion_vote(CouncilMotionVote {
                    id: 0,
                    council_motion_id: motion.id,
                    account_id: voter,
                    approved,
                    block: ctx.block.id,
                })
                .await?;
        }
        Ok(())
    }

    /// `council.close`: settle a motion and any bounty it decided
    pub async fn council_close(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let motion_hash = call.text_arg("proposal_hash")?;
        let proposal_index = call.index_arg("index")?;
        let outcome = close_outcome(ctx.events);

        match self.store.get_council_motion(self.chain_id, &motion_hash).await? {
            None => {
                let mut motion = CouncilMotion::new(self.chain_id, motion_hash);
                motion.proposal_index = Some(proposal_index);
                motion.to_block = Some(ctx.block.id);
                if outcome.is_some() {
                    motion.status = outcome;
                    motion.modified_at = Some(ctx.block.id);
                }
                self.store.insert_council_motion(motion).await?;
            }
            Some(mut motion) => {
                motion.proposal_index = Some(proposal_index);
                motion.to_block = Some(ctx.block.id);
                if outcome.is_some() && self.is_newer(ctx.block, motion.modified_at).await? {
                    motion.status = outcome;
                    motion.modified_at = Some(ctx.block.id);
                }
                self.store.update_council_motion(&motion).await?;
            }
        }

        self.bounty_lifecycle(ctx).await
    }

    /// `council.propose`: open a motion, linking the treasury proposal it approves
    pub async fn council_propose(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some((proposal_index, motion_hash)) = ctx.events.iter().find_map(|event| match event {
            GovernanceEvent::CouncilProposed {
                proposal_index,
                motion_hash,
            } => Some((*proposal_index, motion_hash.clone())),
            _ => None,
        }) else {
            return Ok(());
        };
        let proposal = call.call_arg("proposal")?;
        let proposer = self.signer_account_id(ctx).await?;

        let motion = match self.store.get_council_motion(self.chain_id, &motion_hash).await? {
            Some(mut motion) => {
                motion.section = Some(proposal.section.clone());
                motion.method = Some(proposal.method.clone());
                motion.proposal_index = Some(proposal_index);
                motion.proposed_by = proposer;
                motion.from_block = Some(ctx.block.id);
                if self.is_newer(ctx.block, motion.modified_at).await? {
                    motion.status = Some(CouncilMotionStatus::Proposed);
                    motion.modified_at = Some(ctx.block.id);
                }
                self.store.update_council_motion(&motion).await?;
                motion
            }
            None => {
                let mut motion = CouncilMotion::new(self.chain_id, motion_hash);
                motion.section = Some(proposal.section.clone());
                motion.method = Some(proposal.method.clone());
                motion.proposal_index = Some(proposal_index);
                motion.proposed_by = proposer;
                motion.from_block = Some(ctx.block.id);
                motion.status = Some(CouncilMotionStatus::Proposed);
                motion.modified_at = Some(ctx.block.id);
                self.store.insert_council_motion(motion).await?
            }
        };

        if proposal.section.eq_ignore_ascii_case("treasury")
            && proposal.method.eq_ignore_ascii_case("approveProposal")
        {
            let proposal_id = proposal.index_arg("proposal_id")?;
            self.link_treasury_approval(proposal_id, motion.id, ctx).await?;
        }
        Ok(())
    }

    /// Attach a council motion to the treasury proposal it approves
    async fn link_treasury_approval(
        &self,
        proposal_id: i64,
        council_motion_id: i32,
        ctx: &CallContext<'_>,
    ) -> Result<(), ReconcileError> {
        match self.store.get_treasury_proposal(self.chain_id, proposal_id).await? {
            Some(mut proposal) => {
                proposal.council_motion_id = Some(council_motion_id);
                self.store.update_treasury_proposal(&proposal).await?;
            }
            None => {
                let awarded = ctx
                    .events
                    .iter()
                    .any(|event| matches!(event, GovernanceEvent::TreasuryAwarded { .. }));
                let status = if awarded {
                    TreasuryProposalStatus::Awarded
                } else {
                    TreasuryProposalStatus::Proposed
                };
                let mut proposal = TreasuryProposal::new(self.chain_id, proposal_id, status, ctx.block.id);
                proposal.council_motion_id = Some(council_motion_id);
                self.store.insert_treasury_proposal(proposal).await?;
            }
        }
        Ok(())
    }
}
