use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{
    Block, Endorsement, Proposal, ProposalStatus, Referendum, ReferendumStatus, ReferendumVote,
};
use crate::domain::services::call_decoder::{Call, GovernanceEvent, StandardVote};
use crate::utils::logging;

impl ReconciliationEngine {
    /// `democracy.propose`
    pub async fn democracy_propose(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let motion_hash = call.optional_text_arg("proposal_hash");
        let proposer = self.signer_account_id(ctx).await?;

        for event in ctx.events {
            let GovernanceEvent::DemocracyProposed { proposal_index } = event else {
                continue;
            };
            match self.store.get_proposal_by_index(self.chain_id, *proposal_index).await? {
                Some(mut proposal) => {
                    proposal.proposed_at = Some(ctx.block.id);
                    proposal.motion_hash = motion_hash.clone().or(proposal.motion_hash);
                    proposal.proposed_by = proposer;
                    if self.is_newer(ctx.block, proposal.modified_at).await? {
                        proposal.status = Some(ProposalStatus::Proposed);
                        proposal.modified_at = Some(ctx.block.id);
                    }
                    self.store.update_proposal(&proposal).await?;
                }
                None => {
                    let mut proposal = Proposal::new(self.chain_id, ProposalStatus::Proposed, ctx.block.id);
                    proposal.proposal_index = Some(*proposal_index);
                    proposal.motion_hash = motion_hash.clone();
                    proposal.proposed_by = proposer;
                    proposal.proposed_at = Some(ctx.block.id);
                    self.store.insert_proposal(proposal).await?;
                }
            }
        }
        Ok(())
    }

    /// `democracy.second`: record each endorser once per proposal
    pub async fn democracy_second(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        for event in ctx.events {
            let GovernanceEvent::Seconded { who, proposal_index } = event else {
                continue;
            };
            let endorser = self.account_id(who).await?;
            let proposal_id = match self.store.get_proposal_by_index(self.chain_id, *proposal_index).await? {
                Some(proposal) => proposal.id,
                None => {
                    let mut proposal = Proposal::new(self.chain_id, ProposalStatus::Proposed, ctx.block.id);
                    proposal.proposal_index = Some(*proposal_index);
                    self.store.insert_proposal(proposal).await?.id
                }
            };

            if self.store.get_endorsement(proposal_id, endorser).await?.is_none() {
                self.store
                    .insert_endorsement(Endorsement {
                        id: 0,
                        proposal_id,
                        endorser,
                        endorsed_at: ctx.block.id,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// `democracy.vote`: record each voter's first standard vote
    pub async fn democracy_vote(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        for event in ctx.events {
            let GovernanceEvent::Voted {
                voter,
                referendum_index,
                vote,
            } = event
            else {
                continue;
            };
            let Some(StandardVote {
                aye,
                conviction,
                balance,
            }) = vote
            else {
                logging::log_debug(&format!(
                    "Skipping split vote of {} on referendum {}",
                    voter, referendum_index
                ));
                continue;
            };

            let voter = self.account_id(voter).await?;
            let referendum_id = match self.store.get_referendum(self.chain_id, *referendum_index).await? {
                Some(referendum) => referendum.id,
                None => {
                    self.store
                        .insert_referendum(Referendum::new(self.chain_id, *referendum_index))
                        .await?
                        .id
                }
            };

            if self.store.get_referendum_vote(referendum_id, voter).await?.is_none() {
                self.store
                    .insert_referendum_vote(ReferendumVote {
                        id: 0,
                        referendum_id,
                        voter,
                        vote: *aye,
                        locked_value: *balance,
                        conviction: *conviction,
                        voted_at: ctx.block.id,
                    })
                    .await?;
            }
        }
        Ok(())
    }

    /// `democracy.notePreimage`: attach the decoded call to its proposal
    pub async fn note_preimage(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some((proposal_hash, who)) = ctx.events.iter().find_map(|event| match event {
            GovernanceEvent::PreimageNoted { proposal_hash, who } => Some((proposal_hash, who)),
            _ => None,
        }) else {
            return Ok(());
        };

        let encoded = match call.optional_text_arg("encoded_proposal") {
            Some(encoded) => encoded,
            None => call.text_arg("bytes")?,
        };
        let decoded = self.preimages.decode(&encoded).await;
        let proposer = self.account_id(who).await?;

        match self.store.get_proposal_by_motion_hash(self.chain_id, proposal_hash).await? {
            Some(mut proposal) => {
                proposal.call = Some(decoded);
                proposal.proposed_by = Some(proposer);
                if self.is_newer(ctx.block, proposal.modified_at).await? {
                    proposal.status = Some(ProposalStatus::Proposed);
                    proposal.modified_at = Some(ctx.block.id);
                }
                self.store.update_proposal(&proposal).await?;
            }
            None => {
                let mut proposal = Proposal::new(self.chain_id, ProposalStatus::Proposed, ctx.block.id);
                proposal.motion_hash = Some(proposal_hash.clone());
                proposal.call = Some(decoded);
                proposal.proposed_by = Some(proposer);
                self.store.insert_proposal(proposal).await?;
            }
        }
        Ok(())
    }

    /// Mark a proposal tabled, returning its row id
    pub(super) async fn table_proposal(&self, proposal_index: i64, block: &Block) -> Result<i32, ReconcileError> {
        match self.store.get_proposal_by_index(self.chain_id, proposal_index).await? {
            Some(mut proposal) => {
                if self.is_newer(block, proposal.modified_at).await? {
                    proposal.status = Some(ProposalStatus::Tabled);
                    proposal.modified_at = Some(block.id);
                    self.store.update_proposal(&proposal).await?;
                }
                Ok(proposal.id)
            }
            None => {
                let mut proposal = Proposal::new(self.chain_id, ProposalStatus::Tabled, block.id);
                proposal.proposal_index = Some(proposal_index);
                Ok(self.store.insert_proposal(proposal).await?.id)
            }
        }
    }

    pub(super) async fn referendum_started(
        &self,
        referendum_index: i64,
        threshold: Option<&str>,
        proposal_id: Option<i32>,
        block: &Block,
    ) -> Result<(), ReconcileError> {
        match self.store.get_referendum(self.chain_id, referendum_index).await? {
            Some(mut referendum) => {
                referendum.started_at = Some(block.id);
                if let Some(threshold) = threshold {
                    referendum.vote_threshold = Some(threshold.to_string());
                }
                if proposal_id.is_some() {
                    referendum.proposal_id = proposal_id;
                }
                if self.is_newer(block, referendum.modified_at).await? {
                    referendum.status = Some(ReferendumStatus::Started);
                    referendum.modified_at = Some(block.id);
                }
                self.store.update_referendum(&referendum).await?;
            }
            None => {
                let mut referendum = Referendum::new(self.chain_id, referendum_index);
                referendum.vote_threshold = threshold.map(str::to_string);
                referendum.proposal_id = proposal_id;
                referendum.started_at = Some(block.id);
                referendum.status = Some(ReferendumStatus::Started);
                referendum.modified_at = Some(block.id);
                self.store.insert_referendum(referendum).await?;
            }
        }
        Ok(())
    }

    /// Executed, Passed, NotPassed or Cancelled
    ///
    /// Every outcome but `Passed` ends the referendum.
    pub(super) async fn referendum_closed(
        &self,
        referendum_index: i64,
        status: ReferendumStatus,
        block: &Block,
    ) -> Result<(), ReconcileError> {
        let ended_at = (status != ReferendumStatus::Passed).then_some(block.id);

        match self.store.get_referendum(self.chain_id, referendum_index).await? {
            Some(mut referendum) => {
                if ended_at.is_some() {
                    referendum.ended_at = ended_at;
                }
                if self.is_newer(block, referendum.modified_at).await? {
                    referendum.status = Some(status);
                    referendum.modified_at = Some(block.id);
                }
                self.store.update_referendum(&referendum).await?;
            }
            None => {
                let mut referendum = Referendum::new(self.chain_id, referendum_index);
                referendum.ended_at = ended_at;
                referendum.status = Some(status);
                referendum.modified_at = Some(block.id);
                self.store.insert_referendum(referendum).await?;
            }
        }
        Ok(())
    }
}
