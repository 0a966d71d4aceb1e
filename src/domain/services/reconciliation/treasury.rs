use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{Block, TreasuryProposal, TreasuryProposalStatus};
use crate::domain::services::call_decoder::{Call, GovernanceEvent};
use crate::domain::services::numeric;

impl ReconciliationEngine {
    /// `treasury.proposeSpend`
    pub async fn propose_spend(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let proposed: Vec<i64> = ctx
            .events
            .iter()
            .filter_map(|event| match event {
                GovernanceEvent::TreasuryProposed { proposal_id } => Some(*proposal_id),
                _ => None,
            })
            .collect();
        if proposed.is_empty() {
            return Ok(());
        }

        let value = numeric::parse_grouped_amount(&call.text_arg("value")?)?;
        let beneficiary = match call.optional_text_arg("beneficiary") {
            Some(address) => Some(self.account_id(&address).await?),
            None => None,
        };
        let proposer = self.signer_account_id(ctx).await?;

        for proposal_id in proposed {
            match self.store.get_treasury_proposal(self.chain_id, proposal_id).await? {
                Some(mut proposal) => {
                    proposal.value = Some(value);
                    proposal.beneficiary = beneficiary.or(proposal.beneficiary);
                    proposal.proposed_by = proposer;
                    proposal.proposed_at = Some(ctx.block.id);
                    if self.is_newer(ctx.block, proposal.modified_at).await? {
                        proposal.status = Some(TreasuryProposalStatus::Proposed);
                        proposal.modified_at = Some(ctx.block.id);
                    }
                    self.store.update_treasury_proposal(&proposal).await?;
                }
                None => {
                    let mut proposal = TreasuryProposal::new(
                        self.chain_id,
                        proposal_id,
                        TreasuryProposalStatus::Proposed,
                        ctx.block.id,
                    );
                    proposal.value = Some(value);
                    proposal.beneficiary = beneficiary;
                    proposal.proposed_by = proposer;
                    proposal.proposed_at = Some(ctx.block.id);
                    self.store.insert_treasury_proposal(proposal).await?;
                }
            }
        }
        Ok(())
    }

    /// Treasury `Awarded` event from block initialization
    pub(super) async fn treasury_awarded(
        &self,
        proposal_id: i64,
        beneficiary: &str,
        block: &Block,
    ) -> Result<(), ReconcileError> {
        let beneficiary = self.account_id(beneficiary).await?;

        match self.store.get_treasury_proposal(self.chain_id, proposal_id).await? {
            Some(mut proposal) => {
                proposal.beneficiary = Some(beneficiary);
                if self.is_newer(block, proposal.modified_at).await? {
                    proposal.status = Some(TreasuryProposalStatus::Awarded);
                    proposal.modified_at = Some(block.id);
                }
                self.store.update_treasury_proposal(&proposal).await?;
            }
            None => {
                let mut proposal =
                    TreasuryProposal::new(self.chain_id, proposal_id, TreasuryProposalStatus::Awarded, block.id);
                proposal.beneficiary = Some(beneficiary);
                self.store.insert_treasury_proposal(proposal).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::services::reconciliation::testing::Fixture;

    fn propose_spend() -> Call {
        Call {
            section: "treasury".to_string(),
            method: "proposeSpend".to_string(),
            args: json!({ "value": "25,000,000", "beneficiary": { "Id": "bene" } }),
        }
    }

    #[tokio::test]
    async fn test_propose_spend_records_value_and_beneficiary() {
        let fx = Fixture::new().await;
        let block = fx.block(5).await;
        let events = [GovernanceEvent::TreasuryProposed { proposal_id: 31 }];

        fx.engine.propose_spend(&propose_spend(), &fx.ctx(&block, Some("dave"), &events)).await.unwrap();

        let proposal = &fx.store.treasury_proposals()[0];
        assert_eq!(proposal.proposal_id, 31);
        assert_eq!(proposal.value, Some(25_000_000.0));
        assert_eq!(fx.store.address_of(proposal.beneficiary.unwrap()).as_deref(), Some("bene"));
        assert_eq!(fx.store.address_of(proposal.proposed_by.unwrap()).as_deref(), Some("dave"));
        assert_eq!(proposal.status, Some(TreasuryProposalStatus::Proposed));
    }

    #[tokio::test]
    async fn test_award_is_kept_over_earlier_spend_proposal() {
        let fx = Fixture::new().await;
        let awarded_at = fx.block(9).await;
        let proposed_at = fx.block(5).await;

        fx.engine.treasury_awarded(31, "bene", &awarded_at).await.unwrap();
        fx.engine
            .propose_spend(
                &propose_spend(),
                &fx.ctx(&proposed_at, Some("dave"), &[GovernanceEvent::TreasuryProposed { proposal_id: 31 }]),
            )
            .await
            .unwrap();

        let proposals = fx.store.treasury_proposals();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].status, Some(TreasuryProposalStatus::Awarded));
        assert_eq!(proposals[0].modified_at, Some(awarded_at.id));
        assert_eq!(proposals[0].value, Some(25_000_000.0));
    }

    #[tokio::test]
    async fn test_earlier_award_does_not_move_modified_at() {
        let fx = Fixture::new().await;
        let proposed_at = fx.block(12).await;
        let awarded_at = fx.block(9).await;

        fx.engine
            .propose_spend(
                &propose_spend(),
                &fx.ctx(&proposed_at, Some("dave"), &[GovernanceEvent::TreasuryProposed { proposal_id: 31 }]),
            )
            .await
            .unwrap();
        fx.engine.treasury_awarded(31, "bene", &awarded_at).await.unwrap();

        let proposal = &fx.store.treasury_proposals()[0];
        assert_eq!(proposal.status, Some(TreasuryProposalStatus::Proposed));
        assert_eq!(proposal.modified_at, Some(proposed_at.id));
    }
}
