use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{Bounty, BountyStatus};
use crate::domain::services::call_decoder::{Call, GovernanceEvent};
use crate::domain::services::numeric;

impl ReconciliationEngine {
    /// `bounties.proposeBounty`
    pub async fn propose_bounty(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let proposed: Vec<i64> = ctx
            .events
            .iter()
            .filter_map(|event| match event {
                GovernanceEvent::BountyProposed { bounty_id } => Some(*bounty_id),
                _ => None,
            })
            .collect();
        if proposed.is_empty() {
            return Ok(());
        }

        let description = call.text_arg("description")?;
        let value = numeric::parse_grouped_amount(&call.text_arg("value")?)?;
        let proposer = self.signer_account_id(ctx).await?;

        for bounty_id in proposed {
            match self.store.get_bounty(self.chain_id, bounty_id).await? {
                Some(mut bounty) => {
                    bounty.description = Some(description.clone());
                    bounty.value = Some(value);
                    bounty.proposed_by = proposer;
                    bounty.proposed_at = Some(ctx.block.id);
                    if self.is_newer(ctx.block, bounty.modified_at).await? {
                        bounty.status = Some(BountyStatus::Proposed);
                        bounty.modified_at = Some(ctx.block.id);
                    }
                    self.store.update_bounty(&bounty).await?;
                }
                None => {
                    let mut bounty = Bounty::new(self.chain_id, bounty_id, BountyStatus::Proposed, ctx.block.id);
                    bounty.description = Some(description.clone());
                    bounty.value = Some(value);
                    bounty.proposed_by = proposer;
                    bounty.proposed_at = Some(ctx.block.id);
                    self.store.insert_bounty(bounty).await?;
                }
            }
        }
        Ok(())
    }

    /// `bounties.claimBounty`, also reached through `multisig.asMulti`
    pub async fn claim_bounty(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        for event in ctx.events {
            if let GovernanceEvent::BountyClaimed { bounty_id } = event {
                self.set_bounty_status(*bounty_id, BountyStatus::Claimed, ctx).await?;
            }
        }
        Ok(())
    }

    /// Close, extend and award extrinsics of the bounties pallet
    pub async fn close_bounty(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        self.bounty_lifecycle(ctx).await
    }

    /// Apply every bounty lifecycle event correlated with the call
    pub(super) async fn bounty_lifecycle(&self, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        for event in ctx.events {
            if let GovernanceEvent::BountyLifecycle { bounty_id, status } = event {
                self.set_bounty_status(*bounty_id, *status, ctx).await?;
            }
        }
        Ok(())
    }

    async fn set_bounty_status(
        &self,
        bounty_id: i64,
        status: BountyStatus,
        ctx: &CallContext<'_>,
    ) -> Result<(), ReconcileError> {
        match self.store.get_bounty(self.chain_id, bounty_id).await? {
            Some(mut bounty) => {
                if self.is_newer(ctx.block, bounty.modified_at).await? {
                    bounty.status = Some(status);
                    bounty.modified_at = Some(ctx.block.id);
                    self.store.update_bounty(&bounty).await?;
                }
            }
            None => {
                self.store
                    .insert_bounty(Bounty::new(self.chain_id, bounty_id, status, ctx.block.id))
                    .await?;
            }
        }
        Ok(())
    }
}
