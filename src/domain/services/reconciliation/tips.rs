use super::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{Tip, TipProposal, TipProposalStatus};
use crate::domain::services::call_decoder::{Call, GovernanceEvent};
use crate::domain::services::numeric;
use crate::utils::logging;

fn new_tip_hash(events: &[GovernanceEvent]) -> Option<&str> {
    events.iter().find_map(|event| match event {
        GovernanceEvent::NewTip { tip_hash } => Some(tip_hash.as_str()),
        _ => None,
    })
}

impl ReconciliationEngine {
    /// `tips.reportAwesome`
    pub async fn report_awesome(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        if let Some(tip_hash) = new_tip_hash(ctx.events) {
            self.record_report(tip_hash, call, ctx).await?;
        }
        Ok(())
    }

    /// `tips.tipNew`: a report that carries the finder's own tip
    pub async fn tip_new(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some(tip_hash) = new_tip_hash(ctx.events) else {
            return Ok(());
        };
        let proposal = self.record_report(tip_hash, call, ctx).await?;

        if let Some(tipper) = self.signer_account_id(ctx).await? {
            let value = numeric::parse_decimal_comma(&call.text_arg("tip_value")?)?;
            self.store
                .insert_tip(Tip {
                    id: 0,
                    tip_proposal_id: proposal.id,
                    tipper,
                    value,
                    tipped_at: ctx.block.id,
                })
                .await?;
        }
        Ok(())
    }

    /// `tips.retractTip`
    pub async fn retract_tip(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let tip_hash = call.text_arg("hash")?;

        match self.store.get_tip_proposal(self.chain_id, &tip_hash).await? {
            Some(mut proposal) => {
                if self.is_newer(ctx.block, proposal.modified_at).await? {
                    proposal.status = Some(TipProposalStatus::Retracted);
                    proposal.modified_at = Some(ctx.block.id);
                    self.store.update_tip_proposal(&proposal).await?;
                }
            }
            None => {
                let mut proposal = TipProposal::new(self.chain_id, tip_hash);
                proposal.status = Some(TipProposalStatus::Retracted);
                proposal.modified_at = Some(ctx.block.id);
                self.store.insert_tip_proposal(proposal).await?;
            }
        }
        Ok(())
    }

    /// `tips.closeTip`: record the final payout
    pub async fn close_tip(&self, _call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some((tip_hash, payout)) = ctx.events.iter().find_map(|event| match event {
            GovernanceEvent::TipClosed { tip_hash, payout } => Some((tip_hash, *payout)),
            _ => None,
        }) else {
            return Ok(());
        };

        match self.store.get_tip_proposal(self.chain_id, tip_hash).await? {
            Some(mut proposal) => {
                proposal.value = Some(payout);
                if self.is_newer(ctx.block, proposal.modified_at).await? {
                    proposal.status = Some(TipProposalStatus::Closed);
                    proposal.modified_at = Some(ctx.block.id);
                }
                self.store.update_tip_proposal(&proposal).await?;
            }
            None => {
                let mut proposal = TipProposal::new(self.chain_id, tip_hash.clone());
                proposal.value = Some(payout);
                proposal.status = Some(TipProposalStatus::Closed);
                proposal.modified_at = Some(ctx.block.id);
                self.store.insert_tip_proposal(proposal).await?;
            }
        }
        Ok(())
    }

    /// `tips.tip`: every tip is kept
    pub async fn tip(&self, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let Some(tipper) = self.signer_account_id(ctx).await? else {
            logging::log_debug("Skipping unsigned tip");
            return Ok(());
        };
        let tip_hash = call.text_arg("hash")?;
        let value = numeric::parse_decimal_comma(&call.text_arg("tip_value")?)?;

        let tip_proposal_id = match self.store.get_tip_proposal(self.chain_id, &tip_hash).await? {
            Some(proposal) => proposal.id,
            None => {
                self.store
                    .insert_tip_proposal(TipProposal::new(self.chain_id, tip_hash))
                    .await?
                    .id
            }
        };

        self.store
            .insert_tip(Tip {
                id: 0,
                tip_proposal_id,
                tipper,
                value,
                tipped_at: ctx.block.id,
            })
            .await?;
        Ok(())
    }

    /// Upsert the tip proposal opened by a report, with the signer as finder
    async fn record_report(
        &self,
        tip_hash: &str,
        call: &Call,
        ctx: &CallContext<'_>,
    ) -> Result<TipProposal, ReconcileError> {
        let reason = call.optional_text_arg("reason");
        let beneficiary = self.account_id(&call.text_arg("who")?).await?;
        let finder = self.signer_account_id(ctx).await?;

        match self.store.get_tip_proposal(self.chain_id, tip_hash).await? {
            Some(mut proposal) => {
                proposal.reason = reason;
                proposal.beneficiary = Some(beneficiary);
                proposal.finder = finder;
                proposal.proposed_at = Some(ctx.block.id);
                if self.is_newer(ctx.block, proposal.modified_at).await? {
                    proposal.status = Some(TipProposalStatus::Proposed);
                    proposal.modified_at = Some(ctx.block.id);
                }
                self.store.update_tip_proposal(&proposal).await?;
                Ok(proposal)
            }
            None => {
                let mut proposal = TipProposal::new(self.chain_id, tip_hash.to_string());
                proposal.reason = reason;
                proposal.beneficiary = Some(beneficiary);
                proposal.finder = finder;
                proposal.proposed_at = Some(ctx.block.id);
                proposal.status = Some(TipProposalStatus::Proposed);
                proposal.modified_at = Some(ctx.block.id);
                Ok(self.store.insert_tip_proposal(proposal).await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::services::reconciliation::testing::Fixture;

    fn call(method: &str, args: serde_json::Value) -> Call {
        Call {
            section: "tips".to_string(),
            method: method.to_string(),
            args,
        }
    }

    fn new_tip() -> [GovernanceEvent; 1] {
        [GovernanceEvent::NewTip {
            tip_hash: "0xtip".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_report_awesome_records_finder_and_beneficiary() {
        let fx = Fixture::new().await;
        let block = fx.block(80).await;

        fx.engine
            .report_awesome(&call("reportAwesome", json!({ "reason": "docs", "who": "ivy" })), &fx.ctx(&block, Some("jack"), &new_tip()))
            .await
            .unwrap();

        let proposal = &fx.store.tip_proposals()[0];
        assert_eq!(proposal.motion_hash, "0xtip");
        assert_eq!(proposal.reason.as_deref(), Some("docs"));
        assert_eq!(fx.store.address_of(proposal.beneficiary.unwrap()).as_deref(), Some("ivy"));
        assert_eq!(fx.store.address_of(proposal.finder.unwrap()).as_deref(), Some("jack"));
        assert_eq!(proposal.status, Some(TipProposalStatus::Proposed));
    }

    #[tokio::test]
    async fn test_tip_new_records_initial_tip() {
        let fx = Fixture::new().await;
        let block = fx.block(80).await;
        let tip_new = call("tipNew", json!({ "reason": "docs", "who": "ivy", "tip_value": "12,5" }));

        fx.engine.tip_new(&tip_new, &fx.ctx(&block, Some("jack"), &new_tip())).await.unwrap();

        let tips = fx.store.tips();
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].value, 12.5);
        assert_eq!(tips[0].tip_proposal_id, fx.store.tip_proposals()[0].id);
    }

    #[tokio::test]
    async fn test_every_tip_is_kept() {
        let fx = Fixture::new().await;
        let block = fx.block(81).await;
        let tip = call("tip", json!({ "hash": "0xtip", "tip_value": "1,5" }));

        fx.engine.tip(&tip, &fx.ctx(&block, Some("kim"), &[])).await.unwrap();
        fx.engine.tip(&tip, &fx.ctx(&block, Some("kim"), &[])).await.unwrap();

        assert_eq!(fx.store.tips().len(), 2);
        let proposals = fx.store.tip_proposals();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].status, None);
        assert_eq!(proposals[0].modified_at, None);
    }

    #[tokio::test]
    async fn test_close_after_retract_in_later_block() {
        let fx = Fixture::new().await;
        let retracted_at = fx.block(90).await;
        let closed_at = fx.block(95).await;
        let closed = [GovernanceEvent::TipClosed {
            tip_hash: "0xtip".to_string(),
            payout: 1234.0,
        }];

        fx.engine
            .close_tip(&call("closeTip", json!({ "hash": "0xtip" })), &fx.ctx(&closed_at, None, &closed))
            .await
            .unwrap();
        fx.engine
            .retract_tip(&call("retractTip", json!({ "hash": "0xtip" })), &fx.ctx(&retracted_at, Some("jack"), &[]))
            .await
            .unwrap();

        let proposal = &fx.store.tip_proposals()[0];
        assert_eq!(proposal.status, Some(TipProposalStatus::Closed));
        assert_eq!(proposal.value, Some(1234.0));
    }
}
