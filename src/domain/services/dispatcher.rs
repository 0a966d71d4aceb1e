//! Routing of calls to reconciliation handlers
//!
//! Wrapper calls (proxy and batch) are unwrapped at every nesting level and
//! their inner calls dispatched with the outer extrinsic's context. Calls
//! without a route are ignored.

use std::collections::HashMap;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use super::call_decoder::Call;
use super::reconciliation::{CallContext, ReconciliationEngine};
use crate::domain::errors::ReconcileError;

/// What a routed call does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// Dispatch the embedded `call` argument
    Proxy,
    /// Dispatch every element of the `calls` argument
    Batch,
    CouncilVote,
    CouncilClose,
    CouncilPropose,
    ProposeBounty,
    ClaimBounty,
    /// Close, extend or award a bounty
    CloseBounty,
    ProposeSpend,
    TimestampSet,
    DemocracyPropose,
    DemocracySecond,
    DemocracyVote,
    NotePreimage,
    ReportAwesome,
    RetractTip,
    CloseTip,
    Tip,
    TipNew,
}

const ROUTES: &[(&str, &str, CallKind)] = &[
    ("proxy", "proxy", CallKind::Proxy),
    ("utility", "batch", CallKind::Batch),
    ("utility", "batchAll", CallKind::Batch),
    // multisig payloads are only inspected for bounty claims
    ("multisig", "asMulti", CallKind::ClaimBounty),
    ("council", "vote", CallKind::CouncilVote),
    ("council", "close", CallKind::CouncilClose),
    ("council", "propose", CallKind::CouncilPropose),
    ("bounties", "proposeBounty", CallKind::ProposeBounty),
    ("bounties", "claimBounty", CallKind::ClaimBounty),
    ("bounties", "closeBounty", CallKind::CloseBounty),
    ("bounties", "extendBountyExpiry", CallKind::CloseBounty),
    ("bounties", "awardBounty", CallKind::CloseBounty),
    ("treasury", "proposeSpend", CallKind::ProposeSpend),
    ("timestamp", "set", CallKind::TimestampSet),
    ("democracy", "propose", CallKind::DemocracyPropose),
    ("democracy", "second", CallKind::DemocracySecond),
    ("democracy", "vote", CallKind::DemocracyVote),
    ("democracy", "notePreimage", CallKind::NotePreimage),
    ("tips", "reportAwesome", CallKind::ReportAwesome),
    ("tips", "retractTip", CallKind::RetractTip),
    ("tips", "closeTip", CallKind::CloseTip),
    ("tips", "tip", CallKind::Tip),
    ("tips", "tipNew", CallKind::TipNew),
];

/// Case-insensitive (section, method) to [`CallKind`] lookup
#[derive(Debug, Clone)]
pub struct DispatchTable {
    routes: HashMap<(String, String), CallKind>,
}

impl DispatchTable {
    pub fn new() -> Self {
        let routes = ROUTES
            .iter()
            .map(|(section, method, kind)| ((section.to_lowercase(), method.to_lowercase()), *kind))
            .collect();
        Self { routes }
    }

    pub fn route(&self, section: &str, method: &str) -> Option<CallKind> {
        self.routes
            .get(&(section.to_lowercase(), method.to_lowercase()))
            .copied()
    }

    /// Every routed (section, method) pair
    pub fn routes(&self) -> impl Iterator<Item = (&str, &str, CallKind)> + '_ {
        self.routes
            .iter()
            .map(|((section, method), kind)| (section.as_str(), method.as_str(), *kind))
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwraps calls and hands them to the [`ReconciliationEngine`]
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: DispatchTable,
    engine: ReconciliationEngine,
}

impl Dispatcher {
    pub fn new(engine: ReconciliationEngine) -> Self {
        Self {
            table: DispatchTable::new(),
            engine,
        }
    }

    pub fn dispatch<'a>(
        &'a self,
        call: &'a Call,
        ctx: &'a CallContext<'a>,
    ) -> BoxFuture<'a, Result<(), ReconcileError>> {
        async move {
            let Some(kind) = self.table.route(&call.section, &call.method) else {
                return Ok(());
            };
            match kind {
                CallKind::Proxy => match call.arg("call") {
                    Some(inner) => {
                        let inner = Call::from_value(inner)?;
                        self.dispatch(&inner, ctx).await
                    }
                    None => Ok(()),
                },
                CallKind::Batch => {
                    let calls = call.arg("calls").and_then(Value::as_array);
                    for inner in calls.into_iter().flatten() {
                        let inner = Call::from_value(inner)?;
                        self.dispatch(&inner, ctx).await?;
                    }
                    Ok(())
                }
                kind => self.reconcile(kind, call, ctx).await,
            }
        }
        .boxed()
    }

    async fn reconcile(&self, kind: CallKind, call: &Call, ctx: &CallContext<'_>) -> Result<(), ReconcileError> {
        let engine = &self.engine;
        match kind {
            CallKind::Proxy | CallKind::Batch => Ok(()),
            CallKind::CouncilVote => engine.council_vote(call, ctx).await,
            CallKind::CouncilClose => engine.council_close(call, ctx).await,
            CallKind::CouncilPropose => engine.council_propose(call, ctx).await,
            CallKind::ProposeBounty => engine.propose_bounty(call, ctx).await,
            CallKind::ClaimBounty => engine.claim_bounty(call, ctx).await,
            CallKind::CloseBounty => engine.close_bounty(call, ctx).await,
            CallKind::ProposeSpend => engine.propose_spend(call, ctx).await,
            CallKind::TimestampSet => engine.timestamp_set(call, ctx).await,
            CallKind::DemocracyPropose => engine.democracy_propose(call, ctx).await,
            CallKind::DemocracySecond => engine.democracy_second(call, ctx).await,
            CallKind::DemocracyVote => engine.democracy_vote(call, ctx).await,
            CallKind::NotePreimage => engine.note_preimage(call, ctx).await,
            CallKind::ReportAwesome => engine.report_awesome(call, ctx).await,
            CallKind::RetractTip => engine.retract_tip(call, ctx).await,
            CallKind::CloseTip => engine.close_tip(call, ctx).await,
            CallKind::Tip => engine.tip(call, ctx).await,
            CallKind::TipNew => engine.tip_new(call, ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::services::reconciliation::testing::Fixture;

    fn dispatcher(fx: &Fixture) -> Dispatcher {
        Dispatcher::new(fx.engine.clone())
    }

    fn council_vote(hash: &str) -> Value {
        json!({
            "section": "council",
            "method": "vote",
            "args": { "proposal": hash, "index": 1, "approve": true }
        })
    }

    #[test]
    fn test_routes_ignore_case() {
        let table = DispatchTable::new();
        assert_eq!(table.route("Utility", "batch_all"), None);
        assert_eq!(table.route("utility", "BATCHALL"), Some(CallKind::Batch));
        assert_eq!(table.route("Council", "vote"), Some(CallKind::CouncilVote));
        assert_eq!(table.route("system", "remark"), None);
        assert_eq!(table.routes().count(), ROUTES.len());
    }

    #[tokio::test]
    async fn test_proxy_vote_is_attributed_to_signer() {
        let fx = Fixture::new().await;
        let block = fx.block(1).await;
        let proxy = Call::from_value(&json!({
            "section": "proxy",
            "method": "proxy",
            "args": { "real": "owner", "force_proxy_type": null, "call": council_vote("0xm") }
        }))
        .unwrap();

        dispatcher(&fx)
            .dispatch(&proxy, &fx.ctx(&block, Some("delegate"), &[]))
            .await
            .unwrap();

        let votes = fx.store.council_motion_votes();
        assert_eq!(votes.len(), 1);
        assert_eq!(fx.store.address_of(votes[0].account_id).as_deref(), Some("delegate"));
    }

    #[tokio::test]
    async fn test_batch_dispatches_nested_calls() {
        let fx = Fixture::new().await;
        let block = fx.block(1).await;
        let batch = Call::from_value(&json!({
            "section": "utility",
            "method": "batch",
            "args": {
                "calls": [
                    council_vote("0xa"),
                    { "section": "tips", "method": "tip", "args": { "hash": "0xt", "tip_value": "2" } },
                    {
                        "section": "proxy",
                        "method": "proxy",
                        "args": { "call": council_vote("0xb") }
                    }
                ]
            }
        }))
        .unwrap();

        dispatcher(&fx)
            .dispatch(&batch, &fx.ctx(&block, Some("signer"), &[]))
            .await
            .unwrap();

        assert_eq!(fx.store.council_motion_votes().len(), 2);
        assert_eq!(fx.store.tips().len(), 1);
        assert!(fx
            .store
            .accounts()
            .iter()
            .all(|account| account.address == "signer"));
    }

    #[tokio::test]
    async fn test_proxy_without_inner_call_is_noop() {
        let fx = Fixture::new().await;
        let block = fx.block(1).await;
        let proxy = Call::from_value(&json!({ "section": "proxy", "method": "proxy", "args": {} })).unwrap();

        dispatcher(&fx)
            .dispatch(&proxy, &fx.ctx(&block, Some("delegate"), &[]))
            .await
            .unwrap();

        assert_eq!(fx.store.governance_row_count(), 0);
    }
}
