pub mod call_decoder;
pub mod dispatcher;
pub mod event_correlator;
pub mod numeric;
pub mod preimage_decoder;
pub mod reconciliation; // Per-domain upsert handlers

// Re-export services for direct imports
pub use call_decoder::{Call, DecodedExtrinsic, EventRecord, GovernanceEvent};
pub use dispatcher::{CallKind, DispatchTable, Dispatcher};
pub use event_correlator::BlockEvents;
pub use preimage_decoder::PreimageDecoder;
pub use reconciliation::{CallContext, ReconciliationEngine};
