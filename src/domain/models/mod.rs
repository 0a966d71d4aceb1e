pub mod bounty;
pub mod chain;
pub mod council;
pub mod democracy;
pub mod status;
pub mod tip;
pub mod treasury;

pub use bounty::Bounty;
pub use chain::{Account, Block, Chain};
pub use council::{CouncilMotion, CouncilMotionVote, Councilor, Councilterm};
pub use democracy::{Endorsement, PreimageCall, Proposal, Referendum, ReferendumVote};
pub use status::{
    BountyStatus, CouncilMotionStatus, ProposalStatus, ProposalType, ReferendumStatus,
    TipProposalStatus, TreasuryProposalStatus,
};
pub use tip::{Tip, TipProposal};
pub use treasury::TreasuryProposal;
