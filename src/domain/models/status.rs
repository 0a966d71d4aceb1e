//! Status and type enums of the governance entities
//!
//! Statuses are persisted as their variant name, the same strings the read
//! API hands out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! stored_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Returns the persisted name of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

stored_enum!(
    /// Lifecycle of a council motion
    CouncilMotionStatus {
        Proposed,
        Approved,
        Rejected,
        Disapproved,
    }
);

stored_enum!(
    /// Lifecycle of a bounty
    BountyStatus {
        Proposed,
        Awarded,
        Rejected,
        Extended,
        Cancelled,
        Claimed,
    }
);

stored_enum!(
    /// Lifecycle of a democracy proposal
    ProposalStatus {
        Proposed,
        Tabled,
    }
);

stored_enum!(
    /// Kind of proposal. Only democracy proposals are indexed.
    ProposalType {
        Democracy,
    }
);

stored_enum!(
    /// Lifecycle of a referendum
    ReferendumStatus {
        Started,
        Tabled,
        Executed,
        Passed,
        NotPassed,
        Cancelled,
    }
);

stored_enum!(
    /// Lifecycle of a tip proposal
    TipProposalStatus {
        Proposed,
        Retracted,
        Closed,
    }
);

stored_enum!(
    /// Lifecycle of a treasury proposal
    TreasuryProposalStatus {
        Proposed,
        Awarded,
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip_through_storage_form() {
        assert_eq!(ReferendumStatus::NotPassed.as_str(), "NotPassed");
        assert_eq!(
            "NotPassed".parse::<ReferendumStatus>(),
            Ok(ReferendumStatus::NotPassed)
        );
        assert_eq!(BountyStatus::Claimed.to_string(), "Claimed");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("Approved".parse::<TipProposalStatus>().is_err());
    }
}
