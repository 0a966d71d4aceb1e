//! Typed decoding of rendered extrinsics and event records
//!
//! The node renders runtime values as human-readable JSON. Everything that
//! pokes into that JSON lives here: the rest of the engine sees [`Call`],
//! [`DecodedExtrinsic`] and [`GovernanceEvent`] only.
//!
//! Event data is accepted either positionally (`[hash, who, deposit]`) or as
//! an object of named fields, whichever the runtime metadata produces.

use serde_json::{Map, Value};

use super::numeric;
use crate::domain::errors::DecodeError;
use crate::domain::models::{BountyStatus, CouncilMotionStatus, ReferendumStatus};

/// A call: the pallet section, the method and its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub section: String,
    pub method: String,
    pub args: Value,
}

impl Call {
    /// Decode a call rendered as `{section, method, args}`
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let section = text_field(value, "section")?;
        let method = text_field(value, "method")?;
        Ok(Self {
            section,
            method,
            args: value.get("args").cloned().unwrap_or(Value::Null),
        })
    }

    /// Look up an argument by its snake_case name
    ///
    /// Older runtimes render argument names in snake_case, newer ones in
    /// camelCase; both are accepted.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        let args = self.args.as_object()?;
        args.get(name)
            .or_else(|| args.get(&camel_case(name)))
            .filter(|v| !v.is_null())
    }

    /// Like [`Call::arg`] but fails when the argument is absent
    pub fn required_arg(&self, name: &str) -> Result<&Value, DecodeError> {
        self.arg(name)
            .ok_or_else(|| DecodeError::MissingField(format!("{}.{}.{}", self.section, self.method, name)))
    }

    /// Required argument rendered as text
    pub fn text_arg(&self, name: &str) -> Result<String, DecodeError> {
        let value = self.required_arg(name)?;
        render_text(value).ok_or_else(|| DecodeError::invalid(name, format!("expected text, got {}", value)))
    }

    /// Optional argument rendered as text
    pub fn optional_text_arg(&self, name: &str) -> Option<String> {
        self.arg(name).and_then(render_text)
    }

    /// Required on-chain index argument
    pub fn index_arg(&self, name: &str) -> Result<i64, DecodeError> {
        numeric::parse_index(&self.text_arg(name)?)
    }

    /// Required boolean argument (`true`, `"true"` or `"Yes"`)
    pub fn flag_arg(&self, name: &str) -> Result<bool, DecodeError> {
        match self.required_arg(name)? {
            Value::Bool(flag) => Ok(*flag),
            Value::String(s) if s.eq_ignore_ascii_case("true") || s == "Yes" => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") || s == "No" => Ok(false),
            other => Err(DecodeError::invalid(name, format!("expected a flag, got {}", other))),
        }
    }

    /// Required argument holding a nested call
    pub fn call_arg(&self, name: &str) -> Result<Call, DecodeError> {
        Call::from_value(self.required_arg(name)?)
    }
}

/// An extrinsic with its signer and outer call
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedExtrinsic {
    pub index: u32,
    /// `None` for unsigned extrinsics (inherents)
    pub signer: Option<String>,
    pub call: Call,
}

impl DecodedExtrinsic {
    /// Decode the extrinsic at position `index` of a block
    pub fn from_value(index: u32, value: &Value) -> Result<Self, DecodeError> {
        let method = value
            .get("method")
            .ok_or_else(|| DecodeError::MissingField("method".to_string()))?;

        let is_signed = value
            .get("isSigned")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let signer = if is_signed {
            value.get("signer").and_then(render_text)
        } else {
            None
        };

        Ok(Self {
            index,
            signer,
            call: Call::from_value(method)?,
        })
    }
}

/// Phase of block execution an event was emitted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialization,
    ApplyExtrinsic(u32),
    Finalization,
}

impl Phase {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) if s.eq_ignore_ascii_case("initialization") => Ok(Phase::Initialization),
            Value::String(s) if s.eq_ignore_ascii_case("finalization") => Ok(Phase::Finalization),
            Value::Object(map) => {
                let index = map
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("applyextrinsic"))
                    .map(|(_, v)| v)
                    .ok_or_else(|| DecodeError::InvalidPhase(value.to_string()))?;
                let index = render_text(index)
                    .and_then(|s| numeric::parse_index(&s).ok())
                    .and_then(|i| u32::try_from(i).ok())
                    .ok_or_else(|| DecodeError::InvalidPhase(value.to_string()))?;
                Ok(Phase::ApplyExtrinsic(index))
            }
            other => Err(DecodeError::InvalidPhase(other.to_string())),
        }
    }
}

/// Aye/nay, conviction and locked balance of a standard democracy vote
#[derive(Debug, Clone, PartialEq)]
pub struct StandardVote {
    pub aye: bool,
    pub conviction: f64,
    pub balance: f64,
}

/// Events the reconciliation engine reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum GovernanceEvent {
    ExtrinsicFailed,
    CouncilProposed { proposal_index: i64, motion_hash: String },
    /// `Approved`, `Rejected` or `Disapproved`
    CouncilOutcome(CouncilMotionStatus),
    BountyProposed { bounty_id: i64 },
    /// `BountyRejected`, `BountyAwarded`, `BountyExtended` or `BountyCanceled`
    BountyLifecycle { bounty_id: i64, status: BountyStatus },
    BountyClaimed { bounty_id: i64 },
    TreasuryProposed { proposal_id: i64 },
    TreasuryAwarded { proposal_id: i64, beneficiary: String },
    NewTerm { members: Vec<String> },
    DemocracyProposed { proposal_index: i64 },
    DemocracyTabled { proposal_index: i64 },
    ReferendumStarted { referendum_index: i64, threshold: Option<String> },
    /// `Executed`, `Passed`, `NotPassed` or `Cancelled`
    ReferendumClosed { referendum_index: i64, status: ReferendumStatus },
    Seconded { who: String, proposal_index: i64 },
    /// `vote` is `None` for split votes
    Voted { voter: String, referendum_index: i64, vote: Option<StandardVote> },
    PreimageNoted { proposal_hash: String, who: String },
    NewTip { tip_hash: String },
    TipClosed { tip_hash: String, payout: f64 },
    /// Anything else; kept so correlation still sees the event
    Other { section: String, method: String },
}

/// An event together with the phase it was emitted in
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub phase: Phase,
    pub event: GovernanceEvent,
}

impl EventRecord {
    /// Decode a record rendered as `{phase, event: {section, method, data}}`
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let phase = value
            .get("phase")
            .ok_or_else(|| DecodeError::MissingField("phase".to_string()))
            .and_then(Phase::from_value)?;
        let event = value
            .get("event")
            .ok_or_else(|| DecodeError::MissingField("event".to_string()))?;

        let section = text_field(event, "section")?;
        let method = text_field(event, "method")?;
        let data = event.get("data").unwrap_or(&Value::Null);

        Ok(Self {
            phase,
            event: decode_event(&section, &method, data)?,
        })
    }
}

/// Decode all event records of a block
pub fn decode_events(records: &[Value]) -> Result<Vec<EventRecord>, DecodeError> {
    records.iter().map(EventRecord::from_value).collect()
}

/// Decode all extrinsics of a block, in block order
pub fn decode_extrinsics(extrinsics: &[Value]) -> Result<Vec<DecodedExtrinsic>, DecodeError> {
    extrinsics
        .iter()
        .enumerate()
        .map(|(index, value)| DecodedExtrinsic::from_value(index as u32, value))
        .collect()
}

fn decode_event(section: &str, method: &str, data: &Value) -> Result<GovernanceEvent, DecodeError> {
    let fields = EventData { data, method };
    let event = match (section.to_ascii_lowercase().as_str(), method) {
        ("system", "ExtrinsicFailed") => GovernanceEvent::ExtrinsicFailed,

        ("council", "Proposed") => GovernanceEvent::CouncilProposed {
            proposal_index: fields.index(1, &["proposalIndex", "proposal_index"])?,
            motion_hash: fields.text(2, &["proposalHash", "proposal_hash"])?,
        },
        ("council", "Approved") => GovernanceEvent::CouncilOutcome(CouncilMotionStatus::Approved),
        ("council", "Rejected") => GovernanceEvent::CouncilOutcome(CouncilMotionStatus::Rejected),
        ("council", "Disapproved") => {
            GovernanceEvent::CouncilOutcome(CouncilMotionStatus::Disapproved)
        }

        ("bounties", "BountyProposed") => GovernanceEvent::BountyProposed {
            bounty_id: fields.index(0, &["index"])?,
        },
        ("bounties", "BountyRejected") => bounty_lifecycle(&fields, BountyStatus::Rejected)?,
        ("bounties", "BountyAwarded") => bounty_lifecycle(&fields, BountyStatus::Awarded)?,
        ("bounties", "BountyExtended") => bounty_lifecycle(&fields, BountyStatus::Extended)?,
        ("bounties", "BountyCanceled") | ("bounties", "BountyCancelled") => {
            bounty_lifecycle(&fields, BountyStatus::Cancelled)?
        }
        ("bounties", "BountyClaimed") => GovernanceEvent::BountyClaimed {
            bounty_id: fields.index(0, &["index"])?,
        },

        ("treasury", "Proposed") => GovernanceEvent::TreasuryProposed {
            proposal_id: fields.index(0, &["proposalIndex", "proposal_index"])?,
        },
        ("treasury", "Awarded") => GovernanceEvent::TreasuryAwarded {
            proposal_id: fields.index(0, &["proposalIndex", "proposal_index"])?,
            beneficiary: fields.text(2, &["account"])?,
        },

        ("phragmenelection", "NewTerm")
        | ("elections", "NewTerm")
        | ("electionsphragmen", "NewTerm") => GovernanceEvent::NewTerm {
            members: new_term_members(fields.required(0, &["newMembers", "new_members"])?)?,
        },

        ("democracy", "Proposed") => GovernanceEvent::DemocracyProposed {
            proposal_index: fields.index(0, &["proposalIndex", "proposal_index"])?,
        },
        ("democracy", "Tabled") => GovernanceEvent::DemocracyTabled {
            proposal_index: fields.index(0, &["proposalIndex", "proposal_index"])?,
        },
        ("democracy", "Started") => GovernanceEvent::ReferendumStarted {
            referendum_index: fields.index(0, &["refIndex", "ref_index"])?,
            threshold: fields.get(1, &["threshold"]).and_then(render_text),
        },
        ("democracy", "Executed") => referendum_closed(&fields, ReferendumStatus::Executed)?,
        ("democracy", "Passed") => referendum_closed(&fields, ReferendumStatus::Passed)?,
        ("democracy", "NotPassed") => referendum_closed(&fields, ReferendumStatus::NotPassed)?,
        ("democracy", "Cancelled") => referendum_closed(&fields, ReferendumStatus::Cancelled)?,
        ("democracy", "Seconded") => GovernanceEvent::Seconded {
            who: fields.text(0, &["seconder", "who"])?,
            proposal_index: fields.index(1, &["propIndex", "prop_index", "proposalIndex"])?,
        },
        ("democracy", "Voted") => GovernanceEvent::Voted {
            voter: fields.text(0, &["voter"])?,
            referendum_index: fields.index(1, &["refIndex", "ref_index"])?,
            vote: standard_vote(fields.required(2, &["vote"])?)?,
        },
        ("democracy", "PreimageNoted") => GovernanceEvent::PreimageNoted {
            proposal_hash: fields.text(0, &["proposalHash", "proposal_hash"])?,
            who: fields.text(1, &["who"])?,
        },

        ("tips", "NewTip") => GovernanceEvent::NewTip {
            tip_hash: fields.text(0, &["tipHash", "tip_hash"])?,
        },
        ("tips", "TipClosed") => GovernanceEvent::TipClosed {
            tip_hash: fields.text(0, &["tipHash", "tip_hash"])?,
            payout: numeric::parse_grouped_amount(&fields.text(2, &["payout"])?)?,
        },

        _ => GovernanceEvent::Other {
            section: section.to_string(),
            method: method.to_string(),
        },
    };
    Ok(event)
}

fn bounty_lifecycle(fields: &EventData<'_>, status: BountyStatus) -> Result<GovernanceEvent, DecodeError> {
    Ok(GovernanceEvent::BountyLifecycle {
        bounty_id: fields.index(0, &["index"])?,
        status,
    })
}

fn referendum_closed(
    fields: &EventData<'_>,
    status: ReferendumStatus,
) -> Result<GovernanceEvent, DecodeError> {
    Ok(GovernanceEvent::ReferendumClosed {
        referendum_index: fields.index(0, &["refIndex", "ref_index"])?,
        status,
    })
}

/// `NewTerm` carries `[[account, balance], ...]`; only the accounts are kept
fn new_term_members(value: &Value) -> Result<Vec<String>, DecodeError> {
    let members = value
        .as_array()
        .ok_or_else(|| DecodeError::invalid("newMembers", "expected a list"))?;
    members
        .iter()
        .map(|member| {
            let account = match member {
                Value::Array(pair) => pair.first().unwrap_or(&Value::Null),
                other => other,
            };
            render_text(account)
                .ok_or_else(|| DecodeError::invalid("newMembers", format!("bad member {}", member)))
        })
        .collect()
}

/// Decode `{Standard: {vote: {vote, conviction}, balance}}`
///
/// Split votes carry no single direction and yield `None`.
fn standard_vote(value: &Value) -> Result<Option<StandardVote>, DecodeError> {
    let Some(standard) = value.get("Standard").or_else(|| value.get("standard")) else {
        return Ok(None);
    };

    let vote = standard
        .get("vote")
        .ok_or_else(|| DecodeError::MissingField("vote.Standard.vote".to_string()))?;
    let direction = vote
        .get("vote")
        .and_then(render_text)
        .ok_or_else(|| DecodeError::MissingField("vote.Standard.vote.vote".to_string()))?;
    let conviction = vote
        .get("conviction")
        .and_then(render_text)
        .ok_or_else(|| DecodeError::MissingField("vote.Standard.vote.conviction".to_string()))?;
    let balance = standard
        .get("balance")
        .and_then(render_text)
        .ok_or_else(|| DecodeError::MissingField("vote.Standard.balance".to_string()))?;

    Ok(Some(StandardVote {
        aye: direction == "Aye",
        conviction: numeric::parse_conviction(&conviction)?,
        balance: numeric::parse_grouped_amount(&balance)?,
    }))
}

/// Positional or named access to event data
struct EventData<'a> {
    data: &'a Value,
    method: &'a str,
}

impl<'a> EventData<'a> {
    fn get(&self, position: usize, names: &[&str]) -> Option<&'a Value> {
        let value = match self.data {
            Value::Array(items) => items.get(position),
            Value::Object(map) => lookup(map, names),
            _ => None,
        };
        value.filter(|v| !v.is_null())
    }

    fn required(&self, position: usize, names: &[&str]) -> Result<&'a Value, DecodeError> {
        self.get(position, names).ok_or_else(|| {
            DecodeError::MissingField(format!(
                "{}.data[{}]",
                self.method,
                names.first().copied().unwrap_or_default()
            ))
        })
    }

    fn text(&self, position: usize, names: &[&str]) -> Result<String, DecodeError> {
        let value = self.required(position, names)?;
        render_text(value)
            .ok_or_else(|| DecodeError::invalid(self.method, format!("expected text, got {}", value)))
    }

    fn index(&self, position: usize, names: &[&str]) -> Result<i64, DecodeError> {
        numeric::parse_index(&self.text(position, names)?)
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| map.get(*name))
}

fn text_field(value: &Value, name: &str) -> Result<String, DecodeError> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::MissingField(name.to_string()))
}

/// Render a scalar value as text
///
/// Addresses may arrive wrapped as `{Id: address}`.
pub fn render_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) if map.len() == 1 => map
            .get("Id")
            .or_else(|| map.get("id"))
            .and_then(render_text),
        _ => None,
    }
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signed_extrinsic() {
        let extrinsic = json!({
            "isSigned": true,
            "signer": { "Id": "5Alice" },
            "method": {
                "section": "bounties",
                "method": "proposeBounty",
                "args": { "value": "1,000", "description": "road" }
            }
        });

        let decoded = DecodedExtrinsic::from_value(3, &extrinsic).unwrap();
        assert_eq!(decoded.index, 3);
        assert_eq!(decoded.signer.as_deref(), Some("5Alice"));
        assert_eq!(decoded.call.section, "bounties");
        assert_eq!(decoded.call.text_arg("value").unwrap(), "1,000");
    }

    #[test]
    fn test_unsigned_extrinsic_has_no_signer() {
        let extrinsic = json!({
            "isSigned": false,
            "method": { "section": "timestamp", "method": "set", "args": { "now": "1,600,000" } }
        });

        let decoded = DecodedExtrinsic::from_value(0, &extrinsic).unwrap();
        assert_eq!(decoded.signer, None);
    }

    #[test]
    fn test_camel_case_argument_fallback() {
        let call = Call::from_value(&json!({
            "section": "council",
            "method": "close",
            "args": { "proposalHash": "0xabc", "index": "4" }
        }))
        .unwrap();

        assert_eq!(call.text_arg("proposal_hash").unwrap(), "0xabc");
        assert!(matches!(
            call.required_arg("length_bound"),
            Err(DecodeError::MissingField(_))
        ));
    }

    #[test]
    fn test_phase_forms() {
        assert_eq!(Phase::from_value(&json!("Initialization")).unwrap(), Phase::Initialization);
        assert_eq!(Phase::from_value(&json!("Finalization")).unwrap(), Phase::Finalization);
        assert_eq!(
            Phase::from_value(&json!({ "ApplyExtrinsic": "1,002" })).unwrap(),
            Phase::ApplyExtrinsic(1002)
        );
        assert_eq!(
            Phase::from_value(&json!({ "applyExtrinsic": 2 })).unwrap(),
            Phase::ApplyExtrinsic(2)
        );
        assert!(matches!(
            Phase::from_value(&json!("Sometime")),
            Err(DecodeError::InvalidPhase(_))
        ));
    }

    #[test]
    fn test_positional_and_named_event_data() {
        let positional = EventRecord::from_value(&json!({
            "phase": { "ApplyExtrinsic": 1 },
            "event": {
                "section": "council",
                "method": "Proposed",
                "data": ["5Alice", "12", "0xmotion", "3"]
            }
        }))
        .unwrap();
        let named = EventRecord::from_value(&json!({
            "phase": { "ApplyExtrinsic": 1 },
            "event": {
                "section": "council",
                "method": "Proposed",
                "data": {
                    "account": "5Alice",
                    "proposalIndex": "12",
                    "proposalHash": "0xmotion",
                    "threshold": "3"
                }
            }
        }))
        .unwrap();

        let expected = GovernanceEvent::CouncilProposed {
            proposal_index: 12,
            motion_hash: "0xmotion".to_string(),
        };
        assert_eq!(positional.event, expected);
        assert_eq!(named.event, expected);
    }

    #[test]
    fn test_new_term_members() {
        let record = EventRecord::from_value(&json!({
            "phase": "Initialization",
            "event": {
                "section": "phragmenElection",
                "method": "NewTerm",
                "data": [[["5Alice", "1,000"], ["5Bob", "2,000"]]]
            }
        }))
        .unwrap();

        assert_eq!(
            record.event,
            GovernanceEvent::NewTerm {
                members: vec!["5Alice".to_string(), "5Bob".to_string()]
            }
        );
    }

    #[test]
    fn test_standard_and_split_votes() {
        let standard = json!({
            "Standard": { "vote": { "vote": "Aye", "conviction": "Locked2x" }, "balance": "1,500" }
        });
        assert_eq!(
            standard_vote(&standard).unwrap(),
            Some(StandardVote {
                aye: true,
                conviction: 2.0,
                balance: 1500.0
            })
        );

        let split = json!({ "Split": { "aye": "10", "nay": "5" } });
        assert_eq!(standard_vote(&split).unwrap(), None);
    }

    #[test]
    fn test_unknown_events_are_kept() {
        let record = EventRecord::from_value(&json!({
            "phase": { "ApplyExtrinsic": 0 },
            "event": { "section": "balances", "method": "Transfer", "data": ["a", "b", "1"] }
        }))
        .unwrap();

        assert_eq!(
            record.event,
            GovernanceEvent::Other {
                section: "balances".to_string(),
                method: "Transfer".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_governance_event_is_a_decode_error() {
        let result = EventRecord::from_value(&json!({
            "phase": { "ApplyExtrinsic": 0 },
            "event": { "section": "bounties", "method": "BountyProposed", "data": ["not a number"] }
        }));

        assert!(matches!(result, Err(DecodeError::InvalidNumber(_))));
    }
}
