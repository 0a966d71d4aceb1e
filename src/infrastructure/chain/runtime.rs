//! Runtime type information for reading blocks and events
//!
//! Built from the metadata a node serves for a runtime version. Extrinsics
//! (format version 4) and the `System.Events` storage value are decoded
//! against it and rendered by [`ValueRenderer`].

use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use parity_scale_codec::{Compact, Decode};
use scale_info::PortableRegistry;
use serde_json::{Map, Value};

use super::error::ChainClientError;
use super::scale::ValueRenderer;

/// Storage key of `System.Events`: `twox128("System") ++ twox128("Events")`
pub const SYSTEM_EVENTS_KEY: &str =
    "0x26aa394eea5630e07c48ae0c9558cef780d41e5e16056765bc8461851072c9d7";

const EXTRINSIC_FORMAT_VERSION: u8 = 4;
const SIGNED_BIT: u8 = 0b1000_0000;

fn undecodable(message: impl Into<String>) -> ChainClientError {
    ChainClientError::Undecodable(message.into())
}

macro_rules! system_events_ty {
    ($metadata:expr, $version:ident) => {
        $metadata
            .pallets
            .iter()
            .find(|pallet| pallet.name == "System")
            .and_then(|pallet| pallet.storage.as_ref())
            .and_then(|storage| storage.entries.iter().find(|entry| entry.name == "Events"))
            .and_then(|entry| match &entry.ty {
                frame_metadata::$version::StorageEntryType::Plain(ty) => Some(ty.id),
                _ => None,
            })
            .ok_or_else(|| undecodable("metadata has no System.Events storage value"))
    };
}

/// Types of one runtime version
#[derive(Debug)]
pub struct RuntimeTypes {
    types: PortableRegistry,
    call_ty: u32,
    address_ty: u32,
    signature_ty: u32,
    /// Signed extension payloads, in the order they are encoded
    extension_tys: Vec<u32>,
    events_ty: u32,
}

impl RuntimeTypes {
    /// Read runtime types from SCALE encoded metadata (V14 or V15)
    pub fn from_metadata(encoded: &[u8]) -> Result<Self, ChainClientError> {
        let prefixed = RuntimeMetadataPrefixed::decode(&mut &encoded[..])?;
        if prefixed.0 != META_RESERVED {
            return Err(undecodable("metadata does not start with the metadata magic"));
        }

        match prefixed.1 {
            RuntimeMetadata::V14(metadata) => {
                let extrinsic_ty = metadata
                    .types
                    .resolve(metadata.extrinsic.ty.id)
                    .ok_or_else(|| undecodable("extrinsic type is not in the registry"))?;
                let param = |name: &str| {
                    extrinsic_ty
                        .type_params
                        .iter()
                        .find(|param| param.name == name)
                        .and_then(|param| param.ty.as_ref())
                        .map(|ty| ty.id)
                        .ok_or_else(|| undecodable(format!("extrinsic type has no {} parameter", name)))
                };

                let call_ty = param("Call")?;
                let address_ty = param("Address")?;
                let signature_ty = param("Signature")?;
                let extension_tys = metadata
                    .extrinsic
                    .signed_extensions
                    .iter()
                    .map(|extension| extension.ty.id)
                    .collect();
                let events_ty = system_events_ty!(metadata, v14)?;

                Ok(Self {
                    types: metadata.types,
                    call_ty,
                    address_ty,
                    signature_ty,
                    extension_tys,
                    events_ty,
                })
            }
            RuntimeMetadata::V15(metadata) => {
                let events_ty = system_events_ty!(metadata, v15)?;
                Ok(Self {
                    call_ty: metadata.extrinsic.call_ty.id,
                    address_ty: metadata.extrinsic.address_ty.id,
                    signature_ty: metadata.extrinsic.signature_ty.id,
                    extension_tys: metadata
                        .extrinsic
                        .signed_extensions
                        .iter()
                        .map(|extension| extension.ty.id)
                        .collect(),
                    events_ty,
                    types: metadata.types,
                })
            }
            other => Err(undecodable(format!(
                "metadata version {} is not supported",
                other.version()
            ))),
        }
    }

    fn renderer(&self) -> ValueRenderer<'_> {
        ValueRenderer::new(&self.types, self.call_ty)
    }

    /// Decode a length-prefixed extrinsic into
    /// `{isSigned, signer, method: {section, method, args}}`
    pub fn decode_extrinsic(&self, encoded: &[u8]) -> Result<Value, ChainClientError> {
        let input = &mut &encoded[..];
        let declared = Compact::<u32>::decode(input)?.0 as usize;
        if declared != input.len() {
            return Err(undecodable(format!(
                "extrinsic declares {} bytes but carries {}",
                declared,
                input.len()
            )));
        }

        let version = u8::decode(input)?;
        if version & !SIGNED_BIT != EXTRINSIC_FORMAT_VERSION {
            return Err(undecodable(format!(
                "extrinsic format version {} is not supported",
                version & !SIGNED_BIT
            )));
        }

        let renderer = self.renderer();
        let is_signed = version & SIGNED_BIT != 0;
        let mut extrinsic = Map::new();
        extrinsic.insert("isSigned".to_string(), Value::Bool(is_signed));

        if is_signed {
            let signer = renderer.render(self.address_ty, input)?;
            renderer.render(self.signature_ty, input)?;
            for ty in &self.extension_tys {
                renderer.render(*ty, input)?;
            }
            extrinsic.insert("signer".to_string(), signer);
        }

        extrinsic.insert("method".to_string(), renderer.render_call(input)?);
        ensure_consumed(input, "extrinsic")?;
        Ok(Value::Object(extrinsic))
    }

    /// Decode the `System.Events` storage value of a block
    pub fn decode_events(&self, encoded: &[u8]) -> Result<Vec<Value>, ChainClientError> {
        let input = &mut &encoded[..];
        let records = self.renderer().render_event_records(self.events_ty, input)?;
        ensure_consumed(input, "events")?;
        Ok(records)
    }

    /// Decode an encoded call
    ///
    /// With `exact`, bytes left over after the call are an error.
    pub fn decode_call(&self, encoded: &[u8], exact: bool) -> Result<Value, ChainClientError> {
        let input = &mut &encoded[..];
        let call = self.renderer().render_call(input)?;
        if exact {
            ensure_consumed(input, "call")?;
        }
        Ok(call)
    }
}

fn ensure_consumed(input: &[u8], what: &str) -> Result<(), ChainClientError> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(undecodable(format!("{} trailing bytes after {}", input.len(), what)))
    }
}

#[cfg(test)]
mod tests {
    use parity_scale_codec::Encode;
    use scale_info::{meta_type, Registry, TypeInfo};
    use serde_json::json;

    use super::*;
    use crate::domain::services::call_decoder::{self, DecodedExtrinsic, GovernanceEvent};

    #[derive(Encode, TypeInfo)]
    struct AccountId32([u8; 32]);

    #[derive(Encode, TypeInfo)]
    enum MultiAddress {
        Id(AccountId32),
    }

    #[derive(Encode, TypeInfo)]
    enum MultiSignature {
        #[codec(index = 1)]
        Sr25519([u8; 64]),
    }

    #[derive(Encode, TypeInfo)]
    struct CheckNonce(#[codec(compact)] u32);

    #[derive(Encode, TypeInfo)]
    enum RuntimeCall {
        #[codec(index = 2)]
        Timestamp(TimestampCall),
        #[codec(index = 14)]
        Democracy(DemocracyCall),
        #[codec(index = 26)]
        Utility(UtilityCall),
        #[codec(index = 34)]
        Bounties(BountiesCall),
    }

    #[allow(non_camel_case_types)]
    #[derive(Encode, TypeInfo)]
    enum TimestampCall {
        set {
            #[codec(compact)]
            now: u64,
        },
    }

    mod conviction {
        use parity_scale_codec::Encode;
        use scale_info::TypeInfo;

        #[derive(Encode, TypeInfo)]
        pub struct Vote(pub u8);
    }

    #[derive(Encode, TypeInfo)]
    enum AccountVote {
        Standard { vote: conviction::Vote, balance: u128 },
    }

    #[allow(non_camel_case_types)]
    #[derive(Encode, TypeInfo)]
    enum DemocracyCall {
        #[codec(index = 3)]
        vote {
            #[codec(compact)]
            ref_index: u32,
            vote: AccountVote,
        },
    }

    #[allow(non_camel_case_types)]
    #[derive(Encode, TypeInfo)]
    enum UtilityCall {
        batch { calls: Vec<RuntimeCall> },
    }

    #[allow(non_camel_case_types)]
    #[derive(Encode, TypeInfo)]
    enum BountiesCall {
        propose_bounty {
            #[codec(compact)]
            value: u128,
            description: Vec<u8>,
        },
    }

    #[derive(Encode, TypeInfo)]
    enum Phase {
        ApplyExtrinsic(u32),
        Finalization,
        Initialization,
    }

    #[derive(Encode, TypeInfo)]
    enum RuntimeEvent {
        #[codec(index = 0)]
        System(SystemEvent),
        #[codec(index = 34)]
        Bounties(BountiesEvent),
    }

    #[derive(Encode, TypeInfo)]
    enum SystemEvent {
        #[codec(index = 1)]
        ExtrinsicFailed { dispatch_error: u8 },
    }

    #[derive(Encode, TypeInfo)]
    enum BountiesEvent {
        BountyProposed { index: u32 },
    }

    #[derive(Encode, TypeInfo)]
    struct EventRecord {
        phase: Phase,
        event: RuntimeEvent,
        topics: Vec<[u8; 32]>,
    }

    fn runtime() -> RuntimeTypes {
        let mut registry = Registry::new();
        let call_ty = registry.register_type(&meta_type::<RuntimeCall>()).id;
        let address_ty = registry.register_type(&meta_type::<MultiAddress>()).id;
        let signature_ty = registry.register_type(&meta_type::<MultiSignature>()).id;
        let nonce_ty = registry.register_type(&meta_type::<CheckNonce>()).id;
        let events_ty = registry.register_type(&meta_type::<Vec<EventRecord>>()).id;

        RuntimeTypes {
            types: registry.into(),
            call_ty,
            address_ty,
            signature_ty,
            extension_tys: vec![nonce_ty],
            events_ty,
        }
    }

    fn signed(call: RuntimeCall) -> Vec<u8> {
        let mut body = vec![SIGNED_BIT | EXTRINSIC_FORMAT_VERSION];
        MultiAddress::Id(AccountId32([1; 32])).encode_to(&mut body);
        MultiSignature::Sr25519([0; 64]).encode_to(&mut body);
        CheckNonce(5).encode_to(&mut body);
        call.encode_to(&mut body);
        body.encode()
    }

    fn unsigned(call: RuntimeCall) -> Vec<u8> {
        let mut body = vec![EXTRINSIC_FORMAT_VERSION];
        call.encode_to(&mut body);
        body.encode()
    }

    fn bounty(value: u128, description: &str) -> RuntimeCall {
        RuntimeCall::Bounties(BountiesCall::propose_bounty {
            value,
            description: description.as_bytes().to_vec(),
        })
    }

    #[test]
    fn test_signed_extrinsic_reads_like_a_rendered_one() {
        let rendered = runtime().decode_extrinsic(&signed(bounty(1000, "road"))).unwrap();

        let extrinsic = DecodedExtrinsic::from_value(1, &rendered).unwrap();
        assert_eq!(extrinsic.signer, Some(format!("0x{}", "01".repeat(32))));
        assert_eq!(extrinsic.call.section, "bounties");
        assert_eq!(extrinsic.call.method, "proposeBounty");
        assert_eq!(extrinsic.call.text_arg("value").unwrap(), "1000");
        assert_eq!(extrinsic.call.text_arg("description").unwrap(), "road");
    }

    #[test]
    fn test_unsigned_extrinsic() {
        let call = RuntimeCall::Timestamp(TimestampCall::set { now: 1_600_000 });
        let rendered = runtime().decode_extrinsic(&unsigned(call)).unwrap();

        assert_eq!(
            rendered,
            json!({
                "isSigned": false,
                "method": { "section": "timestamp", "method": "set", "args": { "now": "1600000" } }
            })
        );
    }

    #[test]
    fn test_nested_calls_and_votes() {
        let vote = RuntimeCall::Democracy(DemocracyCall::vote {
            ref_index: 5,
            vote: AccountVote::Standard {
                vote: conviction::Vote(0x82),
                balance: 1500,
            },
        });
        let batch = RuntimeCall::Utility(UtilityCall::batch {
            calls: vec![vote, bounty(7, "bridge")],
        });

        let rendered = runtime().decode_extrinsic(&signed(batch)).unwrap();
        let extrinsic = DecodedExtrinsic::from_value(0, &rendered).unwrap();
        assert_eq!(extrinsic.call.method, "batch");

        let calls = extrinsic.call.required_arg("calls").unwrap().as_array().unwrap();
        assert_eq!(
            calls[0],
            json!({
                "section": "democracy",
                "method": "vote",
                "args": {
                    "ref_index": "5",
                    "vote": {
                        "Standard": {
                            "vote": { "vote": "Aye", "conviction": "Locked2x" },
                            "balance": "1500"
                        }
                    }
                }
            })
        );
        assert_eq!(calls[1]["method"], json!("proposeBounty"));
    }

    #[test]
    fn test_events_read_like_rendered_records() {
        let records = vec![
            EventRecord {
                phase: Phase::ApplyExtrinsic(1),
                event: RuntimeEvent::Bounties(BountiesEvent::BountyProposed { index: 7 }),
                topics: vec![],
            },
            EventRecord {
                phase: Phase::Initialization,
                event: RuntimeEvent::System(SystemEvent::ExtrinsicFailed { dispatch_error: 3 }),
                topics: vec![[9; 32]],
            },
        ];

        let rendered = runtime().decode_events(&records.encode()).unwrap();
        let decoded = call_decoder::decode_events(&rendered).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].phase, call_decoder::Phase::ApplyExtrinsic(1));
        assert_eq!(decoded[0].event, GovernanceEvent::BountyProposed { bounty_id: 7 });
        assert_eq!(decoded[1].phase, call_decoder::Phase::Initialization);
        assert_eq!(decoded[1].event, GovernanceEvent::ExtrinsicFailed);
    }

    #[test]
    fn test_unsupported_or_malformed_extrinsics() {
        let runtime = runtime();

        let mut body = vec![5u8];
        bounty(1, "x").encode_to(&mut body);
        assert!(matches!(
            runtime.decode_extrinsic(&body.encode()),
            Err(ChainClientError::Undecodable(_))
        ));

        let mut truncated = unsigned(bounty(1, "road"));
        truncated.pop();
        assert!(runtime.decode_extrinsic(&truncated).is_err());
    }

    #[test]
    fn test_call_with_trailing_bytes() {
        let runtime = runtime();
        let mut encoded = bounty(3, "road").encode();
        encoded.push(0xff);

        assert!(runtime.decode_call(&encoded, true).is_err());
        assert_eq!(
            runtime.decode_call(&encoded, false).unwrap()["method"],
            json!("proposeBounty")
        );
    }

    #[test]
    fn test_metadata_must_carry_the_magic() {
        assert!(RuntimeTypes::from_metadata(&[0, 1, 2, 3, 14]).is_err());
    }
}
