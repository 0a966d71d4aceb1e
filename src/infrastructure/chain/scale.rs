//! Type-directed rendering of SCALE encoded runtime values
//!
//! Values are read against the runtime's type registry and rendered the way
//! the engine's decoder expects them: integers as decimal strings, byte
//! strings as text when printable and hex otherwise, fixed byte arrays
//! (account ids, hashes) as hex, unit enum variants as their name and other
//! variants as `{Name: value}`. Runtime calls become `{section, method, args}`.

use parity_scale_codec::{Compact, Decode};
use scale_info::form::PortableForm;
use scale_info::{Field, PortableRegistry, Type, TypeDef, TypeDefPrimitive, Variant};
use serde_json::{json, Map, Value};

use super::error::ChainClientError;

/// Conviction names indexed by their encoded value
const CONVICTIONS: [&str; 7] = [
    "None", "Locked1x", "Locked2x", "Locked3x", "Locked4x", "Locked5x", "Locked6x",
];

type RenderResult = Result<Value, ChainClientError>;

fn undecodable(message: impl Into<String>) -> ChainClientError {
    ChainClientError::Undecodable(message.into())
}

/// Renders values of one runtime's types
#[derive(Debug, Clone, Copy)]
pub struct ValueRenderer<'a> {
    types: &'a PortableRegistry,
    call_ty: u32,
}

impl<'a> ValueRenderer<'a> {
    /// `call_ty` is the runtime's outer call enum; values of that type are
    /// rendered as calls wherever they appear
    pub fn new(types: &'a PortableRegistry, call_ty: u32) -> Self {
        Self { types, call_ty }
    }

    /// Render one value of type `ty`, consuming its bytes from `input`
    pub fn render(&self, ty: u32, input: &mut &[u8]) -> RenderResult {
        if ty == self.call_ty {
            return self.render_call(input);
        }

        let resolved = self.resolve(ty)?;
        if let Some(value) = self.render_special(ty, resolved, input)? {
            return Ok(value);
        }

        match &resolved.type_def {
            TypeDef::Composite(composite) => self.render_fields(&composite.fields, input),
            TypeDef::Variant(def) => {
                let variant = self.read_variant(ty, &def.variants, input)?;
                if variant.fields.is_empty() {
                    return Ok(Value::String(variant.name.clone()));
                }
                let mut map = Map::new();
                map.insert(variant.name.clone(), self.render_fields(&variant.fields, input)?);
                Ok(Value::Object(map))
            }
            TypeDef::Sequence(sequence) => {
                let len = Compact::<u32>::decode(input)?.0 as usize;
                self.render_items(sequence.type_param.id, len, input, true)
            }
            TypeDef::Array(array) => {
                self.render_items(array.type_param.id, array.len as usize, input, false)
            }
            TypeDef::Tuple(tuple) => {
                if tuple.fields.is_empty() {
                    return Ok(Value::Null);
                }
                let items = tuple
                    .fields
                    .iter()
                    .map(|field| self.render(field.id, input))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }
            TypeDef::Primitive(primitive) => render_primitive(primitive, input),
            TypeDef::Compact(compact) => self.render_compact(compact.type_param.id, input),
            TypeDef::BitSequence(_) => Err(undecodable(format!("type {} is a bit sequence", ty))),
        }
    }

    /// Render a runtime call as `{section, method, args}`
    pub fn render_call(&self, input: &mut &[u8]) -> RenderResult {
        let (pallet, call) = self.read_outer_variant(self.call_ty, input)?;

        let mut args = Map::new();
        for (position, field) in call.fields.iter().enumerate() {
            let name = field
                .name
                .clone()
                .unwrap_or_else(|| position.to_string());
            args.insert(name, self.render(field.ty.id, input)?);
        }

        Ok(json!({
            "section": lower_first(&pallet.name),
            "method": camel_case(&call.name),
            "args": args,
        }))
    }

    /// Render a `Vec<EventRecord>` as `[{phase, event: {section, method, data}}]`
    ///
    /// Event data is positional, in field order.
    pub fn render_event_records(&self, ty: u32, input: &mut &[u8]) -> Result<Vec<Value>, ChainClientError> {
        let record_ty = match &self.resolve(ty)?.type_def {
            TypeDef::Sequence(sequence) => sequence.type_param.id,
            _ => return Err(undecodable(format!("events type {} is not a sequence", ty))),
        };
        let fields = match &self.resolve(record_ty)?.type_def {
            TypeDef::Composite(composite) => &composite.fields,
            _ => return Err(undecodable(format!("event record type {} is not a struct", record_ty))),
        };

        let count = Compact::<u32>::decode(input)?.0;
        let mut records = Vec::new();
        for _ in 0..count {
            let mut phase = Value::Null;
            let mut event = Value::Null;
            for field in fields {
                match field.name.as_deref() {
                    Some("phase") => phase = self.render(field.ty.id, input)?,
                    Some("event") => event = self.render_event(field.ty.id, input)?,
                    // topics
                    _ => {
                        self.render(field.ty.id, input)?;
                    }
                }
            }
            records.push(json!({ "phase": phase, "event": event }));
        }
        Ok(records)
    }

    fn render_event(&self, ty: u32, input: &mut &[u8]) -> RenderResult {
        let (pallet, event) = self.read_outer_variant(ty, input)?;
        let data = event
            .fields
            .iter()
            .map(|field| self.render(field.ty.id, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(json!({
            "section": lower_first(&pallet.name),
            "method": event.name,
            "data": data,
        }))
    }

    /// Read a pallet variant of an outer enum and the item variant inside it
    fn read_outer_variant(
        &self,
        ty: u32,
        input: &mut &[u8],
    ) -> Result<(&'a Variant<PortableForm>, &'a Variant<PortableForm>), ChainClientError> {
        let pallet = self.variant_of(ty, input)?;
        let inner_ty = match pallet.fields.as_slice() {
            [field] => field.ty.id,
            _ => {
                return Err(undecodable(format!(
                    "outer variant {} does not wrap a single enum",
                    pallet.name
                )))
            }
        };
        let item = self.variant_of(inner_ty, input)?;
        Ok((pallet, item))
    }

    fn variant_of(&self, ty: u32, input: &mut &[u8]) -> Result<&'a Variant<PortableForm>, ChainClientError> {
        match &self.resolve(ty)?.type_def {
            TypeDef::Variant(def) => self.read_variant(ty, &def.variants, input),
            _ => Err(undecodable(format!("type {} is not an enum", ty))),
        }
    }

    fn read_variant(
        &self,
        ty: u32,
        variants: &'a [Variant<PortableForm>],
        input: &mut &[u8],
    ) -> Result<&'a Variant<PortableForm>, ChainClientError> {
        let index = u8::decode(input)?;
        variants
            .iter()
            .find(|variant| variant.index == index)
            .ok_or_else(|| undecodable(format!("type {} has no variant {}", ty, index)))
    }

    /// Named fields become an object, a single unnamed field its inner value,
    /// several unnamed fields an array
    fn render_fields(&self, fields: &[Field<PortableForm>], input: &mut &[u8]) -> RenderResult {
        if !fields.is_empty() && fields.iter().all(|field| field.name.is_some()) {
            let mut map = Map::new();
            for field in fields {
                let name = field.name.clone().unwrap_or_default();
                map.insert(name, self.render(field.ty.id, input)?);
            }
            return Ok(Value::Object(map));
        }

        match fields {
            [] => Ok(Value::Null),
            [field] => self.render(field.ty.id, input),
            _ => {
                let items = fields
                    .iter()
                    .map(|field| self.render(field.ty.id, input))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }
        }
    }

    fn render_items(&self, item_ty: u32, len: usize, input: &mut &[u8], is_sequence: bool) -> RenderResult {
        if self.is_byte(item_ty)? {
            if input.len() < len {
                return Err(undecodable(format!("{} bytes expected, {} left", len, input.len())));
            }
            let (bytes, rest) = input.split_at(len);
            *input = rest;
            return Ok(Value::String(render_bytes(bytes, is_sequence)));
        }

        let mut items = Vec::with_capacity(len.min(input.len()));
        for _ in 0..len {
            items.push(self.render(item_ty, input)?);
        }
        Ok(Value::Array(items))
    }

    fn render_compact(&self, ty: u32, input: &mut &[u8]) -> RenderResult {
        match &self.resolve(ty)?.type_def {
            TypeDef::Primitive(primitive) => {
                let n: u128 = match primitive {
                    TypeDefPrimitive::U8 => Compact::<u8>::decode(input)?.0.into(),
                    TypeDefPrimitive::U16 => Compact::<u16>::decode(input)?.0.into(),
                    TypeDefPrimitive::U32 => Compact::<u32>::decode(input)?.0.into(),
                    TypeDefPrimitive::U64 => Compact::<u64>::decode(input)?.0.into(),
                    TypeDefPrimitive::U128 => Compact::<u128>::decode(input)?.0,
                    other => return Err(undecodable(format!("compact {:?}", other))),
                };
                Ok(Value::String(n.to_string()))
            }
            TypeDef::Composite(composite) if composite.fields.len() == 1 => {
                self.render_compact(composite.fields[0].ty.id, input)
            }
            TypeDef::Tuple(tuple) if tuple.fields.is_empty() => Ok(Value::Null),
            _ => Err(undecodable(format!("type {} cannot be compact encoded", ty))),
        }
    }

    /// Types whose rendering does not follow their structure
    fn render_special(
        &self,
        ty: u32,
        resolved: &'a Type<PortableForm>,
        input: &mut &[u8],
    ) -> Result<Option<Value>, ChainClientError> {
        let segments = &resolved.path.segments;

        if segments.len() == 1 && segments[0] == "Option" {
            if let TypeDef::Variant(def) = &resolved.type_def {
                let variant = self.read_variant(ty, &def.variants, input)?;
                return Ok(Some(match variant.fields.first() {
                    Some(field) => self.render(field.ty.id, input)?,
                    None => Value::Null,
                }));
            }
        }

        // Democracy and conviction voting pack direction and conviction in one byte
        if segments.last().map(String::as_str) == Some("Vote") {
            if let TypeDef::Composite(composite) = &resolved.type_def {
                if let [field] = composite.fields.as_slice() {
                    if self.is_byte(field.ty.id)? {
                        let packed = u8::decode(input)?;
                        let conviction = CONVICTIONS
                            .get(usize::from(packed & 0x7f))
                            .ok_or_else(|| undecodable(format!("invalid conviction in vote {:#04x}", packed)))?;
                        let direction = if packed & 0x80 != 0 { "Aye" } else { "Nay" };
                        return Ok(Some(json!({ "vote": direction, "conviction": conviction })));
                    }
                }
            }
        }

        Ok(None)
    }

    fn is_byte(&self, ty: u32) -> Result<bool, ChainClientError> {
        Ok(matches!(
            self.resolve(ty)?.type_def,
            TypeDef::Primitive(TypeDefPrimitive::U8)
        ))
    }

    fn resolve(&self, ty: u32) -> Result<&'a Type<PortableForm>, ChainClientError> {
        self.types
            .resolve(ty)
            .ok_or_else(|| undecodable(format!("type {} is not in the registry", ty)))
    }
}

fn render_primitive(primitive: &TypeDefPrimitive, input: &mut &[u8]) -> RenderResult {
    let rendered = match primitive {
        TypeDefPrimitive::Bool => return Ok(Value::Bool(bool::decode(input)?)),
        TypeDefPrimitive::Char => {
            let code = u32::decode(input)?;
            char::from_u32(code)
                .ok_or_else(|| undecodable(format!("invalid char {}", code)))?
                .to_string()
        }
        TypeDefPrimitive::Str => String::decode(input)?,
        TypeDefPrimitive::U8 => u8::decode(input)?.to_string(),
        TypeDefPrimitive::U16 => u16::decode(input)?.to_string(),
        TypeDefPrimitive::U32 => u32::decode(input)?.to_string(),
        TypeDefPrimitive::U64 => u64::decode(input)?.to_string(),
        TypeDefPrimitive::U128 => u128::decode(input)?.to_string(),
        TypeDefPrimitive::I8 => i8::decode(input)?.to_string(),
        TypeDefPrimitive::I16 => i16::decode(input)?.to_string(),
        TypeDefPrimitive::I32 => i32::decode(input)?.to_string(),
        TypeDefPrimitive::I64 => i64::decode(input)?.to_string(),
        TypeDefPrimitive::I128 => i128::decode(input)?.to_string(),
        TypeDefPrimitive::U256 | TypeDefPrimitive::I256 => {
            format!("0x{}", hex::encode(<[u8; 32]>::decode(input)?))
        }
    };
    Ok(Value::String(rendered))
}

/// Byte strings read as text when they are printable UTF-8
fn render_bytes(bytes: &[u8], is_sequence: bool) -> String {
    if is_sequence && !bytes.is_empty() {
        if let Ok(text) = std::str::from_utf8(bytes) {
            if text.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') {
                return text.to_string();
            }
        }
    }
    format!("0x{}", hex::encode(bytes))
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `propose_bounty` becomes `proposeBounty`
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

    #[test]
    fn test_names_follow_rendered_conventions() {
        assert_eq!(lower_first("PhragmenElection"), "phragmenElection");
        assert_eq!(camel_case("propose_bounty"), "proposeBounty");
        assert_eq!(camel_case("vote"), "vote");
    }

    #[test]
    fn test_byte_strings() {
        assert_eq!(render_bytes(b"road", true), "road");
        assert_eq!(render_bytes(&[0x12, 0x34], true), "0x1234");
        assert_eq!(render_bytes(b"road", false), "0x726f6164");
        assert_eq!(render_bytes(&[], true), "0x");
    }
}
