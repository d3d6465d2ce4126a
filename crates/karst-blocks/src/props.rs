//! Property vocabulary: names, textual values, and semantic codes.

use hashbrown::HashMap;

use crate::error::BuildError;
use crate::types::{MAX_PROPERTY_VALUES, MAX_SEMANTIC_CODE, PROPERTY_TAPE_BYTES, PropertyId};

/// One registered block property.
///
/// The name and textual values live on a single length-prefixed byte tape
/// (name length + name bytes, then repeated value length + value bytes),
/// which is the exact layout the protocol layer serializes for registry
/// sync. A parallel array maps each value index to its semantic code
/// (a direction constant, a fluid level bucket, an integer), always in
/// 0..=127.
#[derive(Clone, Debug)]
pub struct PropertySpec {
    tape: Vec<u8>,
    codes: Vec<i32>,
}

impl PropertySpec {
    pub fn name(&self) -> &str {
        let len = self.tape[0] as usize;
        std::str::from_utf8(&self.tape[1..1 + len]).expect("property tape holds UTF-8")
    }

    #[inline]
    pub fn value_count(&self) -> usize {
        self.codes.len()
    }

    /// Textual values in registration order, decoded from the tape.
    pub fn values(&self) -> TapeValues<'_> {
        TapeValues {
            tape: &self.tape[1 + self.tape[0] as usize..],
        }
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values().nth(index)
    }

    /// Linear scan over the tape, as the builder resolves default values.
    pub fn find_value(&self, text: &str) -> Option<usize> {
        self.values().position(|v| v == text)
    }

    #[inline]
    pub fn code(&self, index: usize) -> i32 {
        self.codes[index]
    }

    /// Raw tape bytes, for the wire encoder.
    #[inline]
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }
}

pub struct TapeValues<'a> {
    tape: &'a [u8],
}

impl<'a> Iterator for TapeValues<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (&len, rest) = self.tape.split_first()?;
        let (value, rest) = rest.split_at(len as usize);
        self.tape = rest;
        Some(std::str::from_utf8(value).expect("property tape holds UTF-8"))
    }
}

/// Process-wide property table, indexed by [`PropertyId`].
///
/// Registration keys are distinct from display names: several specs share
/// the wire name `facing` or `level` but differ in value domain, so rows in
/// the block table reference properties by key.
#[derive(Default, Debug)]
pub struct PropertyTable {
    specs: Vec<PropertySpec>,
    by_key: HashMap<String, PropertyId>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: PropertyId) -> &PropertySpec {
        &self.specs[id as usize]
    }

    pub fn id_by_key(&self, key: &str) -> Option<PropertyId> {
        self.by_key.get(key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// `true`/`false` with canonical codes 1/0.
    pub fn register_bool(&mut self, key: &str, name: &str) -> Result<PropertyId, BuildError> {
        self.register_remap(key, name, &[("true", 1), ("false", 0)], &["true", "false"])
    }

    /// Stringified integers `min..=max`; codes are the integers themselves.
    pub fn register_range(
        &mut self,
        key: &str,
        name: &str,
        min: i32,
        max: i32,
    ) -> Result<PropertyId, BuildError> {
        let values: Vec<String> = (min..=max).map(|v| v.to_string()).collect();
        let codes: Vec<i32> = (min..=max).collect();
        let value_refs: Vec<&str> = values.iter().map(String::as_str).collect();
        self.register(key, name, &value_refs, codes)
    }

    /// Codes are positional indices.
    pub fn register_enum(
        &mut self,
        key: &str,
        name: &str,
        values: &[&str],
    ) -> Result<PropertyId, BuildError> {
        let codes: Vec<i32> = (0..values.len() as i32).collect();
        self.register(key, name, values, codes)
    }

    /// Each textual value is looked up in a canonical (text, code) table.
    /// The value list may be shorter or longer than the canonical list,
    /// which is how sixteen fluid levels collapse into three semantic
    /// buckets and direction names become direction constants.
    pub fn register_remap(
        &mut self,
        key: &str,
        name: &str,
        canonical: &[(&str, i32)],
        values: &[&str],
    ) -> Result<PropertyId, BuildError> {
        let mut codes = Vec::with_capacity(values.len());
        for value in values {
            let code = canonical
                .iter()
                .find(|(text, _)| text == value)
                .map(|&(_, code)| code)
                .ok_or_else(|| BuildError::UnresolvedRemap {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
            codes.push(code);
        }
        self.register(key, name, values, codes)
    }

    fn register(
        &mut self,
        key: &str,
        name: &str,
        values: &[&str],
        codes: Vec<i32>,
    ) -> Result<PropertyId, BuildError> {
        if values.len() > MAX_PROPERTY_VALUES {
            return Err(BuildError::TooManyPropertyValues {
                name: name.to_string(),
                count: values.len(),
                max: MAX_PROPERTY_VALUES,
            });
        }
        for &code in &codes {
            if !(0..=MAX_SEMANTIC_CODE).contains(&code) {
                return Err(BuildError::CodeOutOfRange {
                    name: name.to_string(),
                    code,
                });
            }
        }

        let tape_len = 1 + name.len() + values.iter().map(|v| 1 + v.len()).sum::<usize>();
        if tape_len > PROPERTY_TAPE_BYTES || name.len() > u8::MAX as usize {
            return Err(BuildError::TapeOverflow {
                name: name.to_string(),
                max: PROPERTY_TAPE_BYTES,
            });
        }

        let mut tape = Vec::with_capacity(tape_len);
        tape.push(name.len() as u8);
        tape.extend_from_slice(name.as_bytes());
        for value in values {
            tape.push(value.len() as u8);
            tape.extend_from_slice(value.as_bytes());
        }

        if self.by_key.contains_key(key) {
            return Err(BuildError::DuplicateProperty {
                key: key.to_string(),
            });
        }
        let id = self.specs.len() as PropertyId;
        self.by_key.insert(key.to_string(), id);
        self.specs.push(PropertySpec { tape, codes });
        Ok(id)
    }
}
