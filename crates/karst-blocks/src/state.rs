//! Mixed-radix block state encoding.
//!
//! A block state is `base_state + index`, where `index` treats each
//! property as a digit whose base is that property's value count. The first
//! property in sorted order is the most significant digit; decoding walks
//! the schema in reverse so it always matches the encoding order.

use crate::props::PropertyTable;
use crate::types::PropertyId;

/// One (property, default value) pair of a block type's schema, kept sorted
/// by property name.
#[derive(Clone, Copy, Debug)]
pub struct SchemaEntry {
    pub property: PropertyId,
    pub default_index: u8,
}

/// Decoded property values of one state.
#[derive(Clone, Debug)]
pub struct StateInfo {
    entries: Vec<StateProp>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StateProp {
    pub property: PropertyId,
    pub value_index: usize,
    pub code: i32,
}

impl StateInfo {
    pub fn entries(&self) -> &[StateProp] {
        &self.entries
    }

    /// Semantic code of the named property, if the schema carries it.
    pub fn code_of(&self, props: &PropertyTable, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| props.get(e.property).name() == name)
            .map(|e| e.code)
    }

    /// Textual value of the named property.
    pub fn value_of<'p>(&self, props: &'p PropertyTable, name: &str) -> Option<&'p str> {
        self.entries
            .iter()
            .find(|e| props.get(e.property).name() == name)
            .and_then(|e| props.get(e.property).value(e.value_index))
    }

    /// Boolean property check; absent properties read as false, which is
    /// what the predicate setters rely on for types without the property.
    pub fn flag(&self, props: &PropertyTable, name: &str) -> bool {
        self.code_of(props, name) == Some(1)
    }
}

/// Π value_count over the schema.
pub fn state_count(schema: &[SchemaEntry], props: &PropertyTable) -> usize {
    schema
        .iter()
        .map(|e| props.get(e.property).value_count())
        .product()
}

/// Recovers each property's value from a per-type state index by repeated
/// div/mod against the value-count radices, last property first.
pub fn describe_state_index(
    schema: &[SchemaEntry],
    props: &PropertyTable,
    mut index: usize,
) -> StateInfo {
    let mut entries = vec![StateProp::default(); schema.len()];
    for (slot, entry) in schema.iter().enumerate().rev() {
        let spec = props.get(entry.property);
        let value_index = index % spec.value_count();
        index /= spec.value_count();
        entries[slot] = StateProp {
            property: entry.property,
            value_index,
            code: spec.code(value_index),
        };
    }
    StateInfo { entries }
}

/// Inverse of [`describe_state_index`] for a full value-index assignment
/// given in schema order.
pub fn state_index_from_values(
    schema: &[SchemaEntry],
    props: &PropertyTable,
    value_indices: &[usize],
) -> usize {
    debug_assert_eq!(schema.len(), value_indices.len());
    let mut index = 0;
    for (entry, &value_index) in schema.iter().zip(value_indices) {
        index = index * props.get(entry.property).value_count() + value_index;
    }
    index
}

/// State index selected by the schema's default values.
pub fn default_state_index(schema: &[SchemaEntry], props: &PropertyTable) -> usize {
    let defaults: Vec<usize> = schema.iter().map(|e| e.default_index as usize).collect();
    state_index_from_values(schema, props, &defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropertyTable;

    fn schema_of(props: &mut PropertyTable) -> Vec<SchemaEntry> {
        let facing = props
            .register_enum("facing", "facing", &["north", "south", "west", "east"])
            .unwrap();
        let half = props.register_enum("half", "half", &["top", "bottom"]).unwrap();
        let lit = props.register_bool("lit", "lit").unwrap();
        // sorted by name: facing < half < lit
        vec![
            SchemaEntry { property: facing, default_index: 0 },
            SchemaEntry { property: half, default_index: 1 },
            SchemaEntry { property: lit, default_index: 1 },
        ]
    }

    #[test]
    fn decode_matches_encode_for_every_state() {
        let mut props = PropertyTable::new();
        let schema = schema_of(&mut props);
        let total = state_count(&schema, &props);
        assert_eq!(total, 4 * 2 * 2);
        for index in 0..total {
            let info = describe_state_index(&schema, &props, index);
            let values: Vec<usize> = info.entries().iter().map(|e| e.value_index).collect();
            assert_eq!(state_index_from_values(&schema, &props, &values), index);
        }
    }

    #[test]
    fn last_property_is_the_fastest_digit() {
        let mut props = PropertyTable::new();
        let schema = schema_of(&mut props);
        let a = describe_state_index(&schema, &props, 0);
        let b = describe_state_index(&schema, &props, 1);
        assert_eq!(a.value_of(&props, "lit"), Some("true"));
        assert_eq!(b.value_of(&props, "lit"), Some("false"));
        assert_eq!(a.value_of(&props, "facing"), b.value_of(&props, "facing"));
    }

    #[test]
    fn default_state_uses_default_value_indices() {
        let mut props = PropertyTable::new();
        let schema = schema_of(&mut props);
        // facing=north(0), half=bottom(1), lit=false(1) -> ((0*2)+1)*2+1
        assert_eq!(default_state_index(&schema, &props), 3);
        let info = describe_state_index(&schema, &props, 3);
        assert!(!info.flag(&props, "lit"));
        assert_eq!(info.value_of(&props, "half"), Some("bottom"));
    }

    #[test]
    fn absent_property_reads_as_false() {
        let mut props = PropertyTable::new();
        let schema = schema_of(&mut props);
        let info = describe_state_index(&schema, &props, 0);
        assert!(!info.flag(&props, "waterlogged"));
        assert_eq!(info.code_of(&props, "waterlogged"), None);
    }
}
