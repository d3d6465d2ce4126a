//! Per-type accumulation of properties and per-state derived data.

use crate::error::BuildError;
use crate::model::MODEL_EMPTY;
use crate::props::PropertyTable;
use crate::state::{SchemaEntry, StateInfo, describe_state_index, state_count};
use crate::types::{
    Behaviour, Behaviours, MAX_BEHAVIOURS_PER_BLOCK, MAX_LIGHT_LEVEL, MAX_PROPERTIES_PER_BLOCK,
    ModelId, PropertyId,
};

/// One block type under construction: its property schema plus the five
/// per-state derived arrays, sized `state_count` and reallocated whenever a
/// property multiplies the state space.
///
/// Ordering matters: adding a property drops previously written per-state
/// values, so a definition must add all properties before any per-state
/// override. The declarative table interpreter follows that order; direct
/// users of this API must too.
pub struct BlockConfig {
    name: String,
    schema: Vec<SchemaEntry>,
    state_count: usize,
    collision_model: Vec<ModelId>,
    support_model: Vec<ModelId>,
    light_blocking_model: Vec<ModelId>,
    light_reduction: Vec<u8>,
    emitted_light: Vec<u8>,
    behaviours: Behaviours,
}

impl BlockConfig {
    pub(crate) fn new(name: &str) -> Self {
        let mut config = Self {
            name: name.to_string(),
            schema: Vec::new(),
            state_count: 1,
            collision_model: Vec::new(),
            support_model: Vec::new(),
            light_blocking_model: Vec::new(),
            light_reduction: Vec::new(),
            emitted_light: Vec::new(),
            behaviours: Behaviours::default(),
        };
        config.reallocate_state_arrays();
        config
    }

    fn reallocate_state_arrays(&mut self) {
        self.collision_model = vec![MODEL_EMPTY; self.state_count];
        self.support_model = vec![MODEL_EMPTY; self.state_count];
        self.light_blocking_model = vec![MODEL_EMPTY; self.state_count];
        self.light_reduction = vec![0; self.state_count];
        self.emitted_light = vec![0; self.state_count];
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    #[inline]
    pub fn schema(&self) -> &[SchemaEntry] {
        &self.schema
    }

    #[inline]
    pub fn behaviours(&self) -> &Behaviours {
        &self.behaviours
    }

    pub fn describe(&self, props: &PropertyTable, state_index: usize) -> StateInfo {
        describe_state_index(&self.schema, props, state_index)
    }

    /// Inserts a property at its sorted position (byte-wise name order, the
    /// ordering the vanilla protocol fixes) and grows the state space.
    pub fn add_property(
        &mut self,
        props: &PropertyTable,
        property: PropertyId,
        default_value: &str,
    ) -> Result<(), BuildError> {
        let spec = props.get(property);

        let default_index =
            spec.find_value(default_value)
                .ok_or_else(|| BuildError::UnknownDefaultValue {
                    block: self.name.clone(),
                    property: spec.name().to_string(),
                    value: default_value.to_string(),
                })?;

        if self.schema.len() == MAX_PROPERTIES_PER_BLOCK {
            return Err(BuildError::TooManyProperties {
                block: self.name.clone(),
                max: MAX_PROPERTIES_PER_BLOCK,
            });
        }

        let insert_at = self
            .schema
            .iter()
            .position(|e| spec.name() < props.get(e.property).name())
            .unwrap_or(self.schema.len());
        self.schema.insert(
            insert_at,
            SchemaEntry {
                property,
                default_index: default_index as u8,
            },
        );

        self.state_count = state_count(&self.schema, props);
        // old per-state contents are dropped; see the ordering note above
        self.reallocate_state_arrays();
        Ok(())
    }

    pub fn add_behaviour(&mut self, behaviour: Behaviour) -> Result<(), BuildError> {
        if !self.behaviours.push(behaviour) {
            return Err(BuildError::TooManyBehaviours {
                block: self.name.clone(),
                max: MAX_BEHAVIOURS_PER_BLOCK,
            });
        }
        Ok(())
    }

    // bulk setters

    pub fn set_collision_model_for_all_states(&mut self, model: ModelId) {
        self.collision_model.fill(model);
    }

    pub fn set_support_model_for_all_states(&mut self, model: ModelId) {
        self.support_model.fill(model);
    }

    // Full blocks usually keep the empty model here: a light reduction of
    // 15 already blocks everything, and an empty light model skips the
    // geometric sweep entirely.
    pub fn set_light_blocking_model_for_all_states(&mut self, model: ModelId) {
        self.light_blocking_model.fill(model);
    }

    pub fn set_all_models_individually(
        &mut self,
        collision: ModelId,
        support: ModelId,
        light_blocking: ModelId,
    ) {
        self.set_collision_model_for_all_states(collision);
        self.set_support_model_for_all_states(support);
        self.set_light_blocking_model_for_all_states(light_blocking);
    }

    pub fn set_all_models_for_all_states(&mut self, model: ModelId) {
        self.set_all_models_individually(model, model, model);
    }

    pub fn set_light_reduction_for_all_states(&mut self, reduction: u8) {
        self.light_reduction.fill(reduction & MAX_LIGHT_LEVEL);
    }

    pub fn set_emitted_light_for_all_states(&mut self, level: u8) {
        self.emitted_light.fill(level & MAX_LIGHT_LEVEL);
    }

    // per-state setters used by the shape interpreters

    pub fn set_state_models(
        &mut self,
        state_index: usize,
        collision: ModelId,
        support: ModelId,
        light_blocking: ModelId,
    ) {
        self.collision_model[state_index] = collision;
        self.support_model[state_index] = support;
        self.light_blocking_model[state_index] = light_blocking;
    }

    // predicate setters: decode every state and conditionally overwrite

    /// Waterlogged states dim light by one level, dry states not at all.
    /// Types without the property read as dry everywhere.
    pub fn set_light_reduction_when_waterlogged(&mut self, props: &PropertyTable) {
        for state_index in 0..self.state_count {
            let info = self.describe(props, state_index);
            self.light_reduction[state_index] = if info.flag(props, "waterlogged") { 1 } else { 0 };
        }
    }

    pub fn set_emitted_light_when_lit(&mut self, props: &PropertyTable, level: u8) {
        for state_index in 0..self.state_count {
            let info = self.describe(props, state_index);
            if info.flag(props, "lit") {
                self.emitted_light[state_index] = level & MAX_LIGHT_LEVEL;
            }
        }
    }

    pub fn set_emitted_light_when_berries(&mut self, props: &PropertyTable, level: u8) {
        for state_index in 0..self.state_count {
            let info = self.describe(props, state_index);
            if info.flag(props, "berries") {
                self.emitted_light[state_index] = level & MAX_LIGHT_LEVEL;
            }
        }
    }

    /// Lit candle clusters emit per candle: `level * candles`.
    pub fn set_emitted_light_per_candle(&mut self, props: &PropertyTable, level: u8) {
        for state_index in 0..self.state_count {
            let info = self.describe(props, state_index);
            if info.flag(props, "lit") {
                let candles = info.code_of(props, "candles").unwrap_or(0) as u8;
                self.emitted_light[state_index] = (level * candles) & MAX_LIGHT_LEVEL;
            }
        }
    }

    /// Multi-face growths (sculk veins, glow lichen) only glow once at
    /// least one face is present.
    pub fn set_emitted_light_when_any_face(&mut self, props: &PropertyTable, level: u8) {
        const FACES: [&str; 6] = ["down", "up", "north", "south", "west", "east"];
        for state_index in 0..self.state_count {
            let info = self.describe(props, state_index);
            if FACES.iter().any(|f| info.flag(props, f)) {
                self.emitted_light[state_index] = level & MAX_LIGHT_LEVEL;
            }
        }
    }

    // frozen views, consumed by the finalizer

    pub(crate) fn into_tables(self) -> BlockTables {
        BlockTables {
            schema: self.schema,
            state_count: self.state_count,
            collision_model: self.collision_model,
            support_model: self.support_model,
            light_blocking_model: self.light_blocking_model,
            light_reduction: self.light_reduction,
            emitted_light: self.emitted_light,
            behaviours: self.behaviours,
        }
    }
}

/// Finished per-type data handed to the finalizer.
pub(crate) struct BlockTables {
    pub schema: Vec<SchemaEntry>,
    pub state_count: usize,
    pub collision_model: Vec<ModelId>,
    pub support_model: Vec<ModelId>,
    pub light_blocking_model: Vec<ModelId>,
    pub light_reduction: Vec<u8>,
    pub emitted_light: Vec<u8>,
    pub behaviours: Behaviours,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropertyTable;

    fn table_with_vocab() -> PropertyTable {
        let mut props = PropertyTable::new();
        props.register_bool("waterlogged", "waterlogged").unwrap();
        props.register_bool("lit", "lit").unwrap();
        props
            .register_enum("facing", "facing", &["north", "south", "west", "east"])
            .unwrap();
        props.register_range("candles", "candles", 1, 4).unwrap();
        props
    }

    #[test]
    fn properties_stay_sorted_for_any_insertion_order() {
        let props = table_with_vocab();
        let waterlogged = props.id_by_key("waterlogged").unwrap();
        let facing = props.id_by_key("facing").unwrap();

        let mut config = BlockConfig::new("karst:test");
        assert_eq!(config.name(), "karst:test");
        assert_eq!(config.state_count(), 1);
        config.add_property(&props, waterlogged, "false").unwrap();
        config.add_property(&props, facing, "north").unwrap();

        let names: Vec<&str> = config
            .schema()
            .iter()
            .map(|e| props.get(e.property).name())
            .collect();
        assert_eq!(names, ["facing", "waterlogged"]);
        assert_eq!(config.state_count(), 8);
    }

    #[test]
    fn unknown_default_is_an_error() {
        let props = table_with_vocab();
        let facing = props.id_by_key("facing").unwrap();
        let mut config = BlockConfig::new("karst:test");
        let err = config.add_property(&props, facing, "up").unwrap_err();
        assert!(matches!(err, BuildError::UnknownDefaultValue { .. }));
    }

    #[test]
    fn adding_a_property_resets_per_state_data() {
        let props = table_with_vocab();
        let lit = props.id_by_key("lit").unwrap();
        let mut config = BlockConfig::new("karst:test");
        config.set_light_reduction_for_all_states(15);
        config.add_property(&props, lit, "false").unwrap();
        // the old single-state value is gone, both new states read zero
        config.set_emitted_light_when_lit(&props, 9);
        let lit_state = 0; // "true" is value index 0
        assert_eq!(config.emitted_light[lit_state], 9);
        assert_eq!(config.emitted_light[1], 0);
        assert_eq!(config.light_reduction, vec![0, 0]);
    }

    #[test]
    fn candle_emission_scales_with_count() {
        let props = table_with_vocab();
        let candles = props.id_by_key("candles").unwrap();
        let lit = props.id_by_key("lit").unwrap();
        let mut config = BlockConfig::new("karst:candle");
        config.add_property(&props, candles, "1").unwrap();
        config.add_property(&props, lit, "false").unwrap();
        config.set_emitted_light_per_candle(&props, 3);
        // schema order: candles, lit; lit is the fast digit with true first
        for (candle_count, expected) in [(1u8, 3u8), (2, 6), (3, 9), (4, 12)] {
            let state_index = (candle_count as usize - 1) * 2;
            assert_eq!(config.emitted_light[state_index], expected);
            // unlit neighbour state stays dark
            assert_eq!(config.emitted_light[state_index + 1], 0);
        }
    }

    #[test]
    fn behaviour_capacity_is_checked() {
        let mut config = BlockConfig::new("karst:test");
        for _ in 0..MAX_BEHAVIOURS_PER_BLOCK {
            config.add_behaviour(Behaviour::Fluid).unwrap();
        }
        let err = config.add_behaviour(Behaviour::Fluid).unwrap_err();
        assert!(matches!(err, BuildError::TooManyBehaviours { .. }));
    }
}
