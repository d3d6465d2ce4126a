//! Name interning, tag groups, and the finalized world configuration.

use hashbrown::HashMap;
use log::{debug, info};

use crate::builder::{BlockConfig, BlockTables};
use crate::error::BuildError;
use crate::model::ModelRegistry;
use crate::props::PropertyTable;
use crate::state::{SchemaEntry, StateInfo, default_state_index, describe_state_index};
use crate::types::{Behaviours, BlockStateId, BlockTypeId, MAX_BLOCK_STATES, ModelId};

/// Resource names interned to dense ids in registration order, plus named
/// tag groups over those ids. Shared by block types and the protocol
/// layer's registry sync packets.
#[derive(Default, Debug)]
pub struct NameRegistry {
    names: Vec<String>,
    by_name: HashMap<String, BlockTypeId>,
    tags: HashMap<String, Vec<BlockTypeId>>,
}

impl NameRegistry {
    pub fn add_or_get(&mut self, name: &str) -> BlockTypeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.names.len() as BlockTypeId;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<BlockTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: BlockTypeId) -> &str {
        &self.names[id as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registers a tag group; every member must already be a registered
    /// name.
    pub fn add_tag(&mut self, tag: &str, members: &[&str]) -> Result<(), BuildError> {
        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            let id = self.id(member).ok_or_else(|| BuildError::UnknownTagMember {
                tag: tag.to_string(),
                member: member.to_string(),
            })?;
            ids.push(id);
        }
        self.tags.insert(tag.to_string(), ids);
        Ok(())
    }

    pub fn tag_members(&self, tag: &str) -> Option<&[BlockTypeId]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    pub fn is_tagged(&self, tag: &str, id: BlockTypeId) -> bool {
        self.tag_members(tag).is_some_and(|m| m.contains(&id))
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &[BlockTypeId])> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Mutable context for the startup build pass. Construct, register
/// everything, then [`WorldBuilder::finalize`] freezes it into a
/// [`WorldConfig`].
pub struct WorldBuilder {
    pub props: PropertyTable,
    pub models: ModelRegistry,
    pub names: NameRegistry,
    // public so callers can hold `&mut blocks[i]` while reading `props`
    pub blocks: Vec<BlockConfig>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self {
            props: PropertyTable::new(),
            models: ModelRegistry::new(),
            names: NameRegistry::default(),
            blocks: Vec::new(),
        }
    }

    /// Allocates the next block type. Types are finalized in the order
    /// they are begun, so state id assignment is deterministic.
    pub fn begin_block(&mut self, name: &str) -> Result<usize, BuildError> {
        let id = self.names.add_or_get(name);
        if (id as usize) < self.blocks.len() {
            return Err(BuildError::DuplicateBlock {
                block: name.to_string(),
            });
        }
        debug!("block {name}");
        self.blocks.push(BlockConfig::new(name));
        Ok(id as usize)
    }

    /// Assigns every type its contiguous state range, copies the per-type
    /// arrays into the global tables, and validates the global invariants.
    ///
    /// `declared_state_bits` is the packed bit width the block table
    /// declares for the wire/storage format; a mismatch with the real state
    /// count is a configuration bug, not a runtime condition.
    pub fn finalize(self, declared_state_bits: u32) -> Result<WorldConfig, BuildError> {
        let WorldBuilder {
            props,
            models,
            names,
            blocks,
        } = self;

        let mut config = WorldConfig {
            props,
            models,
            names,
            types: Vec::with_capacity(blocks.len()),
            block_type_by_state: Vec::new(),
            collision_model_by_state: Vec::new(),
            support_model_by_state: Vec::new(),
            light_blocking_model_by_state: Vec::new(),
            light_reduction_by_state: Vec::new(),
            emitted_light_by_state: Vec::new(),
        };

        for (type_id, block) in blocks.into_iter().enumerate() {
            let BlockTables {
                schema,
                state_count,
                collision_model,
                support_model,
                light_blocking_model,
                light_reduction,
                emitted_light,
                behaviours,
            } = block.into_tables();

            let base_state = config.block_type_by_state.len();
            if base_state + state_count > MAX_BLOCK_STATES {
                return Err(BuildError::StateCapacityExceeded {
                    count: base_state + state_count,
                    max: MAX_BLOCK_STATES,
                });
            }

            config.types.push(BlockTypeInfo {
                base_state: base_state as BlockStateId,
                schema,
                behaviours,
            });
            config
                .block_type_by_state
                .extend(std::iter::repeat_n(type_id as BlockTypeId, state_count));
            config.collision_model_by_state.extend(collision_model);
            config.support_model_by_state.extend(support_model);
            config
                .light_blocking_model_by_state
                .extend(light_blocking_model);
            config.light_reduction_by_state.extend(light_reduction);
            config.emitted_light_by_state.extend(emitted_light);
        }

        let total = config.block_type_by_state.len();
        let actual_bits = ceil_log2(total as u32);
        if actual_bits != declared_state_bits {
            return Err(BuildError::StateBitsMismatch {
                declared: declared_state_bits,
                actual: actual_bits,
                count: total,
            });
        }

        info!(
            "finalized {} block types, {} states (packed in {} bits), {} models",
            config.types.len(),
            total,
            actual_bits,
            config.models.len(),
        );
        Ok(config)
    }
}

/// Per-type slice of the finalized tables.
#[derive(Debug)]
pub struct BlockTypeInfo {
    base_state: BlockStateId,
    schema: Vec<SchemaEntry>,
    behaviours: Behaviours,
}

impl BlockTypeInfo {
    #[inline]
    pub fn base_state(&self) -> BlockStateId {
        self.base_state
    }

    #[inline]
    pub fn schema(&self) -> &[SchemaEntry] {
        &self.schema
    }

    #[inline]
    pub fn behaviours(&self) -> &Behaviours {
        &self.behaviours
    }
}

/// The frozen output of the build pass. Written only by
/// [`WorldBuilder::finalize`]; afterwards shared read-only with every
/// consumer for the rest of the process lifetime.
#[derive(Debug)]
pub struct WorldConfig {
    pub props: PropertyTable,
    pub models: ModelRegistry,
    pub names: NameRegistry,
    types: Vec<BlockTypeInfo>,
    block_type_by_state: Vec<BlockTypeId>,
    collision_model_by_state: Vec<ModelId>,
    support_model_by_state: Vec<ModelId>,
    light_blocking_model_by_state: Vec<ModelId>,
    light_reduction_by_state: Vec<u8>,
    emitted_light_by_state: Vec<u8>,
}

impl WorldConfig {
    #[inline]
    pub fn state_count(&self) -> usize {
        self.block_type_by_state.len()
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn block_type(&self, id: BlockTypeId) -> &BlockTypeInfo {
        &self.types[id as usize]
    }

    #[inline]
    pub fn block_type_of_state(&self, state: BlockStateId) -> BlockTypeId {
        self.block_type_by_state[state as usize]
    }

    #[inline]
    pub fn collision_model(&self, state: BlockStateId) -> ModelId {
        self.collision_model_by_state[state as usize]
    }

    #[inline]
    pub fn support_model(&self, state: BlockStateId) -> ModelId {
        self.support_model_by_state[state as usize]
    }

    #[inline]
    pub fn light_blocking_model(&self, state: BlockStateId) -> ModelId {
        self.light_blocking_model_by_state[state as usize]
    }

    #[inline]
    pub fn light_reduction(&self, state: BlockStateId) -> u8 {
        self.light_reduction_by_state[state as usize]
    }

    #[inline]
    pub fn emitted_light(&self, state: BlockStateId) -> u8 {
        self.emitted_light_by_state[state as usize]
    }

    /// Default state of a block type, selected by its default property
    /// values.
    pub fn default_state(&self, id: BlockTypeId) -> BlockStateId {
        let ty = self.block_type(id);
        ty.base_state + default_state_index(ty.schema(), &self.props) as BlockStateId
    }

    /// Decodes a global state id into named property values.
    pub fn describe_state(&self, state: BlockStateId) -> StateInfo {
        let ty = self.block_type(self.block_type_of_state(state));
        describe_state_index(
            ty.schema(),
            &self.props,
            (state - ty.base_state()) as usize,
        )
    }
}

/// Bits needed to store `count` distinct values.
pub fn ceil_log2(count: u32) -> u32 {
    match count {
        0 | 1 => 0,
        n => 32 - (n - 1).leading_zeros(),
    }
}
