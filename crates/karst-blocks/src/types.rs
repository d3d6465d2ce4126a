use serde::Deserialize;

/// Dense id of a registered block type, in registration order.
pub type BlockTypeId = u16;
/// Global block state id: `base_state + mixed_radix_index`.
pub type BlockStateId = u16;
/// Id into the deduplicated model registry. Id 0 is always the empty model.
pub type ModelId = u8;
/// Id into the property spec table.
pub type PropertyId = u8;

pub const MAX_PROPERTIES_PER_BLOCK: usize = 8;
pub const MAX_PROPERTY_VALUES: usize = 32;
pub const PROPERTY_TAPE_BYTES: usize = 255;
/// Semantic codes travel in 7 bits.
pub const MAX_SEMANTIC_CODE: i32 = 127;
pub const MAX_BEHAVIOURS_PER_BLOCK: usize = 8;
pub const MAX_BLOCK_STATES: usize = 1 << 15;

/// Light levels occupy a nibble.
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Semantic codes shared between the property vocabulary and the shape
/// interpreters. Direction codes deliberately equal the `karst_geom::Dir`
/// bit indices so decoded facings index face masks directly.
pub mod codes {
    pub const DIR_NEG_Y: i32 = 0;
    pub const DIR_POS_Y: i32 = 1;
    pub const DIR_NEG_Z: i32 = 2;
    pub const DIR_POS_Z: i32 = 3;
    pub const DIR_NEG_X: i32 = 4;
    pub const DIR_POS_X: i32 = 5;

    /// Sixteen textual fluid levels bucket into source, flowing 1..=7, and
    /// falling.
    pub const FLUID_SOURCE: i32 = 0;
    pub const FLUID_FALLING: i32 = 8;
}

/// Behaviour tags consumed by world logic (placement checks, connections,
/// fluid handling). The build pass records them verbatim and never
/// interprets them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behaviour {
    Fluid,
    Stairs,
    Bed,
    Door,
    TallPlant,
    NeedSoilBelow,
    NeedNonAirBelow,
    NeedPoleSupportBelow,
    NeedFullSupportBehind,
    FenceConnect,
    PaneConnect,
    WallConnect,
    FenceGateConnect,
    MushroomConnect,
    SnowyTop,
}

/// Fixed-capacity behaviour list carried per block type.
#[derive(Clone, Copy, Debug, Default)]
pub struct Behaviours {
    entries: [Option<Behaviour>; MAX_BEHAVIOURS_PER_BLOCK],
    len: usize,
}

impl Behaviours {
    pub(crate) fn push(&mut self, behaviour: Behaviour) -> bool {
        if self.len == MAX_BEHAVIOURS_PER_BLOCK {
            return false;
        }
        self.entries[self.len] = Some(behaviour);
        self.len += 1;
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Behaviour> + '_ {
        self.entries[..self.len].iter().flatten().copied()
    }

    #[inline]
    pub fn contains(&self, behaviour: Behaviour) -> bool {
        self.iter().any(|b| b == behaviour)
    }
}
