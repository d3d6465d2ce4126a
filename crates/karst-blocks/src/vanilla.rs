//! Vanilla property vocabulary and the embedded block table.

use crate::config::{BlockTable, interpret};
use crate::error::BuildError;
use crate::props::PropertyTable;
use crate::registry::WorldBuilder;
use crate::types::codes;

/// Canonical options for remapped direction properties: textual facing
/// values resolve to direction constants, not positional indices.
const DIRECTION_OPTIONS: [(&str, i32); 6] = [
    ("down", codes::DIR_NEG_Y),
    ("up", codes::DIR_POS_Y),
    ("north", codes::DIR_NEG_Z),
    ("south", codes::DIR_POS_Z),
    ("west", codes::DIR_NEG_X),
    ("east", codes::DIR_POS_X),
];

/// Sixteen textual fluid levels collapse onto source / flowing depth /
/// falling buckets.
const FLUID_LEVEL_OPTIONS: [(&str, i32); 16] = [
    ("0", codes::FLUID_SOURCE),
    ("1", 1),
    ("2", 2),
    ("3", 3),
    ("4", 4),
    ("5", 5),
    ("6", 6),
    ("7", 7),
    ("8", codes::FLUID_FALLING),
    ("9", codes::FLUID_FALLING),
    ("10", codes::FLUID_FALLING),
    ("11", codes::FLUID_FALLING),
    ("12", codes::FLUID_FALLING),
    ("13", codes::FLUID_FALLING),
    ("14", codes::FLUID_FALLING),
    ("15", codes::FLUID_FALLING),
];

/// Registers every property the vanilla table references. Runs before the
/// table is interpreted.
pub fn register_vocabulary(props: &mut PropertyTable) -> Result<(), BuildError> {
    for key in [
        "berries",
        "bottom",
        "down",
        "east",
        "hanging",
        "has_book",
        "in_wall",
        "lit",
        "north",
        "occupied",
        "open",
        "persistent",
        "powered",
        "snowy",
        "south",
        "up",
        "waterlogged",
        "west",
    ] {
        props.register_bool(key, key)?;
    }

    props.register_enum("axis", "axis", &["x", "y", "z"])?;
    props.register_enum("attach_face", "face", &["floor", "wall", "ceiling"])?;
    props.register_enum("half", "half", &["top", "bottom"])?;
    props.register_enum("double_block_half", "half", &["upper", "lower"])?;
    props.register_enum("slab_type", "type", &["top", "bottom", "double"])?;
    props.register_enum(
        "stairs_shape",
        "shape",
        &["straight", "inner_left", "inner_right", "outer_left", "outer_right"],
    )?;
    props.register_enum("bed_part", "part", &["head", "foot"])?;
    props.register_enum("door_hinge", "hinge", &["left", "right"])?;
    props.register_enum("wall_east", "east", &["none", "low", "tall"])?;
    props.register_enum("wall_north", "north", &["none", "low", "tall"])?;
    props.register_enum("wall_south", "south", &["none", "low", "tall"])?;
    props.register_enum("wall_west", "west", &["none", "low", "tall"])?;

    props.register_remap(
        "facing",
        "facing",
        &DIRECTION_OPTIONS,
        &["north", "east", "south", "west", "up", "down"],
    )?;
    props.register_remap(
        "horizontal_facing",
        "facing",
        &DIRECTION_OPTIONS,
        &["north", "south", "west", "east"],
    )?;
    props.register_remap(
        "fluid_level",
        "level",
        &FLUID_LEVEL_OPTIONS,
        &[
            "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15",
        ],
    )?;

    props.register_range("stage", "stage", 0, 1)?;
    props.register_range("age_3", "age", 0, 3)?;
    props.register_range("age_7", "age", 0, 7)?;
    props.register_range("age_15", "age", 0, 15)?;
    props.register_range("age_25", "age", 0, 25)?;
    props.register_range("distance", "distance", 1, 7)?;
    props.register_range("stability_distance", "distance", 0, 7)?;
    props.register_range("candles", "candles", 1, 4)?;
    props.register_range("rotation", "rotation", 0, 15)?;
    props.register_range("layers", "layers", 1, 8)?;
    props.register_range("moisture", "moisture", 0, 7)?;
    props.register_range("level_composter", "level", 0, 8)?;

    Ok(())
}

/// The vanilla block corpus, compiled into the binary. No file I/O at
/// runtime.
pub const VANILLA_TABLE_TOML: &str = include_str!("vanilla.toml");

/// Builds a world from any block table text, returning the populated
/// builder and the table's declared packed bit width.
pub fn builder_from_table(toml_text: &str) -> Result<(WorldBuilder, u32), BuildError> {
    let table = BlockTable::from_toml_str(toml_text)?;
    let mut builder = WorldBuilder::new();
    register_vocabulary(&mut builder.props)?;
    interpret(&mut builder, &table)?;
    Ok((builder, table.state_bits))
}

/// Builds the vanilla world configuration.
pub fn build() -> Result<(WorldBuilder, u32), BuildError> {
    builder_from_table(VANILLA_TABLE_TOML)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_registers_cleanly() {
        let mut props = PropertyTable::new();
        register_vocabulary(&mut props).unwrap();
        assert!(props.id_by_key("waterlogged").is_some());
        assert!(props.id_by_key("horizontal_facing").is_some());
        // two specs share the wire name "facing" under distinct keys
        let facing = props.id_by_key("facing").unwrap();
        let horizontal = props.id_by_key("horizontal_facing").unwrap();
        assert_ne!(facing, horizontal);
        assert_eq!(props.get(facing).name(), "facing");
        assert_eq!(props.get(horizontal).name(), "facing");
    }

    #[test]
    fn fluid_levels_bucket_to_semantic_codes() {
        let mut props = PropertyTable::new();
        register_vocabulary(&mut props).unwrap();
        let level = props.id_by_key("fluid_level").unwrap();
        let spec = props.get(level);
        assert_eq!(spec.value_count(), 16);
        assert_eq!(spec.code(0), codes::FLUID_SOURCE);
        assert_eq!(spec.code(7), 7);
        for falling in 8..16 {
            assert_eq!(spec.code(falling), codes::FLUID_FALLING);
        }
    }

    #[test]
    fn facing_values_resolve_to_direction_constants() {
        let mut props = PropertyTable::new();
        register_vocabulary(&mut props).unwrap();
        let facing = props.id_by_key("horizontal_facing").unwrap();
        let spec = props.get(facing);
        assert_eq!(spec.find_value("north"), Some(0));
        assert_eq!(spec.code(0), codes::DIR_NEG_Z);
        assert_eq!(spec.code(3), codes::DIR_POS_X);
    }
}
