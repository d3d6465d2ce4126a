//! Declarative block table: serde schema plus the interpretation pipeline
//! that drives the builder API.
//!
//! The table is data, the shape families are the algorithm: each category
//! derives per-state models from the decoded property values, through the
//! same deduplicating model registry.

use karst_geom::{Aabb, rotate_clockwise};
use serde::Deserialize;
use std::collections::HashMap;

use crate::builder::BlockConfig;
use crate::error::BuildError;
use crate::model::{CrossConnections, MODEL_EMPTY, ModelRegistry, cross_model_boxes};
use crate::props::PropertyTable;
use crate::registry::WorldBuilder;
use crate::types::{Behaviour, codes};

#[derive(Deserialize)]
pub struct BlockTable {
    /// Bit width the wire/storage format packs a state id into; checked
    /// against the real state count at finalize.
    pub state_bits: u32,
    pub blocks: Vec<BlockRow>,
    #[serde(default)]
    pub tags: HashMap<String, Vec<String>>,
}

impl BlockTable {
    pub fn from_toml_str(text: &str) -> Result<Self, BuildError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Deserialize)]
pub struct BlockRow {
    pub name: String,
    #[serde(default)]
    pub shape: Option<ShapeCfg>,
    #[serde(default)]
    pub props: Vec<PropRef>,
    #[serde(default)]
    pub light_reduction: Option<LightReductionCfg>,
    #[serde(default)]
    pub emitted_light: Option<EmittedLightCfg>,
    #[serde(default)]
    pub behaviours: Vec<Behaviour>,
}

/// Reference to a registered property by vocabulary key (not wire name;
/// several specs share a wire name like `facing`).
#[derive(Deserialize)]
pub struct PropRef {
    pub name: String,
    pub default: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum ShapeCfg {
    Simple(SimpleShape),
    Boxes(BoxesShape),
}

/// Shape families with per-state geometry rules.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SimpleShape {
    Empty,
    Solid,
    Slab,
    Leaves,
    Pane,
    Fence,
    FenceGate,
    Bed,
    Carpet,
}

/// Explicit box lists, in pixel coordinates.
#[derive(Deserialize)]
pub struct BoxesShape {
    pub collision: Vec<[f32; 6]>,
    #[serde(default)]
    pub support: Option<Vec<[f32; 6]>>,
    #[serde(default)]
    pub light: Option<Vec<[f32; 6]>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum LightReductionCfg {
    Fixed(u8),
    Rule(ReductionRule),
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionRule {
    Waterlogged,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum EmittedLightCfg {
    Fixed(u8),
    Rule { when: EmitCondition, level: u8 },
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitCondition {
    Lit,
    Berries,
    AnyFace,
    PerLitCandle,
}

// shape template boxes, pixel grid

const FULL_BOX: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 16.0, 16.0);
const BOTTOM_SLAB_BOX: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 8.0, 16.0);
const TOP_SLAB_BOX: Aabb = Aabb::pixels(0.0, 8.0, 0.0, 16.0, 16.0, 16.0);
const CARPET_BOX: Aabb = Aabb::pixels(0.0, 0.0, 0.0, 16.0, 1.0, 16.0);

const PANE_CENTRE: Aabb = Aabb::pixels(7.0, 0.0, 7.0, 9.0, 16.0, 9.0);
const PANE_NEG_Z_ARM: Aabb = Aabb::pixels(7.0, 0.0, 0.0, 9.0, 16.0, 9.0);
const PANE_THROUGH_Z: Aabb = Aabb::pixels(7.0, 0.0, 0.0, 9.0, 16.0, 16.0);

const FENCE_CENTRE: Aabb = Aabb::pixels(6.0, 0.0, 6.0, 10.0, 24.0, 10.0);
const FENCE_NEG_Z_ARM: Aabb = Aabb::pixels(6.0, 0.0, 0.0, 10.0, 24.0, 10.0);
const FENCE_THROUGH_Z: Aabb = Aabb::pixels(6.0, 0.0, 0.0, 10.0, 24.0, 16.0);

const GATE_FACING_X_BOX: Aabb = Aabb::pixels(6.0, 0.0, 0.0, 10.0, 24.0, 16.0);
const GATE_FACING_Z_BOX: Aabb = Aabb::pixels(0.0, 0.0, 6.0, 16.0, 24.0, 10.0);

// bed with its foot towards +X; other facings are rotations
const BED_FOOT_POS_X: [Aabb; 3] = [
    Aabb::pixels(0.0, 3.0, 0.0, 16.0, 9.0, 16.0),
    Aabb::pixels(0.0, 0.0, 0.0, 3.0, 3.0, 3.0),
    Aabb::pixels(0.0, 0.0, 13.0, 3.0, 3.0, 16.0),
];

/// Runs every row of the table through the builder pipeline, then resolves
/// the tag groups.
pub fn interpret(builder: &mut WorldBuilder, table: &BlockTable) -> Result<(), BuildError> {
    for row in &table.blocks {
        let index = builder.begin_block(&row.name)?;

        // properties first: adding one reallocates the per-state arrays
        for prop in &row.props {
            let id = builder.props.id_by_key(&prop.name).ok_or_else(|| {
                BuildError::UnknownProperty {
                    block: row.name.clone(),
                    name: prop.name.clone(),
                }
            })?;
            builder.blocks[index].add_property(&builder.props, id, &prop.default)?;
        }

        let config = &mut builder.blocks[index];
        if let Some(shape) = &row.shape {
            apply_shape(&mut builder.models, &builder.props, config, shape)?;
        }

        match &row.light_reduction {
            Some(LightReductionCfg::Fixed(v)) => config.set_light_reduction_for_all_states(*v),
            Some(LightReductionCfg::Rule(ReductionRule::Waterlogged)) => {
                config.set_light_reduction_when_waterlogged(&builder.props)
            }
            // solid blocks block all light unless the row says otherwise
            None => {
                if matches!(row.shape, Some(ShapeCfg::Simple(SimpleShape::Solid))) {
                    config.set_light_reduction_for_all_states(15);
                }
            }
        }

        match &row.emitted_light {
            Some(EmittedLightCfg::Fixed(v)) => config.set_emitted_light_for_all_states(*v),
            Some(EmittedLightCfg::Rule { when, level }) => match when {
                EmitCondition::Lit => config.set_emitted_light_when_lit(&builder.props, *level),
                EmitCondition::Berries => {
                    config.set_emitted_light_when_berries(&builder.props, *level)
                }
                EmitCondition::AnyFace => {
                    config.set_emitted_light_when_any_face(&builder.props, *level)
                }
                EmitCondition::PerLitCandle => {
                    config.set_emitted_light_per_candle(&builder.props, *level)
                }
            },
            None => {}
        }

        for &behaviour in &row.behaviours {
            config.add_behaviour(behaviour)?;
        }
    }

    for (tag, members) in &table.tags {
        let member_refs: Vec<&str> = members.iter().map(String::as_str).collect();
        builder.names.add_tag(tag, &member_refs)?;
    }

    Ok(())
}

fn apply_shape(
    models: &mut ModelRegistry,
    props: &PropertyTable,
    config: &mut BlockConfig,
    shape: &ShapeCfg,
) -> Result<(), BuildError> {
    match shape {
        ShapeCfg::Simple(SimpleShape::Empty) => {
            config.set_all_models_for_all_states(MODEL_EMPTY);
        }
        ShapeCfg::Simple(SimpleShape::Solid) => {
            let full = models.register(&[FULL_BOX])?;
            // empty light model: a 15 light reduction already blocks
            config.set_all_models_individually(full, full, MODEL_EMPTY);
        }
        ShapeCfg::Simple(SimpleShape::Leaves) => {
            let full = models.register(&[FULL_BOX])?;
            config.set_all_models_individually(full, MODEL_EMPTY, MODEL_EMPTY);
        }
        ShapeCfg::Simple(SimpleShape::Carpet) => {
            let carpet = models.register(&[CARPET_BOX])?;
            config.set_all_models_individually(carpet, carpet, MODEL_EMPTY);
        }
        ShapeCfg::Simple(SimpleShape::Slab) => apply_slab(models, props, config)?,
        ShapeCfg::Simple(SimpleShape::Pane) => {
            apply_cross(models, props, config, PANE_CENTRE, PANE_NEG_Z_ARM, PANE_THROUGH_Z)?
        }
        ShapeCfg::Simple(SimpleShape::Fence) => {
            apply_cross(models, props, config, FENCE_CENTRE, FENCE_NEG_Z_ARM, FENCE_THROUGH_Z)?
        }
        ShapeCfg::Simple(SimpleShape::FenceGate) => apply_fence_gate(models, props, config)?,
        ShapeCfg::Simple(SimpleShape::Bed) => apply_bed(models, props, config)?,
        ShapeCfg::Boxes(boxes) => {
            let collision = models.register(&to_aabbs(&boxes.collision))?;
            let support = match &boxes.support {
                Some(list) => models.register(&to_aabbs(list))?,
                None => collision,
            };
            let light = match &boxes.light {
                Some(list) => models.register(&to_aabbs(list))?,
                None => MODEL_EMPTY,
            };
            config.set_all_models_individually(collision, support, light);
        }
    }
    Ok(())
}

fn to_aabbs(list: &[[f32; 6]]) -> Vec<Aabb> {
    list.iter()
        .map(|b| Aabb::pixels(b[0], b[1], b[2], b[3], b[4], b[5]))
        .collect()
}

/// Slabs pick one of three models from the `type` property; the slab shape
/// also blocks light geometrically, so all three model slots match.
fn apply_slab(
    models: &mut ModelRegistry,
    props: &PropertyTable,
    config: &mut BlockConfig,
) -> Result<(), BuildError> {
    let bottom = models.register(&[BOTTOM_SLAB_BOX])?;
    let top = models.register(&[TOP_SLAB_BOX])?;
    let full = models.register(&[FULL_BOX])?;
    for state_index in 0..config.state_count() {
        let info = config.describe(props, state_index);
        let model = match info.value_of(props, "type") {
            Some("top") => top,
            Some("double") => full,
            _ => bottom,
        };
        config.set_state_models(state_index, model, model, model);
    }
    Ok(())
}

/// Panes and fences synthesize their box list per connection state; the
/// deduplicating registry collapses the sixteen states onto the shared
/// models.
fn apply_cross(
    models: &mut ModelRegistry,
    props: &PropertyTable,
    config: &mut BlockConfig,
    centre: Aabb,
    neg_z_arm: Aabb,
    through_z: Aabb,
) -> Result<(), BuildError> {
    for state_index in 0..config.state_count() {
        let info = config.describe(props, state_index);
        let connections = CrossConnections {
            neg_z: info.flag(props, "north"),
            pos_z: info.flag(props, "south"),
            neg_x: info.flag(props, "west"),
            pos_x: info.flag(props, "east"),
        };
        let boxes = cross_model_boxes(centre, neg_z_arm, through_z, connections);
        let model = models.register(&boxes)?;
        config.set_state_models(state_index, model, model, MODEL_EMPTY);
    }
    Ok(())
}

fn apply_fence_gate(
    models: &mut ModelRegistry,
    props: &PropertyTable,
    config: &mut BlockConfig,
) -> Result<(), BuildError> {
    let facing_x = models.register(&[GATE_FACING_X_BOX])?;
    let facing_z = models.register(&[GATE_FACING_Z_BOX])?;
    for state_index in 0..config.state_count() {
        let info = config.describe(props, state_index);
        let model = if info.flag(props, "open") {
            MODEL_EMPTY
        } else if is_x_axis(info.code_of(props, "facing")) {
            facing_x
        } else {
            facing_z
        };
        config.set_state_models(state_index, model, model, MODEL_EMPTY);
    }
    Ok(())
}

fn apply_bed(
    models: &mut ModelRegistry,
    props: &PropertyTable,
    config: &mut BlockConfig,
) -> Result<(), BuildError> {
    for state_index in 0..config.state_count() {
        let info = config.describe(props, state_index);
        let mut facing = info.code_of(props, "facing").unwrap_or(codes::DIR_POS_X);
        if info.value_of(props, "part") == Some("head") {
            facing ^= 1; // opposite direction
        }
        let turns = match facing {
            codes::DIR_POS_X => 0,
            codes::DIR_POS_Z => 1,
            codes::DIR_NEG_X => 2,
            _ => 3,
        };
        let mut boxes = BED_FOOT_POS_X;
        for b in &mut boxes {
            for _ in 0..turns {
                *b = rotate_clockwise(*b);
            }
        }
        let model = models.register(&boxes)?;
        config.set_state_models(state_index, model, model, MODEL_EMPTY);
    }
    Ok(())
}

#[inline]
fn is_x_axis(direction_code: Option<i32>) -> bool {
    matches!(direction_code, Some(codes::DIR_NEG_X) | Some(codes::DIR_POS_X))
}
