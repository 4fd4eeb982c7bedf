//! Properties encoded in the 4-bit metadata nibble.
//!
//! Every facing below uses the catalog's historical compass, which is the
//! 1.12 orientation of the same metadata turned one step clockwise
//! (furnace `2` faces east, bed `0` faces west, rail `0` runs east-west).

use std::borrow::Cow;

use super::catalog::ids;
use super::{LegacyBlock, Properties};

fn number(value: u8) -> Cow<'static, str> {
    Cow::Owned(value.to_string())
}

fn flag(value: bool) -> Cow<'static, str> {
    Cow::Borrowed(if value { "true" } else { "false" })
}

/// Facing values 2..=5 of furnaces, dispensers, ladders, wall signs and pistons.
fn side_facing(meta: u8) -> Option<&'static str> {
    match meta {
        2 => Some("east"),
        3 => Some("west"),
        4 => Some("north"),
        5 => Some("south"),
        _ => None,
    }
}

/// Two-bit facing of beds, pumpkins and repeaters.
fn horizontal_facing(meta: u8) -> &'static str {
    match meta & 3 {
        0 => "west",
        1 => "north",
        2 => "east",
        _ => "south",
    }
}

/// Attachment side of wall torches and buttons (1..=4).
fn attached_facing(meta: u8) -> Option<&'static str> {
    match meta {
        1 => Some("south"),
        2 => Some("north"),
        3 => Some("west"),
        4 => Some("east"),
        _ => None,
    }
}

fn stairs_facing(meta: u8) -> &'static str {
    match meta & 3 {
        0 => "south",
        1 => "north",
        2 => "west",
        _ => "east",
    }
}

pub(crate) fn door_facing(meta: u8) -> &'static str {
    match meta % 4 {
        0 => "south",
        1 => "west",
        2 => "north",
        _ => "east",
    }
}

fn trapdoor_facing(meta: u8) -> &'static str {
    match meta & 3 {
        0 => "east",
        1 => "west",
        2 => "north",
        _ => "south",
    }
}

fn rail_shape(meta: u8) -> Option<&'static str> {
    Some(match meta {
        0 => "east_west",
        1 => "north_south",
        2 => "ascending_south",
        3 => "ascending_north",
        4 => "ascending_east",
        5 => "ascending_west",
        6 => "south_west",
        7 => "north_west",
        8 => "north_east",
        9 => "south_east",
        _ => return None,
    })
}

fn piston_facing(meta: u8) -> &'static str {
    match meta & 7 {
        0 => "down",
        1 => "up",
        side => side_facing(side).unwrap_or("up"),
    }
}

/// Baseline properties of `block` plus what `meta` encodes for its id.
pub fn from_metadata(block: &LegacyBlock, meta: u8) -> Properties {
    let meta = meta & 0x0F;
    let mut props: Properties = block
        .properties
        .iter()
        .map(|&(key, value)| (key, Cow::Borrowed(value)))
        .collect();

    let mut put = |key: &'static str, value: &'static str| {
        props.insert(key, Cow::Borrowed(value));
    };

    match block.id as u16 {
        ids::BED => {
            put("facing", horizontal_facing(meta));
            put("part", if meta < 8 { "foot" } else { "head" });
        }
        ids::DISPENSER | ids::FURNACE | ids::LIT_FURNACE | ids::LADDER | ids::WALL_SIGN => {
            if let Some(facing) = side_facing(meta) {
                put("facing", facing);
            }
        }
        ids::RAIL => {
            if let Some(shape) = rail_shape(meta) {
                put("shape", shape);
            }
        }
        ids::POWERED_RAIL | ids::DETECTOR_RAIL => {
            if let Some(shape) = rail_shape(meta & 7) {
                put("shape", shape);
            }
            put("powered", if meta & 8 != 0 { "true" } else { "false" });
        }
        ids::STICKY_PISTON | ids::PISTON | ids::MOVING_PISTON => {
            put("facing", piston_facing(meta));
            put("extended", if meta & 8 != 0 { "true" } else { "false" });
        }
        ids::PISTON_HEAD => {
            put("facing", piston_facing(meta));
            put("type", if meta & 8 != 0 { "sticky" } else { "normal" });
        }
        ids::TORCH | ids::REDSTONE_TORCH | ids::LIT_REDSTONE_TORCH | ids::STONE_BUTTON => {
            if let Some(facing) = attached_facing(meta & 7) {
                put("facing", facing);
            }
            if block.id as u16 == ids::STONE_BUTTON {
                put("face", "wall");
                put("powered", if meta & 8 != 0 { "true" } else { "false" });
            }
        }
        ids::OAK_STAIRS | ids::COBBLESTONE_STAIRS => {
            put("facing", stairs_facing(meta));
            put("half", "bottom");
            put("shape", "straight");
        }
        ids::PUMPKIN | ids::JACK_O_LANTERN => put("facing", horizontal_facing(meta)),
        ids::TRAPDOOR => {
            put("facing", trapdoor_facing(meta));
            put("half", "bottom");
            put("open", if meta & 4 != 0 { "true" } else { "false" });
        }
        _ => {}
    }

    match block.id as u16 {
        ids::FLOWING_WATER | ids::WATER | ids::FLOWING_LAVA | ids::LAVA => {
            props.insert("level", number(meta));
        }
        ids::SNOW => {
            // Legacy layer counts start at 0, modern ones at 1
            props.insert("layers", number((meta & 7) + 1));
        }
        ids::SIGN => {
            props.insert("rotation", number((meta + 4) & 15));
        }
        ids::WHEAT => {
            props.insert("age", number(meta & 7));
        }
        ids::FARMLAND => {
            props.insert("moisture", number(meta & 7));
        }
        ids::CACTUS | ids::SUGAR_CANE => {
            props.insert("age", number(meta));
        }
        ids::CAKE => {
            props.insert("bites", number(meta.min(6)));
        }
        ids::REDSTONE_WIRE => {
            props.insert("power", number(meta));
        }
        ids::REPEATER | ids::LIT_REPEATER => {
            props.insert("facing", Cow::Borrowed(horizontal_facing(meta)));
            props.insert("delay", number((meta >> 2) + 1));
            props.insert("locked", flag(false));
        }
        _ => {}
    }

    props
}
