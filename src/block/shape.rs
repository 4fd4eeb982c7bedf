//! Neighbor-dependent properties the legacy formats never stored.

use std::borrow::Cow;

use super::catalog::{ids, is_flammable, is_opaque};
use super::properties::door_facing;
use super::{BlockAccess, Direction, Properties, RawBlock};

/// Adds the shape properties of `raw` at (x, y, z) to `props`.
pub fn infer<A: BlockAccess + ?Sized>(raw: RawBlock, x: i32, y: i32, z: i32, access: &A, props: &mut Properties) {
    let neighbor = |dir: Direction| {
        let (dx, dz) = dir.offset();
        access.raw_block(x + dx, y, z + dz)
    };

    match raw.id {
        ids::GRASS => {
            let above = access.raw_block(x, y + 1, z).id;
            set_flag(props, "snowy", matches!(above, ids::SNOW | ids::SNOW_BLOCK));
        }
        ids::FENCE => {
            for dir in Direction::CARDINALS {
                set_flag(props, dir.name(), neighbor(dir).id == ids::FENCE);
            }
        }
        ids::NETHER_PORTAL => {
            let along_x = neighbor(Direction::West).id == ids::NETHER_PORTAL
                || neighbor(Direction::East).id == ids::NETHER_PORTAL;
            props.insert("axis", Cow::Borrowed(if along_x { "x" } else { "z" }));
        }
        ids::CHEST => chest(x, y, z, access, props),
        ids::OAK_DOOR | ids::IRON_DOOR => door(raw.data, props),
        ids::FIRE => fire(raw.data, x, y, z, access, props),
        _ => {}
    }
}

fn set_flag(props: &mut Properties, key: &'static str, value: bool) {
    props.insert(key, Cow::Borrowed(if value { "true" } else { "false" }));
}

const PARTNER_ORDER: [Direction; 4] = [Direction::West, Direction::East, Direction::North, Direction::South];
const BACKING_ORDER: [Direction; 4] = [Direction::South, Direction::East, Direction::North, Direction::West];

fn chest<A: BlockAccess + ?Sized>(x: i32, y: i32, z: i32, access: &A, props: &mut Properties) {
    let opaque_at = |x: i32, z: i32, dir: Direction| {
        let (dx, dz) = dir.offset();
        is_opaque(access.raw_block(x + dx, y, z + dz).id)
    };

    let partner = PARTNER_ORDER.into_iter().find(|dir| {
        let (dx, dz) = dir.offset();
        access.raw_block(x + dx, y, z + dz).id == ids::CHEST
    });

    let (facing, kind) = match partner {
        Some(partner) => {
            let (px, pz) = partner.offset();
            let (px, pz) = (x + px, z + pz);
            // Double chests open away from a blocked long side
            let facing = if partner.is_x_axis() {
                if opaque_at(x, z, Direction::South) || opaque_at(px, pz, Direction::South) {
                    Direction::North
                } else {
                    Direction::South
                }
            } else if opaque_at(x, z, Direction::East) || opaque_at(px, pz, Direction::East) {
                Direction::West
            } else {
                Direction::East
            };
            let kind = if facing.clockwise() == partner { "left" } else { "right" };
            (facing, kind)
        }
        None => {
            let facing = BACKING_ORDER
                .into_iter()
                .find(|&dir| opaque_at(x, z, dir))
                .map(Direction::opposite)
                .unwrap_or(Direction::South);
            (facing, "single")
        }
    };

    props.insert("facing", Cow::Borrowed(facing.name()));
    props.insert("type", Cow::Borrowed(kind));
}

fn door(meta: u8, props: &mut Properties) {
    props.insert("half", Cow::Borrowed(if meta / 8 == 1 { "upper" } else { "lower" }));
    set_flag(props, "open", (meta / 4) % 2 == 1);
    props.insert("facing", Cow::Borrowed(door_facing(meta)));
    props.insert("hinge", Cow::Borrowed("left"));
    set_flag(props, "powered", false);
}

fn fire<A: BlockAccess + ?Sized>(meta: u8, x: i32, y: i32, z: i32, access: &A, props: &mut Properties) {
    let below = access.raw_block(x, y - 1, z).id;
    let grounded = is_opaque(below) || matches!(below, ids::COBWEB | ids::SPAWNER | ids::FENCE);

    for dir in Direction::CARDINALS {
        let (dx, dz) = dir.offset();
        let burning = !grounded && is_flammable(access.raw_block(x + dx, y, z + dz).id);
        set_flag(props, dir.name(), burning);
    }
    let up = !grounded && is_flammable(access.raw_block(x, y + 1, z).id);
    set_flag(props, "up", up);
    props.insert("age", Cow::Owned(meta.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tests::SparseBlocks;
    use crate::block::{BlockState, block_state};

    const STONE: u16 = 1;

    fn state_at(world: &SparseBlocks, id: u16, data: u8) -> BlockState {
        block_state(RawBlock::new(id, data), 0, 64, 0, world)
    }

    fn chest_at(world: SparseBlocks) -> (String, String) {
        let world = world.with(0, 64, 0, ids::CHEST);
        let state = state_at(&world, ids::CHEST, 0);
        (
            state.property("facing").unwrap().to_string(),
            state.property("type").unwrap().to_string(),
        )
    }

    #[test]
    fn test_chest_configurations() {
        // (neighbors, expected facing, expected type); chest sits at (0, 64, 0)
        let cases: Vec<(Vec<(i32, i32, u16)>, &str, &str)> = vec![
            // partner west
            (vec![(-1, 0, ids::CHEST)], "south", "left"),
            (vec![(-1, 0, ids::CHEST), (0, 1, STONE)], "north", "right"),
            (vec![(-1, 0, ids::CHEST), (-1, 1, STONE)], "north", "right"),
            // partner east
            (vec![(1, 0, ids::CHEST)], "south", "right"),
            (vec![(1, 0, ids::CHEST), (1, 1, STONE)], "north", "left"),
            // partner north
            (vec![(0, -1, ids::CHEST)], "east", "right"),
            (vec![(0, -1, ids::CHEST), (1, -1, STONE)], "west", "left"),
            // partner south
            (vec![(0, 1, ids::CHEST)], "east", "left"),
            (vec![(0, 1, ids::CHEST), (1, 0, STONE)], "west", "right"),
            // west wins over east
            (vec![(-1, 0, ids::CHEST), (1, 0, ids::CHEST)], "south", "left"),
            // single chests
            (vec![], "south", "single"),
            (vec![(0, 1, STONE)], "north", "single"),
            (vec![(1, 0, STONE)], "west", "single"),
            (vec![(0, -1, STONE)], "south", "single"),
            (vec![(-1, 0, STONE)], "east", "single"),
            (vec![(0, -1, STONE), (1, 0, STONE)], "west", "single"),
        ];
        assert_eq!(cases.len(), 16);

        for (neighbors, facing, kind) in cases {
            let mut world = SparseBlocks::default();
            for &(dx, dz, id) in &neighbors {
                world = world.with(dx, 64, dz, id);
            }
            let actual = chest_at(world);
            assert_eq!(actual, (facing.to_string(), kind.to_string()), "neighbors {neighbors:?}");
        }
    }

    #[test]
    fn test_fence_connects_to_fences_only() {
        let world = SparseBlocks::default()
            .with(0, 64, -1, ids::FENCE)
            .with(1, 64, 0, STONE)
            .with(-1, 64, 0, ids::FENCE);
        let fence = state_at(&world, ids::FENCE, 0);
        assert_eq!(fence.property("north"), Some("true"));
        assert_eq!(fence.property("east"), Some("false"));
        assert_eq!(fence.property("south"), Some("false"));
        assert_eq!(fence.property("west"), Some("true"));
    }

    #[test]
    fn test_grass_snowy() {
        let bare = state_at(&SparseBlocks::default(), ids::GRASS, 0);
        assert_eq!(bare.property("snowy"), Some("false"));

        let covered = SparseBlocks::default().with(0, 65, 0, ids::SNOW);
        assert_eq!(state_at(&covered, ids::GRASS, 0).property("snowy"), Some("true"));

        let under_block = SparseBlocks::default().with(0, 65, 0, ids::SNOW_BLOCK);
        assert_eq!(state_at(&under_block, ids::GRASS, 0).property("snowy"), Some("true"));
    }

    #[test]
    fn test_portal_axis() {
        let along_x = SparseBlocks::default().with(1, 64, 0, ids::NETHER_PORTAL);
        assert_eq!(state_at(&along_x, ids::NETHER_PORTAL, 0).property("axis"), Some("x"));

        let along_z = SparseBlocks::default().with(0, 64, 1, ids::NETHER_PORTAL);
        assert_eq!(state_at(&along_z, ids::NETHER_PORTAL, 0).property("axis"), Some("z"));
    }

    #[test]
    fn test_door_from_metadata() {
        let world = SparseBlocks::default();
        let lower = state_at(&world, ids::OAK_DOOR, 0b0110);
        assert_eq!(lower.property("half"), Some("lower"));
        assert_eq!(lower.property("open"), Some("true"));
        assert_eq!(lower.property("facing"), Some("north"));
        assert_eq!(lower.property("hinge"), Some("left"));
        assert_eq!(lower.property("powered"), Some("false"));

        let upper = state_at(&world, ids::IRON_DOOR, 0b1001);
        assert_eq!(upper.property("half"), Some("upper"));
        assert_eq!(upper.property("open"), Some("false"));
        assert_eq!(upper.property("facing"), Some("west"));
    }

    #[test]
    fn test_fire_spreads_along_flammable_neighbors() {
        let world = SparseBlocks::default()
            .with(0, 64, -1, ids::PLANKS)
            .with(1, 64, 0, STONE)
            .with(0, 65, 0, ids::LEAVES);
        let fire = state_at(&world, ids::FIRE, 3);
        assert_eq!(fire.property("north"), Some("true"));
        assert_eq!(fire.property("east"), Some("false"));
        assert_eq!(fire.property("up"), Some("true"));
        assert_eq!(fire.property("age"), Some("3"));
    }

    #[test]
    fn test_grounded_fire_has_no_sides() {
        for ground in [STONE, ids::COBWEB, ids::SPAWNER, ids::FENCE] {
            let world = SparseBlocks::default()
                .with(0, 63, 0, ground)
                .with(0, 64, -1, ids::PLANKS)
                .with(0, 65, 0, ids::LEAVES);
            let fire = state_at(&world, ids::FIRE, 0);
            for key in ["north", "east", "south", "west", "up"] {
                assert_eq!(fire.property(key), Some("false"), "ground {ground} key {key}");
            }
        }
    }
}
