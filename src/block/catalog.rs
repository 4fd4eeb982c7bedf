//! Static table of every block id the legacy formats can store.

use std::sync::LazyLock;

/// Numeric ids referenced by derivation rules.
pub mod ids {
    pub const AIR: u16 = 0;
    pub const GRASS: u16 = 2;
    pub const PLANKS: u16 = 5;
    pub const FLOWING_WATER: u16 = 8;
    pub const WATER: u16 = 9;
    pub const FLOWING_LAVA: u16 = 10;
    pub const LAVA: u16 = 11;
    pub const LOG: u16 = 17;
    pub const LEAVES: u16 = 18;
    pub const DISPENSER: u16 = 23;
    pub const BED: u16 = 26;
    pub const POWERED_RAIL: u16 = 27;
    pub const DETECTOR_RAIL: u16 = 28;
    pub const STICKY_PISTON: u16 = 29;
    pub const COBWEB: u16 = 30;
    pub const TALL_GRASS: u16 = 31;
    pub const PISTON: u16 = 33;
    pub const PISTON_HEAD: u16 = 34;
    pub const WOOL: u16 = 35;
    pub const MOVING_PISTON: u16 = 36;
    pub const SLAB: u16 = 44;
    pub const TNT: u16 = 46;
    pub const BOOKSHELF: u16 = 47;
    pub const TORCH: u16 = 50;
    pub const FIRE: u16 = 51;
    pub const SPAWNER: u16 = 52;
    pub const OAK_STAIRS: u16 = 53;
    pub const CHEST: u16 = 54;
    pub const REDSTONE_WIRE: u16 = 55;
    pub const WHEAT: u16 = 59;
    pub const FARMLAND: u16 = 60;
    pub const FURNACE: u16 = 61;
    pub const LIT_FURNACE: u16 = 62;
    pub const SIGN: u16 = 63;
    pub const OAK_DOOR: u16 = 64;
    pub const LADDER: u16 = 65;
    pub const RAIL: u16 = 66;
    pub const COBBLESTONE_STAIRS: u16 = 67;
    pub const WALL_SIGN: u16 = 68;
    pub const IRON_DOOR: u16 = 71;
    pub const REDSTONE_TORCH: u16 = 75;
    pub const LIT_REDSTONE_TORCH: u16 = 76;
    pub const STONE_BUTTON: u16 = 77;
    pub const SNOW: u16 = 78;
    pub const SNOW_BLOCK: u16 = 80;
    pub const CACTUS: u16 = 81;
    pub const SUGAR_CANE: u16 = 83;
    pub const FENCE: u16 = 85;
    pub const PUMPKIN: u16 = 86;
    pub const NETHER_PORTAL: u16 = 90;
    pub const JACK_O_LANTERN: u16 = 91;
    pub const CAKE: u16 = 92;
    pub const REPEATER: u16 = 93;
    pub const LIT_REPEATER: u16 = 94;
    pub const TRAPDOOR: u16 = 96;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyBlock {
    pub id: u8,
    pub data: u8,
    pub name: &'static str,
    /// Properties every state of this entry carries regardless of metadata.
    pub properties: &'static [(&'static str, &'static str)],
}

const fn entry(id: u8, data: u8, name: &'static str) -> LegacyBlock {
    LegacyBlock {
        id,
        data,
        name,
        properties: &[],
    }
}

const fn with(
    id: u8,
    data: u8,
    name: &'static str,
    properties: &'static [(&'static str, &'static str)],
) -> LegacyBlock {
    LegacyBlock {
        id,
        data,
        name,
        properties,
    }
}

const AXIS_Y: &[(&str, &str)] = &[("axis", "y")];
const DOUBLE: &[(&str, &str)] = &[("type", "double")];
const BOTTOM: &[(&str, &str)] = &[("type", "bottom")];
const LIT: &[(&str, &str)] = &[("lit", "true")];
const UNLIT: &[(&str, &str)] = &[("lit", "false")];
const POWERED: &[(&str, &str)] = &[("powered", "true")];
const UNPOWERED: &[(&str, &str)] = &[("powered", "false")];

pub static CATALOG: &[LegacyBlock] = &[
    entry(1, 0, "minecraft:stone"),
    entry(2, 0, "minecraft:grass_block"),
    entry(3, 0, "minecraft:dirt"),
    entry(4, 0, "minecraft:cobblestone"),
    entry(5, 0, "minecraft:oak_planks"),
    entry(6, 0, "minecraft:oak_sapling"),
    entry(6, 1, "minecraft:spruce_sapling"),
    entry(6, 2, "minecraft:birch_sapling"),
    entry(7, 0, "minecraft:bedrock"),
    entry(8, 0, "minecraft:water"),
    entry(9, 0, "minecraft:water"),
    entry(10, 0, "minecraft:lava"),
    entry(11, 0, "minecraft:lava"),
    entry(12, 0, "minecraft:sand"),
    entry(13, 0, "minecraft:gravel"),
    entry(14, 0, "minecraft:gold_ore"),
    entry(15, 0, "minecraft:iron_ore"),
    entry(16, 0, "minecraft:coal_ore"),
    with(17, 0, "minecraft:oak_log", AXIS_Y),
    with(17, 1, "minecraft:spruce_log", AXIS_Y),
    with(17, 2, "minecraft:birch_log", AXIS_Y),
    entry(18, 0, "minecraft:oak_leaves"),
    entry(18, 1, "minecraft:spruce_leaves"),
    entry(18, 2, "minecraft:birch_leaves"),
    entry(18, 3, "minecraft:acacia_leaves"),
    entry(19, 0, "minecraft:sponge"),
    entry(20, 0, "minecraft:glass"),
    entry(21, 0, "minecraft:lapis_ore"),
    entry(22, 0, "minecraft:lapis_block"),
    entry(23, 0, "minecraft:dispenser"),
    entry(24, 0, "minecraft:sandstone"),
    entry(25, 0, "minecraft:note_block"),
    entry(26, 0, "minecraft:red_bed"),
    entry(27, 0, "minecraft:powered_rail"),
    entry(28, 0, "minecraft:detector_rail"),
    entry(29, 0, "minecraft:sticky_piston"),
    entry(30, 0, "minecraft:cobweb"),
    entry(31, 0, "minecraft:dead_bush"),
    entry(31, 1, "minecraft:grass"),
    entry(31, 2, "minecraft:fern"),
    entry(32, 0, "minecraft:dead_bush"),
    entry(33, 0, "minecraft:piston"),
    entry(34, 0, "minecraft:piston_head"),
    entry(35, 0, "minecraft:white_wool"),
    entry(35, 1, "minecraft:orange_wool"),
    entry(35, 2, "minecraft:magenta_wool"),
    entry(35, 3, "minecraft:light_blue_wool"),
    entry(35, 4, "minecraft:yellow_wool"),
    entry(35, 5, "minecraft:lime_wool"),
    entry(35, 6, "minecraft:pink_wool"),
    entry(35, 7, "minecraft:gray_wool"),
    entry(35, 8, "minecraft:light_gray_wool"),
    entry(35, 9, "minecraft:cyan_wool"),
    entry(35, 10, "minecraft:purple_wool"),
    entry(35, 11, "minecraft:blue_wool"),
    entry(35, 12, "minecraft:brown_wool"),
    entry(35, 13, "minecraft:green_wool"),
    entry(35, 14, "minecraft:red_wool"),
    entry(35, 15, "minecraft:black_wool"),
    entry(36, 0, "minecraft:moving_piston"),
    entry(37, 0, "minecraft:dandelion"),
    entry(38, 0, "minecraft:poppy"),
    entry(39, 0, "minecraft:brown_mushroom"),
    entry(40, 0, "minecraft:red_mushroom"),
    entry(41, 0, "minecraft:gold_block"),
    entry(42, 0, "minecraft:iron_block"),
    with(43, 0, "minecraft:smooth_stone_slab", DOUBLE),
    with(43, 1, "minecraft:sandstone_slab", DOUBLE),
    with(43, 2, "minecraft:oak_slab", DOUBLE),
    with(43, 3, "minecraft:cobblestone_slab", DOUBLE),
    entry(43, 4, "minecraft:smooth_stone"),
    with(44, 0, "minecraft:smooth_stone_slab", BOTTOM),
    with(44, 1, "minecraft:sandstone_slab", BOTTOM),
    with(44, 2, "minecraft:oak_slab", BOTTOM),
    with(44, 3, "minecraft:cobblestone_slab", BOTTOM),
    entry(45, 0, "minecraft:bricks"),
    entry(46, 0, "minecraft:tnt"),
    entry(47, 0, "minecraft:bookshelf"),
    entry(48, 0, "minecraft:mossy_cobblestone"),
    entry(49, 0, "minecraft:obsidian"),
    entry(50, 0, "minecraft:wall_torch"),
    entry(50, 5, "minecraft:torch"),
    entry(51, 0, "minecraft:fire"),
    entry(52, 0, "minecraft:spawner"),
    entry(53, 0, "minecraft:oak_stairs"),
    entry(54, 0, "minecraft:chest"),
    entry(55, 0, "minecraft:redstone_wire"),
    entry(56, 0, "minecraft:diamond_ore"),
    entry(57, 0, "minecraft:diamond_block"),
    entry(58, 0, "minecraft:crafting_table"),
    entry(59, 0, "minecraft:wheat"),
    entry(60, 0, "minecraft:farmland"),
    with(61, 0, "minecraft:furnace", UNLIT),
    with(62, 0, "minecraft:furnace", LIT),
    entry(63, 0, "minecraft:oak_sign"),
    entry(64, 0, "minecraft:oak_door"),
    entry(65, 0, "minecraft:ladder"),
    entry(66, 0, "minecraft:rail"),
    entry(67, 0, "minecraft:cobblestone_stairs"),
    entry(68, 0, "minecraft:oak_wall_sign"),
    entry(69, 0, "minecraft:lever"),
    entry(70, 0, "minecraft:stone_pressure_plate"),
    entry(71, 0, "minecraft:iron_door"),
    entry(72, 0, "minecraft:oak_pressure_plate"),
    with(73, 0, "minecraft:redstone_ore", UNLIT),
    with(74, 0, "minecraft:redstone_ore", LIT),
    with(75, 0, "minecraft:redstone_wall_torch", UNLIT),
    with(75, 5, "minecraft:redstone_torch", UNLIT),
    with(76, 0, "minecraft:redstone_wall_torch", LIT),
    with(76, 5, "minecraft:redstone_torch", LIT),
    entry(77, 0, "minecraft:stone_button"),
    entry(78, 0, "minecraft:snow"),
    entry(79, 0, "minecraft:ice"),
    entry(80, 0, "minecraft:snow_block"),
    entry(81, 0, "minecraft:cactus"),
    entry(82, 0, "minecraft:clay"),
    entry(83, 0, "minecraft:sugar_cane"),
    entry(84, 0, "minecraft:jukebox"),
    entry(85, 0, "minecraft:oak_fence"),
    entry(86, 0, "minecraft:carved_pumpkin"),
    entry(87, 0, "minecraft:netherrack"),
    entry(88, 0, "minecraft:soul_sand"),
    entry(89, 0, "minecraft:glowstone"),
    entry(90, 0, "minecraft:nether_portal"),
    entry(91, 0, "minecraft:jack_o_lantern"),
    entry(92, 0, "minecraft:cake"),
    with(93, 0, "minecraft:repeater", UNPOWERED),
    with(94, 0, "minecraft:repeater", POWERED),
    entry(95, 0, "minecraft:chest"),
    entry(96, 0, "minecraft:oak_trapdoor"),
];

const NONE: u16 = u16::MAX;

/// Position in [`CATALOG`] for every `(id << 4) | data` slot.
static INDEX: LazyLock<Box<[u16]>> = LazyLock::new(|| {
    let mut index = vec![NONE; 256 * 16].into_boxed_slice();
    for (position, block) in CATALOG.iter().enumerate() {
        index[slot(block.id as u16, block.data)] = position as u16;
    }
    index
});

#[inline]
fn slot(id: u16, data: u8) -> usize {
    ((id as usize & 0xFF) << 4) | (data as usize & 0x0F)
}

fn exact(id: u16, data: u8) -> Option<&'static LegacyBlock> {
    if id > 0xFF {
        return None;
    }
    match INDEX[slot(id, data)] {
        NONE => None,
        position => CATALOG.get(position as usize),
    }
}

/// Resolves a legacy id/metadata pair: exact match first, then the
/// metadata-0 entry of the same id. Air (id 0) has no entry.
pub fn lookup(id: u16, data: u8) -> Option<&'static LegacyBlock> {
    let data = if id == ids::LEAVES { data & 0x3 } else { data & 0xF };
    exact(id, data).or_else(|| exact(id, 0))
}

/// Full opaque cubes. Chest orientation and fire placement consult this.
pub fn is_opaque(id: u16) -> bool {
    matches!(
        id,
        1..=5 | 7 | 12..=17 | 19 | 21..=25 | 35 | 41..=43 | 45..=49 | 56..=58 | 61 | 62 | 73 | 74 | 80 | 82 | 84
            | 86..=89 | 91
    )
}

/// Blocks fire can spread along.
pub fn is_flammable(id: u16) -> bool {
    matches!(
        id,
        ids::PLANKS | ids::LOG | ids::LEAVES | ids::TALL_GRASS | ids::WOOL | ids::TNT | ids::BOOKSHELF
    )
}

pub fn is_fluid(id: u16) -> bool {
    matches!(id, ids::FLOWING_WATER | ids::WATER | ids::FLOWING_LAVA | ids::LAVA)
}

/// Ids whose stored block light is unreliable and is reported as 7.
pub fn has_fixed_block_light(id: u16) -> bool {
    matches!(id, ids::SLAB | ids::OAK_STAIRS | ids::COBBLESTONE_STAIRS)
}
