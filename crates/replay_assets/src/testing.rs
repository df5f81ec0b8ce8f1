//! In-memory asset files for tests. Gated behind the `testing` feature so
//! downstream crates can build small catalogues without shipping fixtures.

use replay_core::{DataReader, TypeProperty, VersionProfile};

use crate::TypeCatalogue;

/// Finds the wire byte that a property translates from in this version, so
/// fixtures stay valid across the table's reshuffles.
fn wire_byte(profile: &VersionProfile, property: TypeProperty) -> u8 {
    (0u8..64)
        .find(|&index| {
            profile
                .translate_type_property(index)
                .is_ok_and(|found| found == property)
        })
        .unwrap_or_else(|| panic!("{property:?} unavailable in {}", profile.triplet))
}

fn push_frame_group(profile: &VersionProfile, out: &mut Vec<u8>) {
    out.extend_from_slice(&[1, 1, 1, 1, 1]); // width, height, layers, x/y div

    if profile.features.type_z_div {
        out.push(1);
    }

    out.push(1); // frame count

    if profile.features.sprite_index_u32 {
        out.extend_from_slice(&0u32.to_le_bytes());
    } else {
        out.extend_from_slice(&0u16.to_le_bytes());
    }
}

fn push_record(profile: &VersionProfile, out: &mut Vec<u8>, properties: &[TypeProperty]) {
    for &property in properties {
        out.push(wire_byte(profile, property));

        if property == TypeProperty::Ground {
            out.extend_from_slice(&150u16.to_le_bytes());
        }
    }
    out.push(0xFF);

    push_frame_group(profile, out);
}

fn push_outfit_record(profile: &VersionProfile, out: &mut Vec<u8>) {
    out.push(0xFF);

    if profile.features.frame_groups {
        out.push(1); // group count
        out.push(0); // idle group
    }

    push_frame_group(profile, out);
}

fn picture_file(profile: &VersionProfile) -> Vec<u8> {
    let count: u16 = if profile.triplet.at_least(9, 0) { 9 } else { 8 };

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&count.to_le_bytes());

    /* All cells point at one shared zero-length sprite record at the tail
     * of the file. */
    let tail = bytes.len() + usize::from(count) * 9;

    for _ in 0..count {
        bytes.push(1); // tiles wide
        bytes.push(1); // tiles tall
        bytes.extend_from_slice(&[0, 0, 0]); // color key
        bytes.extend_from_slice(&(tail as u32).to_le_bytes());
    }

    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes
}

fn sprite_file(profile: &VersionProfile) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());

    if profile.features.sprite_index_u32 {
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&((bytes.len() + 4) as u32).to_le_bytes());
    } else {
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&((bytes.len() + 4) as u32).to_le_bytes());
    }

    /* Color key + zero-length payload. */
    bytes.extend_from_slice(&[0, 0, 0]);
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes
}

fn type_file(profile: &VersionProfile) -> Vec<u8> {
    use TypeProperty::*;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&105u16.to_le_bytes()); // item max id
    bytes.extend_from_slice(&2u16.to_le_bytes()); // outfit max id
    bytes.extend_from_slice(&4u16.to_le_bytes()); // effect max id
    bytes.extend_from_slice(&4u16.to_le_bytes()); // missile max id

    push_record(profile, &mut bytes, &[Ground]); // 100
    push_record(profile, &mut bytes, &[]); // 101
    push_record(profile, &mut bytes, &[Stackable]); // 102
    push_record(profile, &mut bytes, &[LiquidContainer]); // 103
    push_record(profile, &mut bytes, &[LiquidPool]); // 104

    // 105: a rune where the property exists, otherwise plain.
    if profile.triplet.at_least(7, 80) && !profile.triplet.at_least(8, 60) {
        push_record(profile, &mut bytes, &[Rune]);
    } else {
        push_record(profile, &mut bytes, &[]);
    }

    for _ in 0..2 {
        push_outfit_record(profile, &mut bytes);
    }

    for _ in 0..8 {
        push_record(profile, &mut bytes, &[]); // effects and missiles
    }

    bytes
}

/// A catalogue with six items (ground, plain, stackable, liquid container,
/// liquid pool, rune), two outfits, and four effects/missiles each.
pub fn small_catalogue(profile: &VersionProfile) -> TypeCatalogue {
    let pictures = picture_file(profile);
    let sprites = sprite_file(profile);
    let types = type_file(profile);

    TypeCatalogue::load(
        profile,
        DataReader::new(&pictures),
        DataReader::new(&sprites),
        DataReader::new(&types),
    )
    .expect("test catalogue must load")
}

/// Item ids exposed by [`small_catalogue`].
pub mod items {
    pub const GROUND: u16 = 100;
    pub const PLAIN: u16 = 101;
    pub const STACKABLE: u16 = 102;
    pub const LIQUID_CONTAINER: u16 = 103;
    pub const LIQUID_POOL: u16 = 104;
    pub const RUNE: u16 = 105;
}
