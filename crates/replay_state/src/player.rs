use replay_protocol::{InventorySlot, Object, Skill, SKILL_COUNT};

const INVENTORY_SLOTS: usize = 11;

/// The recording player's statistics block.
#[derive(Clone, Copy, Default, Debug)]
pub struct PlayerStats {
    pub health: i16,
    pub max_health: i16,

    pub capacity: u32,
    pub max_capacity: u32,

    pub experience: u64,
    pub experience_bonus: f64,

    pub level: u16,
    pub level_percent: u8,

    pub mana: i16,
    pub max_mana: i16,

    pub magic_level: u8,
    pub magic_level_base: u8,
    pub magic_level_percent: u8,

    pub soul_points: u8,
    pub stamina: u16,

    pub speed: u16,
    pub fed: u16,
    pub offline_stamina: u16,
}

#[derive(Clone, Default, Debug)]
pub struct PlayerData {
    pub id: u32,
    pub beat_duration: u16,
    pub allow_bug_reports: bool,

    pub is_premium: bool,
    pub premium_until: u32,
    pub vocation: u8,
    pub known_spells: Vec<u8>,

    pub icons: u16,
    pub blessings: u16,
    pub hotkey_preset: u32,

    pub stats: PlayerStats,
    pub skills: [Skill; SKILL_COUNT],

    pub attack_mode: u8,
    pub chase_mode: u8,
    pub secure_mode: u8,
    pub pvp_mode: u8,

    pub open_pvp_situations: u8,

    inventory: [Object; INVENTORY_SLOTS],
}

impl PlayerData {
    pub fn inventory(&self, slot: InventorySlot) -> &Object {
        &self.inventory[slot as usize - 1]
    }

    pub fn set_inventory(&mut self, slot: InventorySlot, object: Object) {
        self.inventory[slot as usize - 1] = object;
    }
}

#[cfg(test)]
mod tests {
    use replay_protocol::Item;

    use super::*;

    #[test]
    fn inventory_slots_are_one_based() {
        let mut player = PlayerData::default();

        let helmet = Object::Item(Item {
            id: 150,
            ..Item::default()
        });

        player.set_inventory(InventorySlot::Head, helmet);
        assert_eq!(*player.inventory(InventorySlot::Head), helmet);
        assert_eq!(*player.inventory(InventorySlot::Purse), Object::None);
    }
}
