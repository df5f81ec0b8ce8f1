use replay_core::wire_enum;

wire_enum! {
    pub enum CreatureType {
        Player = 0,
        Monster = 1,
        NPC = 2,
        SummonOwn = 3,
        SummonOthers = 4,
    }
}

wire_enum! {
    pub enum Direction {
        North = 0,
        East = 1,
        South = 2,
        West = 3,
    }
}

wire_enum! {
    pub enum CharacterSkull {
        None = 0,
        Yellow = 1,
        Green = 2,
        White = 3,
        Red = 4,
        Black = 5,
        Orange = 6,
    }
}

wire_enum! {
    pub enum PartyShield {
        None = 0,
        WhiteYellow = 1,
        WhiteBlue = 2,
        Blue = 3,
        Yellow = 4,
        BlueSharedExp = 5,
        YellowSharedExp = 6,
        BlueNoSharedExpBlink = 7,
        YellowNoSharedExpBlink = 8,
        BlueNoSharedExp = 9,
        YellowNoSharedExp = 10,
        Gray = 11,
    }
}

wire_enum! {
    pub enum WarIcon {
        None = 0,
        Ally = 1,
        Enemy = 2,
        Neutral = 3,
        Member = 4,
        Other = 5,
    }
}

wire_enum! {
    pub enum NPCCategory {
        None = 0,
        Normal = 1,
        Trader = 2,
        Quest = 3,
        TraderQuest = 4,
    }
}

wire_enum! {
    /// Equipment slots; the `Quiver` and `Purse` slots only appear in later
    /// versions but are harmless to accept everywhere.
    pub enum InventorySlot {
        Head = 1,
        Amulet = 2,
        Backpack = 3,
        Chest = 4,
        RightArm = 5,
        LeftArm = 6,
        Legs = 7,
        Boots = 8,
        Ring = 9,
        Quiver = 10,
        Purse = 11,
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::North
    }
}

impl Default for CreatureType {
    fn default() -> Self {
        CreatureType::Monster
    }
}

impl Default for CharacterSkull {
    fn default() -> Self {
        CharacterSkull::None
    }
}

impl Default for PartyShield {
    fn default() -> Self {
        PartyShield::None
    }
}

impl Default for WarIcon {
    fn default() -> Self {
        WarIcon::None
    }
}

impl Default for NPCCategory {
    fn default() -> Self {
        NPCCategory::None
    }
}

#[cfg(test)]
mod tests {
    use replay_core::WireEnum;

    use super::*;

    #[test]
    fn wire_ranges() {
        assert_eq!(CharacterSkull::FIRST, 0);
        assert_eq!(CharacterSkull::LAST, 6);
        assert_eq!(InventorySlot::FIRST, 1);
        assert_eq!(InventorySlot::LAST, 11);
        assert_eq!(PartyShield::from_wire(11), Some(PartyShield::Gray));
        assert_eq!(PartyShield::from_wire(12), None);
    }
}
