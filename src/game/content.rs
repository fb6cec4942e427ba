//! Static Game Content
//!
//! Character roster, board areas, and card pools. The engine reads these
//! tables but never owns or mutates them; rule variants (dice mapping,
//! pairing mode, amounts, player counts) are configuration, not code.

use serde::{Serialize, Deserialize};

/// Character definition identifier.
pub type CharacterId = String;
/// Board area identifier.
pub type AreaId = String;
/// Card definition identifier.
pub type CardId = String;

// =============================================================================
// FACTIONS & CHARACTERS
// =============================================================================

/// Hidden-role alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Faction {
    Hunter,
    Shadow,
    Neutral,
}

/// How a character wins.
///
/// `Factional` characters win with their faction; the rest carry their
/// own condition, checked by the win evaluator in seat order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinCondition {
    /// Wins when the character's faction wins.
    Factional,
    /// Wins by being the first player to die.
    FirstToDie,
    /// Wins while alive with at least this many equipment cards.
    EquipmentCount { count: usize },
    /// Wins by surviving until at most this many players remain alive.
    SurviveToLast { count: usize },
}

/// A character from the roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub name: String,
    pub faction: Faction,
    pub max_hp: u8,
    pub win_condition: WinCondition,
}

// =============================================================================
// AREAS
// =============================================================================

/// An effect a board area can offer to the player standing on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaEffect {
    /// Draw the top card of the white deck.
    DrawWhite,
    /// Draw the top card of the black deck.
    DrawBlack,
    /// Draw a hermit card and deliver it to a chosen living player.
    DrawHermit,
    /// Heal one player or damage one player (configured amounts).
    HealOrDamage,
    /// Take an equipment card from a player in range.
    StealEquipment,
}

/// A static board location.
///
/// `dice_range` is the inclusive span of dice sums that route movement
/// here. Adjacency pairing is *match* state (it may be randomized per
/// match), so it is deliberately absent from the definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDef {
    pub id: AreaId,
    pub name: String,
    pub dice_range: (u8, u8),
    pub effects: Vec<AreaEffect>,
}

// =============================================================================
// CARDS & DECKS
// =============================================================================

/// One of the three named card pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeckId {
    White,
    Black,
    Hermit,
}

/// Card behavior class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    /// Stays in the drawer's hand; counts for equipment-based wins.
    Equipment,
    /// Resolves immediately and goes to the discard pile.
    SingleUse,
}

/// A card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDef {
    pub id: CardId,
    pub name: String,
    pub deck: DeckId,
    pub kind: CardKind,
}

// =============================================================================
// CONTENT BUNDLE
// =============================================================================

/// The full immutable content set one match plays against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Content {
    pub characters: Vec<CharacterDef>,
    pub areas: Vec<AreaDef>,
    pub cards: Vec<CardDef>,
}

impl Content {
    /// Look up a character definition.
    pub fn character(&self, id: &str) -> Option<&CharacterDef> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Look up an area definition.
    pub fn area(&self, id: &str) -> Option<&AreaDef> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Look up a card definition.
    pub fn card(&self, id: &str) -> Option<&CardDef> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// All characters of one faction.
    pub fn characters_of(&self, faction: Faction) -> Vec<&CharacterDef> {
        self.characters.iter().filter(|c| c.faction == faction).collect()
    }

    /// Card ids belonging to one deck, in definition order.
    pub fn deck_cards(&self, deck: DeckId) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.deck == deck)
            .map(|c| c.id.clone())
            .collect()
    }

    /// The area a dice sum routes to, if any.
    ///
    /// The special sum (area choice) maps to no area by construction.
    pub fn area_for_sum(&self, sum: u8) -> Option<&AreaDef> {
        self.areas
            .iter()
            .find(|a| sum >= a.dice_range.0 && sum <= a.dice_range.1)
    }

    /// The default content set: six areas, three decks, a roster with one
    /// character per special win condition.
    pub fn standard() -> Self {
        let characters = vec![
            character("warden", "The Warden", Faction::Hunter, 14, WinCondition::Factional),
            character("oracle", "The Oracle", Faction::Hunter, 10, WinCondition::Factional),
            character("chaplain", "The Chaplain", Faction::Hunter, 12, WinCondition::Factional),
            character("revenant", "The Revenant", Faction::Shadow, 13, WinCondition::Factional),
            character("wraith", "The Wraith", Faction::Shadow, 11, WinCondition::Factional),
            character("harrow", "The Harrow", Faction::Shadow, 12, WinCondition::Factional),
            character("martyr", "The Martyr", Faction::Neutral, 8, WinCondition::FirstToDie),
            character(
                "magpie",
                "The Magpie",
                Faction::Neutral,
                10,
                WinCondition::EquipmentCount { count: 5 },
            ),
            character(
                "drifter",
                "The Drifter",
                Faction::Neutral,
                11,
                WinCondition::SurviveToLast { count: 2 },
            ),
        ];

        let areas = vec![
            area("hermit_cabin", "Hermit's Cabin", (2, 3), vec![AreaEffect::DrawHermit]),
            area(
                "underworld_gate",
                "Underworld Gate",
                (4, 5),
                vec![AreaEffect::DrawWhite, AreaEffect::DrawBlack, AreaEffect::DrawHermit],
            ),
            area("church", "Church", (6, 6), vec![AreaEffect::DrawWhite]),
            area("cemetery", "Cemetery", (8, 8), vec![AreaEffect::DrawBlack]),
            area("weird_woods", "Weird Woods", (9, 9), vec![AreaEffect::HealOrDamage]),
            area(
                "forgotten_altar",
                "Forgotten Altar",
                (10, 10),
                vec![AreaEffect::StealEquipment],
            ),
        ];

        let cards = vec![
            card("w_blessed_mail", "Blessed Mail", DeckId::White, CardKind::Equipment),
            card("w_silver_rosary", "Silver Rosary", DeckId::White, CardKind::Equipment),
            card("w_holy_lance", "Holy Lance", DeckId::White, CardKind::Equipment),
            card("w_first_aid", "First Aid", DeckId::White, CardKind::SingleUse),
            card("w_banishment", "Banishment", DeckId::White, CardKind::SingleUse),
            card("w_guardian_charm", "Guardian Charm", DeckId::White, CardKind::Equipment),
            card("b_cursed_blade", "Cursed Blade", DeckId::Black, CardKind::Equipment),
            card("b_bone_talisman", "Bone Talisman", DeckId::Black, CardKind::Equipment),
            card("b_night_cloak", "Night Cloak", DeckId::Black, CardKind::Equipment),
            card("b_bloodletting", "Bloodletting", DeckId::Black, CardKind::SingleUse),
            card("b_grave_dust", "Grave Dust", DeckId::Black, CardKind::SingleUse),
            card("b_fang_dagger", "Fang Dagger", DeckId::Black, CardKind::Equipment),
            card("h_vision_of_greed", "Vision of Greed", DeckId::Hermit, CardKind::SingleUse),
            card("h_vision_of_faith", "Vision of Faith", DeckId::Hermit, CardKind::SingleUse),
            card("h_vision_of_doubt", "Vision of Doubt", DeckId::Hermit, CardKind::SingleUse),
            card("h_vision_of_fury", "Vision of Fury", DeckId::Hermit, CardKind::SingleUse),
            card("h_vision_of_loss", "Vision of Loss", DeckId::Hermit, CardKind::SingleUse),
        ];

        Self { characters, areas, cards }
    }
}

fn character(
    id: &str,
    name: &str,
    faction: Faction,
    max_hp: u8,
    win_condition: WinCondition,
) -> CharacterDef {
    CharacterDef {
        id: id.to_string(),
        name: name.to_string(),
        faction,
        max_hp,
        win_condition,
    }
}

fn area(id: &str, name: &str, dice_range: (u8, u8), effects: Vec<AreaEffect>) -> AreaDef {
    AreaDef {
        id: id.to_string(),
        name: name.to_string(),
        dice_range,
        effects,
    }
}

fn card(id: &str, name: &str, deck: DeckId, kind: CardKind) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: name.to_string(),
        deck,
        kind,
    }
}

// =============================================================================
// GAME CONFIG
// =============================================================================

/// How adjacency pairs are assigned at match start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingMode {
    /// The classic fixed board layout.
    Static,
    /// Pairs drawn fresh from the match RNG at start.
    Randomized,
}

/// Rule-variant knobs.
///
/// Both observed rule variants (fixed vs. randomized pairing, different
/// amounts and player minimums) are expressible here; the engine never
/// hard-codes either.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub min_players: usize,
    pub max_players: usize,
    /// Dice sum that forces an explicit area choice instead of moving.
    pub special_dice_sum: u8,
    pub pairing: PairingMode,
    /// HP restored by the heal area action.
    pub heal_amount: u8,
    /// HP removed by the damage area action.
    pub damage_amount: u8,
    /// Upper bound on the roll-again loop when a roll lands on the
    /// mover's current area.
    pub reroll_cap: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 8,
            special_dice_sum: 7,
            pairing: PairingMode::Randomized,
            heal_amount: 1,
            damage_amount: 2,
            reroll_cap: 32,
        }
    }
}

impl GameConfig {
    /// Faction distribution for a seated player count:
    /// (hunters, shadows, neutrals). `None` if the count is unplayable.
    pub fn faction_distribution(&self, players: usize) -> Option<(usize, usize, usize)> {
        match players {
            2 => Some((1, 1, 0)),
            3 => Some((1, 1, 1)),
            4 => Some((2, 2, 0)),
            5 => Some((2, 2, 1)),
            6 => Some((2, 2, 2)),
            7 => Some((2, 2, 3)),
            8 => Some((3, 3, 2)),
            _ => None,
        }
    }

    /// The fixed pairing used by `PairingMode::Static`.
    pub fn static_pairings(&self, content: &Content) -> Vec<(AreaId, AreaId)> {
        // Pair areas in definition order: 1st with 2nd, 3rd with 4th, ...
        content
            .areas
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0].id.clone(), pair[1].id.clone()))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_content_lookups() {
        let content = Content::standard();

        assert_eq!(content.character("warden").unwrap().faction, Faction::Hunter);
        assert_eq!(content.area("church").unwrap().dice_range, (6, 6));
        assert_eq!(content.card("b_cursed_blade").unwrap().deck, DeckId::Black);
        assert!(content.character("nobody").is_none());
    }

    #[test]
    fn test_dice_sum_routing() {
        let content = Content::standard();
        let config = GameConfig::default();

        assert_eq!(content.area_for_sum(2).unwrap().id, "hermit_cabin");
        assert_eq!(content.area_for_sum(3).unwrap().id, "hermit_cabin");
        assert_eq!(content.area_for_sum(4).unwrap().id, "underworld_gate");
        assert_eq!(content.area_for_sum(6).unwrap().id, "church");
        assert_eq!(content.area_for_sum(8).unwrap().id, "cemetery");
        assert_eq!(content.area_for_sum(10).unwrap().id, "forgotten_altar");

        // The special sum routes nowhere: it forces a choice.
        assert!(content.area_for_sum(config.special_dice_sum).is_none());
    }

    #[test]
    fn test_roster_covers_distributions() {
        let content = Content::standard();
        let config = GameConfig::default();

        for players in 2..=8 {
            let (h, s, n) = config.faction_distribution(players).unwrap();
            assert_eq!(h + s + n, players);
            assert!(content.characters_of(Faction::Hunter).len() >= h);
            assert!(content.characters_of(Faction::Shadow).len() >= s);
            assert!(content.characters_of(Faction::Neutral).len() >= n);
        }
        assert!(config.faction_distribution(9).is_none());
    }

    #[test]
    fn test_static_pairings_cover_all_areas() {
        let content = Content::standard();
        let config = GameConfig::default();

        let pairs = config.static_pairings(&content);
        assert_eq!(pairs.len(), content.areas.len() / 2);

        let mut seen: Vec<&str> = pairs
            .iter()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), content.areas.len());
    }
}
