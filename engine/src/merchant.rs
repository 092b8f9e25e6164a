//! Shop stock, buying and selling.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::character::Character;
use crate::dice::DiceExpr;
use crate::item::{ArmorCategory, Item};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    pub item: Item,
    pub quantity: u32,
    /// Unit price in gold pieces.
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantStock {
    pub name: String,
    pub entries: IndexMap<String, StockEntry>,
}

impl MerchantStock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: IndexMap::new() }
    }

    /// Price defaults to the item's listed value.
    pub fn add_item(&mut self, id: &str, item: Item, quantity: u32, price: Option<u32>) {
        let price = price.unwrap_or(item.value);
        self.entries.insert(id.to_string(), StockEntry { item, quantity, price });
    }

    pub fn has_item(&self, id: &str, quantity: u32) -> bool {
        self.entries.get(id).is_some_and(|e| e.quantity >= quantity)
    }

    pub fn get(&self, id: &str) -> Option<&StockEntry> {
        self.entries.get(id)
    }

    /// Entries that run out are removed from the listing.
    pub fn remove_quantity(&mut self, id: &str, quantity: u32) -> bool {
        if !self.has_item(id, quantity) {
            return false;
        }
        let sold_out = match self.entries.get_mut(id) {
            Some(entry) => {
                entry.quantity -= quantity;
                entry.quantity == 0
            }
            None => return false,
        };
        if sold_out {
            self.entries.shift_remove(id);
        }
        true
    }

    pub fn add_quantity(&mut self, id: &str, quantity: u32) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.quantity += quantity;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stock every village shop opens with.
    pub fn village() -> Self {
        let mut shop = Self::new("Village Shop");
        let potion = |name: &str, count, sides, modifier, value| {
            Item::healing_potion(name, DiceExpr::new(count, sides, modifier), value)
        };
        shop.add_item("potion_healing", potion("Potion of Healing", 2, 4, 2, 50), 5, None);
        shop.add_item(
            "potion_greater_healing",
            potion("Potion of Greater Healing", 4, 4, 4, 100),
            2,
            None,
        );
        shop.add_item("potion_mana", Item::mana_potion("Potion of Mana", 1, 60), 3, None);

        let weapon = |name: &str, count, sides, kind: &str, value| {
            Item::weapon(name, DiceExpr::new(count, sides, 0), kind, value)
        };
        let dagger = weapon("Dagger", 1, 4, "piercing", 2).with_flags(true, false);
        shop.add_item("dagger", dagger, 10, None);
        shop.add_item(
            "shortsword",
            weapon("Shortsword", 1, 6, "piercing", 10).with_flags(true, false),
            3,
            None,
        );
        shop.add_item("longsword", weapon("Longsword", 1, 8, "slashing", 15), 2, None);
        shop.add_item("greatsword", weapon("Greatsword", 2, 6, "slashing", 50), 1, None);
        let longbow = weapon("Longbow", 1, 8, "piercing", 50).with_flags(false, true);
        shop.add_item("longbow", longbow, 2, None);

        let armor = |name: &str, ac, category, value| Item::armor(name, ac, category, value);
        let leather = armor("Leather Armor", 11, ArmorCategory::Light, 10);
        shop.add_item("leather_armor", leather, 2, None);
        shop.add_item("chain_mail", armor("Chain Mail", 16, ArmorCategory::Heavy, 75), 1, None);
        shop.add_item("plate_armor", armor("Plate Armor", 18, ArmorCategory::Heavy, 1500), 1, None);
        shop.add_item("shield", armor("Shield", 2, ArmorCategory::Shield, 10), 3, None);
        shop
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("no merchant registered as '{0}'")]
    UnknownMerchant(String),
    #[error("'{item}' is not in stock (wanted {requested})")]
    OutOfStock { item: String, requested: u32 },
    #[error("{character} needs {needed} gp but has {available} gp")]
    InsufficientGold { character: String, needed: u32, available: u32 },
    #[error("{character} has no inventory slot {index}")]
    NoSuchItem { character: String, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TradeKind,
    pub character: String,
    pub merchant: String,
    pub item: String,
    pub quantity: u32,
    /// Gold paid on a buy, received on a sell.
    pub gold: u32,
}

/// Buy `quantity` of `id`. Stock is checked before gold.
pub fn buy(
    character: &mut Character,
    stock: &mut MerchantStock,
    id: &str,
    quantity: u32,
) -> Result<Transaction, TradeError> {
    let quantity = quantity.max(1);
    let entry = stock
        .get(id)
        .filter(|e| e.quantity >= quantity)
        .ok_or_else(|| TradeError::OutOfStock { item: id.to_string(), requested: quantity })?;
    let cost = entry.price * quantity;
    if character.gold < cost {
        return Err(TradeError::InsufficientGold {
            character: character.name.clone(),
            needed: cost,
            available: character.gold,
        });
    }
    let item = entry.item.clone();
    character.gold -= cost;
    stock.remove_quantity(id, quantity);
    for _ in 0..quantity {
        character.add_item(item.clone());
    }
    Ok(Transaction {
        kind: TradeKind::Buy,
        character: character.name.clone(),
        merchant: stock.name.clone(),
        item: item.name,
        quantity,
        gold: cost,
    })
}

/// Sell one inventory item for half its value.
pub fn sell(
    character: &mut Character,
    stock: &MerchantStock,
    index: usize,
) -> Result<Transaction, TradeError> {
    let item = character
        .remove_item(index)
        .ok_or_else(|| TradeError::NoSuchItem { character: character.name.clone(), index })?;
    let price = item.resale_value();
    character.gold += price;
    Ok(Transaction {
        kind: TradeKind::Sell,
        character: character.name.clone(),
        merchant: stock.name.clone(),
        item: item.name,
        quantity: 1,
        gold: price,
    })
}

/// Every shop in the game plus the running ledger of trades.
#[derive(Debug, Clone, Default)]
pub struct MerchantRegistry {
    stocks: IndexMap<String, MerchantStock>,
    log: Vec<Transaction>,
}

impl MerchantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("village", MerchantStock::village());
        let mut desert = MerchantStock::village();
        desert.name = "Desert Caravan".to_string();
        registry.register("desert_merchant", desert);
        registry
    }

    pub fn register(&mut self, id: &str, stock: MerchantStock) {
        self.stocks.insert(id.to_string(), stock);
    }

    pub fn get(&self, id: &str) -> Option<&MerchantStock> {
        self.stocks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MerchantStock> {
        self.stocks.get_mut(id)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    pub fn buy(
        &mut self,
        merchant: &str,
        character: &mut Character,
        id: &str,
        quantity: u32,
    ) -> Result<Transaction, TradeError> {
        let stock = self
            .stocks
            .get_mut(merchant)
            .ok_or_else(|| TradeError::UnknownMerchant(merchant.to_string()))?;
        let tx = buy(character, stock, id, quantity)?;
        info!(character = %tx.character, item = %tx.item, gold = tx.gold, "bought");
        self.log.push(tx.clone());
        Ok(tx)
    }

    pub fn sell(
        &mut self,
        merchant: &str,
        character: &mut Character,
        index: usize,
    ) -> Result<Transaction, TradeError> {
        let stock = self
            .stocks
            .get(merchant)
            .ok_or_else(|| TradeError::UnknownMerchant(merchant.to_string()))?;
        let tx = sell(character, stock, index)?;
        info!(character = %tx.character, item = %tx.item, gold = tx.gold, "sold");
        self.log.push(tx.clone());
        Ok(tx)
    }
}
