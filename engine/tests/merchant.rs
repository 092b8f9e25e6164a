use delve_engine::merchant::{buy, sell, MerchantRegistry, MerchantStock, TradeError, TradeKind};
use delve_engine::{Abilities, Character, CharacterClass, Item};

fn shopper(gold: u32) -> Character {
    let mut hero = Character::new("Lyra", CharacterClass::rogue(), Abilities::default(), 1);
    hero.gold = gold;
    hero
}

fn rope_stall(quantity: u32) -> MerchantStock {
    let mut stock = MerchantStock::new("Rope Stall");
    stock.add_item("rope", Item::gear("Rope", 4), quantity, None);
    stock.add_item("lantern", Item::gear("Lantern", 10), 1, Some(12));
    stock
}

#[test]
fn buying_moves_gold_and_stock() {
    let mut hero = shopper(20);
    let mut stock = rope_stall(3);
    let tx = buy(&mut hero, &mut stock, "rope", 2).unwrap();

    assert_eq!(tx.kind, TradeKind::Buy);
    assert_eq!((tx.quantity, tx.gold), (2, 8));
    assert_eq!(hero.gold, 12);
    assert_eq!(hero.inventory.len(), 2);
    assert_eq!(stock.get("rope").unwrap().quantity, 1);
}

#[test]
fn listed_price_overrides_item_value() {
    let mut hero = shopper(12);
    let mut stock = rope_stall(1);
    assert_eq!(buy(&mut hero, &mut stock, "lantern", 1).unwrap().gold, 12);
    assert_eq!(hero.gold, 0);
}

#[test]
fn stock_is_checked_before_gold() {
    let mut broke = shopper(0);
    let mut stock = rope_stall(1);
    assert_eq!(
        buy(&mut broke, &mut stock, "rope", 5),
        Err(TradeError::OutOfStock { item: "rope".to_string(), requested: 5 })
    );
    assert_eq!(
        buy(&mut broke, &mut stock, "rope", 1),
        Err(TradeError::InsufficientGold { character: "Lyra".to_string(), needed: 4, available: 0 })
    );
    // a failed trade changes nothing
    assert_eq!(stock.get("rope").unwrap().quantity, 1);
    assert!(broke.inventory.is_empty());
}

#[test]
fn sold_out_entries_leave_the_listing() {
    let mut hero = shopper(100);
    let mut stock = rope_stall(1);
    buy(&mut hero, &mut stock, "rope", 1).unwrap();
    assert!(stock.get("rope").is_none());
    assert!(!stock.has_item("rope", 1));
    assert!(matches!(buy(&mut hero, &mut stock, "rope", 1), Err(TradeError::OutOfStock { .. })));
    buy(&mut hero, &mut stock, "lantern", 1).unwrap();
    assert!(stock.is_empty());
}

#[test]
fn selling_pays_half_value() {
    let mut hero = shopper(0).with_item(Item::gear("Silver Ring", 25));
    let stock = rope_stall(1);
    let tx = sell(&mut hero, &stock, 0).unwrap();
    assert_eq!(tx.kind, TradeKind::Sell);
    assert_eq!(tx.gold, 12);
    assert_eq!(hero.gold, 12);
    assert!(hero.inventory.is_empty());
    assert_eq!(
        sell(&mut hero, &stock, 0),
        Err(TradeError::NoSuchItem { character: "Lyra".to_string(), index: 0 })
    );
}

#[test]
fn registry_keeps_a_ledger() {
    let mut registry = MerchantRegistry::with_defaults();
    let mut hero = shopper(200);

    registry.buy("village", &mut hero, "potion_healing", 2).unwrap();
    registry.sell("village", &mut hero, 0).unwrap();
    assert_eq!(hero.gold, 200 - 100 + 25);

    let kinds: Vec<TradeKind> = registry.transactions().iter().map(|t| t.kind).collect();
    assert_eq!(kinds, [TradeKind::Buy, TradeKind::Sell]);
    assert_eq!(registry.transactions()[0].merchant, "Village Shop");
}

#[test]
fn unknown_merchants_are_rejected() {
    let mut registry = MerchantRegistry::with_defaults();
    let mut hero = shopper(200);
    assert_eq!(
        registry.buy("pirate_cove", &mut hero, "dagger", 1),
        Err(TradeError::UnknownMerchant("pirate_cove".to_string()))
    );
    assert!(registry.transactions().is_empty());
}

#[test]
fn each_shop_has_its_own_stock() {
    let mut registry = MerchantRegistry::with_defaults();
    let mut hero = shopper(5_000);
    registry.buy("desert_merchant", &mut hero, "plate_armor", 1).unwrap();

    assert!(registry.get("desert_merchant").unwrap().get("plate_armor").is_none());
    assert!(registry.get("village").unwrap().has_item("plate_armor", 1));
    assert_eq!(registry.get("desert_merchant").unwrap().name, "Desert Caravan");
}

#[test]
fn restocking_only_touches_listed_items() {
    let mut stock = rope_stall(1);
    stock.add_quantity("rope", 4);
    stock.add_quantity("anvil", 4);
    assert_eq!(stock.get("rope").unwrap().quantity, 5);
    assert!(stock.get("anvil").is_none());
    assert!(!stock.remove_quantity("rope", 6));
    assert!(stock.remove_quantity("rope", 5));
}
