use tracing::{debug, warn};

use super::{Choice, RestType, Scene, SceneKind};
use crate::combat::{run_combat, CombatOutcome};
use crate::game::GameContext;

pub(super) fn run_scene(scene: &Scene, ctx: &mut GameContext<'_>) -> Option<String> {
    if !scene.title.is_empty() {
        ctx.ui.show(&format!("== {} ==", scene.title));
    }
    match &scene.kind {
        SceneKind::Narrative { text, next_scene } => {
            ctx.ui.show(text);
            ctx.ui.pause();
            next_scene.clone()
        }
        SceneKind::Choice { description, choices } => choose(ctx, &scene.id, description, choices),
        SceneKind::Combat { description, monsters, on_victory, on_defeat } => {
            fight(ctx, description, monsters, on_victory, on_defeat)
        }
        SceneKind::Rest { rest_type, next_scene } => {
            rest(ctx, *rest_type);
            next_scene.clone()
        }
        SceneKind::Merchant { merchant_id, next_scene } => {
            shop(ctx, merchant_id);
            next_scene.clone()
        }
    }
}

fn choose(
    ctx: &mut GameContext<'_>,
    id: &str,
    description: &str,
    choices: &[Choice],
) -> Option<String> {
    if !description.is_empty() {
        ctx.ui.show(description);
    }
    if choices.is_empty() {
        warn!(scene = id, "choice scene has no options; ending scenario");
        return None;
    }
    let options: Vec<String> = choices.iter().map(|c| c.text.clone()).collect();
    let picked = ctx.ui.choose("What do you do?", &options).min(choices.len() - 1);
    let choice = &choices[picked];
    for (counter, delta) in &choice.effects {
        let now = ctx.state.add(counter, *delta);
        debug!(counter = %counter, delta, now, "choice effect");
    }
    choice.next_scene.clone()
}

fn fight(
    ctx: &mut GameContext<'_>,
    description: &str,
    monster_ids: &[String],
    on_victory: &Option<String>,
    on_defeat: &Option<String>,
) -> Option<String> {
    if !description.is_empty() {
        ctx.ui.show(description);
    }
    let monsters = ctx.monsters.create_many(monster_ids);
    if monsters.is_empty() {
        warn!(?monster_ids, "no monsters could be created; the way is clear");
        return on_victory.clone();
    }

    let standing_before = ctx.alive_count();
    let report = run_combat(&mut ctx.party, monsters, &mut ctx.dice, &ctx.combat);
    for line in &report.log {
        ctx.ui.show(line);
    }
    let dropped = standing_before.saturating_sub(ctx.alive_count());
    ctx.state.add("deaths", dropped as i64);
    ctx.state.add("total_xp", i64::from(report.xp_awarded));
    ctx.ui.pause();

    match report.outcome {
        CombatOutcome::Victory => {
            ctx.state.add("combat_victories", 1);
            on_victory.clone()
        }
        CombatOutcome::Defeat | CombatOutcome::Stalemate => on_defeat.clone(),
    }
}

fn rest(ctx: &mut GameContext<'_>, rest_type: RestType) {
    for hero in ctx.party.iter_mut() {
        if !hero.is_alive() {
            continue;
        }
        let healed = match rest_type {
            RestType::Short => hero.short_rest(&mut ctx.dice),
            RestType::Long => hero.long_rest(),
        };
        ctx.ui.show(&format!(
            "{} rests: +{} HP ({}/{})",
            hero.name, healed, hero.hit_points, hero.max_hit_points
        ));
    }
}

/// Buy/sell loop for one shopper. Leaving is always the first option.
fn shop(ctx: &mut GameContext<'_>, merchant_id: &str) {
    let Some(stock) = ctx.merchants.get(merchant_id) else {
        warn!(merchant = merchant_id, "unknown merchant; nothing to trade");
        return;
    };
    ctx.ui.show(&format!("Welcome to {}.", stock.name));

    let shoppers: Vec<usize> = (0..ctx.party.len()).filter(|&i| ctx.party[i].is_alive()).collect();
    if shoppers.is_empty() {
        return;
    }
    let names: Vec<String> = shoppers
        .iter()
        .map(|&i| format!("{} ({} gp)", ctx.party[i].name, ctx.party[i].gold))
        .collect();
    let who = shoppers[ctx.ui.choose("Who is shopping?", &names).min(shoppers.len() - 1)];

    let menu = ["Leave".to_string(), "Buy".to_string(), "Sell".to_string()];
    loop {
        match ctx.ui.choose("Trade", &menu) {
            1 => shop_buy(ctx, merchant_id, who),
            2 => shop_sell(ctx, merchant_id, who),
            _ => break,
        }
    }
}

fn shop_buy(ctx: &mut GameContext<'_>, merchant_id: &str, who: usize) {
    let Some(stock) = ctx.merchants.get(merchant_id) else {
        return;
    };
    let ids: Vec<String> = stock.entries.keys().cloned().collect();
    let mut options = vec!["Back".to_string()];
    options.extend(
        stock
            .entries
            .values()
            .map(|e| format!("{} - {} gp ({} left)", e.item.name, e.price, e.quantity)),
    );
    let picked = ctx.ui.choose("Buy what?", &options);
    let Some(id) = picked.checked_sub(1).and_then(|i| ids.get(i)) else {
        return;
    };
    let gold_before = ctx.party[who].gold;
    match ctx.merchants.buy(merchant_id, &mut ctx.party[who], id, 1) {
        Ok(tx) => {
            ctx.state.add("gold_spent", i64::from(gold_before - ctx.party[who].gold));
            ctx.ui.show(&format!("{} buys {} for {} gp.", tx.character, tx.item, tx.gold));
        }
        Err(err) => ctx.ui.show(&err.to_string()),
    }
}

fn shop_sell(ctx: &mut GameContext<'_>, merchant_id: &str, who: usize) {
    let mut options = vec!["Back".to_string()];
    options.extend(
        ctx.party[who]
            .inventory
            .iter()
            .map(|i| format!("{} - {} gp", i.name, i.resale_value())),
    );
    let picked = ctx.ui.choose("Sell what?", &options);
    let Some(index) = picked.checked_sub(1).filter(|&i| i < ctx.party[who].inventory.len()) else {
        return;
    };
    match ctx.merchants.sell(merchant_id, &mut ctx.party[who], index) {
        Ok(tx) => ctx.ui.show(&format!("{} sells {} for {} gp.", tx.character, tx.item, tx.gold)),
        Err(err) => ctx.ui.show(&err.to_string()),
    }
}
