use delve_engine::{Dice, DiceError, DiceExpr};
use proptest::prelude::*;

#[test]
fn parses_count_sides_and_modifier() {
    assert_eq!(DiceExpr::parse("2d6+3").unwrap(), DiceExpr::new(2, 6, 3));
    assert_eq!(DiceExpr::parse("1d8").unwrap(), DiceExpr::new(1, 8, 0));
    assert_eq!(DiceExpr::parse("4d4-1").unwrap(), DiceExpr::new(4, 4, -1));
    assert_eq!(DiceExpr::parse(" 3D10 + 2 ").unwrap(), DiceExpr::new(3, 10, 2));
}

#[test]
fn display_matches_input_form() {
    assert_eq!(DiceExpr::new(2, 6, 3).to_string(), "2d6+3");
    assert_eq!(DiceExpr::new(1, 20, 0).to_string(), "1d20");
    assert_eq!(DiceExpr::new(1, 4, -1).to_string(), "1d4-1");
}

#[test]
fn malformed_expressions_are_typed_errors() {
    assert_eq!(DiceExpr::parse(""), Err(DiceError::Empty));
    assert!(matches!(DiceExpr::parse("abc"), Err(DiceError::MissingSeparator(_))));
    assert!(matches!(DiceExpr::parse("xd6"), Err(DiceError::BadCount(_))));
    assert!(matches!(DiceExpr::parse("0d6"), Err(DiceError::BadCount(_))));
    assert!(matches!(DiceExpr::parse("2d"), Err(DiceError::BadSides(_))));
    assert!(matches!(DiceExpr::parse("2d0"), Err(DiceError::BadSides(_))));
    assert!(matches!(DiceExpr::parse("2d6+"), Err(DiceError::BadModifier(_))));
    assert!(matches!(DiceExpr::parse("2d6+x"), Err(DiceError::BadModifier(_))));
}

#[test]
fn oversized_expressions_are_rejected() {
    for src in ["1d6+2147483647", "70000d70000", "1001d6", "1d1001", "1d6-10001"] {
        assert_eq!(DiceExpr::parse(src), Err(DiceError::OutOfRange(src.to_string())), "{src}");
    }
    assert!(matches!(DiceExpr::parse("1d6+99999999999999999999"), Err(DiceError::BadModifier(_))));
    assert!(Dice::from_seed(7).roll_expr("1d6+2147483647").is_err());
    assert!(Dice::from_seed(7).roll_expr("70000d70000").is_err());
}

#[test]
fn largest_accepted_expression_rolls_without_overflow() {
    let expr = DiceExpr::parse("1000d1000+10000").unwrap();
    assert_eq!(expr.max(), 1_010_000);
    assert_eq!(expr.min(), 11_000);
    let rolled = expr.roll_crit(&mut Dice::from_seed(3));
    assert!((2_000 + 10_000..=2_000_000 + 10_000).contains(&rolled));
    // hand-built expressions past the parse limits saturate
    assert_eq!(DiceExpr::new(70_000, 70_000, 5).max(), i32::MAX);
}

#[test]
fn roll_expr_surfaces_parse_errors() {
    let mut dice = Dice::from_seed(1);
    assert!(dice.roll_expr("d").is_err());
    let rolled = dice.roll_expr("3d6").unwrap();
    assert!((3..=18).contains(&rolled));
}

#[test]
fn scripted_dice_replay_their_values() {
    let mut dice = Dice::from_scripted(vec![4, 2]);
    assert_eq!(DiceExpr::new(2, 6, 1).roll(&mut dice), 7);
    // cycle wraps back to the start
    assert_eq!(dice.d20(), 4);
    assert_eq!(dice.pick(5), 0);
}

#[test]
fn crit_rolls_the_dice_twice_but_adds_the_modifier_once() {
    let mut dice = Dice::from_scripted(vec![3]);
    assert_eq!(DiceExpr::new(2, 6, 2).roll_crit(&mut dice), 3 * 4 + 2);
}

#[test]
fn same_seed_same_rolls() {
    let expr = DiceExpr::new(4, 6, 0);
    let mut a = Dice::from_seed(2025);
    let mut b = Dice::from_seed(2025);
    let left: Vec<i32> = (0..20).map(|_| expr.roll(&mut a)).collect();
    let right: Vec<i32> = (0..20).map(|_| expr.roll(&mut b)).collect();
    assert_eq!(left, right);
}

#[test]
fn serde_uses_the_string_form() {
    let expr: DiceExpr = serde_json::from_str("\"1d12+3\"").unwrap();
    assert_eq!(expr, DiceExpr::new(1, 12, 3));
    assert_eq!(serde_json::to_string(&expr).unwrap(), "\"1d12+3\"");
    assert!(serde_json::from_str::<DiceExpr>("\"twelve\"").is_err());
}

proptest! {
    #[test]
    fn rolls_stay_within_bounds(
        count in 1u32..8,
        sides in 1u32..20,
        modifier in -5i32..6,
        seed in any::<u64>(),
    ) {
        let expr = DiceExpr::new(count, sides, modifier);
        let mut dice = Dice::from_seed(seed);
        for _ in 0..16 {
            let r = expr.roll(&mut dice);
            prop_assert!(r >= expr.min() && r <= expr.max(), "{} rolled {}", expr, r);
        }
    }

    #[test]
    fn display_then_parse_is_identity(
        count in 1u32..50,
        sides in 1u32..100,
        modifier in -20i32..20,
    ) {
        let expr = DiceExpr::new(count, sides, modifier);
        prop_assert_eq!(expr.to_string().parse::<DiceExpr>().unwrap(), expr);
    }
}
