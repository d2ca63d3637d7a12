//! Built-in strategy definitions.
//!
//! Definitions are plain data. Shortcut names and expressions stay textual
//! here and are resolved (and validated) by `StrategyRegistry::from_defs`.

use crate::components::indicator::MaColumn;
use crate::components::predicate::{
    Crossover, EqualityPair, FlatnessPair, Predicate, RankConstraint, Rising,
};
use crate::domain::Granularity;

/// One conjunct of a strategy definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Named MA ordering at a slot.
    Shortcut { name: String, slot: usize },
    /// Comparison expression such as `MA5 == MA10` at a slot.
    Expr { expr: String, slot: usize },
    /// Already-typed predicate.
    Predicate(Predicate),
}

/// Unresolved strategy: an id, a granularity and its terms.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyDef {
    pub id: String,
    pub granularity: Granularity,
    pub terms: Vec<Term>,
}

impl StrategyDef {
    pub fn new(id: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            id: id.into(),
            granularity,
            terms: Vec::new(),
        }
    }

    pub fn shortcut(mut self, name: impl Into<String>, slot: usize) -> Self {
        self.terms.push(Term::Shortcut {
            name: name.into(),
            slot,
        });
        self
    }

    pub fn expr(mut self, expr: impl Into<String>, slot: usize) -> Self {
        self.terms.push(Term::Expr {
            expr: expr.into(),
            slot,
        });
        self
    }

    pub fn with(mut self, predicate: impl Into<Predicate>) -> Self {
        self.terms.push(Term::Predicate(predicate.into()));
        self
    }

    /// MA5 and MA10 both rising at the current row.
    pub fn short_trend_up(self) -> Self {
        self.with(Rising::new(MaColumn::MA5, 0))
            .with(Rising::new(MaColumn::MA10, 0))
    }

    /// Weekly transition named by its shortcuts, oldest first:
    /// `"2_to_3"` puts shortcut 2 at slot 1 and shortcut 3 at slot 0.
    pub fn transition(id: &str) -> Self {
        let steps: Vec<&str> = id.split("_to_").collect();
        let last = steps.len() - 1;
        let def = steps
            .iter()
            .enumerate()
            .fold(Self::new(id, Granularity::Weekly), |def, (i, name)| {
                def.shortcut(*name, last - i)
            });
        def.short_trend_up()
    }
}

fn flat(id: &str, a: MaColumn, b: MaColumn) -> StrategyDef {
    StrategyDef::new(id, Granularity::Daily)
        .with(FlatnessPair::new(a, b, 1))
        .with(FlatnessPair::new(a, b, 2))
        .short_trend_up()
}

fn equal_two_days(id: &str, a: MaColumn, b: MaColumn) -> StrategyDef {
    StrategyDef::new(id, Granularity::Daily)
        .with(EqualityPair::new(a, b, 1))
        .with(EqualityPair::new(a, b, 2))
        .short_trend_up()
}

fn rank_rising_3(id: &str, granularity: Granularity, column: MaColumn) -> StrategyDef {
    StrategyDef::new(id, granularity).with(RankConstraint::new(column, vec![3, 2, 1]))
}

pub const WEEKLY_TRANSITIONS: &[&str] = &[
    "3_to_7-7",
    "7-7_to_7-8",
    "3_to_7-3",
    "2_to_3",
    "2-2_to_7-3",
    "2-1_to_7-1",
    "3-1_to_7-7",
    "3-1_to_7-8",
    "3-1_to_9",
    "2_to_7-3",
    "3_to_7-8",
    "1-1_to_10",
    "1-1_to_A+1",
    "10_to_1-1_to_10",
    "3-1_to_7-5_to_3",
    "1_to_7-5_to_7-7",
    "1_to_7-5_to_1",
    "1_to_7-5_to_3",
    "7-5_to_7-7_to_3-1",
];

/// The full built-in catalog, daily strategies first.
pub fn builtin_defs() -> Vec<StrategyDef> {
    use MaColumn as C;

    let mut defs = vec![
        flat("MA5_MA10_Flat", C::MA5, C::MA10),
        flat("MA10_MA20_Flat", C::MA10, C::MA20),
        flat("MA5_MA20_Flat", C::MA5, C::MA20),
        equal_two_days("MA5_Eq_MA10_2Days", C::MA5, C::MA10),
        equal_two_days("MA10_Eq_MA20_2Days", C::MA10, C::MA20),
        equal_two_days("MA5_Eq_MA20_2Days", C::MA5, C::MA20),
        StrategyDef::new("MA5_cross_MA10", Granularity::Daily).with(Crossover::new(C::MA5, C::MA10)),
        StrategyDef::new("MA5_Eq_MA10_Expr", Granularity::Daily)
            .expr("MA5 == MA10", 0)
            .expr("MA5 == MA10", 1),
        rank_rising_3("MA5_Rank_Rising_3", Granularity::Daily, C::MA5),
        rank_rising_3("MA10_Rank_Rising_3", Granularity::Daily, C::MA10),
    ];

    defs.extend(WEEKLY_TRANSITIONS.iter().map(|id| StrategyDef::transition(id)));
    defs.push(rank_rising_3("W_MA20_Rank_Rising_3", Granularity::Weekly, C::MA20));
    defs
}
