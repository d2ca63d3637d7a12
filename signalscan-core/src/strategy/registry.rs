//! Strategy registry: id → `StrategySpec`, built once and read-only after.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::components::predicate::{ColumnComparison, ExprError, Predicate};
use crate::domain::Granularity;

use super::catalog::{builtin_defs, StrategyDef, Term};
use super::shortcuts::shortcut_chain;
use super::StrategySpec;

// ─── Error type ──────────────────────────────────────────────────────

/// Errors raised while building a registry. Lookups never fail this way.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("strategy '{strategy}': unknown ordering shortcut '{name}'")]
    UnknownShortcut { strategy: String, name: String },

    #[error("strategy '{strategy}': {source}")]
    BadExpression {
        strategy: String,
        #[source]
        source: ExprError,
    },

    #[error("duplicate strategy id '{0}'")]
    DuplicateId(String),

    #[error("strategy '{0}' has no predicates")]
    Empty(String),

    #[error("strategy '{strategy}': {reason}")]
    InvalidPredicate { strategy: String, reason: String },
}

// ─── Registry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    specs: Vec<StrategySpec>,
    index: HashMap<String, usize>,
}

impl StrategyRegistry {
    /// Resolve definitions into specs, validating every term.
    pub fn from_defs(defs: Vec<StrategyDef>) -> Result<Self, RegistryError> {
        let specs = defs
            .into_iter()
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_specs(specs)
    }

    /// Register already-built specs. Ids must be unique.
    pub fn from_specs(specs: Vec<StrategySpec>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if spec.predicates().is_empty() {
                return Err(RegistryError::Empty(spec.id.clone()));
            }
            for predicate in spec.predicates() {
                check_predicate(predicate).map_err(|reason| RegistryError::InvalidPredicate {
                    strategy: spec.id.clone(),
                    reason,
                })?;
            }
            if index.insert(spec.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateId(spec.id.clone()));
            }
        }
        Ok(Self { specs, index })
    }

    /// Process-wide built-in catalog.
    pub fn builtin() -> &'static StrategyRegistry {
        static BUILTIN: OnceLock<StrategyRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            StrategyRegistry::from_defs(builtin_defs()).expect("built-in strategy catalog is valid")
        })
    }

    pub fn get(&self, id: &str) -> Option<&StrategySpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids of one granularity, in catalog order.
    pub fn ids(&self, granularity: Granularity) -> Vec<&str> {
        self.specs
            .iter()
            .filter(|s| s.granularity == granularity)
            .map(|s| s.id.as_str())
            .collect()
    }

    pub fn specs(&self) -> &[StrategySpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Shape checks for predicates that skipped their constructors, e.g. ones
/// deserialized from JSON.
fn check_predicate(predicate: &Predicate) -> Result<(), String> {
    match predicate {
        Predicate::Ordering(chain) if chain.columns.len() < 2 => Err(format!(
            "ordering chain needs at least two columns, got {}",
            chain.columns.len()
        )),
        Predicate::Rank(rank) if rank.targets.is_empty() => {
            Err(format!("rank constraint on {} has no target slots", rank.column))
        }
        Predicate::Crossover(cross) if cross.short == cross.long => {
            Err(format!("crossover of {} with itself", cross.short))
        }
        _ => Ok(()),
    }
}

fn resolve(def: StrategyDef) -> Result<StrategySpec, RegistryError> {
    let mut predicates: Vec<Predicate> = Vec::with_capacity(def.terms.len());
    for term in def.terms {
        let predicate = match term {
            Term::Shortcut { name, slot } => shortcut_chain(&name, slot)
                .ok_or_else(|| RegistryError::UnknownShortcut {
                    strategy: def.id.clone(),
                    name,
                })?
                .into(),
            Term::Expr { expr, slot } => ColumnComparison::parse(&expr, slot)
                .map_err(|source| RegistryError::BadExpression {
                    strategy: def.id.clone(),
                    source,
                })?
                .into(),
            Term::Predicate(p) => p,
        };
        predicates.push(predicate);
    }
    Ok(StrategySpec::new(def.id, def.granularity, predicates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::indicator::MaColumn;
    use crate::components::predicate::{PatternPredicate, Rising};

    #[test]
    fn builtin_catalog_builds() {
        let reg = StrategyRegistry::from_defs(builtin_defs()).unwrap();
        assert_eq!(reg.len(), 30);
        assert!(std::ptr::eq(StrategyRegistry::builtin(), StrategyRegistry::builtin()));
    }

    #[test]
    fn lookup_and_listing() {
        let reg = StrategyRegistry::builtin();
        let spec = reg.get("3_to_7-7").unwrap();
        assert_eq!(spec.granularity, Granularity::Weekly);
        assert_eq!(spec.depth(), 1);
        assert_eq!(spec.warmup_bars(), 61);
        assert!(reg.get("no_such_strategy").is_none());

        let daily = reg.ids(Granularity::Daily);
        assert_eq!(daily[0], "MA5_MA10_Flat");
        assert!(daily.contains(&"MA5_cross_MA10"));
        assert!(reg.ids(Granularity::Weekly).contains(&"W_MA20_Rank_Rising_3"));
    }

    #[test]
    fn expression_strategy_parses_once() {
        let spec = StrategyRegistry::builtin().get("MA5_Eq_MA10_Expr").unwrap();
        assert_eq!(spec.predicates().len(), 2);
        assert_eq!(spec.predicates()[1].describe(), "MA5 == MA10 @1");
    }

    #[test]
    fn unknown_shortcut_rejected() {
        let err = StrategyRegistry::from_defs(vec![StrategyDef::transition("4_to_3")]).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownShortcut {
                strategy: "4_to_3".into(),
                name: "4".into()
            }
        );
    }

    #[test]
    fn bad_expression_rejected() {
        let def = StrategyDef::new("bad", Granularity::Daily).expr("MA5 ~ MA10", 0);
        assert!(matches!(
            StrategyRegistry::from_defs(vec![def]),
            Err(RegistryError::BadExpression { .. })
        ));
    }

    #[test]
    fn deserialized_degenerate_predicates_rejected() {
        let short_chain: StrategySpec = serde_json::from_str(
            r#"{"id":"one","granularity":"daily","predicates":[{"kind":"ordering","slot":0,"columns":[5]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            StrategyRegistry::from_specs(vec![short_chain]),
            Err(RegistryError::InvalidPredicate { strategy, .. }) if strategy == "one"
        ));

        let no_targets: StrategySpec = serde_json::from_str(
            r#"{"id":"rank","granularity":"daily","predicates":[{"kind":"rank","column":5,"targets":[]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            StrategyRegistry::from_specs(vec![no_targets]),
            Err(RegistryError::InvalidPredicate { strategy, .. }) if strategy == "rank"
        ));
    }

    #[test]
    fn duplicate_and_empty_rejected() {
        let one = StrategyDef::new("x", Granularity::Daily).with(Rising::new(MaColumn::MA5, 0));
        assert_eq!(
            StrategyRegistry::from_defs(vec![one.clone(), one]).unwrap_err(),
            RegistryError::DuplicateId("x".into())
        );
        assert_eq!(
            StrategyRegistry::from_defs(vec![StrategyDef::new("e", Granularity::Daily)]).unwrap_err(),
            RegistryError::Empty("e".into())
        );
    }
}
