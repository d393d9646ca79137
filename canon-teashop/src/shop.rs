//! The tea shop.
//!
//! Each order names a table and a tea key. The shop keeps one shared [`Tea`]
//! per variety and renders it for the ordering table; the table number is
//! never stored on the tea.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use canon_cache::{CacheConfig, CacheStats, InternCache, UsageLedger, UsageRecord, UsageReport};
use canon_core::{CanonResult, Resolution, UnknownKeyPolicy};
use serde::Serialize;

use crate::config::ShopConfig;
use crate::tea::{TableNumber, Tea, TeaVariety};

/// The orders replayed by the `teashop` demo: (table, tea key).
pub const DEMO_ORDERS: [(u32, &str); 5] = [
    (1, "karak"),
    (2, "karak"),
    (5, "jasmine"),
    (2, "karak"),
    (3, "jasmine"),
];

/// An order waiting to be served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeaOrder {
    pub table: TableNumber,
    pub tea: String,
}

/// End-of-service summary, as printed by the `teashop --json` binary.
#[derive(Debug, Clone, Serialize)]
pub struct ShopSummary {
    pub report: UsageReport,
    pub stats: CacheStats,
    pub records: Vec<UsageRecord<String, TableNumber>>,
}

#[derive(Debug)]
pub struct TeaShop {
    ledger: UsageLedger<String, Tea, TableNumber>,
    pending: VecDeque<TeaOrder>,
    policy: UnknownKeyPolicy,
}

impl TeaShop {
    /// Shop with the default menu and a strict unknown-key policy.
    pub fn new() -> Self {
        let config = ShopConfig::default();
        let menu = TeaVariety::ALL.into_iter().collect();
        Self::build(&config, menu)
    }

    /// Build a shop from validated configuration.
    pub fn from_config(config: &ShopConfig) -> CanonResult<Self> {
        config.validate()?;
        let menu = config.menu_varieties()?.into_iter().collect();
        Ok(Self::build(config, menu))
    }

    fn build(config: &ShopConfig, menu: HashSet<TeaVariety>) -> Self {
        let cache = InternCache::with_config(
            CacheConfig::new()
                .with_name("tea")
                .with_initial_capacity(config.initial_capacity),
        );
        let menu = Arc::new(menu);
        let policy = config.unknown_key_policy.clone();

        let resolver_policy = policy.clone();
        let ledger = UsageLedger::new(cache, brew).with_resolver(move |requested: &String| {
            resolve_tea(&resolver_policy, &menu, requested)
        });

        Self {
            ledger,
            pending: VecDeque::new(),
            policy,
        }
    }

    /// Serve `tea` to `table` right away.
    pub fn serve(&self, table: impl Into<TableNumber>, tea: impl Into<String>) -> CanonResult<String> {
        self.ledger.record(table.into(), tea.into())
    }

    /// Queue an order for [`serve_pending`](Self::serve_pending).
    pub fn take_order(&mut self, table: impl Into<TableNumber>, tea: impl Into<String>) {
        self.pending.push_back(TeaOrder {
            table: table.into(),
            tea: tea.into(),
        });
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Serve every queued order in the order it was taken.
    pub fn serve_pending(&mut self) -> Vec<CanonResult<String>> {
        let orders: Vec<TeaOrder> = self.pending.drain(..).collect();
        orders
            .into_iter()
            .map(|order| self.serve(order.table, order.tea))
            .collect()
    }

    /// Orders served (including rejected ones) and tea types created.
    pub fn report(&self) -> UsageReport {
        self.ledger.report()
    }

    pub fn report_line(&self) -> String {
        let report = self.report();
        format!(
            "Total orders: {}, Tea types created: {}",
            report.total_requests, report.distinct_keys
        )
    }

    pub fn summary(&self) -> ShopSummary {
        ShopSummary {
            report: self.report(),
            stats: self.ledger.stats(),
            records: self.ledger.records(),
        }
    }

    /// The shared tea for `variety`, if one has been brewed.
    pub fn tea(&self, variety: TeaVariety) -> Option<Arc<Tea>> {
        self.ledger.instance(&variety.as_key().to_string())
    }

    pub fn policy(&self) -> &UnknownKeyPolicy {
        &self.policy
    }

    pub fn ledger(&self) -> &UsageLedger<String, Tea, TableNumber> {
        &self.ledger
    }
}

impl Default for TeaShop {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a requested key to the canonical key of a tea on the menu.
fn resolve_tea(
    policy: &UnknownKeyPolicy,
    menu: &HashSet<TeaVariety>,
    requested: &str,
) -> CanonResult<String> {
    let on_menu = |key: &str| {
        key.parse::<TeaVariety>()
            .map(|v| menu.contains(&v))
            .unwrap_or(false)
    };
    let resolution = policy.resolve(requested, on_menu)?;
    if let Resolution::Substituted { requested, default } = resolution {
        tracing::warn!(requested, default, "tea not on menu, serving default");
    }
    let variety: TeaVariety = resolution.key().parse()?;
    Ok(variety.as_key().to_string())
}

fn brew(key: &String) -> CanonResult<Tea> {
    let variety: TeaVariety = key.parse()?;
    tracing::info!(tea = variety.as_key(), "Created new tea type");
    Ok(Tea::new(variety))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_order_creates_tea() {
        let shop = TeaShop::new();
        let line = shop.serve(1, "karak").unwrap();
        assert_eq!(line, "Serving Karak tea to table #1");
        assert_eq!(shop.report_line(), "Total orders: 1, Tea types created: 1");
    }

    #[test]
    fn test_case_variants_share_one_tea() {
        let shop = TeaShop::new();
        shop.serve(1, "karak").unwrap();
        let first = shop.tea(TeaVariety::Karak).unwrap();
        shop.serve(2, " KARAK ").unwrap();
        let second = shop.tea(TeaVariety::Karak).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(shop.report().distinct_keys, 1);
        assert_eq!(shop.ledger().records()[1].key, " KARAK ");
    }

    #[test]
    fn test_pending_orders_served_fifo() {
        let mut shop = TeaShop::new();
        for (table, tea) in DEMO_ORDERS {
            shop.take_order(table, tea);
        }
        assert_eq!(shop.pending(), 5);
        assert_eq!(shop.report().total_requests, 0);

        let served: Vec<String> = shop
            .serve_pending()
            .into_iter()
            .collect::<CanonResult<_>>()
            .unwrap();
        assert_eq!(
            served,
            vec![
                "Serving Karak tea to table #1",
                "Serving Karak tea to table #2",
                "Serving Jasmine tea to table #5",
                "Serving Karak tea to table #2",
                "Serving Jasmine tea to table #3",
            ]
        );
        assert_eq!(shop.pending(), 0);
        assert_eq!(shop.report_line(), "Total orders: 5, Tea types created: 2");
    }

    #[test]
    fn test_brew_rejects_unknown_key() {
        let err = brew(&"oolong".to_string()).unwrap_err();
        assert!(err.is_unknown_key());
    }

    #[test]
    fn test_resolve_tea_normalizes_known_key() {
        let menu: HashSet<TeaVariety> = TeaVariety::ALL.into_iter().collect();
        let key = resolve_tea(&UnknownKeyPolicy::Reject, &menu, "Jasmine").unwrap();
        assert_eq!(key, "jasmine");
    }

    #[test]
    fn test_resolve_tea_respects_restricted_menu() {
        let menu: HashSet<TeaVariety> = [TeaVariety::Jasmine].into_iter().collect();
        let err = resolve_tea(&UnknownKeyPolicy::Reject, &menu, "karak").unwrap_err();
        assert!(err.is_unknown_key());

        let policy = UnknownKeyPolicy::Fallback("jasmine".to_string());
        let key = resolve_tea(&policy, &menu, "karak").unwrap();
        assert_eq!(key, "jasmine");
    }

    #[test]
    fn test_summary_serializes() {
        let shop = TeaShop::new();
        shop.serve(4, "jasmine").unwrap();
        let json = serde_json::to_value(shop.summary()).unwrap();
        assert_eq!(json["report"]["total_requests"], 1);
        assert_eq!(json["report"]["distinct_keys"], 1);
        assert_eq!(json["records"][0]["site"], 4);
        assert_eq!(json["records"][0]["key"], "jasmine");
        assert_eq!(json["stats"]["misses"], 1);
    }
}
