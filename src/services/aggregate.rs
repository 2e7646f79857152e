//! Period aggregator
//!
//! Sums expanded installment entries over a date range. Entries are matched
//! on the date they were assigned to, never on the purchase date, and shares
//! always come from the expander.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, InvoiceMonth, Money, Transaction};
use crate::storage::TransactionStore;

use super::amortization::{AmortizationExpander, ExpandedEntry};

/// Collapse runs of whitespace and lowercase, for metadata comparisons
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Metadata filter applied per transaction
///
/// Empty allow-lists match everything. Comparisons ignore case and extra
/// whitespace; `search` is a substring match on the description.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub methods: Vec<String>,
    pub search: Option<String>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl AsRef<str>) -> Self {
        self.categories.push(normalize(category.as_ref()));
        self
    }

    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.push(normalize(tag.as_ref()));
        self
    }

    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.methods.push(normalize(method.as_ref()));
        self
    }

    pub fn search(mut self, text: impl AsRef<str>) -> Self {
        let text = normalize(text.as_ref());
        self.search = (!text.is_empty()).then_some(text);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.tags.is_empty()
            && self.methods.is_empty()
            && self.search.is_none()
    }

    /// Check a transaction against every configured criterion
    pub fn matches(&self, transaction: &Transaction) -> bool {
        fn allowed(list: &[String], value: &str) -> bool {
            list.is_empty() || list.iter().any(|v| normalize(v) == normalize(value))
        }

        allowed(&self.categories, &transaction.category)
            && allowed(&self.tags, &transaction.tag)
            && allowed(&self.methods, &transaction.method)
            && self
                .search
                .as_ref()
                .map_or(true, |s| normalize(&transaction.description).contains(s.as_str()))
    }
}

/// Dimension an aggregate can be broken down by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Category,
    Tag,
    Method,
    InvoiceMonth,
}

impl GroupKey {
    /// The group label an entry of `transaction` falls in
    ///
    /// Whitespace runs collapse; case is kept. Labels that `normalize` to the
    /// same string are one group.
    pub fn value_for(&self, transaction: &Transaction, entry: &ExpandedEntry) -> String {
        let raw = match self {
            GroupKey::Category => &transaction.category,
            GroupKey::Tag => &transaction.tag,
            GroupKey::Method => &transaction.method,
            GroupKey::InvoiceMonth => return entry.period.invoice_month.to_string(),
        };
        let label = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if label.is_empty() {
            "(none)".to_string()
        } else {
            label
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupKey::Category => "category",
            GroupKey::Tag => "tag",
            GroupKey::Method => "method",
            GroupKey::InvoiceMonth => "invoice-month",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GroupKey {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "category" | "categoria" => Ok(GroupKey::Category),
            "tag" => Ok(GroupKey::Tag),
            "method" | "metodo" | "método" => Ok(GroupKey::Method),
            "invoice-month" | "invoice_month" | "month" => Ok(GroupKey::InvoiceMonth),
            other => Err(CycleError::Validation(format!(
                "Unknown group key '{}'. Use category, tag, method or invoice-month",
                other
            ))),
        }
    }
}

/// Total of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: Money,
    pub count: usize,
}

/// Result of aggregating a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub range: DateRange,
    /// Exact total; round at output
    pub total: Money,
    /// Number of matched entries
    pub count: usize,
    /// Per-group totals, largest first, when a group key was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupTotal>>,
}

impl Aggregate {
    /// Total of a named group, zero when absent
    pub fn group_total(&self, key: &str) -> Money {
        let wanted = normalize(key);
        self.groups
            .iter()
            .flatten()
            .find(|g| normalize(&g.key) == wanted)
            .map(|g| g.total)
            .unwrap_or_default()
    }
}

/// An expanded entry together with the transaction it came from
#[derive(Debug, Clone)]
pub struct MatchedEntry<'t> {
    pub transaction: &'t Transaction,
    pub entry: ExpandedEntry,
}

impl MatchedEntry<'_> {
    /// Description with the installment suffix
    pub fn label(&self) -> String {
        self.entry.label(&self.transaction.description)
    }
}

/// Aggregates expanded entries over date ranges
#[derive(Debug, Clone, Copy)]
pub struct PeriodAggregator<'a> {
    expander: AmortizationExpander<'a>,
}

impl<'a> PeriodAggregator<'a> {
    pub fn new(expander: AmortizationExpander<'a>) -> Self {
        Self { expander }
    }

    pub fn expander(&self) -> &AmortizationExpander<'a> {
        &self.expander
    }

    /// Entries dated inside `range` from transactions accepted by `predicate`
    ///
    /// Ordered by entry date, then by installment index.
    pub fn entries_in<'t, I, P>(
        &self,
        transactions: I,
        range: &DateRange,
        predicate: P,
    ) -> Vec<MatchedEntry<'t>>
    where
        I: IntoIterator<Item = &'t Transaction>,
        P: Fn(&Transaction) -> bool,
    {
        let mut matched: Vec<MatchedEntry<'t>> = transactions
            .into_iter()
            .filter(|t| predicate(t))
            .flat_map(move |transaction| {
                self.expander
                    .expand(transaction)
                    .into_iter()
                    .filter(move |entry| range.contains(entry.date))
                    .map(move |entry| MatchedEntry { transaction, entry })
            })
            .collect();

        matched.sort_by(|a, b| {
            a.entry
                .date
                .cmp(&b.entry.date)
                .then(a.transaction.timestamp.cmp(&b.transaction.timestamp))
                .then(a.entry.installment_index.cmp(&b.entry.installment_index))
        });
        matched
    }

    /// Sum entries inside `range`, optionally broken down by `group`
    pub fn aggregate<'t, I, P>(
        &self,
        transactions: I,
        range: &DateRange,
        predicate: P,
        group: Option<GroupKey>,
    ) -> Aggregate
    where
        I: IntoIterator<Item = &'t Transaction>,
        P: Fn(&Transaction) -> bool,
    {
        let entries = self.entries_in(transactions, range, predicate);

        let total: Money = entries.iter().map(|m| m.entry.prorated_amount).sum();

        let groups = group.map(|key| {
            // Keyed by the normalized label; the first spelling seen is shown
            let mut by_key: BTreeMap<String, GroupTotal> = BTreeMap::new();
            for matched in &entries {
                let label = key.value_for(matched.transaction, &matched.entry);
                let slot = by_key.entry(normalize(&label)).or_insert_with(|| GroupTotal {
                    key: label,
                    total: Money::zero(),
                    count: 0,
                });
                slot.total += matched.entry.prorated_amount;
                slot.count += 1;
            }

            let mut groups: Vec<GroupTotal> = by_key.into_values().collect();
            groups.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
            groups
        });

        Aggregate {
            range: *range,
            total,
            count: entries.len(),
            groups,
        }
    }

    /// Read transactions from a store and aggregate them
    pub fn aggregate_store<S, P>(
        &self,
        store: &S,
        range: &DateRange,
        predicate: P,
        group: Option<GroupKey>,
    ) -> CycleResult<Aggregate>
    where
        S: TransactionStore + ?Sized,
        P: Fn(&Transaction) -> bool,
    {
        let transactions = store.read_all(Some(range))?;
        Ok(self.aggregate(&transactions, range, predicate, group))
    }

    /// First and last invoice months any entry of `transactions` lands in
    pub fn invoice_month_span<'t, I>(&self, transactions: I) -> Option<(InvoiceMonth, InvoiceMonth)>
    where
        I: IntoIterator<Item = &'t Transaction>,
    {
        transactions
            .into_iter()
            .flat_map(|transaction| self.expander.expand(transaction))
            .map(|entry| entry.period.invoice_month)
            .fold(None, |span, month| match span {
                None => Some((month, month)),
                Some((first, last)) => Some((first.min(month), last.max(month))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CycleSettings;
    use crate::services::calendar::CivilClock;
    use crate::services::cycle::CycleResolver;
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> CivilClock {
        CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn txn(on: NaiveDate, cents: i64, installments: u32, category: &str, method: &str) -> Transaction {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        Transaction::new(clock().instant_at(on, noon), Money::from_cents(cents), "Compra")
            .with_installments(installments)
            .with_metadata(category, "Pessoal", method)
    }

    fn range(a: NaiveDate, b: NaiveDate) -> DateRange {
        DateRange::new(a, b).unwrap()
    }

    #[test]
    fn test_filters_on_assigned_date() {
        let cycle = CycleSettings::default();
        let expander = AmortizationExpander::new(CycleResolver::new(&cycle), clock());
        let aggregator = PeriodAggregator::new(expander);

        let transactions = vec![txn(date(2025, 9, 10), 60000, 3, "Eletrônicos", "Crédito")];
        let transition = range(date(2025, 10, 4), date(2025, 11, 16));

        let result = aggregator.aggregate(&transactions, &transition, |_| true, None);
        assert_eq!(result.count, 1);
        assert_eq!(result.total, Money::from_cents(20000));

        let december = range(date(2025, 11, 17), date(2025, 12, 16));
        let result = aggregator.aggregate(&transactions, &december, |_| true, None);
        assert_eq!(result.count, 1);
        assert_eq!(result.total, Money::from_cents(20000));
    }

    #[test]
    fn test_metadata_filter_applies_to_every_installment() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));

        let transactions = vec![
            txn(date(2025, 9, 10), 60000, 3, "Eletrônicos", "Crédito"),
            txn(date(2025, 10, 10), 5000, 1, "Alimentação", "Pix"),
        ];
        let filter = EntryFilter::new().method("  crédito ");
        let all_time = range(date(2025, 1, 1), date(2026, 12, 31));

        let result = aggregator.aggregate(&transactions, &all_time, |t| filter.matches(t), None);
        assert_eq!(result.count, 3);
        assert_eq!(result.total, Money::from_cents(60000));
    }

    #[test]
    fn test_groups_sorted_by_total_then_key() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));

        let transactions = vec![
            txn(date(2025, 12, 1), 3000, 1, "Lazer", "Pix"),
            txn(date(2025, 12, 2), 5000, 1, "Mercado", "Pix"),
            txn(date(2025, 12, 3), 3000, 1, "Farmácia", "Pix"),
            txn(date(2025, 12, 4), 2000, 1, "Mercado", "Pix"),
        ];
        let december = range(date(2025, 11, 17), date(2025, 12, 16));

        let result =
            aggregator.aggregate(&transactions, &december, |_| true, Some(GroupKey::Category));
        let groups = result.groups.clone().unwrap();
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Mercado", "Farmácia", "Lazer"]);
        assert_eq!(groups[0].total, Money::from_cents(7000));
        assert_eq!(groups[0].count, 2);
        assert_eq!(result.group_total("Lazer"), Money::from_cents(3000));
        assert_eq!(result.group_total("Viagem"), Money::zero());
    }

    #[test]
    fn test_groups_merge_case_and_spacing_variants() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));

        let transactions = vec![
            txn(date(2025, 12, 1), 3000, 1, "Mercado", "Pix"),
            txn(date(2025, 12, 2), 2000, 1, " mercado ", "Pix"),
            txn(date(2025, 12, 3), 1000, 1, "Padaria  do Zé", "Pix"),
            txn(date(2025, 12, 4), 500, 1, "padaria do zé", "Pix"),
        ];
        let december = range(date(2025, 11, 17), date(2025, 12, 16));

        let result =
            aggregator.aggregate(&transactions, &december, |_| true, Some(GroupKey::Category));
        let groups = result.groups.clone().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Mercado");
        assert_eq!(groups[0].total, Money::from_cents(5000));
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].key, "Padaria do Zé");
        assert_eq!(groups[1].total, Money::from_cents(1500));
        assert_eq!(result.group_total("MERCADO"), Money::from_cents(5000));
    }

    #[test]
    fn test_group_by_invoice_month() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));

        let transactions = vec![txn(date(2025, 9, 10), 60000, 3, "Eletrônicos", "Crédito")];
        let all_time = range(date(2025, 1, 1), date(2026, 12, 31));

        let result = aggregator.aggregate(
            &transactions,
            &all_time,
            |_| true,
            Some(GroupKey::InvoiceMonth),
        );
        let mut keys: Vec<String> = result.groups.unwrap().into_iter().map(|g| g.key).collect();
        keys.sort();
        assert_eq!(keys, vec!["2025-10", "2025-11", "2025-12"]);
    }

    #[test]
    fn test_refunds_reduce_total() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));

        let transactions = vec![
            txn(date(2025, 12, 1), 10000, 1, "Roupas", "Crédito"),
            txn(date(2025, 12, 5), -2500, 1, "Roupas", "Crédito"),
        ];
        let december = range(date(2025, 11, 17), date(2025, 12, 16));
        let result = aggregator.aggregate(&transactions, &december, |_| true, None);
        assert_eq!(result.total, Money::from_cents(7500));
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_search_and_normalization() {
        let mut t = txn(date(2025, 12, 1), 1000, 1, "Alimentação", "Pix");
        t.description = "Padaria   do  Zé".into();

        assert!(EntryFilter::new().search("PADARIA do").matches(&t));
        assert!(!EntryFilter::new().search("mercado").matches(&t));
        assert!(EntryFilter::new().category("alimentação").matches(&t));
        assert!(!EntryFilter::new().category("lazer").matches(&t));
        assert!(EntryFilter::new().search("   ").is_empty());
    }

    #[test]
    fn test_group_key_parse() {
        assert_eq!("Category".parse::<GroupKey>().unwrap(), GroupKey::Category);
        assert_eq!("invoice-month".parse::<GroupKey>().unwrap(), GroupKey::InvoiceMonth);
        assert!("payee".parse::<GroupKey>().is_err());
    }

    #[test]
    fn test_aggregate_from_store() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));
        let store = vec![txn(date(2025, 12, 1), 1000, 1, "Lazer", "Pix")];

        let december = range(date(2025, 11, 17), date(2025, 12, 16));
        let result = aggregator
            .aggregate_store(&store, &december, |_| true, None)
            .unwrap();
        assert_eq!(result.total, Money::from_cents(1000));
    }

    #[test]
    fn test_invoice_month_span() {
        let cycle = CycleSettings::default();
        let aggregator =
            PeriodAggregator::new(AmortizationExpander::new(CycleResolver::new(&cycle), clock()));
        assert_eq!(aggregator.invoice_month_span(&Vec::<Transaction>::new()), None);

        let transactions = vec![
            txn(date(2025, 9, 10), 60000, 3, "Eletrônicos", "Crédito"),
            txn(date(2025, 3, 1), 5000, 1, "Alimentação", "Pix"),
        ];
        let span = aggregator.invoice_month_span(&transactions);
        assert_eq!(
            span,
            Some((
                InvoiceMonth::new(2025, 3).unwrap(),
                InvoiceMonth::new(2025, 12).unwrap()
            ))
        );
    }
}
