// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

use tracing::{debug, info};

use crate::deferred::DeferredValue;
use crate::edit::{CellInput, commit_cell};
use crate::filter::{CapacityPolicy, FILTER_ALL, FilterPipeline, is_active_value, is_inactive};
use crate::ids::RowId;
use crate::model::{
    Coupon, DashboardCounts, Dataset, EntityKind, Order, Product, SharedAccount, User, VirtualCard,
};
use crate::pagination::{DEFAULT_PAGE_SIZE, Pagination};
use crate::record::{FieldValue, Record};
use crate::schema::{CellRenderer, FilterKind, FilterSpec, TableSchema};
use crate::store::RowStore;

/// Called when the user asks to create a record; creation itself happens
/// outside the table.
pub type AddHook = Box<dyn FnMut(EntityKind, &'static str)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    pub page_size: usize,
    pub capacity: CapacityPolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            capacity: CapacityPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    /// Raw search box contents; filtering catches up on the next tick.
    SetSearch(String),
    SetFilter {
        key: &'static str,
        value: String,
    },
    ClearFilters,
    CommitCell {
        row_id: RowId,
        field: &'static str,
        input: CellInput,
    },
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    SetPageSize(usize),
    RequestAdd(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SearchApplied(String),
    FilterChanged {
        key: &'static str,
        value: String,
    },
    FiltersCleared,
    RowPatched {
        row_id: RowId,
        field: &'static str,
        value: FieldValue,
    },
    PageChanged(usize),
    PageSizeChanged(usize),
    AddRequested {
        kind: EntityKind,
        action: &'static str,
    },
    Resynced {
        rows: usize,
    },
}

/// Editable, filterable, paginated view over one [`RowStore`].
///
/// All user actions go through [`TableController::dispatch`]; after each one
/// the filtered positions and page index are recomputed so readers always
/// see a consistent page.
pub struct TableController<R: Record> {
    store: RowStore<R>,
    search: DeferredValue<String>,
    filter_values: Vec<String>,
    capacity: CapacityPolicy,
    pagination: Pagination,
    filtered: Vec<usize>,
    add_hook: Option<AddHook>,
}

impl<R: Record> fmt::Debug for TableController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableController")
            .field("kind", &R::KIND)
            .field("rows", &self.store.len())
            .field("search", &self.search)
            .field("filter_values", &self.filter_values)
            .field("pagination", &self.pagination)
            .field("filtered", &self.filtered.len())
            .finish_non_exhaustive()
    }
}

impl<R: Record> TableController<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self::with_options(records, TableOptions::default())
    }

    pub fn with_options(records: Vec<R>, options: TableOptions) -> Self {
        let mut controller = Self {
            store: RowStore::new(records),
            search: DeferredValue::new(String::new()),
            filter_values: vec![FILTER_ALL.to_owned(); R::schema().filters.len()],
            capacity: options.capacity,
            pagination: Pagination::new(options.page_size),
            filtered: Vec::new(),
            add_hook: None,
        };
        controller.recompute();
        controller
    }

    pub fn set_add_hook(&mut self, hook: AddHook) {
        self.add_hook = Some(hook);
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        match command {
            TableCommand::SetSearch(term) => {
                self.search.set(term);
                Vec::new()
            }
            TableCommand::SetFilter { key, value } => self.set_filter(key, value),
            TableCommand::ClearFilters => self.clear_filters(),
            TableCommand::CommitCell {
                row_id,
                field,
                input,
            } => self.commit(&row_id, field, input),
            TableCommand::NextPage => {
                let total = self.filtered.len();
                self.page_moved(|pages| pages.next(total))
            }
            TableCommand::PreviousPage => self.page_moved(Pagination::previous),
            TableCommand::FirstPage => self.page_moved(Pagination::first),
            TableCommand::LastPage => {
                let total = self.filtered.len();
                self.page_moved(|pages| pages.last(total))
            }
            TableCommand::SetPageSize(size) => {
                let previous = self.pagination.page_index();
                if !self.pagination.set_page_size(size, self.filtered.len()) {
                    return Vec::new();
                }
                let mut events = vec![TableEvent::PageSizeChanged(size)];
                if self.pagination.page_index() != previous {
                    events.push(TableEvent::PageChanged(self.pagination.page_index()));
                }
                events
            }
            TableCommand::RequestAdd(action) => self.request_add(action),
        }
    }

    /// Idle-time catch-up: publishes the latest search input and refilters.
    /// Empty when nothing was pending.
    pub fn tick(&mut self) -> Vec<TableEvent> {
        if !self.search.tick() {
            return Vec::new();
        }
        let term = self.search.deferred().clone();
        debug!(kind = R::KIND.as_str(), term = %term, "search applied");
        let mut events = vec![TableEvent::SearchApplied(term)];
        events.extend(self.recompute());
        events
    }

    /// External resync. Local edits are discarded.
    pub fn replace_all(&mut self, records: Vec<R>) -> Vec<TableEvent> {
        self.store.replace_all(records);
        info!(
            kind = R::KIND.as_str(),
            rows = self.store.len(),
            "table resynced"
        );
        let mut events = vec![TableEvent::Resynced {
            rows: self.store.len(),
        }];
        events.extend(self.recompute());
        events
    }

    pub fn store(&self) -> &RowStore<R> {
        &self.store
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered.len())
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn search_input(&self) -> &str {
        self.search.immediate()
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn filter_value(&self, key: &str) -> Option<&str> {
        let position = R::schema().filters.iter().position(|spec| spec.key == key)?;
        self.filter_values.get(position).map(String::as_str)
    }

    /// Filters currently narrowing the view, in toolbar order.
    pub fn active_filters(&self) -> Vec<(&'static FilterSpec, &str)> {
        R::schema()
            .filters
            .iter()
            .zip(&self.filter_values)
            .filter(|(spec, value)| is_active_value(spec.kind, value))
            .map(|(spec, value)| (spec, value.as_str()))
            .collect()
    }

    pub fn filtered_records(&self) -> Vec<&R> {
        let rows = self.store.rows();
        self.filtered.iter().map(|&position| &rows[position]).collect()
    }

    /// Records on the current page.
    pub fn visible_records(&self) -> Vec<&R> {
        let rows = self.store.rows();
        self.filtered[self.pagination.range(self.filtered.len())]
            .iter()
            .map(|&position| &rows[position])
            .collect()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let schema = R::schema();
        let rows = self
            .visible_records()
            .into_iter()
            .map(|record| RowView::of(record, schema))
            .collect();
        TableSnapshot {
            kind: R::KIND,
            schema,
            rows,
            page_index: self.pagination.page_index(),
            page_count: self.page_count(),
            page_size: self.pagination.page_size(),
            filtered_count: self.filtered.len(),
            total_count: self.store.len(),
            search_input: self.search.immediate().clone(),
            search_pending: self.search.is_pending(),
            filters: schema
                .filters
                .iter()
                .zip(&self.filter_values)
                .map(|(spec, value)| FilterState {
                    spec,
                    value: value.clone(),
                })
                .collect(),
            revision: self.store.revision(),
        }
    }

    /// Display text of a copyable cell. Other columns never leave the table
    /// this way.
    pub fn sensitive_value(&self, row_id: &RowId, field: &str) -> Option<String> {
        let column = R::schema().column(field)?;
        if !column.copyable {
            return None;
        }
        self.store
            .get(row_id)?
            .field(column.key)
            .map(|value| value.display())
    }

    fn set_filter(&mut self, key: &'static str, value: String) -> Vec<TableEvent> {
        let schema = R::schema();
        let Some(position) = schema.filters.iter().position(|spec| spec.key == key) else {
            debug!(kind = R::KIND.as_str(), key, "unknown filter");
            return Vec::new();
        };
        if !accepts(schema.filters[position].kind, &value) {
            debug!(kind = R::KIND.as_str(), key, value = %value, "filter value not offered");
            return Vec::new();
        }
        if self.filter_values[position] == value {
            return Vec::new();
        }
        self.filter_values[position].clone_from(&value);
        let mut events = vec![TableEvent::FilterChanged { key, value }];
        events.extend(self.recompute());
        events
    }

    fn clear_filters(&mut self) -> Vec<TableEvent> {
        let had_search = !self.search.immediate().is_empty() || !self.search.deferred().is_empty();
        let had_filters = self.filter_values.iter().any(|value| !is_inactive(value));
        if !had_search && !had_filters {
            return Vec::new();
        }
        self.search.reset(String::new());
        for value in &mut self.filter_values {
            *value = FILTER_ALL.to_owned();
        }
        let mut events = vec![TableEvent::FiltersCleared];
        events.extend(self.recompute());
        events
    }

    fn commit(&mut self, row_id: &RowId, field: &str, input: CellInput) -> Vec<TableEvent> {
        let Some(column) = R::schema().column(field) else {
            debug!(kind = R::KIND.as_str(), field, "commit on unknown column");
            return Vec::new();
        };
        let Some(record) = self.store.get(row_id) else {
            debug!(kind = R::KIND.as_str(), %row_id, "commit on missing row");
            return Vec::new();
        };
        let Some(intent) = commit_cell(record, column, input) else {
            return Vec::new();
        };
        let Some(updated) = intent.apply(record) else {
            return Vec::new();
        };
        // Integer columns truncate, so the stored value can differ from the
        // intent and may equal the old one.
        let Some(stored) = updated.field(intent.field) else {
            return Vec::new();
        };
        if record.field(intent.field).as_ref() == Some(&stored) {
            debug!(kind = R::KIND.as_str(), field = intent.field, "edit stores the same value");
            return Vec::new();
        }
        if !self.store.patch(&intent.row_id, move |_| updated) {
            return Vec::new();
        }
        info!(
            kind = R::KIND.as_str(),
            row_id = %intent.row_id,
            field = intent.field,
            value = %stored,
            "cell edited"
        );
        let mut events = vec![TableEvent::RowPatched {
            row_id: intent.row_id,
            field: intent.field,
            value: stored,
        }];
        events.extend(self.recompute());
        events
    }

    fn page_moved(&mut self, step: impl FnOnce(&mut Pagination) -> bool) -> Vec<TableEvent> {
        if step(&mut self.pagination) {
            vec![TableEvent::PageChanged(self.pagination.page_index())]
        } else {
            Vec::new()
        }
    }

    fn request_add(&mut self, action: &'static str) -> Vec<TableEvent> {
        let Some(spec) = R::schema().add_action(action) else {
            debug!(kind = R::KIND.as_str(), action, "no such add action");
            return Vec::new();
        };
        info!(kind = R::KIND.as_str(), action = spec.key, "add requested");
        if let Some(hook) = self.add_hook.as_mut() {
            hook(R::KIND, spec.key);
        }
        vec![TableEvent::AddRequested {
            kind: R::KIND,
            action: spec.key,
        }]
    }

    fn recompute(&mut self) -> Vec<TableEvent> {
        let pipeline = FilterPipeline::compile(
            R::schema(),
            self.search.deferred(),
            &self.filter_values,
            self.capacity,
        );
        self.filtered = pipeline.apply(self.store.rows());
        if self.pagination.clamp(self.filtered.len()) {
            vec![TableEvent::PageChanged(self.pagination.page_index())]
        } else {
            Vec::new()
        }
    }
}

fn accepts(kind: FilterKind, value: &str) -> bool {
    match kind {
        FilterKind::Categorical { .. } | FilterKind::Ratio { .. } => {
            is_inactive(value) || kind.options().iter().any(|option| option.value == value)
        }
        FilterKind::MinThreshold { .. } => true,
    }
}

/// One rendered cell: the field value plus, for ratio columns, the
/// denominator it is shown against.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub value: FieldValue,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: RowId,
    pub cells: Vec<CellView>,
}

impl RowView {
    fn of<R: Record>(record: &R, schema: &TableSchema) -> Self {
        let cells = schema
            .columns
            .iter()
            .map(|column| {
                let value = record
                    .field(column.key)
                    .unwrap_or_else(|| FieldValue::text(""));
                let total = match column.renderer {
                    CellRenderer::Ratio { denominator } => {
                        record.field(denominator).and_then(|value| value.as_number())
                    }
                    _ => None,
                };
                CellView { value, total }
            })
            .collect();
        Self {
            id: record.id().clone(),
            cells,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub spec: &'static FilterSpec,
    pub value: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        is_active_value(self.spec.kind, &self.value)
    }
}

/// Everything the rendering layer needs for one frame of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub kind: EntityKind,
    pub schema: &'static TableSchema,
    pub rows: Vec<RowView>,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub filtered_count: usize,
    pub total_count: usize,
    pub search_input: String,
    pub search_pending: bool,
    pub filters: Vec<FilterState>,
    pub revision: u64,
}

/// Kind-erased access to a [`TableController`], so one rendering layer can
/// drive every table.
pub trait TableView {
    fn kind(&self) -> EntityKind;
    fn schema(&self) -> &'static TableSchema;
    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent>;
    fn tick(&mut self) -> Vec<TableEvent>;
    fn snapshot(&self) -> TableSnapshot;
    fn cell(&self, row_id: &RowId, field: &str) -> Option<FieldValue>;
    fn filter_value(&self, key: &str) -> Option<&str>;
    fn sensitive_value(&self, row_id: &RowId, field: &str) -> Option<String>;
    fn set_add_hook(&mut self, hook: AddHook);
}

impl<R: Record> TableView for TableController<R> {
    fn kind(&self) -> EntityKind {
        R::KIND
    }

    fn schema(&self) -> &'static TableSchema {
        R::schema()
    }

    fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        TableController::dispatch(self, command)
    }

    fn tick(&mut self) -> Vec<TableEvent> {
        TableController::tick(self)
    }

    fn snapshot(&self) -> TableSnapshot {
        TableController::snapshot(self)
    }

    fn cell(&self, row_id: &RowId, field: &str) -> Option<FieldValue> {
        self.store.get(row_id)?.field(field)
    }

    fn filter_value(&self, key: &str) -> Option<&str> {
        TableController::filter_value(self, key)
    }

    fn sensitive_value(&self, row_id: &RowId, field: &str) -> Option<String> {
        TableController::sensitive_value(self, row_id, field)
    }

    fn set_add_hook(&mut self, hook: AddHook) {
        TableController::set_add_hook(self, hook);
    }
}

/// One controller per entity kind.
#[derive(Debug)]
pub struct TableSet {
    pub users: TableController<User>,
    pub products: TableController<Product>,
    pub orders: TableController<Order>,
    pub coupons: TableController<Coupon>,
    pub shared_accounts: TableController<SharedAccount>,
    pub virtual_cards: TableController<VirtualCard>,
}

impl TableSet {
    pub fn new(dataset: Dataset, options: TableOptions) -> Self {
        Self {
            users: TableController::with_options(dataset.users, options),
            products: TableController::with_options(dataset.products, options),
            orders: TableController::with_options(dataset.orders, options),
            coupons: TableController::with_options(dataset.coupons, options),
            shared_accounts: TableController::with_options(dataset.shared_accounts, options),
            virtual_cards: TableController::with_options(dataset.virtual_cards, options),
        }
    }

    pub fn get(&self, kind: EntityKind) -> &dyn TableView {
        match kind {
            EntityKind::Users => &self.users,
            EntityKind::Products => &self.products,
            EntityKind::Orders => &self.orders,
            EntityKind::Coupons => &self.coupons,
            EntityKind::SharedAccounts => &self.shared_accounts,
            EntityKind::VirtualCards => &self.virtual_cards,
        }
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut dyn TableView {
        match kind {
            EntityKind::Users => &mut self.users,
            EntityKind::Products => &mut self.products,
            EntityKind::Orders => &mut self.orders,
            EntityKind::Coupons => &mut self.coupons,
            EntityKind::SharedAccounts => &mut self.shared_accounts,
            EntityKind::VirtualCards => &mut self.virtual_cards,
        }
    }

    /// Replaces one table's rows with the matching collection of `dataset`.
    pub fn resync(&mut self, kind: EntityKind, dataset: Dataset) -> Vec<TableEvent> {
        match kind {
            EntityKind::Users => self.users.replace_all(dataset.users),
            EntityKind::Products => self.products.replace_all(dataset.products),
            EntityKind::Orders => self.orders.replace_all(dataset.orders),
            EntityKind::Coupons => self.coupons.replace_all(dataset.coupons),
            EntityKind::SharedAccounts => self.shared_accounts.replace_all(dataset.shared_accounts),
            EntityKind::VirtualCards => self.virtual_cards.replace_all(dataset.virtual_cards),
        }
    }

    pub fn dashboard_counts(&self) -> DashboardCounts {
        DashboardCounts::from_rows(self.users.store().rows(), self.orders.store().rows())
    }

    /// Ticks every table; returns the kinds whose view changed.
    pub fn tick(&mut self) -> Vec<EntityKind> {
        EntityKind::ALL
            .into_iter()
            .filter(|kind| !self.get_mut(*kind).tick().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{TableCommand, TableController, TableEvent, TableOptions, TableSet, TableView};
    use crate::edit::CellInput;
    use crate::model::{
        CardStatus, Dataset, EntityKind, Product, ProductStatus, ProductType, SharedAccount,
        SharedAccountStatus, VirtualCard,
    };
    use crate::record::{FieldValue, Record};
    use crate::RowId;

    fn card(id: usize, balance: f64, status: CardStatus) -> VirtualCard {
        VirtualCard {
            id: RowId::new(id.to_string()),
            pan: format!("4000 0000 0000 {id:04}"),
            expiry: "05/28".to_owned(),
            cvv: "000".to_owned(),
            balance,
            provider: if id % 2 == 0 { "Wise" } else { "Brocard" }.to_owned(),
            status,
        }
    }

    fn cards(count: usize) -> Vec<VirtualCard> {
        (1..=count)
            .map(|id| card(id, id as f64 * 100.0, CardStatus::Available))
            .collect()
    }

    fn ids(records: &[&VirtualCard]) -> Vec<String> {
        records.iter().map(|card| card.id.to_string()).collect()
    }

    fn filter(key: &'static str, value: &str) -> TableCommand {
        TableCommand::SetFilter {
            key,
            value: value.to_owned(),
        }
    }

    #[test]
    fn search_waits_for_tick() {
        let mut table = TableController::new(cards(4));
        table.dispatch(TableCommand::SetSearch("w".to_owned()));
        table.dispatch(TableCommand::SetSearch("wis".to_owned()));
        assert_eq!(table.filtered_count(), 4);
        assert!(table.is_search_pending());
        assert_eq!(table.search_input(), "wis");

        let events = table.tick();
        assert_eq!(events, vec![TableEvent::SearchApplied("wis".to_owned())]);
        assert_eq!(ids(&table.filtered_records()), ["2", "4"]);
        assert!(table.tick().is_empty());
    }

    #[test]
    fn narrowing_filter_clamps_to_last_page() {
        let mut table = TableController::with_options(
            cards(25),
            TableOptions {
                page_size: 10,
                ..TableOptions::default()
            },
        );
        table.dispatch(TableCommand::LastPage);
        assert_eq!(table.pagination().page_index(), 2);

        let events = table.dispatch(filter("minBalance", "1600"));
        assert_eq!(
            events,
            vec![
                TableEvent::FilterChanged {
                    key: "minBalance",
                    value: "1600".to_owned(),
                },
                TableEvent::PageChanged(0),
            ]
        );
        assert_eq!(table.filtered_count(), 10);
        assert_eq!(table.visible_records().len(), 10);
    }

    #[test]
    fn unknown_filter_or_option_is_ignored() {
        let mut table = TableController::new(cards(3));
        assert!(table.dispatch(filter("color", "red")).is_empty());
        assert!(table.dispatch(filter("status", "Lost")).is_empty());
        assert_eq!(table.filter_value("status"), Some("all"));
        assert!(table.active_filters().is_empty());
    }

    #[test]
    fn edit_that_leaves_the_filter_drops_the_row() {
        let mut table = TableController::new(cards(3));
        table.dispatch(filter("status", "Available"));
        let events = table.dispatch(TableCommand::CommitCell {
            row_id: RowId::from("2"),
            field: "status",
            input: CellInput::Choice("Used".to_owned()),
        });
        assert!(matches!(events.first(), Some(TableEvent::RowPatched { .. })));
        assert_eq!(ids(&table.filtered_records()), ["1", "3"]);
        assert_eq!(table.store().len(), 3);
    }

    #[test]
    fn unparseable_threshold_is_not_reported_active() {
        let mut table = TableController::new(cards(3));
        table.dispatch(filter("minBalance", "abc"));
        assert_eq!(table.filter_value("minBalance"), Some("abc"));
        assert_eq!(table.filtered_count(), 3);
        assert!(table.active_filters().is_empty());
        assert!(table.snapshot().filters.iter().all(|state| !state.is_active()));

        table.dispatch(filter("minBalance", "200"));
        assert_eq!(table.active_filters().len(), 1);
        assert_eq!(table.filtered_count(), 2);
    }

    #[test]
    fn fractional_stock_that_truncates_to_the_same_count_is_not_patched() {
        let product = Product {
            id: RowId::from("1"),
            name: "Claude Pro seat".to_owned(),
            product_type: ProductType::Shared,
            category: "Claude".to_owned(),
            price: 12.0,
            stock: 2,
            status: ProductStatus::Active,
        };
        let mut table = TableController::new(vec![product]);
        let revision = table.store().revision();
        let before = table.snapshot();
        let commit = |input: &str| TableCommand::CommitCell {
            row_id: RowId::from("1"),
            field: "stock",
            input: CellInput::Text(input.to_owned()),
        };

        assert!(table.dispatch(commit("2.7")).is_empty());
        assert_eq!(table.store().revision(), revision);
        assert_eq!(table.snapshot(), before);

        let events = table.dispatch(commit("5.9"));
        assert_eq!(
            events.first(),
            Some(&TableEvent::RowPatched {
                row_id: RowId::from("1"),
                field: "stock",
                value: FieldValue::Number(5.0),
            })
        );
        let stored = table.store().get(&RowId::from("1")).and_then(|row| row.field("stock"));
        assert_eq!(stored, Some(FieldValue::Number(5.0)));
    }

    #[test]
    fn commit_on_missing_row_is_a_no_op() {
        let mut table = TableController::new(cards(2));
        let revision = table.store().revision();
        let events = table.dispatch(TableCommand::CommitCell {
            row_id: RowId::from("99"),
            field: "status",
            input: CellInput::Choice("Used".to_owned()),
        });
        assert!(events.is_empty());
        assert_eq!(table.store().revision(), revision);
    }

    #[test]
    fn clear_filters_resets_search_and_values() {
        let mut table = TableController::new(cards(5));
        table.dispatch(TableCommand::SetSearch("brocard".to_owned()));
        table.tick();
        table.dispatch(filter("minBalance", "300"));
        assert_eq!(table.filtered_count(), 2);

        let events = table.dispatch(TableCommand::ClearFilters);
        assert_eq!(events.first(), Some(&TableEvent::FiltersCleared));
        assert_eq!(table.filtered_count(), 5);
        assert_eq!(table.search_input(), "");
        assert!(table.dispatch(TableCommand::ClearFilters).is_empty());
    }

    #[test]
    fn add_hook_fires_for_declared_actions_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut table = TableController::new(cards(1));
        table.set_add_hook(Box::new(move |kind, action| {
            sink.borrow_mut().push((kind, action));
        }));

        let events = table.dispatch(TableCommand::RequestAdd("bulk"));
        assert_eq!(
            events,
            vec![TableEvent::AddRequested {
                kind: EntityKind::VirtualCards,
                action: "bulk",
            }]
        );
        assert!(table.dispatch(TableCommand::RequestAdd("account")).is_empty());
        assert_eq!(*seen.borrow(), vec![(EntityKind::VirtualCards, "bulk")]);
    }

    #[test]
    fn sensitive_value_only_for_copyable_columns() {
        let table = TableController::new(cards(1));
        let id = RowId::from("1");
        assert_eq!(
            table.sensitive_value(&id, "pan").as_deref(),
            Some("4000 0000 0000 0001")
        );
        assert!(table.sensitive_value(&id, "cvv").is_none());
        assert!(table.sensitive_value(&RowId::from("2"), "pan").is_none());
    }

    #[test]
    fn snapshot_carries_ratio_totals() {
        let account = SharedAccount {
            id: RowId::from("1"),
            service: "ChatGPT Plus".to_owned(),
            email: "chatgpt-shared-01@permia.ai".to_owned(),
            password: "P@ssw0rd-01".to_owned(),
            max_slots: 10,
            used_slots: 7,
            status: SharedAccountStatus::Active,
        };
        let table = TableController::new(vec![account]);
        let snapshot = table.snapshot();
        let capacity = snapshot
            .schema
            .column_index("usedSlots")
            .expect("capacity column");
        assert_eq!(snapshot.rows[0].cells[capacity].total, Some(10.0));
        assert_eq!(snapshot.page_count, 1);
        assert_eq!(snapshot.filters.len(), 2);
        assert!(snapshot.filters.iter().all(|filter| !filter.is_active()));
    }

    #[test]
    fn table_set_resyncs_one_kind() {
        let mut tables = TableSet::new(
            Dataset {
                virtual_cards: cards(3),
                ..Dataset::default()
            },
            TableOptions::default(),
        );
        tables.get_mut(EntityKind::VirtualCards).dispatch(TableCommand::CommitCell {
            row_id: RowId::from("1"),
            field: "status",
            input: CellInput::Choice("Expired".to_owned()),
        });

        let events = tables.resync(
            EntityKind::VirtualCards,
            Dataset {
                virtual_cards: cards(2),
                ..Dataset::default()
            },
        );
        assert_eq!(events, vec![TableEvent::Resynced { rows: 2 }]);
        let snapshot = tables.get(EntityKind::VirtualCards).snapshot();
        assert_eq!(snapshot.total_count, 2);
        assert_eq!(tables.virtual_cards.store().rows()[0].status, CardStatus::Available);
        assert_eq!(tables.get(EntityKind::Users).kind(), EntityKind::Users);
    }
}
