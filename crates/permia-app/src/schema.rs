// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{
    CardStatus, CouponType, EntityKind, OrderStatus, ProductType, SharedAccountStatus, UserRole,
    UserStatus,
};

/// Static description of one management screen: which columns it shows,
/// which of them are editable, which fields the global search covers, and
/// which filters and add actions the toolbar offers.
#[derive(Debug, PartialEq)]
pub struct TableSchema {
    pub kind: EntityKind,
    pub title: &'static str,
    pub columns: &'static [ColumnSpec],
    pub search_fields: &'static [&'static str],
    pub filters: &'static [FilterSpec],
    pub add_actions: &'static [AddAction],
}

impl TableSchema {
    pub fn column(&self, key: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    pub fn filter(&self, key: &str) -> Option<&'static FilterSpec> {
        self.filters.iter().find(|filter| filter.key == key)
    }

    pub fn add_action(&self, key: &str) -> Option<&'static AddAction> {
        self.add_actions.iter().find(|action| action.key == key)
    }

    pub fn editable_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        let columns: &'static [ColumnSpec] = self.columns;
        columns.iter().filter(|column| column.editor.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
    pub renderer: CellRenderer,
    pub editor: Option<EditorKind>,
    /// Sensitive value offered for clipboard copy.
    pub copyable: bool,
}

impl ColumnSpec {
    const fn plain(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            renderer: CellRenderer::Plain,
            editor: None,
            copyable: false,
        }
    }

    const fn rendered(self, renderer: CellRenderer) -> Self {
        Self { renderer, ..self }
    }

    const fn editable(self, editor: EditorKind) -> Self {
        Self {
            editor: Some(editor),
            ..self
        }
    }

    const fn copyable(self) -> Self {
        Self {
            copyable: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRenderer {
    Plain,
    /// Fixed-width identifiers such as card numbers.
    Mono,
    /// Secrets, shown as bullets.
    Masked,
    Money,
    /// `value / denominator` against another numeric field.
    Ratio { denominator: &'static str },
    Badge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Text,
    Number,
    Choice(&'static [&'static str]),
    Toggle(ToggleMapping),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMapping {
    /// The field itself is a boolean.
    Flag,
    /// A two-state subset of an enumerated field.
    Choice {
        on: &'static str,
        off: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Categorical {
        field: &'static str,
        options: &'static [FilterOption],
    },
    /// `numerator / denominator` bucketed by the capacity policy.
    Ratio {
        numerator: &'static str,
        denominator: &'static str,
    },
    /// Field must be at least the user-supplied number.
    MinThreshold { field: &'static str },
}

impl FilterKind {
    /// Selectable values in toolbar order, not counting the inactive `all`.
    pub fn options(&self) -> &'static [FilterOption] {
        match self {
            Self::Categorical { options, .. } => *options,
            Self::Ratio { .. } => RATIO_OPTIONS,
            Self::MinThreshold { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> FilterOption {
    FilterOption { value, label }
}

pub const RATIO_LOW: &str = "low";
pub const RATIO_HIGH: &str = "high";

const RATIO_OPTIONS: &[FilterOption] = &[
    option(RATIO_LOW, "mostly free"),
    option(RATIO_HIGH, "nearly full"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddAction {
    pub key: &'static str,
    pub label: &'static str,
}

pub static USER_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::Users,
    title: "Users",
    columns: &[
        ColumnSpec::plain("fullName", "Name"),
        ColumnSpec::plain("email", "Email"),
        ColumnSpec::plain("phone", "Phone").rendered(CellRenderer::Mono),
        ColumnSpec::plain("totalOrders", "Orders"),
        ColumnSpec::plain("totalSpent", "Spent").rendered(CellRenderer::Money),
        ColumnSpec::plain("role", "Role").editable(EditorKind::Choice(UserRole::OPTIONS)),
        ColumnSpec::plain("status", "Status")
            .rendered(CellRenderer::Badge)
            .editable(EditorKind::Choice(UserStatus::OPTIONS)),
        ColumnSpec::plain("createdAt", "Joined"),
    ],
    search_fields: &["fullName", "email", "phone"],
    filters: &[
        FilterSpec {
            key: "status",
            label: "status",
            kind: FilterKind::Categorical {
                field: "status",
                options: &[
                    option("Active", "active"),
                    option("Suspended", "suspended"),
                    option("Banned", "banned"),
                ],
            },
        },
        FilterSpec {
            key: "role",
            label: "role",
            kind: FilterKind::Categorical {
                field: "role",
                options: &[
                    option("admin", "admin"),
                    option("operator", "operator"),
                    option("customer", "customer"),
                ],
            },
        },
    ],
    add_actions: &[],
};

pub static PRODUCT_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::Products,
    title: "Products",
    columns: &[
        ColumnSpec::plain("name", "Name").editable(EditorKind::Text),
        ColumnSpec::plain("type", "Type").editable(EditorKind::Choice(ProductType::OPTIONS)),
        ColumnSpec::plain("category", "Category").editable(EditorKind::Text),
        ColumnSpec::plain("price", "Price")
            .rendered(CellRenderer::Money)
            .editable(EditorKind::Number),
        ColumnSpec::plain("stock", "Stock").editable(EditorKind::Number),
        ColumnSpec::plain("status", "Status")
            .rendered(CellRenderer::Badge)
            .editable(EditorKind::Toggle(ToggleMapping::Choice {
                on: "Active",
                off: "Hidden",
            })),
    ],
    search_fields: &["name", "category"],
    filters: &[
        FilterSpec {
            key: "type",
            label: "type",
            kind: FilterKind::Categorical {
                field: "type",
                options: &[
                    option("shared", "shared"),
                    option("private", "private"),
                    option("vcc", "vcc"),
                    option("manual", "manual"),
                ],
            },
        },
        FilterSpec {
            key: "status",
            label: "status",
            kind: FilterKind::Categorical {
                field: "status",
                options: &[
                    option("Active", "active"),
                    option("Hidden", "hidden"),
                    option("OutOfStock", "out of stock"),
                ],
            },
        },
    ],
    add_actions: &[AddAction {
        key: "product",
        label: "add product",
    }],
};

pub static ORDER_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::Orders,
    title: "Orders",
    columns: &[
        ColumnSpec::plain("orderNumber", "Order").rendered(CellRenderer::Mono),
        ColumnSpec::plain("customer", "Customer"),
        ColumnSpec::plain("product", "Product"),
        ColumnSpec::plain("amount", "Amount").rendered(CellRenderer::Money),
        ColumnSpec::plain("createdAt", "Date"),
        ColumnSpec::plain("status", "Status")
            .rendered(CellRenderer::Badge)
            .editable(EditorKind::Choice(OrderStatus::OPTIONS)),
    ],
    search_fields: &["orderNumber", "customer", "product"],
    filters: &[FilterSpec {
        key: "status",
        label: "status",
        kind: FilterKind::Categorical {
            field: "status",
            options: &[
                option("Pending", "awaiting payment"),
                option("Paid", "paid"),
                option("Completed", "completed"),
            ],
        },
    }],
    add_actions: &[],
};

pub static COUPON_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::Coupons,
    title: "Coupons",
    columns: &[
        ColumnSpec::plain("code", "Code")
            .rendered(CellRenderer::Mono)
            .editable(EditorKind::Text),
        ColumnSpec::plain("type", "Type").editable(EditorKind::Choice(CouponType::OPTIONS)),
        ColumnSpec::plain("value", "Value").editable(EditorKind::Number),
        ColumnSpec::plain("used", "Used").rendered(CellRenderer::Ratio {
            denominator: "maxUsage",
        }),
        ColumnSpec::plain("expiresAt", "Expires"),
        ColumnSpec::plain("active", "Active").editable(EditorKind::Toggle(ToggleMapping::Flag)),
    ],
    search_fields: &["code"],
    filters: &[FilterSpec {
        key: "active",
        label: "state",
        kind: FilterKind::Categorical {
            field: "active",
            options: &[option("true", "active"), option("false", "inactive")],
        },
    }],
    add_actions: &[AddAction {
        key: "coupon",
        label: "create coupon",
    }],
};

pub static SHARED_ACCOUNT_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::SharedAccounts,
    title: "Shared accounts",
    columns: &[
        ColumnSpec::plain("service", "Service"),
        ColumnSpec::plain("email", "Email"),
        ColumnSpec::plain("password", "Password")
            .rendered(CellRenderer::Masked)
            .copyable(),
        ColumnSpec::plain("usedSlots", "Capacity").rendered(CellRenderer::Ratio {
            denominator: "maxSlots",
        }),
        ColumnSpec::plain("status", "Status")
            .rendered(CellRenderer::Badge)
            .editable(EditorKind::Choice(SharedAccountStatus::OPTIONS)),
    ],
    search_fields: &["service", "email"],
    filters: &[
        FilterSpec {
            key: "status",
            label: "status",
            kind: FilterKind::Categorical {
                field: "status",
                options: &[
                    option("Active", "active"),
                    option("Limited", "limited"),
                    option("Disabled", "disabled"),
                ],
            },
        },
        FilterSpec {
            key: "capacity",
            label: "capacity",
            kind: FilterKind::Ratio {
                numerator: "usedSlots",
                denominator: "maxSlots",
            },
        },
    ],
    add_actions: &[AddAction {
        key: "account",
        label: "add account",
    }],
};

pub static VIRTUAL_CARD_SCHEMA: TableSchema = TableSchema {
    kind: EntityKind::VirtualCards,
    title: "Virtual cards",
    columns: &[
        ColumnSpec::plain("pan", "Card number")
            .rendered(CellRenderer::Mono)
            .copyable(),
        ColumnSpec::plain("expiry", "Expiry").rendered(CellRenderer::Mono),
        ColumnSpec::plain("cvv", "CVV").rendered(CellRenderer::Masked),
        ColumnSpec::plain("balance", "Balance").rendered(CellRenderer::Money),
        ColumnSpec::plain("provider", "Provider"),
        ColumnSpec::plain("status", "Status")
            .rendered(CellRenderer::Badge)
            .editable(EditorKind::Choice(CardStatus::OPTIONS)),
    ],
    search_fields: &["pan", "provider"],
    filters: &[
        FilterSpec {
            key: "status",
            label: "status",
            kind: FilterKind::Categorical {
                field: "status",
                options: &[
                    option("Available", "available"),
                    option("Used", "used"),
                    option("Expired", "expired"),
                ],
            },
        },
        FilterSpec {
            key: "minBalance",
            label: "min balance",
            kind: FilterKind::MinThreshold { field: "balance" },
        },
    ],
    add_actions: &[
        AddAction {
            key: "single",
            label: "add card",
        },
        AddAction {
            key: "bulk",
            label: "bulk import",
        },
    ],
};

pub fn schema_for(kind: EntityKind) -> &'static TableSchema {
    match kind {
        EntityKind::Users => &USER_SCHEMA,
        EntityKind::Products => &PRODUCT_SCHEMA,
        EntityKind::Orders => &ORDER_SCHEMA,
        EntityKind::Coupons => &COUPON_SCHEMA,
        EntityKind::SharedAccounts => &SHARED_ACCOUNT_SCHEMA,
        EntityKind::VirtualCards => &VIRTUAL_CARD_SCHEMA,
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorKind, FilterKind, schema_for};
    use crate::model::{Coupon, EntityKind, Order, Product, SharedAccount, User, VirtualCard};
    use crate::record::Record;

    fn assert_fields_resolve<R: Record>(sample: &R) {
        let schema = R::schema();
        assert_eq!(schema.kind, R::KIND);
        for column in schema.columns {
            assert!(
                sample.field(column.key).is_some(),
                "{} column {} has no accessor",
                schema.title,
                column.key
            );
        }
        for field in schema.search_fields {
            assert!(sample.field(field).is_some(), "search field {field}");
        }
        for filter in schema.filters {
            let fields: Vec<&str> = match filter.kind {
                FilterKind::Categorical { field, .. } => vec![field],
                FilterKind::Ratio {
                    numerator,
                    denominator,
                } => vec![numerator, denominator],
                FilterKind::MinThreshold { field } => vec![field],
            };
            for field in fields {
                assert!(sample.field(field).is_some(), "filter field {field}");
            }
        }
    }

    fn from_json<R: serde::de::DeserializeOwned>(json: &str) -> anyhow::Result<R> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn every_schema_column_has_an_accessor() -> anyhow::Result<()> {
        let user: User = from_json(
            r#"{"id":"1","fullName":"a","email":"b","phone":"c","totalOrders":1,"totalSpent":2,"status":"Active","role":"admin","createdAt":"d"}"#,
        )?;
        let product: Product = from_json(
            r#"{"id":"1","name":"a","type":"vcc","category":"b","price":1,"stock":2,"status":"Hidden"}"#,
        )?;
        let order: Order = from_json(
            r#"{"id":"1","orderNumber":"PM-1","customer":"a","product":"b","amount":1,"createdAt":"c","status":"Paid"}"#,
        )?;
        let coupon: Coupon = from_json(
            r#"{"id":"1","code":"A","type":"fixed","value":5,"maxUsage":5,"used":1,"expiresAt":"x","active":true}"#,
        )?;
        let account: SharedAccount = from_json(
            r#"{"id":"1","service":"a","email":"b","password":"c","maxSlots":4,"usedSlots":1,"status":"Limited"}"#,
        )?;
        let card: VirtualCard = from_json(
            r#"{"id":"1","pan":"4111","expiry":"12/27","cvv":"123","balance":5,"provider":"x","status":"Used"}"#,
        )?;
        assert_fields_resolve(&user);
        assert_fields_resolve(&product);
        assert_fields_resolve(&order);
        assert_fields_resolve(&coupon);
        assert_fields_resolve(&account);
        assert_fields_resolve(&card);
        Ok(())
    }

    #[test]
    fn schema_for_matches_kind() {
        for kind in EntityKind::ALL {
            assert_eq!(schema_for(kind).kind, kind);
        }
    }

    #[test]
    fn editable_columns_follow_the_screens() {
        let keys = |kind| -> Vec<&'static str> {
            schema_for(kind)
                .editable_columns()
                .map(|column| column.key)
                .collect()
        };
        assert_eq!(keys(EntityKind::Users), ["role", "status"]);
        assert_eq!(
            keys(EntityKind::Products),
            ["name", "type", "category", "price", "stock", "status"]
        );
        assert_eq!(keys(EntityKind::Orders), ["status"]);
        assert_eq!(keys(EntityKind::Coupons), ["code", "type", "value", "active"]);
        assert_eq!(keys(EntityKind::SharedAccounts), ["status"]);
        assert_eq!(keys(EntityKind::VirtualCards), ["status"]);
    }

    #[test]
    fn copyable_columns_are_the_secrets() {
        let shared = schema_for(EntityKind::SharedAccounts);
        let cards = schema_for(EntityKind::VirtualCards);
        assert!(shared.column("password").is_some_and(|c| c.copyable));
        assert!(cards.column("pan").is_some_and(|c| c.copyable));
        assert!(cards.column("cvv").is_some_and(|c| !c.copyable));
        assert!(matches!(
            shared.column("status").and_then(|c| c.editor),
            Some(EditorKind::Choice(_))
        ));
    }
}
