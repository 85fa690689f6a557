// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RowId;
use crate::record::{FieldValue, Record, number_to_count};
use crate::schema::{
    COUPON_SCHEMA, ORDER_SCHEMA, PRODUCT_SCHEMA, SHARED_ACCOUNT_SCHEMA, TableSchema, USER_SCHEMA,
    VIRTUAL_CARD_SCHEMA,
};

macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $wire:literal, $label:literal;)+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            pub const OPTIONS: &'static [&'static str] = &[$($wire),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

choice_enum!(UserStatus {
    Active => "Active", "active";
    Suspended => "Suspended", "suspended";
    Banned => "Banned", "banned";
});

choice_enum!(UserRole {
    Admin => "admin", "admin";
    Operator => "operator", "operator";
    Customer => "customer", "customer";
});

choice_enum!(ProductType {
    Shared => "shared", "shared account";
    Private => "private", "private account";
    Vcc => "vcc", "vcc card";
    Manual => "manual", "manual";
});

choice_enum!(ProductStatus {
    Active => "Active", "active";
    Hidden => "Hidden", "hidden";
    OutOfStock => "OutOfStock", "out of stock";
});

choice_enum!(OrderStatus {
    Pending => "Pending", "awaiting payment";
    Paid => "Paid", "paid";
    Completed => "Completed", "completed";
});

choice_enum!(CouponType {
    Percent => "percent", "percent (%)";
    Fixed => "fixed", "fixed ($)";
});

choice_enum!(SharedAccountStatus {
    Active => "Active", "active";
    Limited => "Limited", "limited";
    Disabled => "Disabled", "disabled";
});

choice_enum!(CardStatus {
    Available => "Available", "available";
    Used => "Used", "used";
    Expired => "Expired", "expired";
});

choice_enum!(BroadcastAudience {
    All => "all", "all users";
    Active => "active", "active users";
    Paid => "paid", "users with a purchase";
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Users,
    Products,
    Orders,
    Coupons,
    SharedAccounts,
    VirtualCards,
}

impl EntityKind {
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Products,
        Self::Orders,
        Self::Coupons,
        Self::SharedAccounts,
        Self::VirtualCards,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Coupons => "coupons",
            Self::SharedAccounts => "shared-accounts",
            Self::VirtualCards => "virtual-cards",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "users" => Some(Self::Users),
            "products" => Some(Self::Products),
            "orders" => Some(Self::Orders),
            "coupons" => Some(Self::Coupons),
            "shared-accounts" => Some(Self::SharedAccounts),
            "virtual-cards" => Some(Self::VirtualCards),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Coupons => "coupons",
            Self::SharedAccounts => "shared",
            Self::VirtualCards => "vcc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RowId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub total_orders: i64,
    pub total_spent: f64,
    pub status: UserStatus,
    pub role: UserRole,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RowId,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RowId,
    pub order_number: String,
    pub customer: String,
    pub product: String,
    pub amount: f64,
    pub created_at: String,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: RowId,
    pub code: String,
    #[serde(rename = "type")]
    pub coupon_type: CouponType,
    pub value: f64,
    pub max_usage: i64,
    pub used: i64,
    pub expires_at: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAccount {
    pub id: RowId,
    pub service: String,
    pub email: String,
    pub password: String,
    pub max_slots: i64,
    pub used_slots: i64,
    pub status: SharedAccountStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCard {
    pub id: RowId,
    pub pan: String,
    pub expiry: String,
    pub cvv: String,
    pub balance: f64,
    pub provider: String,
    pub status: CardStatus,
}

/// Everything one console session mounts: one collection per entity kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub coupons: Vec<Coupon>,
    pub shared_accounts: Vec<SharedAccount>,
    pub virtual_cards: Vec<VirtualCard>,
}

impl Dataset {
    pub fn row_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Users => self.users.len(),
            EntityKind::Products => self.products.len(),
            EntityKind::Orders => self.orders.len(),
            EntityKind::Coupons => self.coupons.len(),
            EntityKind::SharedAccounts => self.shared_accounts.len(),
            EntityKind::VirtualCards => self.virtual_cards.len(),
        }
    }
}

fn set_text(slot: &mut String, value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(text) => {
            slot.clone_from(text);
            true
        }
        _ => false,
    }
}

fn set_number(slot: &mut f64, value: &FieldValue) -> bool {
    match value.as_number() {
        Some(number) => {
            *slot = number;
            true
        }
        None => false,
    }
}

fn set_count(slot: &mut i64, value: &FieldValue) -> bool {
    match value.as_number() {
        Some(number) => {
            *slot = number_to_count(number);
            true
        }
        None => false,
    }
}

fn set_choice<T: Copy>(slot: &mut T, value: &FieldValue, parse: fn(&str) -> Option<T>) -> bool {
    match value.as_choice().and_then(parse) {
        Some(parsed) => {
            *slot = parsed;
            true
        }
        None => false,
    }
}

impl Record for User {
    const KIND: EntityKind = EntityKind::Users;

    fn schema() -> &'static TableSchema {
        &USER_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "fullName" => FieldValue::text(&self.full_name),
            "email" => FieldValue::text(&self.email),
            "phone" => FieldValue::text(&self.phone),
            "totalOrders" => FieldValue::Number(self.total_orders as f64),
            "totalSpent" => FieldValue::Number(self.total_spent),
            "status" => FieldValue::Choice(self.status.as_str()),
            "role" => FieldValue::Choice(self.role.as_str()),
            "createdAt" => FieldValue::text(&self.created_at),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "fullName" => set_text(&mut self.full_name, value),
            "email" => set_text(&mut self.email, value),
            "phone" => set_text(&mut self.phone, value),
            "totalOrders" => set_count(&mut self.total_orders, value),
            "totalSpent" => set_number(&mut self.total_spent, value),
            "status" => set_choice(&mut self.status, value, UserStatus::parse),
            "role" => set_choice(&mut self.role, value, UserRole::parse),
            "createdAt" => set_text(&mut self.created_at, value),
            _ => false,
        }
    }
}

impl Record for Product {
    const KIND: EntityKind = EntityKind::Products;

    fn schema() -> &'static TableSchema {
        &PRODUCT_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "name" => FieldValue::text(&self.name),
            "type" => FieldValue::Choice(self.product_type.as_str()),
            "category" => FieldValue::text(&self.category),
            "price" => FieldValue::Number(self.price),
            "stock" => FieldValue::Number(self.stock as f64),
            "status" => FieldValue::Choice(self.status.as_str()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "name" => set_text(&mut self.name, value),
            "type" => set_choice(&mut self.product_type, value, ProductType::parse),
            "category" => set_text(&mut self.category, value),
            "price" => set_number(&mut self.price, value),
            "stock" => set_count(&mut self.stock, value),
            "status" => set_choice(&mut self.status, value, ProductStatus::parse),
            _ => false,
        }
    }
}

impl Record for Order {
    const KIND: EntityKind = EntityKind::Orders;

    fn schema() -> &'static TableSchema {
        &ORDER_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "orderNumber" => FieldValue::text(&self.order_number),
            "customer" => FieldValue::text(&self.customer),
            "product" => FieldValue::text(&self.product),
            "amount" => FieldValue::Number(self.amount),
            "createdAt" => FieldValue::text(&self.created_at),
            "status" => FieldValue::Choice(self.status.as_str()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "orderNumber" => set_text(&mut self.order_number, value),
            "customer" => set_text(&mut self.customer, value),
            "product" => set_text(&mut self.product, value),
            "amount" => set_number(&mut self.amount, value),
            "createdAt" => set_text(&mut self.created_at, value),
            "status" => set_choice(&mut self.status, value, OrderStatus::parse),
            _ => false,
        }
    }
}

impl Record for Coupon {
    const KIND: EntityKind = EntityKind::Coupons;

    fn schema() -> &'static TableSchema {
        &COUPON_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "code" => FieldValue::text(&self.code),
            "type" => FieldValue::Choice(self.coupon_type.as_str()),
            "value" => FieldValue::Number(self.value),
            "maxUsage" => FieldValue::Number(self.max_usage as f64),
            "used" => FieldValue::Number(self.used as f64),
            "expiresAt" => FieldValue::text(&self.expires_at),
            "active" => FieldValue::Flag(self.active),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "code" => set_text(&mut self.code, value),
            "type" => set_choice(&mut self.coupon_type, value, CouponType::parse),
            "value" => set_number(&mut self.value, value),
            "maxUsage" => set_count(&mut self.max_usage, value),
            "used" => set_count(&mut self.used, value),
            "expiresAt" => set_text(&mut self.expires_at, value),
            "active" => match value.as_flag() {
                Some(active) => {
                    self.active = active;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}

impl Record for SharedAccount {
    const KIND: EntityKind = EntityKind::SharedAccounts;

    fn schema() -> &'static TableSchema {
        &SHARED_ACCOUNT_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "service" => FieldValue::text(&self.service),
            "email" => FieldValue::text(&self.email),
            "password" => FieldValue::text(&self.password),
            "maxSlots" => FieldValue::Number(self.max_slots as f64),
            "usedSlots" => FieldValue::Number(self.used_slots as f64),
            "status" => FieldValue::Choice(self.status.as_str()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "service" => set_text(&mut self.service, value),
            "email" => set_text(&mut self.email, value),
            "password" => set_text(&mut self.password, value),
            "maxSlots" => set_count(&mut self.max_slots, value),
            "usedSlots" => set_count(&mut self.used_slots, value),
            "status" => set_choice(&mut self.status, value, SharedAccountStatus::parse),
            _ => false,
        }
    }
}

impl Record for VirtualCard {
    const KIND: EntityKind = EntityKind::VirtualCards;

    fn schema() -> &'static TableSchema {
        &VIRTUAL_CARD_SCHEMA
    }

    fn id(&self) -> &RowId {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "pan" => FieldValue::text(&self.pan),
            "expiry" => FieldValue::text(&self.expiry),
            "cvv" => FieldValue::text(&self.cvv),
            "balance" => FieldValue::Number(self.balance),
            "provider" => FieldValue::text(&self.provider),
            "status" => FieldValue::Choice(self.status.as_str()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) -> bool {
        match name {
            "pan" => set_text(&mut self.pan, value),
            "expiry" => set_text(&mut self.expiry, value),
            "cvv" => set_text(&mut self.cvv, value),
            "balance" => set_number(&mut self.balance, value),
            "provider" => set_text(&mut self.provider, value),
            "status" => set_choice(&mut self.status, value, CardStatus::parse),
            _ => false,
        }
    }
}

/// Headline numbers shown above the tables, computed from the live rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardCounts {
    /// Sum of paid and completed order amounts.
    pub total_sales: f64,
    pub active_users: usize,
    /// Orders still awaiting payment.
    pub open_orders: usize,
}

impl DashboardCounts {
    pub fn from_rows(users: &[User], orders: &[Order]) -> Self {
        let active_users = users
            .iter()
            .filter(|user| user.status == UserStatus::Active)
            .count();
        let total_sales = orders
            .iter()
            .filter(|order| order.status != OrderStatus::Pending)
            .map(|order| order.amount)
            .sum();
        let open_orders = orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .count();
        Self {
            total_sales,
            active_users,
            open_orders,
        }
    }
}
