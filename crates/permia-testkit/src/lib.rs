// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use permia_app::{
    CardStatus, Coupon, CouponType, Dataset, Order, OrderStatus, Product, ProductStatus,
    ProductType, RowId, SharedAccount, SharedAccountStatus, User, UserRole, UserStatus,
    VirtualCard,
};
use std::path::PathBuf;

const FIRST_NAMES: [&str; 16] = [
    "Ali", "Maryam", "Hossein", "Zahra", "Reza", "Fatemeh", "Mohammad", "Sara", "Amir", "Niloofar",
    "Mehdi", "Parisa", "Saeed", "Leila", "Kian", "Shirin",
];
const LAST_NAMES: [&str; 14] = [
    "Rezaei", "Ahmadi", "Mousavi", "Hosseini", "Karimi", "Jafari", "Sadeghi", "Rahimi", "Kazemi",
    "Moradi", "Ebrahimi", "Ghasemi", "Hashemi", "Nazari",
];

const SERVICES: [&str; 8] = [
    "ChatGPT Plus",
    "Claude Pro",
    "Midjourney",
    "Gemini Advanced",
    "Perplexity Pro",
    "GitHub Copilot",
    "Cursor Pro",
    "Poe",
];

const CATEGORIES: [&str; 6] = ["ChatGPT", "Claude", "VCC", "Midjourney", "Gemini", "Custom"];
const PROVIDERS: [&str; 4] = ["Brocard", "Wise", "Stripe", "Payoneer"];
const COUPON_WORDS: [&str; 8] = [
    "PERMIA", "WELCOME", "SPRING", "NOWRUZ", "VIP", "FLASH", "LOYAL", "STUDENT",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of console records, for tables far larger than the
/// built-in fixtures. Ids are sequential per faker.
#[derive(Debug, Clone)]
pub struct ConsoleFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl ConsoleFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    /// `rows` records of every kind.
    pub fn dataset(&mut self, rows: usize) -> Dataset {
        Dataset {
            users: (0..rows).map(|_| self.user()).collect(),
            products: (0..rows).map(|_| self.product()).collect(),
            orders: (0..rows).map(|_| self.order()).collect(),
            coupons: (0..rows).map(|_| self.coupon()).collect(),
            shared_accounts: (0..rows).map(|_| self.shared_account()).collect(),
            virtual_cards: (0..rows).map(|_| self.virtual_card()).collect(),
        }
    }

    pub fn user(&mut self) -> User {
        let id = self.row_id();
        let first = self.pick_str(&FIRST_NAMES);
        let last = self.pick_str(&LAST_NAMES);
        let total_orders = self.int_range(0, 40);
        let status = match self.rng.int_n(10) {
            0 => UserStatus::Banned,
            1 | 2 => UserStatus::Suspended,
            _ => UserStatus::Active,
        };
        let role = match self.rng.int_n(20) {
            0 => UserRole::Admin,
            1 | 2 => UserRole::Operator,
            _ => UserRole::Customer,
        };
        User {
            email: format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                id
            ),
            phone: format!("09{:09}", self.rng.next_u64() % 1_000_000_000),
            full_name: format!("{first} {last}"),
            total_orders,
            total_spent: (total_orders * self.int_range(5, 60)) as f64,
            status,
            role,
            created_at: self.date(),
            id,
        }
    }

    pub fn product(&mut self) -> Product {
        let id = self.row_id();
        let product_type = *self.pick(ProductType::ALL);
        let category = self.pick_str(&CATEGORIES).to_owned();
        let stock = self.int_range(0, 50);
        let status = if stock == 0 {
            ProductStatus::OutOfStock
        } else if self.rng.int_n(6) == 0 {
            ProductStatus::Hidden
        } else {
            ProductStatus::Active
        };
        Product {
            name: format!("{category} {} #{id}", product_type.label()),
            product_type,
            category,
            price: self.int_range(3, 600) as f64,
            stock,
            status,
            id,
        }
    }

    pub fn order(&mut self) -> Order {
        let number = 1000 + self.next_id;
        let id = self.row_id();
        let first = self.pick_str(&FIRST_NAMES);
        let last = self.pick_str(&LAST_NAMES);
        Order {
            order_number: format!("PM-{number}"),
            customer: format!("{first} {last}"),
            product: self.pick_str(&SERVICES).to_owned(),
            amount: self.int_range(5, 600) as f64,
            created_at: format!(
                "{} {:02}:{:02}",
                self.date(),
                self.rng.int_n(24),
                self.rng.int_n(60)
            ),
            status: *self.pick(OrderStatus::ALL),
            id,
        }
    }

    pub fn coupon(&mut self) -> Coupon {
        let id = self.row_id();
        let coupon_type = *self.pick(CouponType::ALL);
        let value = match coupon_type {
            CouponType::Percent => self.int_range(5, 50),
            CouponType::Fixed => self.int_range(1, 25),
        };
        let max_usage = self.int_range(10, 300);
        Coupon {
            code: format!("{}{}", self.pick_str(&COUPON_WORDS), id),
            coupon_type,
            value: value as f64,
            max_usage,
            used: self.int_range(0, max_usage),
            expires_at: self.date(),
            active: self.rng.int_n(4) != 0,
            id,
        }
    }

    pub fn shared_account(&mut self) -> SharedAccount {
        let id = self.row_id();
        let service = self.pick_str(&SERVICES);
        // A few pools have no seats at all.
        let max_slots = if self.rng.int_n(15) == 0 {
            0
        } else {
            self.int_range(2, 12)
        };
        let used_slots = self.int_range(0, max_slots);
        let status = if used_slots >= max_slots && max_slots > 0 {
            SharedAccountStatus::Limited
        } else if self.rng.int_n(8) == 0 {
            SharedAccountStatus::Disabled
        } else {
            SharedAccountStatus::Active
        };
        SharedAccount {
            email: format!(
                "{}-shared-{id}@permia.ai",
                service.to_lowercase().replace(' ', "-")
            ),
            service: service.to_owned(),
            password: format!("P@ssw0rd-{:04}", self.rng.int_n(10_000)),
            max_slots,
            used_slots,
            status,
            id,
        }
    }

    pub fn virtual_card(&mut self) -> VirtualCard {
        let id = self.row_id();
        let prefix = if self.rng.bool() { 4000 } else { 5500 };
        VirtualCard {
            pan: format!(
                "{prefix} {:04} {:04} {:04}",
                self.rng.int_n(10_000),
                self.rng.int_n(10_000),
                self.rng.int_n(10_000)
            ),
            expiry: format!("{:02}/{}", self.int_range(1, 12), self.int_range(25, 30)),
            cvv: format!("{:03}", self.rng.int_n(1000)),
            balance: (self.int_range(1, 40) * 50) as f64,
            provider: self.pick_str(&PROVIDERS).to_owned(),
            status: *self.pick(CardStatus::ALL),
            id,
        }
    }

    fn row_id(&mut self) -> RowId {
        let id = self.next_id;
        self.next_id += 1;
        RowId::new(id.to_string())
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.int_n(items.len())]
    }

    fn pick_str(&mut self, items: &[&'static str]) -> &'static str {
        *self.pick(items)
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn date(&mut self) -> String {
        format!(
            "{}/{:02}/{:02}",
            self.int_range(1402, 1403),
            self.int_range(1, 12),
            self.int_range(1, 29)
        )
    }
}

/// The seeded console data every screen starts from.
pub fn fixture_dataset() -> Dataset {
    Dataset {
        users: fixture_users(),
        products: fixture_products(),
        orders: fixture_orders(),
        coupons: fixture_coupons(),
        shared_accounts: fixture_shared_accounts(),
        virtual_cards: fixture_virtual_cards(),
    }
}

pub fn fixture_users() -> Vec<User> {
    let user = |id: &str,
                name: &str,
                email: &str,
                phone: &str,
                orders: i64,
                spent: f64,
                status: UserStatus,
                role: UserRole,
                created_at: &str| User {
        id: RowId::from(id),
        full_name: name.to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
        total_orders: orders,
        total_spent: spent,
        status,
        role,
        created_at: created_at.to_owned(),
    };
    vec![
        user(
            "1",
            "Ali Rezaei",
            "ali.rezaei@example.com",
            "09123456789",
            5,
            120.0,
            UserStatus::Active,
            UserRole::Customer,
            "1403/01/10",
        ),
        user(
            "2",
            "Maryam Ahmadi",
            "maryam.ahmadi@example.com",
            "09351234567",
            12,
            520.0,
            UserStatus::Active,
            UserRole::Customer,
            "1403/02/05",
        ),
        user(
            "3",
            "Hossein Mousavi",
            "hossein.mousavi@example.com",
            "09201112233",
            2,
            45.0,
            UserStatus::Suspended,
            UserRole::Customer,
            "1403/03/20",
        ),
        user(
            "4",
            "Main Admin",
            "admin@permia.ai",
            "09120000000",
            0,
            0.0,
            UserStatus::Active,
            UserRole::Admin,
            "1402/12/01",
        ),
    ]
}

pub fn fixture_products() -> Vec<Product> {
    let product = |id: &str,
                   name: &str,
                   product_type: ProductType,
                   category: &str,
                   price: f64,
                   stock: i64,
                   status: ProductStatus| Product {
        id: RowId::from(id),
        name: name.to_owned(),
        product_type,
        category: category.to_owned(),
        price,
        stock,
        status,
    };
    vec![
        product(
            "1",
            "ChatGPT Plus shared account",
            ProductType::Shared,
            "ChatGPT",
            15.0,
            20,
            ProductStatus::Active,
        ),
        product(
            "2",
            "Claude Pro private account",
            ProductType::Private,
            "Claude",
            30.0,
            5,
            ProductStatus::Active,
        ),
        product(
            "3",
            "VCC card $500",
            ProductType::Vcc,
            "VCC",
            520.0,
            10,
            ProductStatus::Active,
        ),
        product(
            "4",
            "OpenAI manual top-up",
            ProductType::Manual,
            "Custom",
            5.0,
            0,
            ProductStatus::OutOfStock,
        ),
    ]
}

pub fn fixture_orders() -> Vec<Order> {
    let order = |id: &str,
                 number: &str,
                 customer: &str,
                 product: &str,
                 amount: f64,
                 created_at: &str,
                 status: OrderStatus| Order {
        id: RowId::from(id),
        order_number: number.to_owned(),
        customer: customer.to_owned(),
        product: product.to_owned(),
        amount,
        created_at: created_at.to_owned(),
        status,
    };
    vec![
        order(
            "1",
            "PM-1001",
            "Ali Rezaei",
            "ChatGPT Plus shared account",
            25.0,
            "1403/09/10 14:32",
            OrderStatus::Pending,
        ),
        order(
            "2",
            "PM-1002",
            "Maryam Ahmadi",
            "VCC card $500",
            520.0,
            "1403/09/10 15:10",
            OrderStatus::Paid,
        ),
        order(
            "3",
            "PM-1003",
            "Hossein Mousavi",
            "Claude Pro private account",
            30.0,
            "1403/09/09 19:45",
            OrderStatus::Completed,
        ),
    ]
}

pub fn fixture_coupons() -> Vec<Coupon> {
    let coupon = |id: &str,
                  code: &str,
                  coupon_type: CouponType,
                  value: f64,
                  max_usage: i64,
                  used: i64,
                  expires_at: &str,
                  active: bool| Coupon {
        id: RowId::from(id),
        code: code.to_owned(),
        coupon_type,
        value,
        max_usage,
        used,
        expires_at: expires_at.to_owned(),
        active,
    };
    vec![
        coupon("1", "PERMIA10", CouponType::Percent, 10.0, 100, 25, "1403/10/01", true),
        coupon("2", "WELCOME5", CouponType::Fixed, 5.0, 50, 10, "1403/09/30", true),
        coupon("3", "BLACKFRIDAY", CouponType::Percent, 25.0, 200, 200, "1403/09/05", false),
    ]
}

pub fn fixture_shared_accounts() -> Vec<SharedAccount> {
    let account = |id: &str,
                   service: &str,
                   email: &str,
                   max_slots: i64,
                   used_slots: i64,
                   status: SharedAccountStatus| SharedAccount {
        id: RowId::from(id),
        service: service.to_owned(),
        email: email.to_owned(),
        password: format!("P@ssw0rd-{id:0>2}"),
        max_slots,
        used_slots,
        status,
    };
    vec![
        account(
            "1",
            "ChatGPT Plus",
            "chatgpt-shared-01@permia.ai",
            10,
            7,
            SharedAccountStatus::Active,
        ),
        account(
            "2",
            "Claude Pro",
            "claude-shared-01@permia.ai",
            8,
            8,
            SharedAccountStatus::Limited,
        ),
        account(
            "3",
            "Midjourney",
            "midjourney-shared-01@permia.ai",
            5,
            2,
            SharedAccountStatus::Active,
        ),
        account(
            "4",
            "Gemini Advanced",
            "gemini-shared-01@permia.ai",
            6,
            0,
            SharedAccountStatus::Disabled,
        ),
    ]
}

pub fn fixture_virtual_cards() -> Vec<VirtualCard> {
    let card = |id: &str,
                pan: &str,
                expiry: &str,
                cvv: &str,
                balance: f64,
                provider: &str,
                status: CardStatus| VirtualCard {
        id: RowId::from(id),
        pan: pan.to_owned(),
        expiry: expiry.to_owned(),
        cvv: cvv.to_owned(),
        balance,
        provider: provider.to_owned(),
        status,
    };
    vec![
        card("1", "4111 1111 1111 1111", "12/27", "123", 500.0, "Brocard", CardStatus::Available),
        card("2", "5500 0000 0000 0004", "08/26", "456", 250.0, "Wise", CardStatus::Used),
        card("3", "4000 1234 5678 9010", "05/25", "789", 1000.0, "Brocard", CardStatus::Expired),
        card("4", "4444 3333 2222 1111", "03/28", "321", 750.0, "Stripe", CardStatus::Available),
    ]
}

/// Writes `dataset` as JSON into a fresh temp dir. Keep the `TempDir` alive
/// for as long as the path is used.
pub fn temp_dataset_file(dataset: &Dataset) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("dataset.json");
    let json = serde_json::to_string_pretty(dataset).context("serialize dataset")?;
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{ConsoleFaker, fixture_dataset, fixture_shared_accounts, temp_dataset_file};
    use permia_app::{Dataset, EntityKind, Record};
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = ConsoleFaker::new(42);
        let mut right = ConsoleFaker::new(42);
        assert_eq!(left.user(), right.user());
        assert_eq!(left.virtual_card(), right.virtual_card());
    }

    #[test]
    fn fixtures_cover_every_screen() {
        let dataset = fixture_dataset();
        assert_eq!(dataset.row_count(EntityKind::Users), 4);
        assert_eq!(dataset.row_count(EntityKind::Products), 4);
        assert_eq!(dataset.row_count(EntityKind::Orders), 3);
        assert_eq!(dataset.row_count(EntityKind::Coupons), 3);
        assert_eq!(dataset.row_count(EntityKind::SharedAccounts), 4);
        assert_eq!(dataset.row_count(EntityKind::VirtualCards), 4);
    }

    #[test]
    fn fixture_passwords_follow_account_ids() {
        let passwords: Vec<String> = fixture_shared_accounts()
            .into_iter()
            .map(|account| account.password)
            .collect();
        assert_eq!(
            passwords,
            ["P@ssw0rd-01", "P@ssw0rd-02", "P@ssw0rd-03", "P@ssw0rd-04"]
        );
    }

    #[test]
    fn faker_ids_are_unique_across_kinds() {
        let dataset = ConsoleFaker::new(7).dataset(50);
        let mut ids = BTreeSet::new();
        for user in &dataset.users {
            assert!(ids.insert(user.id().clone()));
        }
        for card in &dataset.virtual_cards {
            assert!(ids.insert(card.id().clone()));
        }
        assert_eq!(dataset.row_count(EntityKind::Coupons), 50);
    }

    #[test]
    fn faker_respects_slot_and_usage_bounds() {
        let mut faker = ConsoleFaker::new(3);
        for _ in 0..200 {
            let account = faker.shared_account();
            assert!(account.used_slots <= account.max_slots.max(0));
            let coupon = faker.coupon();
            assert!(coupon.used <= coupon.max_usage);
        }
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = ConsoleFaker::new(seed);
            names.insert(faker.user().full_name);
        }
        assert!(names.len() >= 10, "got {}", names.len());
    }

    #[test]
    fn temp_dataset_file_round_trips() -> anyhow::Result<()> {
        let (_dir, path) = temp_dataset_file(&fixture_dataset())?;
        let loaded: Dataset = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        assert_eq!(loaded, fixture_dataset());
        Ok(())
    }
}
