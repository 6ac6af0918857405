use chrono::{Duration, Local};
use duckdb::params;
use tracing::info;

use super::store::{Db, StoreError};

const DEPARTMENTS: [&str; 6] = [
    "HR",
    "Engineering",
    "Marketing",
    "Sales",
    "Finance",
    "Operations",
];

const FIRST_NAMES: [&str; 20] = [
    "Aaron", "Bianca", "Carlos", "Daphne", "Elena", "Felix", "Grace", "Hamid", "Irene", "Jonas",
    "Kavya", "Liam", "Meera", "Noah", "Olga", "Priya", "Quentin", "Rosa", "Samuel", "Tara",
];

const LAST_NAMES: [&str; 20] = [
    "Andersson", "Baker", "Chen", "Dubois", "Evans", "Fischer", "Garcia", "Hansen", "Ito",
    "Jackson", "Kumar", "Lopez", "Miller", "Novak", "Okafor", "Patel", "Quinn", "Rossi", "Silva",
    "Tanaka",
];

const PRODUCT_WORDS: [&str; 16] = [
    "Anchor", "Beacon", "Compass", "Drift", "Ember", "Flint", "Grove", "Harbor", "Inlet",
    "Juniper", "Kestrel", "Lantern", "Meadow", "Nimbus", "Orchard", "Pebble",
];

const EMPLOYEE_COUNT: i64 = 50;
const PRODUCT_COUNT: i64 = 50;
const ORDER_COUNT: i64 = 50;

/// Small deterministic generator so seeding the same file twice produces the
/// same rows. Plain xorshift, not a statistics-grade source.
struct SeededRng(u64);

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next() % (hi - lo) as u64) as i64
    }

    fn money(&mut self, lo: i64, hi: i64) -> f64 {
        self.range(lo * 100, hi * 100) as f64 / 100.0
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next() % items.len() as u64) as usize]
    }
}

/// Creates the four demo domain tables if absent and fills them with
/// synthetic rows: the six named departments, 50 employees, 50 products and
/// 50 orders spread over the trailing year.
pub fn seed(db: &Db) -> Result<(), StoreError> {
    let conn = db.connect()?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS departments (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS employees (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            department_id BIGINT NOT NULL,
            email TEXT NOT NULL,
            salary DOUBLE NOT NULL
        );
        CREATE TABLE IF NOT EXISTS products (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            price DOUBLE NOT NULL
        );
        CREATE TABLE IF NOT EXISTS orders (
            id BIGINT PRIMARY KEY,
            customer_name TEXT NOT NULL,
            employee_id BIGINT NOT NULL,
            order_total DOUBLE NOT NULL,
            order_date DATE NOT NULL
        );",
    )?;

    let mut rng = SeededRng::new(0x5eed_f00d);

    for (i, dept) in DEPARTMENTS.iter().enumerate() {
        conn.execute(
            "INSERT INTO departments (id, name) VALUES (?, ?)",
            params![(i + 1) as i64, *dept],
        )?;
    }

    for id in 1..=EMPLOYEE_COUNT {
        let first = rng.pick(&FIRST_NAMES);
        let last = rng.pick(&LAST_NAMES);
        let name = format!("{} {}", first, last);
        let email = format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            id
        );
        let department_id = rng.range(1, DEPARTMENTS.len() as i64 + 1);
        let salary = rng.money(30_000, 120_000);
        conn.execute(
            "INSERT INTO employees (id, name, department_id, email, salary)
             VALUES (?, ?, ?, ?, ?)",
            params![id, name, department_id, email, salary],
        )?;
    }

    for id in 1..=PRODUCT_COUNT {
        let name = format!("{} {}", rng.pick(&PRODUCT_WORDS), rng.pick(&PRODUCT_WORDS));
        let price = rng.money(10, 500);
        conn.execute(
            "INSERT INTO products (id, name, price) VALUES (?, ?, ?)",
            params![id, name, price],
        )?;
    }

    let today = Local::now().date_naive();
    for id in 1..=ORDER_COUNT {
        let customer = format!("{} {}", rng.pick(&FIRST_NAMES), rng.pick(&LAST_NAMES));
        let employee_id = rng.range(1, EMPLOYEE_COUNT + 1);
        let order_total = rng.money(100, 5_000);
        let order_date = today - Duration::days(rng.range(0, 365));
        conn.execute(
            "INSERT INTO orders (id, customer_name, employee_id, order_total, order_date)
             VALUES (?, ?, ?, ?, CAST(? AS DATE))",
            params![
                id,
                customer,
                employee_id,
                order_total,
                order_date.format("%Y-%m-%d").to_string()
            ],
        )?;
    }

    info!(
        "seeded fixture data: {} departments, {} employees, {} products, {} orders",
        DEPARTMENTS.len(),
        EMPLOYEE_COUNT,
        PRODUCT_COUNT,
        ORDER_COUNT
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_fills_all_four_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("fixtures.duckdb"));
        seed(&db).unwrap();

        let conn = db.connect().unwrap();
        let count = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap()
        };

        assert_eq!(count("departments"), 6);
        assert_eq!(count("employees"), 50);
        assert_eq!(count("products"), 50);
        assert_eq!(count("orders"), 50);
    }

    #[test]
    fn employees_reference_existing_departments() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("fixtures.duckdb"));
        seed(&db).unwrap();

        let conn = db.connect().unwrap();
        let orphans: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM employees e
                 LEFT JOIN departments d ON e.department_id = d.id
                 WHERE d.id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
