//! Price resolution: the acting user's company selects one of four stored
//! price tiers; products never priced resolve to zero.

use crate::error::AppResult;
use crate::store::Db;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;

const TIERS: [&str; 4] = ["price_1", "price_2", "price_3", "price_4"];

fn tier_column(level: Option<&str>) -> &'static str {
    // unknown or unset level falls back to tier 1
    TIERS
        .iter()
        .find(|t| Some(**t) == level)
        .copied()
        .unwrap_or("price_1")
}

pub fn find_prices_for_user(
    conn: &Connection,
    uid: i64,
    product_codes: &[String],
) -> AppResult<HashMap<String, f64>> {
    if product_codes.is_empty() {
        return Ok(HashMap::new());
    }

    let level: Option<String> = conn
        .query_row(
            "SELECT c.price_level FROM t_user u \
             JOIN t_company c ON u.company_id = c.id \
             WHERE u.uid = ?1",
            params![uid],
            |row| row.get(0),
        )
        .optional()?;
    let column = tier_column(level.as_deref());

    let placeholders = vec!["?"; product_codes.len()].join(",");
    let sql = format!(
        "SELECT product_code, {column} FROM t_price WHERE product_code IN ({placeholders})"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(product_codes), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(rows)
}

/// Lock-scoped wrapper used by the query orchestrator.
pub fn resolve_for_user(db: &Db, uid: i64, product_codes: &[String]) -> AppResult<HashMap<String, f64>> {
    let conn = db.conn()?;
    find_prices_for_user(&conn, uid, product_codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Db;

    fn seed(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO t_company (id, name, price_level) VALUES (1, '甲公司', 'price_3');
             INSERT INTO t_company (id, name, price_level) VALUES (2, '乙公司', 'price_9');
             INSERT INTO t_user (uid, username, company_id) VALUES (10, 'alice', 1);
             INSERT INTO t_user (uid, username, company_id) VALUES (11, 'bob', 2);
             INSERT INTO t_price (product_code, price_1, price_2, price_3, price_4)
               VALUES ('P-001', 100.0, 90.0, 80.0, 70.0);",
        )
        .unwrap();
    }

    #[test]
    fn company_tier_selects_price_column() {
        let db = Db::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        seed(&conn);
        let prices = find_prices_for_user(&conn, 10, &["P-001".to_string()]).unwrap();
        assert_eq!(prices.get("P-001"), Some(&80.0));
    }

    #[test]
    fn unknown_tier_and_unknown_user_fall_back_to_tier_one() {
        let db = Db::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        seed(&conn);
        let prices = find_prices_for_user(&conn, 11, &["P-001".to_string()]).unwrap();
        assert_eq!(prices.get("P-001"), Some(&100.0));
        // no such user: no tier row at all, still tier 1
        let prices = find_prices_for_user(&conn, 999, &["P-001".to_string()]).unwrap();
        assert_eq!(prices.get("P-001"), Some(&100.0));
    }

    #[test]
    fn unpriced_codes_are_simply_absent() {
        let db = Db::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        seed(&conn);
        let prices =
            find_prices_for_user(&conn, 10, &["P-001".to_string(), "P-404".to_string()]).unwrap();
        assert_eq!(prices.len(), 1);
        assert!(!prices.contains_key("P-404"));
    }

    #[test]
    fn empty_code_set_short_circuits() {
        let db = Db::open_in_memory().unwrap();
        let conn = db.conn().unwrap();
        assert!(find_prices_for_user(&conn, 1, &[]).unwrap().is_empty());
    }
}
