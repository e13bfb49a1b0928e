//! SQLite catalog store

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::models::{CatalogSeed, Item, Outfit};
use super::CatalogStore;

/// Counts returned by a seed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub items: usize,
    pub outfits: usize,
}

/// Database connection wrapper
///
/// The connection sits behind a mutex so one catalog can serve concurrent
/// requests; queries are short and run one at a time.
pub struct CatalogDatabase {
    conn: Mutex<Connection>,
}

impl CatalogDatabase {
    /// Open or create the catalog database
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create catalog directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog at {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory catalog
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Items ====================

    /// List items, optionally filtered by a colour substring and an exact category
    pub fn list_items(&self, color: Option<&str>, category: Option<&str>) -> Result<Vec<Item>> {
        let mut sql = String::from(
            "SELECT id, name, category, color, price, created_at, owned FROM items WHERE 1=1",
        );
        let mut values: Vec<Value> = Vec::new();

        if let Some(color) = color {
            values.push(Value::Text(format!("%{color}%")));
            sql.push_str(&format!(" AND color LIKE ?{}", values.len()));
        }
        if let Some(category) = category {
            values.push(Value::Text(category.to_string()));
            sql.push_str(&format!(" AND category = ?{}", values.len()));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_item)?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list items")
    }

    // ==================== Outfits ====================

    /// Insert or replace an outfit and its item links
    ///
    /// The outfit's `items` only contribute their ids; the item rows
    /// themselves must already exist.
    #[cfg(test)]
    pub fn insert_outfit(&self, outfit: &Outfit) -> Result<()> {
        let item_ids: Vec<i64> = outfit.items.iter().map(|i| i.id).collect();
        write_outfit(&self.conn(), outfit, &item_ids)
    }

    // ==================== Seed import ====================

    /// Load a seed document in a single transaction
    pub fn import_seed(&self, seed: &CatalogSeed) -> Result<ImportStats> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("Failed to start import transaction")?;
        let now = Utc::now();

        for seed_item in &seed.items {
            write_item(
                &tx,
                &Item {
                    id: seed_item.id,
                    name: seed_item.name.clone(),
                    category: seed_item.category.clone(),
                    color: seed_item.color.clone(),
                    price: seed_item.price,
                    created_at: Some(now),
                    owned: seed_item.owned,
                },
            )?;
        }

        for seed_outfit in &seed.outfits {
            let outfit = Outfit {
                id: seed_outfit.id,
                name: seed_outfit.name.clone(),
                occasion: seed_outfit.occasion.clone(),
                description: seed_outfit.description.clone(),
                created_at: Some(now),
                items: Vec::new(),
            };
            write_outfit(&tx, &outfit, &seed_outfit.item_ids)?;
        }

        tx.commit().context("Failed to commit import")?;

        Ok(ImportStats {
            items: seed.items.len(),
            outfits: seed.outfits.len(),
        })
    }

    /// Read a JSON seed file and import it
    pub fn import_seed_file(&self, path: &Path) -> Result<ImportStats> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: CatalogSeed = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid seed file {}", path.display()))?;
        self.import_seed(&seed)
    }

    // ==================== Stats ====================

    /// Get total item count
    pub fn item_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get total outfit count
    pub fn outfit_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM outfits", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl CatalogStore for CatalogDatabase {
    fn fetch_outfits(&self, tags: &[String], limit: usize) -> Result<Vec<Outfit>> {
        let mut values: Vec<Value> = tags.iter().map(|t| Value::Text(t.clone())).collect();

        let sql = if tags.is_empty() {
            "SELECT id, name, occasion, description, created_at FROM outfits ORDER BY id LIMIT ?1"
                .to_string()
        } else {
            let placeholders = (1..=tags.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "SELECT id, name, occasion, description, created_at FROM outfits \
                 WHERE occasion IN ({placeholders}) ORDER BY id LIMIT ?{}",
                tags.len() + 1
            )
        };
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_outfit)?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to fetch outfits")
    }

    fn items_for_outfit(&self, outfit_id: i64) -> Result<Vec<Item>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT i.id, i.name, i.category, i.color, i.price, i.created_at, i.owned
             FROM items i
             JOIN outfit_items oi ON i.id = oi.item_id
             WHERE oi.outfit_id = ?1
             ORDER BY i.id",
        )?;

        let rows = stmt.query_map(params![outfit_id], row_to_item)?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to get outfit items")
    }
}

/// Run migrations
fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            created_at TEXT,
            owned INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS outfits (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            occasion TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT
        );

        CREATE TABLE IF NOT EXISTS outfit_items (
            outfit_id INTEGER NOT NULL,
            item_id INTEGER NOT NULL,
            PRIMARY KEY (outfit_id, item_id),
            FOREIGN KEY (outfit_id) REFERENCES outfits(id),
            FOREIGN KEY (item_id) REFERENCES items(id)
        );

        CREATE INDEX IF NOT EXISTS idx_outfits_occasion ON outfits(occasion);
        CREATE INDEX IF NOT EXISTS idx_outfit_items_outfit_id ON outfit_items(outfit_id);
        "#,
    )?;
    Ok(())
}

fn write_item(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO items (id, name, category, color, price, created_at, owned)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            name = ?2,
            category = ?3,
            color = ?4,
            price = ?5,
            owned = ?7
        "#,
        params![
            item.id,
            item.name,
            item.category,
            item.color,
            item.price,
            item.created_at.map(|t| t.to_rfc3339()),
            item.owned,
        ],
    )?;
    Ok(())
}

fn write_outfit(conn: &Connection, outfit: &Outfit, item_ids: &[i64]) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO outfits (id, name, occasion, description, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            name = ?2,
            occasion = ?3,
            description = ?4
        "#,
        params![
            outfit.id,
            outfit.name,
            outfit.occasion,
            outfit.description,
            outfit.created_at.map(|t| t.to_rfc3339()),
        ],
    )?;

    conn.execute(
        "DELETE FROM outfit_items WHERE outfit_id = ?1",
        params![outfit.id],
    )?;
    for item_id in item_ids {
        conn.execute(
            "INSERT OR IGNORE INTO outfit_items (outfit_id, item_id) VALUES (?1, ?2)",
            params![outfit.id, item_id],
        )?;
    }
    Ok(())
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        color: row.get(3)?,
        price: row.get(4)?,
        created_at: parse_timestamp(row.get::<_, Option<String>>(5)?),
        owned: row.get(6)?,
    })
}

fn row_to_outfit(row: &rusqlite::Row) -> rusqlite::Result<Outfit> {
    Ok(Outfit {
        id: row.get(0)?,
        name: row.get(1)?,
        occasion: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_timestamp(row.get::<_, Option<String>>(4)?),
        items: Vec::new(),
    })
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc))
}
