use crate::error::Result;
use rusqlite::{params, Connection};
use school_directory_common::{decode_image_column, Record, RecordId, SchoolFields};
use std::path::Path;
use tracing::debug;

/// Row of the `schools` table as stored
#[derive(Debug, Clone)]
pub struct StoredSchool {
    pub id: RecordId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact_number: String,
    /// JSON array, or a bare filename on legacy rows
    pub image: Option<String>,
    pub email_id: String,
}

impl StoredSchool {
    pub fn into_record(self) -> Record {
        Record {
            id: self.id,
            images: decode_image_column(self.image.as_deref()),
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            contact_number: self.contact_number,
            email_id: self.email_id,
        }
    }
}

/// Persistence of school records
pub trait SchoolRepository {
    /// Insert a record; `image_column` is the encoded reference list
    fn insert(&self, fields: &SchoolFields, image_column: &str) -> Result<RecordId>;

    /// All records, most recent first
    fn list_desc(&self) -> Result<Vec<StoredSchool>>;
}

/// SQLite-backed repository
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) the database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "database opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let repo = Self { conn };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schools (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                address         TEXT NOT NULL,
                city            TEXT NOT NULL,
                state           TEXT NOT NULL,
                contact_number  TEXT NOT NULL,
                image           TEXT,
                email_id        TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Raw insert that bypasses encoding; used to seed legacy rows
    pub fn insert_raw(&self, fields: &SchoolFields, image: Option<&str>) -> Result<RecordId> {
        self.conn.execute(
            "INSERT INTO schools (name, address, city, state, contact_number, image, email_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fields.name,
                fields.address,
                fields.city,
                fields.state,
                fields.contact,
                image,
                fields.email_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

impl SchoolRepository for SqliteRepository {
    fn insert(&self, fields: &SchoolFields, image_column: &str) -> Result<RecordId> {
        self.insert_raw(fields, Some(image_column))
    }

    fn list_desc(&self) -> Result<Vec<StoredSchool>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, address, city, state, contact_number, image, email_id
             FROM schools ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredSchool {
                id: row.get(0)?,
                name: row.get(1)?,
                address: row.get(2)?,
                city: row.get(3)?,
                state: row.get(4)?,
                contact_number: row.get(5)?,
                image: row.get(6)?,
                email_id: row.get(7)?,
            })
        })?;

        let mut schools = Vec::new();
        for row in rows {
            schools.push(row?);
        }
        Ok(schools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use school_directory_common::{encode_image_column, ImageReference};

    fn fields(name: &str) -> SchoolFields {
        SchoolFields {
            name: name.into(),
            address: "1 Main".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            contact: "9876543210".into(),
            email_id: "a@b.in".into(),
        }
    }

    #[test]
    fn test_images_round_trip_in_order() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let images = vec![ImageReference::new("a.jpg"), ImageReference::new("b.jpg")];
        let column = encode_image_column(&images).unwrap();
        repo.insert(&fields("Sunrise"), &column).unwrap();

        let records: Vec<Record> = repo
            .list_desc()
            .unwrap()
            .into_iter()
            .map(StoredSchool::into_record)
            .collect();
        assert_eq!(records[0].images, images);
        assert_eq!(records[0].contact_number, "9876543210");
    }

    #[test]
    fn test_legacy_scalar_round_trip() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        repo.insert_raw(&fields("Old"), Some("a.jpg")).unwrap();
        repo.insert_raw(&fields("Bare"), None).unwrap();

        let records: Vec<Record> = repo
            .list_desc()
            .unwrap()
            .into_iter()
            .map(StoredSchool::into_record)
            .collect();
        assert_eq!(records[0].name, "Bare");
        assert!(records[0].images.is_empty());
        assert_eq!(records[1].images, vec![ImageReference::new("a.jpg")]);
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        let first = repo.insert(&fields("First"), "[\"1.jpg\"]").unwrap();
        let second = repo.insert(&fields("Second"), "[\"2.jpg\"]").unwrap();
        assert!(second > first);

        let names: Vec<String> = repo.list_desc().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }
}
