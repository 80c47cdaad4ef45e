//! Session field persistence.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::session::KeyValueStore;

impl Database {
    /// Read one field.
    pub fn get_session_field(&self, name: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM session_fields WHERE name = ?",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Write one field, replacing any previous value.
    pub fn set_session_field(&self, name: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO session_fields (name, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![name, value],
        )?;
        Ok(())
    }

    /// Remove every field in a single statement.
    pub fn clear_session_fields(&self) -> DbResult<usize> {
        let removed = self.conn.execute("DELETE FROM session_fields", [])?;
        Ok(removed)
    }

    /// Replace the whole field set inside one transaction.
    pub fn replace_session_fields(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM session_fields", [])?;
        for (name, value) in entries {
            tx.execute(
                "INSERT INTO session_fields (name, value) VALUES (?1, ?2)",
                params![name, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.get_session_field(key)
    }

    fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.set_session_field(key, value)
    }

    fn clear(&self) -> DbResult<()> {
        self.clear_session_fields().map(|_| ())
    }

    fn replace_all(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        self.replace_session_fields(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn field_names(db: &Database) -> Vec<String> {
        let mut stmt = db
            .conn
            .prepare("SELECT name FROM session_fields ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let db = setup_db();

        db.set_session_field("token", "abc").unwrap();
        assert_eq!(db.get_session_field("token").unwrap(), Some("abc".into()));
        assert_eq!(db.get_session_field("role").unwrap(), None);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let db = setup_db();

        db.set_session_field("email", "old@mail.com").unwrap();
        db.set_session_field("email", "new@mail.com").unwrap();

        assert_eq!(
            db.get_session_field("email").unwrap(),
            Some("new@mail.com".into())
        );
        assert_eq!(field_names(&db), vec!["email"]);
    }

    #[test]
    fn test_clear_removes_everything() {
        let db = setup_db();

        db.set_session_field("token", "abc").unwrap();
        db.set_session_field("role", "patient").unwrap();

        assert_eq!(db.clear_session_fields().unwrap(), 2);
        assert_eq!(db.get_session_field("token").unwrap(), None);
        assert!(field_names(&db).is_empty());
    }

    #[test]
    fn test_replace_drops_stale_fields() {
        let db = setup_db();

        db.set_session_field("phone", "0600000000").unwrap();
        db.replace_session_fields(&[("token", "t2"), ("role", "patient")])
            .unwrap();

        assert_eq!(db.get_session_field("phone").unwrap(), None);
        assert_eq!(db.get_session_field("token").unwrap(), Some("t2".into()));
    }

    #[test]
    fn test_fields_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_session_field("token", "persisted").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_session_field("token").unwrap(),
            Some("persisted".into())
        );
    }
}
