use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(UserRow {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password: password_hash.to_string(),
            })
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Messages --

    pub fn insert_message(&self, username: &str, message: &str) -> Result<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (username, message) VALUES (?1, ?2)",
                (username, message),
            )?;
            Ok(MessageRow {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                message: message.to_string(),
            })
        })
    }

    pub fn get_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, username, message FROM messages ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        message: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, message FROM messages WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(MessageRow {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            message: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_message_body(&self, id: i64, message: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages SET message = ?1 WHERE id = ?2",
                (message, id),
            )?;
            Ok(())
        })
    }

    pub fn delete_message(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            "SELECT id, username, password FROM users WHERE username = ?1",
            [username],
            |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}
