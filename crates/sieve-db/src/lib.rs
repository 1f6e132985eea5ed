//! SQL query building and SQLite execution for sieve.
//!
//! The [`SelectQuery`] builder collects `WHERE` predicates and `ORDER BY`
//! terms as typed [`Expression`]s and renders them to SQL with `?`
//! placeholders. Filters only ever talk to it through the [`QueryBuilder`]
//! trait, so any other builder can be plugged in instead.

pub mod connection;
pub mod error;
pub mod expr;
pub mod query;
pub mod traits;
pub mod value;

pub use connection::DbConnection;
pub use error::{DbError, Result};
pub use expr::Column;
pub use query::*;
pub use traits::{Expression, QueryBuilder};
pub use value::Value;

#[cfg(test)]
mod tests {
    use diesel::{
        sql_query,
        sql_types::{BigInt, Nullable, Text},
        QueryableByName, RunQueryDsl,
    };

    use super::*;

    #[derive(Debug, QueryableByName)]
    struct Package {
        #[diesel(sql_type = BigInt)]
        id: i64,
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = BigInt)]
        downloads: i64,
        #[diesel(sql_type = Nullable<Text>)]
        description: Option<String>,
    }

    fn setup_db() -> DbConnection {
        let mut db = DbConnection::open_in_memory().unwrap();

        sql_query(
            "CREATE TABLE packages (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                downloads INTEGER NOT NULL DEFAULT 0,
                description TEXT
            )",
        )
        .execute(db.conn())
        .unwrap();

        sql_query(
            "INSERT INTO packages (name, downloads, description) VALUES
                ('zls', 120, 'Zig Language Server'),
                ('rust-analyzer', 9000, 'Rusty Language Server'),
                ('ripgrep', 5000, NULL)",
        )
        .execute(db.conn())
        .unwrap();

        db
    }

    #[test]
    fn test_select_with_like() {
        let mut db = setup_db();

        let pkgs: Vec<Package> = SelectQuery::from("packages")
            .filter(Column::new("name").like("rust"))
            .load(db.conn())
            .unwrap();

        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "rust-analyzer");
        assert_eq!(pkgs[0].downloads, 9000);
    }

    #[test]
    fn test_select_ordered_and_limited() {
        let mut db = setup_db();

        let pkgs: Vec<Package> = SelectQuery::from("packages")
            .order_by(Column::new("downloads"), SortDirection::Desc)
            .limit(2)
            .load(db.conn())
            .unwrap();

        let names: Vec<_> = pkgs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["rust-analyzer", "ripgrep"]);
    }

    #[test]
    fn test_select_null_and_in() {
        let mut db = setup_db();

        let pkgs: Vec<Package> = SelectQuery::from("packages")
            .filter(Column::new("description").null())
            .load(db.conn())
            .unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "ripgrep");
        assert!(pkgs[0].description.is_none());

        let count = SelectQuery::from("packages")
            .filter(Column::new("name").in_(["zls", "ripgrep", "missing"]))
            .count(db.conn())
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_select_between() {
        let mut db = setup_db();

        let pkgs: Vec<Package> = SelectQuery::from("packages")
            .filter(Column::new("downloads").between(100, 5000))
            .order_by(Column::new("id"), SortDirection::Asc)
            .load(db.conn())
            .unwrap();

        let ids: Vec<_> = pkgs.iter().map(|p| p.id).collect();
        assert_eq!(ids, [1, 3]);
    }
}
