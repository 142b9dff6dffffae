/// A table of the budget schema together with the DDL that creates it.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: &'static str,
    /// Tables that must exist before this one because of its foreign keys
    pub references: &'static [&'static str],
    pub ddl: &'static str,
}

pub const DEFAULT_DATABASE_NAME: &str = "budget_tracker";
pub const CHARACTER_SET: &str = "utf8mb4";
pub const COLLATION: &str = "utf8mb4_general_ci";

pub const USERS: TableDefinition = TableDefinition {
    name: "users",
    references: &[],
    ddl: include_str!("../schema/users.sql"),
};

pub const CATEGORIES: TableDefinition = TableDefinition {
    name: "categories",
    references: &["users"],
    ddl: include_str!("../schema/categories.sql"),
};

pub const TRANSACTIONS: TableDefinition = TableDefinition {
    name: "transactions",
    references: &["users", "categories"],
    ddl: include_str!("../schema/transactions.sql"),
};

/// All tables, in the order they have to be created.
pub const TABLES: &[TableDefinition] = &[USERS, CATEGORIES, TRANSACTIONS];
