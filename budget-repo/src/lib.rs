pub mod account;
pub mod admin_repo;
pub mod schema;
pub mod statements;

// implementation modules
pub mod mem_repo;
pub mod sqlx_repo;
