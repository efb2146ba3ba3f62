/// Database plumbing
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: sqlx migration runner for the `migrations/` directory

pub mod migrations;
pub mod pool;
