/// Database models for TaskVault
///
/// # Models
///
/// - `user`: User accounts, profile updates, cascading account deletion
/// - `session_token`: The per-user live token set (one row per login)
/// - `task`: Owner-scoped tasks with the filtered/sorted/paginated list query

pub mod session_token;
pub mod task;
pub mod user;
