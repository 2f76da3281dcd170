/// Database models for Taskboard
///
/// Every operation takes `&mut PgConnection` so the caller decides the
/// transaction boundary. Status and task operations are scoped by owner:
/// a record owned by someone else is reported exactly like a missing one.
///
/// # Models
///
/// - `user`: Accounts and credentials
/// - `status`: Board columns with a dense per-user order
/// - `task`: Work items, each filed under one of the owner's statuses
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::status::{Status, StatusInput};
/// use taskboard_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// let user = User::create(
///     &mut tx,
///     CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let todo = Status::create(
///     &mut tx,
///     user.id,
///     StatusInput {
///         name: "To do".to_string(),
///         color: "#3366ff".to_string(),
///     },
/// )
/// .await?;
/// assert_eq!(todo.sort_order, 1);
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

pub mod status;
pub mod task;
pub mod user;
