//! # Tasklane Core Library
//!
//! The persistence and scheduling layer behind the Tasklane to-do list.
//!
//! ## Features
//!
//! - **Recurring Tasks**: Deterministic due-date generation for daily, weekly,
//!   monthly and custom-interval schedules, bounded by iteration caps
//! - **Store Abstraction**: Any backend that can fetch, insert, update and
//!   delete records in bulk can hold tasks
//! - **Strict Schema**: One translation layer between [`models::Task`] and
//!   the store's field names
//! - **Ordering**: Every created task receives a unique, increasing `order`
//!
//! ## Core Modules
//!
//! - [`db`]: SQLite connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Recurrence date generation
//! - [`query`]: Store-neutral filter and sort description
//! - [`store`]: The store trait and its SQLite implementation
//! - [`schema`]: Mapping between tasks and stored records
//! - [`repository`]: Task operations with the Repository pattern
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use tasklane_core::{
//!     db,
//!     models::{DayOfWeek, NewTaskData, RecurrenceSpec},
//!     repository::{StoreTaskRepository, TaskRepository},
//!     store::SqliteStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("tasks.db").await?;
//!     let repo = StoreTaskRepository::new(SqliteStore::new(pool));
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     let task_data = NewTaskData {
//!         title: "Team sync".to_string(),
//!         is_recurring: true,
//!         recurring_data: Some(RecurrenceSpec::weekly(start, [DayOfWeek::Monday])),
//!         ..Default::default()
//!     };
//!
//!     let created = repo.create(task_data).await?;
//!     println!("Created {} tasks", created.tasks().len());
//!
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod recurrence;
pub mod repository;
pub mod schema;
pub mod store;
