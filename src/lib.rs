//! Device-local account and session store for the VisionSync app.
//!
//! ```no_run
//! use visionsync::{AuthSettings, FileStore, Registration, SessionStore};
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = SessionStore::new(FileStore::open("data")?, AuthSettings::default());
//! if store.restore_session().is_none() {
//!     store.register(&Registration::new("a@x.com", "secret1", "A", "B"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod demo;
pub mod error;
pub mod journal;
pub mod model;
pub mod session;
pub mod storage;
pub mod validation;

pub use error::AuthError;
pub use model::{Registration, SessionState, StoredUser, User};
pub use session::{AuthSettings, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
