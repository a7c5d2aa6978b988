pub mod lock_manager;
pub mod transaction_manager;

pub use lock_manager::{LockError, LockManager, LockMode};
pub use transaction_manager::{TransactionError, TransactionManager};
