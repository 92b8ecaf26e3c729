//! Types that represent the core data model, such as `Transaction` and `Settings`.
pub(crate) mod amount;
mod settings;
mod summary;
mod transaction;
mod user;

pub use amount::{Amount, AmountError, Money, CURRENCY};
pub use settings::{Settings, Theme};
pub use summary::{CategoryTotal, Dashboard, Report, Summary, RECENT_COUNT};
pub use transaction::{Transaction, TransactionType, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use user::User;
