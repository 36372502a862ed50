//! Domain models for the order desk.
//!
//! These are validated domain objects, separate from the row types the
//! repositories decode query results into.

pub mod customer;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use customer::Customer;
pub use order::{Order, StatusCounts};
pub use product::Product;
pub use session::CurrentUser;
pub use user::User;
