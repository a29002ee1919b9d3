//! Data models for Vikmo backend entities.
//!
//! - `User`: the authenticated account returned by `/auth/me/`
//! - `Product`, `Dealer`, `InventoryLevel`: catalog records
//! - `Order`, `OrderItem`, `OrderStatus`: dealer orders and line items
//!
//! The generic client operations stay untyped and pass bodies through
//! as JSON; these structs are the typed layer callers opt into via
//! `ApiOutcome::parse`.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Dealer, InventoryLevel, Product};
pub use order::{Order, OrderItem, OrderStatus};
pub use user::User;
