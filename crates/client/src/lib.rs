//! `canteen-client` — the back-office application logic, minus rendering.
//!
//! [`ApiClient`] talks to the HTTP API and holds the session token; the other
//! modules hold the screen state (lists, cart, search, sidebar) the UI binds to.

pub mod api;
pub mod cart;
pub mod error;
pub mod inventory;
pub mod list;
pub mod nav;
pub mod search;

pub use api::{ApiClient, AuthSession, PageEntry, PlaceOrder, UserForm, WhoAmI};
pub use cart::{Cart, CartLine};
pub use error::ClientError;
pub use list::{ListSource, ListState, ListView, Listed};
