//! Client-side core for the shift views: typed calls to the service, a
//! single-owner shift list with optimistic rollback, fan-out loading, live
//! polling and small caches.

pub mod actions;
pub mod api;
pub mod fanout;
pub mod listener;
pub mod locations;
pub mod store;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::delete_shift_optimistic;
pub use api::{ClientError, ClientResult, HttpShiftApi, ShiftApi};
pub use fanout::{fetch_referenced, load_offered_shifts, sort_by_start};
pub use listener::Listener;
pub use locations::LocationCache;
pub use store::{ShiftListStore, ShiftSnapshot, StoreClosed, StoreCommand};
pub use users::UserDirectory;
