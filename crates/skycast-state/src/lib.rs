//! Observable application state.
//!
//! A single [`StateStore`] holds the dashboard's [`AppState`] and notifies
//! subscribers synchronously on every effective write. The `user` and
//! `current_city` fields mirror into the shared [`skycast_core::LocalStore`]
//! so they survive restarts.

pub mod state;
pub mod store;

pub use state::{AppState, StateChange, StateField, StateUpdate, Theme};
pub use store::{StateStore, Subscription};
