//! Application wiring: the controller that connects UI events to the
//! weather client, credential store and state store.

pub mod controller;
pub mod events;

pub use controller::AppController;
pub use events::AppEvent;
