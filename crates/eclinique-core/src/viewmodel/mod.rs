//! View models: derived, display-ready state for the appointment screens.

mod appointments;
mod clock;
mod filter;
mod form;

pub use appointments::*;
pub use clock::*;
pub use filter::*;
pub use form::*;
