//! Controller input.

mod controller;

pub use controller::Controller;
