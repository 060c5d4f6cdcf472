pub mod seed;
pub mod windows;

pub use seed::{InvalidTransition, SeedStatus, UnknownStatus};
pub use windows::WindowError;
