mod clean;
mod doctor;
mod eject;
mod release;

pub use clean::clean;
pub use doctor::doctor;
pub use eject::eject;
pub use release::{ReleaseOptions, release};
