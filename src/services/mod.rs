pub mod export;
pub mod restore;
pub mod snapshot;
pub mod uploads;
