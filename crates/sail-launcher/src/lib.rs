pub mod conf;
pub mod control_plane;
pub mod description;
pub mod error;
pub mod identity;
pub mod launcher;
pub mod registry;
pub mod resource;
pub mod secret;
pub mod translator;
#[cfg(test)]
mod testing;

pub use launcher::{delete_driver_resources, DriverLauncher, DriverLauncherOptions, LaunchSummary};
