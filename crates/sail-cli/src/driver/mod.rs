mod launch;
mod stop;

pub(crate) use launch::{run_launch, LaunchArgs};
pub(crate) use stop::{run_stop, StopArgs};
