use derive_new::new;
use serde::{Deserialize, Serialize};

pub use admin::*;
pub use course::*;
pub use file::*;
pub use ids::*;
pub use payment::*;
pub use progress::*;
pub use timestamp::*;
pub use user::*;

mod admin;
mod course;
mod file;
mod ids;
mod payment;
mod progress;
mod timestamp;
mod user;

#[cfg(test)]
pub(crate) mod fixtures;
