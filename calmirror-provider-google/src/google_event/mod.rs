//! Conversions between calmirror's event types and Google's event resource.

mod from_google;
mod to_google;

pub use from_google::FromGoogle;
pub use to_google::{ToGoogle, status_to_google};
