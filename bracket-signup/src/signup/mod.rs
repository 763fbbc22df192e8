pub mod request;
pub mod registry;
pub mod allocator;

pub use request::{parse_signup, validate_signup, ValidSignup};
pub use registry::find_or_register;
pub use allocator::{apply_claim, holds, plan_claim};
