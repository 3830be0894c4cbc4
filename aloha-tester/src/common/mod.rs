pub mod scenario;
pub mod util;

pub use util::{OutputTarget, split_csv};
