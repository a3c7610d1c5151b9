pub mod request;
pub mod scenario;

pub use request::*;
pub use scenario::*;
