//! Translation between the domain model and the service's wire format.

pub mod request;
pub mod response;
mod value;

pub use request::to_payload;
pub use response::{from_list_payload, from_payload};
