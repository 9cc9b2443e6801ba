mod features;
mod request;
mod response;

pub use features::segments_to_feature_collection;
pub use request::*;
pub use response::*;
