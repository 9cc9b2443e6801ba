mod form;
mod notifier;

pub use form::{read_form, UploadForm};
pub use notifier::TracingNotifier;
