mod find;
mod import;
mod record;

pub use find::find_post;
pub use import::import_post;
pub use record::{record_get, record_post};
