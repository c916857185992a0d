pub mod catalog_traits;
pub mod notify_traits;

pub use catalog_traits::{PrimaryCatalog, SecondaryCatalog};
pub use notify_traits::StatusNotifier;
