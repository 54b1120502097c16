pub mod error;
pub mod form;
pub mod id;
pub mod page;
pub mod query;
pub mod validation;
pub mod view;

pub use error::Error;
pub use page::{Page, Pagination};
