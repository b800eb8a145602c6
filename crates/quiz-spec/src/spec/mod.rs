pub mod catalog;
pub mod question;

pub use catalog::{Catalog, CatalogError, CatalogSpec};
pub use question::{QuestionKind, QuestionSpec, TextFormat};
