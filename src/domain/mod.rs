pub mod source;
pub mod item;
pub mod report;

pub use source::{EventSelectors, ListSelectors, SourceConfig, Strategy};
pub use item::Item;
pub use report::{RunReport, SourceError, SourceResult, SourceStatus};
