pub mod traits;
pub mod http;

pub use traits::{FetchedPage, PageFetcher};
pub use http::HttpFetcher;

#[cfg(test)]
pub use traits::MockPageFetcher;
