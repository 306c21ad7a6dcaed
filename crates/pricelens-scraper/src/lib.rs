//! Listing-page fetching and per-platform extraction.

pub mod error;
pub mod extract;
pub mod gateway;
pub mod retry;

pub use error::TransportError;
pub use extract::{ExtractionProfile, ExtractorRegistry, PlatformExtractor, ProfileExtractor};
pub use gateway::{
    DomainRateLimiter, GatewayConfig, HtmlFetcher, HttpFetcher, RequestGateway, UserAgentPool,
};
