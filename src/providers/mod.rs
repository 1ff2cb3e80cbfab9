pub mod caching;
pub mod ecb;

pub use caching::RateCache;
pub use ecb::EcbRateSource;
