/// Source identifiers as used in CLI arguments, config, and the JSON export.
pub const RENTCAST_SOURCE: &str = "rentcast";
pub const ZILLOW_SOURCE: &str = "zillow";
pub const REDFIN_SOURCE: &str = "redfin";

/// RapidAPI hosts for the providers that ride on it.
pub const ZILLOW_RAPIDAPI_HOST: &str = "zillow-com1.p.rapidapi.com";
pub const REDFIN_RAPIDAPI_HOST: &str = "redfin-com.p.rapidapi.com";

pub const RENTCAST_BASE_URL: &str = "https://api.rentcast.io/v1";

/// Region id Redfin's auto-complete resolves for San Francisco; used when
/// the lookup returns nothing usable.
pub const REDFIN_FALLBACK_REGION_ID: &str = "20330";

/// Per-adapter request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum listings requested per source per run.
pub const PER_SOURCE_LIMIT: u32 = 50;
