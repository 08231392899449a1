// HTTP adapters for the application ports

pub mod directory_feed;
pub mod http_client;
pub mod map_point_feed;
pub mod nominatim;

pub use directory_feed::HttpDirectoryFeed;
pub use map_point_feed::HttpMapPointFeed;
pub use nominatim::NominatimGeocoder;
