pub mod feed_service;
pub mod load_service;
pub mod store_service;
pub mod transition_service;
pub mod view_service;
