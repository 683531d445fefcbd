pub mod traits;

// Built-in implementations
pub mod mock_data;
pub mod simulated_feed;
