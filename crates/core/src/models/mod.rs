pub mod intent;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod token;
pub mod views;
