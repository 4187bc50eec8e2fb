// Presentation layer - HTTP surface for the hosting UI
pub mod api_error;
pub mod app_state;
pub mod handlers;
