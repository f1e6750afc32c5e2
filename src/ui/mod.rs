mod app;
mod components;
mod images;
mod pagination;
mod state;

pub use app::ChatApp;
pub use state::AppState;
