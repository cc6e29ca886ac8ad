//! Client side of the todo app: an HTTP client for the todo API, the local
//! view state that mirrors it, and a text renderer for that state.

mod api;
mod config;
pub mod debounce;
mod render;
mod view;

pub use api::{ClientError, ClientResult, HttpTodoApi, TodoApi};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_DEBOUNCE};
pub use debounce::Debouncer;
pub use render::render;
pub use view::{EditField, Mode, TodoView, ViewState};
