pub mod dispatch;
pub mod protocol;
pub mod server;

pub use dispatch::{endpoint_catalog, Dispatcher};
pub use protocol::ApiError;
pub use server::{router, serve, AppState};
