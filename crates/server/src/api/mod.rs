pub mod files;
pub mod handlers;
pub mod middleware;
pub mod process;
pub mod routes;
pub mod summary;

pub use routes::create_router;
