//! HTML template rendering handlers for the web dashboard.

mod dashboard;
mod error_page;
mod links;
mod login;
mod view;

pub use dashboard::dashboard_handler;
pub use error_page::error_page_handler;
pub use links::{edit_link_handler, links_handler, new_link_handler};
pub use login::{login_handler, register_handler};
