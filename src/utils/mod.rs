pub mod api_error;
pub mod logging;
pub mod url;
