pub mod auth;
pub mod comment;
pub mod errors;
pub mod feed;
pub mod observability;
pub mod password;
pub mod post;
pub mod routes;
pub mod state;
pub mod user;
