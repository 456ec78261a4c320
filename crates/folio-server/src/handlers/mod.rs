//! HTTP request handlers.

pub(crate) mod actions;
pub(crate) mod form;
pub(crate) mod links;
pub(crate) mod list;
pub(crate) mod public;
pub(crate) mod routes;
