//! Polling job dashboard for the Pogo job service.
//!
//! Job listings are fetched through a [`JobSource`](pogo_client::source::JobSource)
//! into a [`PaginatedCollection`](collection::PaginatedCollection), paged
//! locally by a [`TableBinding`](table::TableBinding), and drawn by a
//! [`Renderer`](render::Renderer). Each table runs as its own
//! [`TableController`](controller::TableController) task; [`app::App`] wires
//! the tables of a page together.

pub mod app;
pub mod collection;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod table;
pub mod views;
