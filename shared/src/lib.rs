//! Shared core for the OSSC center admin dashboard.
//!
//! All state lives here; shells render [`ViewModel`] and execute the HTTP,
//! key-value and render effects the core requests.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod create_form;
pub mod error;
pub mod event;
pub mod graphql;
pub mod list_view;
pub mod model;
pub mod selector;
pub mod session;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{ErrorKind, FetchError, PageError, SelectionError, ValidationError};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;

pub const DEFAULT_ENDPOINT: &str = "https://staging-gateway.lmis.gov.et/v1/graphql";
pub const PAGE_SIZE: usize = 7;
