//! Capability set: GraphQL over `crux_http`, session storage over `crux_kv`,
//! and Crux's built-in `Render`.

mod http;
mod kv;

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

pub use self::http::{send_graphql, HttpCapability, ValidatedUrl, MAX_URL_LENGTH};
pub use self::kv::{clear_session, load_session, store_session, KvCapability, KvError};

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
}
