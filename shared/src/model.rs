use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AppConfig;
use crate::create_form::CreateForm;
use crate::list_view::ListView;
use crate::session::{LoginState, Session};

/// Identifier as the gateway sends it. Hasura exposes both integer and
/// uuid/text keys, so the original JSON form is kept and echoed back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub EntityId);

        impl $name {
            pub fn new(id: impl Into<EntityId>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_id(&self) -> &EntityId {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

typed_id!(RegionId);
typed_id!(ZoneId);
typed_id!(WoredaId);
typed_id!(CenterId);
typed_id!(UserId);

// --- Administrative hierarchy ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    #[serde(default)]
    pub region_id: Option<RegionId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Woreda {
    pub id: WoredaId,
    pub name: String,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
}

/// Anything that can be offered as an option in a select control.
pub trait Selectable {
    fn option_id(&self) -> &EntityId;
    fn option_name(&self) -> &str;
}

impl Selectable for Region {
    fn option_id(&self) -> &EntityId {
        self.id.as_id()
    }
    fn option_name(&self) -> &str {
        &self.name
    }
}

impl Selectable for Zone {
    fn option_id(&self) -> &EntityId {
        self.id.as_id()
    }
    fn option_name(&self) -> &str {
        &self.name
    }
}

impl Selectable for Woreda {
    fn option_id(&self) -> &EntityId {
        self.id.as_id()
    }
    fn option_name(&self) -> &str {
        &self.name
    }
}

// --- OSSC centers ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ZoneName {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct CenterRegion {
    pub name: String,
    #[serde(default)]
    pub zones: Vec<ZoneName>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Center {
    pub name: String,
    #[serde(default)]
    pub region: Option<CenterRegion>,
    pub created_at: DateTime<Utc>,
}

impl Center {
    #[must_use]
    pub fn matches(&self, folded_term: &str) -> bool {
        folded_term.is_empty() || self.name.to_lowercase().contains(folded_term)
    }

    #[must_use]
    pub fn region_name(&self) -> &str {
        self.region.as_ref().map_or("", |r| r.name.as_str())
    }

    #[must_use]
    pub fn zone_names(&self) -> String {
        self.region
            .as_ref()
            .map(|r| {
                r.zones
                    .iter()
                    .map(|z| z.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn created_date(&self) -> String {
        self.created_at.format("%-m/%-d/%Y").to_string()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreatedCenter {
    pub id: CenterId,
    pub name: String,
}

// --- Fetch tickets ---

/// Identity of one issued fetch. A completion is applied only while its
/// ticket is still the one the owning component is waiting for.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default, Clone)]
pub struct TicketCounter {
    next: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> FetchTicket {
        self.next = self.next.wrapping_add(1);
        FetchTicket(self.next)
    }
}

// --- Root model ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Starting,
    Login,
    Dashboard,
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: AppConfig,
    pub screen: Screen,
    pub session: Session,
    pub login: LoginState,
    pub centers: ListView,
    pub create_form: CreateForm,
}

impl Model {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
