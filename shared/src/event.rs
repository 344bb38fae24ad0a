use serde::{Deserialize, Serialize};

use crate::capabilities::KvError;
use crate::config::ConfigOverrides;
use crate::create_form::FormField;
use crate::error::FetchError;
use crate::model::{Center, CreatedCenter, FetchTicket, Region, RegionId, Woreda, WoredaId, Zone, ZoneId};
use crate::selector::Level;
use crate::session::{Password, SessionKey, SignInOutcome};

/// Shell events first, then capability completions. Completions are internal
/// and never cross the bridge.
#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    // Lifecycle
    AppStarted,
    Configure(ConfigOverrides),

    // Auth
    SignInSubmitted {
        phone_number: String,
        password: Password,
    },
    LogoutRequested,

    // Dashboard
    RefreshCenters,
    SearchTermChanged(String),
    PageSelected(usize),

    // Create form
    CreateFormOpened,
    CreateFormClosed,
    FormFieldChanged {
        field: FormField,
        value: String,
    },
    RegionSelected(Option<RegionId>),
    ZoneSelected(Option<ZoneId>),
    WoredaSelected(Option<WoredaId>),
    RetryOptions(Level),
    CreateCenterSubmitted,

    // Capability responses
    #[serde(skip)]
    SessionValueLoaded {
        key: SessionKey,
        result: Result<Option<String>, KvError>,
    },
    #[serde(skip)]
    SessionValueStored {
        key: SessionKey,
        result: Result<(), KvError>,
    },
    #[serde(skip)]
    SessionValueDeleted {
        key: SessionKey,
        result: Result<(), KvError>,
    },
    #[serde(skip)]
    SignInCompleted {
        ticket: FetchTicket,
        result: Result<Box<SignInOutcome>, FetchError>,
    },
    #[serde(skip)]
    CentersFetched {
        ticket: FetchTicket,
        result: Result<Vec<Center>, FetchError>,
    },
    #[serde(skip)]
    RegionsFetched {
        ticket: FetchTicket,
        result: Result<Vec<Region>, FetchError>,
    },
    #[serde(skip)]
    ZonesFetched {
        ticket: FetchTicket,
        result: Result<Vec<Zone>, FetchError>,
    },
    #[serde(skip)]
    WoredasFetched {
        ticket: FetchTicket,
        result: Result<Vec<Woreda>, FetchError>,
    },
    #[serde(skip)]
    CenterCreated {
        ticket: FetchTicket,
        result: Result<CreatedCenter, FetchError>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::Configure(_) => "configure",
            Self::SignInSubmitted { .. } => "sign_in_submitted",
            Self::LogoutRequested => "logout_requested",
            Self::RefreshCenters => "refresh_centers",
            Self::SearchTermChanged(_) => "search_term_changed",
            Self::PageSelected(_) => "page_selected",
            Self::CreateFormOpened => "create_form_opened",
            Self::CreateFormClosed => "create_form_closed",
            Self::FormFieldChanged { .. } => "form_field_changed",
            Self::RegionSelected(_) => "region_selected",
            Self::ZoneSelected(_) => "zone_selected",
            Self::WoredaSelected(_) => "woreda_selected",
            Self::RetryOptions(_) => "retry_options",
            Self::CreateCenterSubmitted => "create_center_submitted",
            Self::SessionValueLoaded { .. } => "session_value_loaded",
            Self::SessionValueStored { .. } => "session_value_stored",
            Self::SessionValueDeleted { .. } => "session_value_deleted",
            Self::SignInCompleted { .. } => "sign_in_completed",
            Self::CentersFetched { .. } => "centers_fetched",
            Self::RegionsFetched { .. } => "regions_fetched",
            Self::ZonesFetched { .. } => "zones_fetched",
            Self::WoredasFetched { .. } => "woredas_fetched",
            Self::CenterCreated { .. } => "center_created",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::SessionValueLoaded { .. }
                | Self::SessionValueStored { .. }
                | Self::SessionValueDeleted { .. }
                | Self::SignInCompleted { .. }
                | Self::CentersFetched { .. }
                | Self::RegionsFetched { .. }
                | Self::ZonesFetched { .. }
                | Self::WoredasFetched { .. }
                | Self::CenterCreated { .. }
        )
    }
}
