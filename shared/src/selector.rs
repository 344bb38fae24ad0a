//! Region → zone → woreda selection.
//!
//! Each control owns an [`Options`] state machine:
//!
//! ```text
//! Disabled ──parent chosen──▶ Empty ──fetch──▶ Loading ──ok──▶ Loaded
//!     ▲                                           │
//!     └────────────── parent cleared ◀────────────┴──err──▶ Failed
//! ```
//!
//! Every fetch is issued under a fresh [`FetchTicket`]. A completion is applied
//! only if the control is still `Loading` under that exact ticket, so a late
//! answer for a parent the user has since moved away from is dropped, and
//! re-selecting the same parent always produces a new attempt.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, SelectionError};
use crate::model::{
    EntityId, FetchTicket, Region, RegionId, Selectable, TicketCounter, Woreda, WoredaId, Zone,
    ZoneId,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Region,
    Zone,
    Woreda,
}

impl Level {
    #[must_use]
    pub const fn parent(self) -> Option<Level> {
        match self {
            Self::Region => None,
            Self::Zone => Some(Self::Region),
            Self::Woreda => Some(Self::Zone),
        }
    }

    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Zone => "zone",
            Self::Woreda => "woreda",
        }
    }

    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Region => "regions",
            Self::Zone => "zones",
            Self::Woreda => "woredas",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlStatus {
    Disabled,
    Empty,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Options<T> {
    Disabled,
    Empty,
    Loading { ticket: FetchTicket },
    Loaded(Vec<T>),
    Failed { error: FetchError },
}

impl<T> Options<T> {
    #[must_use]
    pub fn status(&self) -> ControlStatus {
        match self {
            Self::Disabled => ControlStatus::Disabled,
            Self::Empty => ControlStatus::Empty,
            Self::Loading { .. } => ControlStatus::Loading,
            Self::Loaded(_) => ControlStatus::Loaded,
            Self::Failed { .. } => ControlStatus::Error,
        }
    }

    /// Fetched options, or nothing while loading, failed or gated.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Loaded(items) => items,
            _ => &[],
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    fn pending_ticket(&self) -> Option<FetchTicket> {
        match self {
            Self::Loading { ticket } => Some(*ticket),
            _ => None,
        }
    }

    fn resolve(&mut self, ticket: FetchTicket, result: Result<Vec<T>, FetchError>) -> bool {
        if self.pending_ticket() != Some(ticket) {
            return false;
        }
        *self = match result {
            Ok(items) => Self::Loaded(items),
            Err(error) => Self::Failed { error },
        };
        true
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub id: EntityId,
    pub name: String,
}

impl SelectOption {
    fn from_item<T: Selectable>(item: &T) -> Self {
        Self {
            id: item.option_id().clone(),
            name: item.option_name().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub region: Option<RegionId>,
    pub zone: Option<ZoneId>,
    pub woreda: Option<WoredaId>,
}

/// A dependent fetch the chain wants issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionsFetch {
    Regions { ticket: FetchTicket },
    Zones { ticket: FetchTicket, region_id: RegionId },
    Woredas { ticket: FetchTicket, zone_id: ZoneId },
}

impl OptionsFetch {
    #[must_use]
    pub fn ticket(&self) -> FetchTicket {
        match self {
            Self::Regions { ticket } | Self::Zones { ticket, .. } | Self::Woredas { ticket, .. } => {
                *ticket
            }
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::Regions { .. } => Level::Region,
            Self::Zones { .. } => Level::Zone,
            Self::Woredas { .. } => Level::Woreda,
        }
    }
}

/// Guard applied before any dependent fetch: blank ids count as "nothing chosen".
fn chosen<T, F>(id: Option<T>, raw: F) -> Option<T>
where
    F: Fn(&T) -> &EntityId,
{
    id.filter(|id| match raw(id) {
        EntityId::Text(s) => !s.trim().is_empty(),
        EntityId::Int(_) => true,
    })
}

#[derive(Debug, Clone)]
pub struct SelectorChain {
    selection: SelectionState,
    regions: Options<Region>,
    zones: Options<Zone>,
    woredas: Options<Woreda>,
    tickets: TicketCounter,
}

impl Default for SelectorChain {
    fn default() -> Self {
        Self {
            selection: SelectionState::default(),
            regions: Options::Empty,
            zones: Options::Disabled,
            woredas: Options::Disabled,
            tickets: TicketCounter::default(),
        }
    }
}

impl SelectorChain {
    /// Fresh selection state plus the unconditional region fetch.
    pub fn mount(&mut self) -> OptionsFetch {
        self.unmount();
        let ticket = self.tickets.issue();
        self.regions = Options::Loading { ticket };
        OptionsFetch::Regions { ticket }
    }

    /// Drops all state. Tickets keep counting so nothing issued before the
    /// unmount can match afterwards.
    pub fn unmount(&mut self) {
        self.selection = SelectionState::default();
        self.regions = Options::Empty;
        self.zones = Options::Disabled;
        self.woredas = Options::Disabled;
    }

    #[instrument(skip(self), level = "debug")]
    pub fn set_region(&mut self, id: Option<RegionId>) -> Option<OptionsFetch> {
        let id = chosen(id, RegionId::as_id);
        self.selection.region.clone_from(&id);
        self.selection.zone = None;
        self.selection.woreda = None;
        self.woredas = Options::Disabled;

        match id {
            Some(region_id) => {
                let ticket = self.tickets.issue();
                self.zones = Options::Loading { ticket };
                Some(OptionsFetch::Zones { ticket, region_id })
            }
            None => {
                self.zones = Options::Disabled;
                None
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub fn set_zone(&mut self, id: Option<ZoneId>) -> Result<Option<OptionsFetch>, SelectionError> {
        if self.selection.region.is_none() {
            return Err(SelectionError::ParentNotSelected { level: Level::Zone });
        }

        let id = chosen(id, ZoneId::as_id);
        self.selection.zone.clone_from(&id);
        self.selection.woreda = None;

        Ok(match id {
            Some(zone_id) => {
                let ticket = self.tickets.issue();
                self.woredas = Options::Loading { ticket };
                Some(OptionsFetch::Woredas { ticket, zone_id })
            }
            None => {
                self.woredas = Options::Disabled;
                None
            }
        })
    }

    #[instrument(skip(self), level = "debug")]
    pub fn set_woreda(&mut self, id: Option<WoredaId>) -> Result<(), SelectionError> {
        if self.selection.zone.is_none() {
            return Err(SelectionError::ParentNotSelected {
                level: Level::Woreda,
            });
        }
        self.selection.woreda = chosen(id, WoredaId::as_id);
        Ok(())
    }

    /// Re-issues the fetch for `level` when its parent is chosen. Selections
    /// are left alone.
    pub fn retry(&mut self, level: Level) -> Option<OptionsFetch> {
        match level {
            Level::Region => {
                let ticket = self.tickets.issue();
                self.regions = Options::Loading { ticket };
                Some(OptionsFetch::Regions { ticket })
            }
            Level::Zone => {
                let region_id = self.selection.region.clone()?;
                let ticket = self.tickets.issue();
                self.zones = Options::Loading { ticket };
                Some(OptionsFetch::Zones { ticket, region_id })
            }
            Level::Woreda => {
                let zone_id = self.selection.zone.clone()?;
                let ticket = self.tickets.issue();
                self.woredas = Options::Loading { ticket };
                Some(OptionsFetch::Woredas { ticket, zone_id })
            }
        }
    }

    pub fn apply_regions(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Region>, FetchError>,
    ) -> bool {
        Self::report(Level::Region, ticket, self.regions.resolve(ticket, result))
    }

    pub fn apply_zones(&mut self, ticket: FetchTicket, result: Result<Vec<Zone>, FetchError>) -> bool {
        Self::report(Level::Zone, ticket, self.zones.resolve(ticket, result))
    }

    pub fn apply_woredas(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Woreda>, FetchError>,
    ) -> bool {
        Self::report(Level::Woreda, ticket, self.woredas.resolve(ticket, result))
    }

    fn report(level: Level, ticket: FetchTicket, applied: bool) -> bool {
        if applied {
            debug!(level = level.noun(), ticket = ticket.value(), "options applied");
        } else {
            warn!(
                level = level.noun(),
                ticket = ticket.value(),
                "discarding stale options result"
            );
        }
        applied
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn regions(&self) -> &Options<Region> {
        &self.regions
    }

    #[must_use]
    pub fn zones(&self) -> &Options<Zone> {
        &self.zones
    }

    #[must_use]
    pub fn woredas(&self) -> &Options<Woreda> {
        &self.woredas
    }

    #[must_use]
    pub fn status(&self, level: Level) -> ControlStatus {
        match level {
            Level::Region => self.regions.status(),
            Level::Zone => self.zones.status(),
            Level::Woreda => self.woredas.status(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self, level: Level) -> bool {
        match level {
            Level::Region => true,
            Level::Zone => self.selection.region.is_some(),
            Level::Woreda => self.selection.zone.is_some(),
        }
    }

    #[must_use]
    pub fn options(&self, level: Level) -> Vec<SelectOption> {
        match level {
            Level::Region => self.regions.items().iter().map(SelectOption::from_item).collect(),
            Level::Zone => self.zones.items().iter().map(SelectOption::from_item).collect(),
            Level::Woreda => self.woredas.items().iter().map(SelectOption::from_item).collect(),
        }
    }

    #[must_use]
    pub fn selected_id(&self, level: Level) -> Option<EntityId> {
        match level {
            Level::Region => self.selection.region.as_ref().map(|id| id.as_id().clone()),
            Level::Zone => self.selection.zone.as_ref().map(|id| id.as_id().clone()),
            Level::Woreda => self.selection.woreda.as_ref().map(|id| id.as_id().clone()),
        }
    }
}
