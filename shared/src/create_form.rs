use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FetchError, RequiredField, ValidationError};
use crate::model::{CreatedCenter, FetchTicket, TicketCounter, WoredaId, ZoneId};
use crate::selector::{OptionsFetch, SelectorChain};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Description,
    HouseNumber,
    PhoneNumber,
}

impl FormField {
    #[must_use]
    pub const fn required(self) -> RequiredField {
        match self {
            Self::Name => RequiredField::CenterName,
            Self::Description => RequiredField::Description,
            Self::HouseNumber => RequiredField::HouseNumber,
            Self::PhoneNumber => RequiredField::PhoneNumber,
        }
    }
}

/// Free-text part of the form. Independent of the selection until submit.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct FormDraft {
    pub name: String,
    pub description: String,
    pub house_number: String,
    pub phone_number: String,
}

impl FormDraft {
    pub fn set(&mut self, field: FormField, value: String) {
        *self.field_mut(field) = value;
    }

    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Description => &self.description,
            FormField::HouseNumber => &self.house_number,
            FormField::PhoneNumber => &self.phone_number,
        }
    }

    fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Description => &mut self.description,
            FormField::HouseNumber => &mut self.house_number,
            FormField::PhoneNumber => &mut self.phone_number,
        }
    }
}

/// `base_ossc_insert_input` object sent with the create mutation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateCenterInput {
    pub name: String,
    pub description: String,
    pub house_number: String,
    pub phone_number: String,
    pub zone_id: ZoneId,
    pub woreda_id: WoredaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submission {
    #[default]
    Idle,
    Pending {
        ticket: FetchTicket,
    },
    Invalid {
        error: ValidationError,
    },
    Failed {
        error: FetchError,
    },
}

#[derive(Debug, Default)]
pub struct CreateForm {
    open: bool,
    draft: FormDraft,
    chain: SelectorChain,
    submission: Submission,
    tickets: TicketCounter,
}

impl CreateForm {
    /// Mounts a fresh form and returns the region fetch to issue.
    pub fn open(&mut self) -> OptionsFetch {
        self.open = true;
        self.draft = FormDraft::default();
        self.submission = Submission::Idle;
        self.chain.mount()
    }

    /// Unmounts. Draft, selection and any pending submission are dropped.
    pub fn close(&mut self) {
        self.open = false;
        self.draft = FormDraft::default();
        self.submission = Submission::Idle;
        self.chain.unmount();
    }

    pub fn set_field(&mut self, field: FormField, value: String) -> bool {
        if !self.open {
            debug!(?field, "ignoring edit on closed form");
            return false;
        }
        self.draft.set(field, value);
        true
    }

    /// Every text field non-blank and the full region → zone → woreda path
    /// chosen. Reports the first missing field in form order.
    pub fn validate(&self) -> Result<CreateCenterInput, ValidationError> {
        for field in [
            FormField::Name,
            FormField::Description,
            FormField::HouseNumber,
            FormField::PhoneNumber,
        ] {
            if self.draft.get(field).trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.required(),
                });
            }
        }

        let selection = self.chain.selection();
        if selection.region.is_none() {
            return Err(ValidationError::MissingField {
                field: RequiredField::Region,
            });
        }
        let zone_id = selection.zone.clone().ok_or(ValidationError::MissingField {
            field: RequiredField::Zone,
        })?;
        let woreda_id = selection.woreda.clone().ok_or(ValidationError::MissingField {
            field: RequiredField::Woreda,
        })?;

        Ok(CreateCenterInput {
            name: self.draft.name.trim().to_string(),
            description: self.draft.description.trim().to_string(),
            house_number: self.draft.house_number.trim().to_string(),
            phone_number: self.draft.phone_number.trim().to_string(),
            zone_id,
            woreda_id,
        })
    }

    /// `Ok(None)` when the form is closed or a submission is already pending.
    pub fn submit(&mut self) -> Result<Option<(FetchTicket, CreateCenterInput)>, ValidationError> {
        if !self.open || self.is_submitting() {
            return Ok(None);
        }
        match self.validate() {
            Ok(input) => {
                let ticket = self.tickets.issue();
                self.submission = Submission::Pending { ticket };
                Ok(Some((ticket, input)))
            }
            Err(error) => {
                debug!(%error, "create form rejected");
                self.submission = Submission::Invalid {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Success closes the form. Failure keeps it open with the draft intact.
    pub fn finish(&mut self, ticket: FetchTicket, result: Result<CreatedCenter, FetchError>) -> bool {
        if self.submission != (Submission::Pending { ticket }) {
            warn!(ticket = ticket.value(), "discarding stale create result");
            return false;
        }
        match result {
            Ok(created) => {
                info!(center_id = %created.id, name = %created.name, "center created");
                self.close();
            }
            Err(error) => {
                warn!(code = error.kind().code(), %error, "create center failed");
                self.submission = Submission::Failed { error };
            }
        }
        true
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, Submission::Pending { .. })
    }

    #[must_use]
    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    #[must_use]
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    #[must_use]
    pub fn chain(&self) -> &SelectorChain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut SelectorChain {
        &mut self.chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CenterId, RegionId};

    fn filled() -> CreateForm {
        let mut form = CreateForm::default();
        form.open();
        form.set_field(FormField::Name, "Bole OSSC".into());
        form.set_field(FormField::Description, "Main office".into());
        form.set_field(FormField::HouseNumber, "12".into());
        form.set_field(FormField::PhoneNumber, "0911000000".into());
        let chain = form.chain_mut();
        chain.set_region(Some(RegionId::new(1)));
        chain.set_zone(Some(ZoneId::new(10))).unwrap();
        chain.set_woreda(Some(WoredaId::new(100))).unwrap();
        form
    }

    #[test]
    fn closed_form_ignores_edits() {
        let mut form = CreateForm::default();
        assert!(!form.set_field(FormField::Name, "x".into()));
        assert_eq!(form.draft(), &FormDraft::default());
        assert_eq!(form.submit(), Ok(None));
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut form = filled();
        form.set_field(FormField::HouseNumber, "  ".into());
        assert_eq!(
            form.submit(),
            Err(ValidationError::MissingField {
                field: RequiredField::HouseNumber
            })
        );
        assert!(matches!(form.submission(), Submission::Invalid { .. }));
    }

    #[test]
    fn woreda_is_required() {
        let mut form = filled();
        form.chain_mut().set_woreda(None).unwrap();
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField {
                field: RequiredField::Woreda
            })
        );
    }

    #[test]
    fn region_change_invalidates_lower_levels() {
        let mut form = filled();
        form.chain_mut().set_region(Some(RegionId::new(2)));
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField {
                field: RequiredField::Zone
            })
        );
    }

    #[test]
    fn valid_submit_builds_input_and_blocks_resubmit() {
        let mut form = filled();
        let (ticket, input) = form.submit().unwrap().unwrap();
        assert_eq!(input.name, "Bole OSSC");
        assert_eq!(input.zone_id, ZoneId::new(10));
        assert_eq!(input.woreda_id, WoredaId::new(100));
        assert!(form.is_submitting());
        assert_eq!(form.submit(), Ok(None));

        assert!(form.finish(
            ticket,
            Ok(CreatedCenter {
                id: CenterId::new(1),
                name: "Bole OSSC".into()
            })
        ));
        assert!(!form.is_open());
        assert_eq!(form.draft(), &FormDraft::default());
    }

    #[test]
    fn failed_submit_keeps_draft() {
        let mut form = filled();
        let (ticket, _) = form.submit().unwrap().unwrap();
        form.finish(ticket, Err(FetchError::Status { status: 500 }));
        assert!(form.is_open());
        assert_eq!(form.draft().name, "Bole OSSC");
        assert!(matches!(form.submission(), Submission::Failed { .. }));
        assert!(form.submit().unwrap().is_some());
    }

    #[test]
    fn result_after_close_is_discarded() {
        let mut form = filled();
        let (ticket, _) = form.submit().unwrap().unwrap();
        form.close();
        assert!(!form.finish(ticket, Err(FetchError::MissingData)));
        assert_eq!(form.submission(), &Submission::Idle);
    }
}
