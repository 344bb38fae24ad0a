use serde::{Deserialize, Serialize};

use crate::create_form::{CreateForm, FormDraft, Submission};
use crate::error::RequiredField;
use crate::list_view::{ListBody, ListView};
use crate::model::{EntityId, Model, Screen};
use crate::selector::{ControlStatus, Level, SelectOption, SelectorChain};
use crate::session::LoginState;

pub const NO_MATCHES: &str = "No matching documents";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: ScreenView,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ScreenView {
    Starting,
    Login(LoginView),
    Dashboard(Box<DashboardView>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginView {
    pub submitting: bool,
    pub button_label: String,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DashboardView {
    pub user_label: String,
    pub search_term: String,
    pub body: ListBody,
    pub message: Option<String>,
    pub rows: Vec<CenterRow>,
    pub pagination: Option<PaginationView>,
    pub create_form: Option<CreateFormView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CenterRow {
    pub number: usize,
    pub name: String,
    pub region: String,
    pub zones: String,
    pub created: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: usize,
    pub page_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SelectView {
    pub label: String,
    pub enabled: bool,
    pub status: ControlStatus,
    pub placeholder: String,
    pub options: Vec<SelectOption>,
    pub selected: Option<EntityId>,
    pub can_retry: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateFormView {
    pub draft: FormDraft,
    pub region: SelectView,
    pub zone: SelectView,
    pub woreda: SelectView,
    pub submitting: bool,
    pub error: Option<String>,
}

impl ViewModel {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let screen = match model.screen {
            Screen::Starting => ScreenView::Starting,
            Screen::Login => ScreenView::Login(login_view(&model.login)),
            Screen::Dashboard => ScreenView::Dashboard(Box::new(DashboardView {
                user_label: model.session.display_name().to_string(),
                ..dashboard_view(&model.centers, &model.create_form)
            })),
        };
        Self { screen }
    }
}

fn login_view(login: &LoginState) -> LoginView {
    LoginView {
        submitting: login.is_submitting(),
        button_label: if login.is_submitting() {
            "Logging in...".into()
        } else {
            "Login".into()
        },
        error: login.error().map(str::to_string),
    }
}

fn dashboard_view(list: &ListView, form: &CreateForm) -> DashboardView {
    let body = list.body();
    let message = match body {
        ListBody::Failed => list.error().map(|e| e.user_message()),
        ListBody::NoMatches => Some(NO_MATCHES.to_string()),
        ListBody::Loading | ListBody::Rows => None,
    };
    let rows = list
        .page_window()
        .into_iter()
        .enumerate()
        .map(|(index, center)| CenterRow {
            number: list.row_number(index),
            name: center.name.clone(),
            region: center.region_name().to_string(),
            zones: center.zone_names(),
            created: center.created_date(),
        })
        .collect();
    let pagination = list.shows_pagination().then(|| PaginationView {
        current_page: list.current_page(),
        page_count: list.page_count(),
    });

    DashboardView {
        user_label: String::new(),
        search_term: list.search_term().to_string(),
        body,
        message,
        rows,
        pagination,
        create_form: form.is_open().then(|| create_form_view(form)),
    }
}

fn create_form_view(form: &CreateForm) -> CreateFormView {
    let chain = form.chain();
    let error = match form.submission() {
        Submission::Invalid { error } => Some(error.to_string()),
        Submission::Failed { error } => Some(error.user_message()),
        Submission::Idle | Submission::Pending { .. } => None,
    };
    CreateFormView {
        draft: form.draft().clone(),
        region: select_view(chain, Level::Region),
        zone: select_view(chain, Level::Zone),
        woreda: select_view(chain, Level::Woreda),
        submitting: form.is_submitting(),
        error,
    }
}

fn select_view(chain: &SelectorChain, level: Level) -> SelectView {
    let status = chain.status(level);
    let placeholder = match status {
        ControlStatus::Loading => format!("Loading {}...", level.plural()),
        ControlStatus::Error => format!("Error loading {}", level.plural()),
        _ => format!("Select a {}", level.noun()),
    };
    let label = match level {
        Level::Region => RequiredField::Region,
        Level::Zone => RequiredField::Zone,
        Level::Woreda => RequiredField::Woreda,
    }
    .label();
    SelectView {
        label: label.to_string(),
        enabled: chain.is_enabled(level),
        status,
        placeholder,
        options: chain.options(level),
        selected: chain.selected_id(level),
        can_retry: status == ControlStatus::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{Center, CenterRegion, RegionId, Zone, ZoneId, ZoneName};
    use chrono::{TimeZone, Utc};

    fn center(name: &str) -> Center {
        Center {
            name: name.into(),
            region: Some(CenterRegion {
                name: "Addis Ababa".into(),
                zones: vec![ZoneName { name: "Bole".into() }],
            }),
            created_at: Utc.with_ymd_and_hms(2024, 2, 7, 12, 0, 0).unwrap(),
        }
    }

    fn dashboard(model: &Model) -> DashboardView {
        match ViewModel::from_model(model).screen {
            ScreenView::Dashboard(view) => *view,
            other => panic!("expected dashboard, got {other:?}"),
        }
    }

    #[test]
    fn rows_are_numbered_across_pages() {
        let mut model = Model {
            screen: Screen::Dashboard,
            ..Model::default()
        };
        model
            .centers
            .set_collection((1..=9).map(|i| center(&format!("C{i}"))).collect());
        model.centers.set_page(1).unwrap();

        let view = dashboard(&model);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].number, 8);
        assert_eq!(view.rows[0].region, "Addis Ababa");
        assert_eq!(view.rows[0].zones, "Bole");
        assert_eq!(view.rows[0].created, "2/7/2024");
        assert_eq!(
            view.pagination,
            Some(PaginationView {
                current_page: 1,
                page_count: 2
            })
        );
        assert_eq!(view.user_label, "User");
    }

    #[test]
    fn empty_and_failed_bodies_are_distinct() {
        let mut model = Model {
            screen: Screen::Dashboard,
            ..Model::default()
        };
        model.centers.set_collection(vec![center("Alpha")]);
        model.centers.set_search_term("zzz");
        let view = dashboard(&model);
        assert_eq!(view.body, ListBody::NoMatches);
        assert_eq!(view.message.as_deref(), Some(NO_MATCHES));
        assert!(view.pagination.is_none());

        let ticket = model.centers.begin_load();
        model
            .centers
            .apply_centers(ticket, Err(FetchError::Transport { message: "down".into() }));
        let view = dashboard(&model);
        assert_eq!(view.body, ListBody::Failed);
        assert!(view.message.unwrap().contains("internet connection"));
        assert!(view.rows.is_empty());
    }

    #[test]
    fn select_placeholders_follow_status() {
        let mut model = Model {
            screen: Screen::Dashboard,
            ..Model::default()
        };
        model.create_form.open();
        let form = dashboard(&model).create_form.unwrap();
        assert_eq!(form.region.placeholder, "Loading regions...");
        assert_eq!(form.zone.placeholder, "Select a zone");
        assert!(!form.zone.enabled);
        assert_eq!(form.zone.label, "Zone or Sub-city");

        let chain = model.create_form.chain_mut();
        let fetch = chain.set_region(Some(RegionId::new(1))).unwrap();
        chain.apply_zones(fetch.ticket(), Err(FetchError::Status { status: 500 }));
        let form = dashboard(&model).create_form.unwrap();
        assert_eq!(form.zone.placeholder, "Error loading zones");
        assert!(form.zone.can_retry);
        assert_eq!(form.region.selected, Some(EntityId::Int(1)));

        let fetch = model.create_form.chain_mut().retry(Level::Zone).unwrap();
        model.create_form.chain_mut().apply_zones(
            fetch.ticket(),
            Ok(vec![Zone {
                id: ZoneId::new(10),
                name: "Z1".into(),
                region_id: None,
            }]),
        );
        let form = dashboard(&model).create_form.unwrap();
        assert_eq!(form.zone.options[0].name, "Z1");
        assert_eq!(form.woreda.placeholder, "Select a woreda");
    }

    #[test]
    fn login_button_reflects_pending() {
        let mut model = Model {
            screen: Screen::Login,
            ..Model::default()
        };
        model
            .login
            .submit("0911", &crate::session::Password::new("pw"))
            .unwrap();
        match ViewModel::from_model(&model).screen {
            ScreenView::Login(view) => {
                assert!(view.submitting);
                assert_eq!(view.button_label, "Logging in...");
            }
            other => panic!("expected login, got {other:?}"),
        }
    }
}
