use chrono::{TimeZone, Utc};
use crux_core::testing::AppTester;
use ossc_shared::config::ConfigOverrides;
use ossc_shared::list_view::{Collection, ListBody};
use ossc_shared::model::{Center, CenterRegion, FetchTicket, ZoneName};
use ossc_shared::session::SessionKey;
use ossc_shared::view::{DashboardView, PaginationView, ScreenView};
use ossc_shared::{App, CruxApp, Effect, Event, FetchError, Model};

fn signed_in() -> (AppTester<App, Effect>, Model) {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::AppStarted, &mut model);
    for key in SessionKey::ALL {
        let value = (key == SessionKey::AccessToken).then(|| "token".to_string());
        app.update(Event::SessionValueLoaded { key, result: Ok(value) }, &mut model);
    }
    (app, model)
}

fn pending_ticket(model: &Model) -> FetchTicket {
    match model.centers.collection() {
        Collection::Loading { ticket } => *ticket,
        other => panic!("expected a pending centers fetch, got {other:?}"),
    }
}

fn center(name: &str) -> Center {
    Center {
        name: name.into(),
        region: Some(CenterRegion {
            name: "Oromia".into(),
            zones: vec![
                ZoneName {
                    name: "East Shewa".into(),
                },
                ZoneName {
                    name: "Arsi".into(),
                },
            ],
        }),
        created_at: Utc.with_ymd_and_hms(2023, 11, 3, 6, 0, 0).unwrap(),
    }
}

fn dashboard(model: &Model) -> DashboardView {
    match App.view(model).screen {
        ScreenView::Dashboard(view) => *view,
        other => panic!("expected dashboard, got {other:?}"),
    }
}

fn deliver(app: &AppTester<App, Effect>, model: &mut Model, centers: Vec<Center>) {
    let ticket = pending_ticket(model);
    app.update(
        Event::CentersFetched {
            ticket,
            result: Ok(centers),
        },
        model,
    );
}

#[test]
fn three_matching_centers_fit_one_page() {
    let (app, mut model) = signed_in();
    deliver(
        &app,
        &mut model,
        vec![center("Alpha"), center("Beta"), center("Gamma")],
    );

    app.update(Event::SearchTermChanged("a".into()), &mut model);
    let view = dashboard(&model);
    let names: Vec<_> = view.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    assert!(view.pagination.is_none());
    assert_eq!(view.rows[0].zones, "East Shewa, Arsi");
    assert_eq!(view.rows[0].created, "11/3/2023");
}

#[test]
fn ten_centers_paginate_seven_then_three() {
    let (app, mut model) = signed_in();
    deliver(
        &app,
        &mut model,
        (1..=10).map(|i| center(&format!("Center {i}"))).collect(),
    );

    let view = dashboard(&model);
    assert_eq!(view.rows.len(), 7);
    assert_eq!(view.rows[0].number, 1);
    assert_eq!(
        view.pagination,
        Some(PaginationView {
            current_page: 0,
            page_count: 2
        })
    );

    app.update(Event::PageSelected(1), &mut model);
    let view = dashboard(&model);
    let numbers: Vec<_> = view.rows.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![8, 9, 10]);
    assert_eq!(view.rows[2].name, "Center 10");
}

#[test]
fn narrowing_search_returns_to_first_page() {
    let (app, mut model) = signed_in();
    deliver(
        &app,
        &mut model,
        (1..=10).map(|i| center(&format!("Center {i}"))).collect(),
    );
    app.update(Event::PageSelected(1), &mut model);
    app.update(Event::SearchTermChanged("center 9".into()), &mut model);

    let view = dashboard(&model);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].number, 1);
    assert_eq!(view.body, ListBody::Rows);
}

#[test]
fn fetch_error_shows_indicator_and_refresh_recovers() {
    let (app, mut model) = signed_in();
    let ticket = pending_ticket(&model);
    app.update(
        Event::CentersFetched {
            ticket,
            result: Err(FetchError::Status { status: 503 }),
        },
        &mut model,
    );
    let view = dashboard(&model);
    assert_eq!(view.body, ListBody::Failed);
    assert!(view.rows.is_empty());
    assert!(view.message.is_some());

    let update = app.update(Event::RefreshCenters, &mut model);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    assert_eq!(dashboard(&model).body, ListBody::Loading);

    deliver(&app, &mut model, vec![center("Alpha")]);
    assert_eq!(dashboard(&model).body, ListBody::Rows);
}

#[test]
fn zero_matches_is_not_an_error() {
    let (app, mut model) = signed_in();
    deliver(&app, &mut model, vec![]);
    let view = dashboard(&model);
    assert_eq!(view.body, ListBody::NoMatches);
    assert_eq!(view.message.as_deref(), Some("No matching documents"));
}

#[test]
fn older_refresh_result_is_discarded() {
    let (app, mut model) = signed_in();
    let first = pending_ticket(&model);
    app.update(Event::RefreshCenters, &mut model);
    let second = pending_ticket(&model);

    app.update(
        Event::CentersFetched {
            ticket: second,
            result: Ok(vec![center("Fresh")]),
        },
        &mut model,
    );
    app.update(
        Event::CentersFetched {
            ticket: first,
            result: Ok(vec![center("Stale")]),
        },
        &mut model,
    );

    let view = dashboard(&model);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].name, "Fresh");
}

#[test]
fn configured_page_size_applies() {
    let (app, mut model) = signed_in();
    app.update(
        Event::Configure(ConfigOverrides {
            endpoint: None,
            page_size: Some(3),
        }),
        &mut model,
    );
    deliver(
        &app,
        &mut model,
        (1..=5).map(|i| center(&format!("C{i}"))).collect(),
    );
    let view = dashboard(&model);
    assert_eq!(view.rows.len(), 3);
    assert_eq!(view.pagination.map(|p| p.page_count), Some(2));
}

#[test]
fn invalid_endpoint_override_keeps_previous_config() {
    let (app, mut model) = signed_in();
    app.update(
        Event::Configure(ConfigOverrides {
            endpoint: Some("not a url".into()),
            page_size: None,
        }),
        &mut model,
    );
    assert_eq!(model.config.endpoint(), ossc_shared::DEFAULT_ENDPOINT);
}
