use tracing::{debug, info, warn};

use crate::capabilities::{clear_session, load_session, send_graphql, store_session, Capabilities};
use crate::event::Event;
use crate::graphql::{
    CentersData, GraphQlRequest, InsertCenterData, Payload, RegionsData, SignInData, WoredasData,
    ZonesData,
};
use crate::model::{Model, Screen};
use crate::selector::OptionsFetch;
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    fn graphql<P, F>(&self, request: &GraphQlRequest, model: &mut Model, caps: &Capabilities, on_done: F)
    where
        P: Payload,
        P::Output: Send + 'static,
        F: FnOnce(Result<P::Output, crate::error::FetchError>) -> Event + Send + 'static,
    {
        let immediate = send_graphql::<P, F>(
            &caps.http,
            model.config.endpoint(),
            model.session.bearer_token(),
            request,
            on_done,
        );
        if let Some(event) = immediate {
            crux_core::App::update(self, event, model, caps);
        }
    }

    fn enter_dashboard(&self, model: &mut Model, caps: &Capabilities) {
        model.screen = Screen::Dashboard;
        model.centers.reset();
        self.fetch_centers(model, caps);
    }

    fn fetch_centers(&self, model: &mut Model, caps: &Capabilities) {
        let ticket = model.centers.begin_load();
        self.graphql::<CentersData, _>(&GraphQlRequest::centers(), model, caps, move |result| {
            Event::CentersFetched { ticket, result }
        });
    }

    fn fetch_options(&self, fetch: OptionsFetch, model: &mut Model, caps: &Capabilities) {
        match fetch {
            OptionsFetch::Regions { ticket } => {
                self.graphql::<RegionsData, _>(&GraphQlRequest::regions(), model, caps, move |result| {
                    Event::RegionsFetched { ticket, result }
                });
            }
            OptionsFetch::Zones { ticket, region_id } => {
                let request = GraphQlRequest::zones(&region_id);
                self.graphql::<ZonesData, _>(&request, model, caps, move |result| {
                    Event::ZonesFetched { ticket, result }
                });
            }
            OptionsFetch::Woredas { ticket, zone_id } => {
                let request = GraphQlRequest::woredas(&zone_id);
                self.graphql::<WoredasData, _>(&request, model, caps, move |result| {
                    Event::WoredasFetched { ticket, result }
                });
            }
        }
    }

    fn teardown(model: &mut Model, caps: &Capabilities) {
        let keys = model.session.clear();
        clear_session(&caps.kv, keys);
        model.centers.reset();
        model.create_form.close();
        model.login.reset();
        model.screen = Screen::Login;
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_user_initiated() {
            info!(event = event_name, "user action");
        } else {
            debug!(event = event_name, "capability response");
        }

        match event {
            Event::AppStarted => {
                model.screen = Screen::Starting;
                let keys = model.session.begin_hydrate();
                load_session(&caps.kv, keys);
                caps.render.render();
            }

            Event::Configure(overrides) => {
                if model.config.apply(&overrides).is_ok() {
                    model.centers.set_page_size(model.config.page_size());
                    caps.render.render();
                }
            }

            Event::SessionValueLoaded { key, result } => {
                let value = result.unwrap_or_else(|e| {
                    warn!(key = key.name(), error = %e, "session read failed, treating as absent");
                    None
                });
                if model.session.apply_loaded(key, value) {
                    if model.is_authenticated() {
                        self.enter_dashboard(model, caps);
                    } else {
                        model.screen = Screen::Login;
                    }
                    caps.render.render();
                }
            }

            Event::SessionValueStored { key, result } | Event::SessionValueDeleted { key, result } => {
                if let Err(e) = result {
                    warn!(key = key.name(), error = %e, "session storage write failed");
                }
            }

            Event::SignInSubmitted {
                phone_number,
                password,
            } => {
                if model.is_authenticated() {
                    debug!("already signed in, ignoring sign-in");
                    return;
                }
                match model.login.submit(&phone_number, &password) {
                    Ok(Some(ticket)) => {
                        let request = GraphQlRequest::sign_in(&phone_number, &password);
                        self.graphql::<SignInData, _>(&request, model, caps, move |result| {
                            Event::SignInCompleted {
                                ticket,
                                result: result.map(Box::new),
                            }
                        });
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(error = %e, "sign-in rejected");
                        model.login.reject(&e);
                    }
                }
                caps.render.render();
            }

            Event::SignInCompleted { ticket, result } => {
                if !model.login.finish(ticket, result.is_ok()) {
                    return;
                }
                if let Ok(outcome) = result {
                    model.session.establish(*outcome);
                    store_session(&caps.kv, &model.session);
                    self.enter_dashboard(model, caps);
                }
                caps.render.render();
            }

            Event::LogoutRequested => {
                Self::teardown(model, caps);
                caps.render.render();
            }

            Event::RefreshCenters => {
                if model.screen == Screen::Dashboard {
                    self.fetch_centers(model, caps);
                    caps.render.render();
                }
            }

            Event::CentersFetched { ticket, result } => {
                if model.centers.apply_centers(ticket, result) {
                    caps.render.render();
                }
            }

            Event::SearchTermChanged(term) => {
                model.centers.set_search_term(&term);
                caps.render.render();
            }

            Event::PageSelected(index) => match model.centers.set_page(index) {
                Ok(()) => caps.render.render(),
                Err(e) => warn!(error = %e, "ignoring page selection"),
            },

            Event::CreateFormOpened => {
                if model.screen != Screen::Dashboard {
                    warn!("create form requested outside the dashboard");
                    return;
                }
                let fetch = model.create_form.open();
                self.fetch_options(fetch, model, caps);
                caps.render.render();
            }

            Event::CreateFormClosed => {
                model.create_form.close();
                caps.render.render();
            }

            Event::FormFieldChanged { field, value } => {
                if model.create_form.set_field(field, value) {
                    caps.render.render();
                }
            }

            Event::RegionSelected(id) => {
                if !model.create_form.is_open() {
                    return;
                }
                if let Some(fetch) = model.create_form.chain_mut().set_region(id) {
                    self.fetch_options(fetch, model, caps);
                }
                caps.render.render();
            }

            Event::ZoneSelected(id) => {
                if !model.create_form.is_open() {
                    return;
                }
                match model.create_form.chain_mut().set_zone(id) {
                    Ok(Some(fetch)) => self.fetch_options(fetch, model, caps),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "ignoring zone selection"),
                }
                caps.render.render();
            }

            Event::WoredaSelected(id) => {
                if !model.create_form.is_open() {
                    return;
                }
                match model.create_form.chain_mut().set_woreda(id) {
                    Ok(()) => caps.render.render(),
                    Err(e) => warn!(error = %e, "ignoring woreda selection"),
                }
            }

            Event::RetryOptions(level) => {
                if !model.create_form.is_open() {
                    return;
                }
                if let Some(fetch) = model.create_form.chain_mut().retry(level) {
                    self.fetch_options(fetch, model, caps);
                    caps.render.render();
                }
            }

            Event::RegionsFetched { ticket, result } => {
                if model.create_form.chain_mut().apply_regions(ticket, result) {
                    caps.render.render();
                }
            }

            Event::ZonesFetched { ticket, result } => {
                if model.create_form.chain_mut().apply_zones(ticket, result) {
                    caps.render.render();
                }
            }

            Event::WoredasFetched { ticket, result } => {
                if model.create_form.chain_mut().apply_woredas(ticket, result) {
                    caps.render.render();
                }
            }

            Event::CreateCenterSubmitted => {
                if let Ok(Some((ticket, input))) = model.create_form.submit() {
                    let request = GraphQlRequest::create_center(&input);
                    self.graphql::<InsertCenterData, _>(&request, model, caps, move |result| {
                        Event::CenterCreated { ticket, result }
                    });
                }
                caps.render.render();
            }

            Event::CenterCreated { ticket, result } => {
                let created = result.is_ok();
                if model.create_form.finish(ticket, result) {
                    if created {
                        self.fetch_centers(model, caps);
                    }
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
