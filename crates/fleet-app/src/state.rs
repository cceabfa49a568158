// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::{
    BackendError, EditSession, FleetBackend, SelectionSet, SessionState, SortSpec, Vehicle,
    VehicleDraft, VehicleField, VehicleId, VehicleStore, VinGenerator, visible_vehicles,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetCommand {
    Reload,
    CreateVehicle,
    RefreshVehicle(VehicleId),
    DeleteVehicle(VehicleId),
    DeleteSelection,
    ToggleRow(VehicleId),
    ToggleAllVisible,
    SetSearch(String),
    SetSort(Option<SortSpec>),
    OpenEditor(VehicleId),
    EditField(VehicleField, String),
    AddTag(String),
    RemoveTag(String),
    Update,
    RequestClose,
    KeepEditing,
    DiscardChanges,
    SaveAndClose,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetEvent {
    StoreReloaded(usize),
    VehicleCreated(VehicleId),
    VehicleUpdated(VehicleId),
    VehicleRefreshed(VehicleId),
    VehicleDeleted(VehicleId),
    VehicleGone(VehicleId),
    BulkDeleteFinished { deleted: usize, failed: usize },
    SelectionChanged(usize),
    SearchChanged,
    SortChanged(Option<SortSpec>),
    SessionChanged(SessionState),
    OperationFailed(String),
    StatusUpdated(String),
    StatusCleared,
}

/// Everything the vehicle screen needs: the store, the editing session,
/// the bulk-delete selection and the list view settings.
///
/// Network calls go through the backend passed to [`FleetState::dispatch`];
/// the store is touched only after the backend reports success.
#[derive(Debug, Clone)]
pub struct FleetState {
    pub store: VehicleStore,
    pub session: EditSession,
    pub selection: SelectionSet,
    pub search: String,
    pub sort: Option<SortSpec>,
    pub status_line: Option<String>,
    vins: VinGenerator,
}

impl Default for FleetState {
    fn default() -> Self {
        Self::with_vin_generator(VinGenerator::from_clock())
    }
}

impl FleetState {
    pub fn with_vin_generator(vins: VinGenerator) -> Self {
        Self {
            store: VehicleStore::new(),
            session: EditSession::default(),
            selection: SelectionSet::default(),
            search: String::new(),
            sort: None,
            status_line: None,
            vins,
        }
    }

    /// Store rows after the search filter and sort are applied.
    pub fn visible(&self) -> Vec<&Vehicle> {
        visible_vehicles(self.store.vehicles(), &self.search, self.sort)
    }

    pub fn visible_ids(&self) -> Vec<VehicleId> {
        self.visible().iter().map(|vehicle| vehicle.id).collect()
    }

    pub fn dispatch<B: FleetBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        command: FleetCommand,
    ) -> Vec<FleetEvent> {
        match command {
            FleetCommand::Reload => self.reload(backend),
            FleetCommand::CreateVehicle => self.create(backend),
            FleetCommand::RefreshVehicle(id) => self.refresh(backend, id),
            FleetCommand::DeleteVehicle(id) => self.delete(backend, id),
            FleetCommand::DeleteSelection => self.delete_selection(backend),
            FleetCommand::ToggleRow(id) => {
                self.selection.toggle(id);
                vec![FleetEvent::SelectionChanged(self.selection.len())]
            }
            FleetCommand::ToggleAllVisible => {
                let visible = self.visible_ids();
                self.selection.toggle_all(&visible);
                vec![FleetEvent::SelectionChanged(self.selection.len())]
            }
            FleetCommand::SetSearch(search) => self.set_search(search),
            FleetCommand::SetSort(sort) => {
                self.sort = sort;
                vec![FleetEvent::SortChanged(sort)]
            }
            FleetCommand::OpenEditor(id) => self.open_editor(id),
            FleetCommand::EditField(field, value) => {
                let changed = self.session.edit_field(field, value);
                self.session_event(changed)
            }
            FleetCommand::AddTag(tag) => {
                let changed = self.session.add_tag(&tag);
                self.session_event(changed)
            }
            FleetCommand::RemoveTag(tag) => {
                let changed = self.session.remove_tag(&tag);
                self.session_event(changed)
            }
            FleetCommand::Update => self.save(backend, false),
            FleetCommand::RequestClose => {
                let state = self.session.request_close();
                vec![FleetEvent::SessionChanged(state)]
            }
            FleetCommand::KeepEditing => {
                let state = self.session.keep_editing();
                vec![FleetEvent::SessionChanged(state)]
            }
            FleetCommand::DiscardChanges => {
                self.session.discard();
                vec![
                    FleetEvent::SessionChanged(SessionState::Closed),
                    self.set_status("changes discarded"),
                ]
            }
            FleetCommand::SaveAndClose => self.save(backend, true),
            FleetCommand::ClearStatus => {
                self.status_line = None;
                vec![FleetEvent::StatusCleared]
            }
        }
    }

    fn reload<B: FleetBackend + ?Sized>(&mut self, backend: &mut B) -> Vec<FleetEvent> {
        match backend.list_vehicles() {
            Ok(vehicles) => {
                let count = vehicles.len();
                self.store.replace_all(vehicles);
                let store = &self.store;
                self.selection.retain(|id| store.contains(id));
                info!(count, "loaded vehicles");
                vec![
                    FleetEvent::StoreReloaded(count),
                    self.set_status(&format!("loaded {count} vehicles")),
                ]
            }
            Err(error) => self.fail("load vehicles", &error),
        }
    }

    fn create<B: FleetBackend + ?Sized>(&mut self, backend: &mut B) -> Vec<FleetEvent> {
        let draft = VehicleDraft::placeholder(self.vins.generate());
        match backend.create_vehicle(&draft) {
            Ok(vehicle) => {
                let id = vehicle.id;
                info!(%id, vin = %vehicle.vin, "created vehicle");
                self.store.add(vehicle);
                vec![
                    FleetEvent::VehicleCreated(id),
                    self.set_status(&format!("created vehicle {id}")),
                ]
            }
            Err(error) => self.fail("create vehicle", &error),
        }
    }

    fn refresh<B: FleetBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: VehicleId,
    ) -> Vec<FleetEvent> {
        match backend.get_vehicle(id) {
            Ok(vehicle) => {
                self.store.apply_update(id, &vehicle);
                debug!(%id, "refreshed vehicle");
                vec![FleetEvent::VehicleRefreshed(id)]
            }
            Err(BackendError::NotFound(_)) => {
                self.store.remove(id);
                self.selection.deselect(id);
                info!(%id, "vehicle no longer exists on the server");
                vec![
                    FleetEvent::VehicleGone(id),
                    self.set_status(&format!("vehicle {id} no longer exists")),
                ]
            }
            Err(error) => self.fail(&format!("refresh vehicle {id}"), &error),
        }
    }

    fn delete<B: FleetBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: VehicleId,
    ) -> Vec<FleetEvent> {
        match backend.delete_vehicle(id) {
            Ok(()) => {
                self.store.remove(id);
                self.selection.deselect(id);
                info!(%id, "deleted vehicle");
                vec![
                    FleetEvent::VehicleDeleted(id),
                    FleetEvent::SelectionChanged(self.selection.len()),
                    self.set_status(&format!("deleted vehicle {id}")),
                ]
            }
            Err(error) => self.fail(&format!("delete vehicle {id}"), &error),
        }
    }

    /// One delete request per selected id. Each success is removed from
    /// the store on its own; failures are only logged. The selection is
    /// cleared whatever the outcome.
    fn delete_selection<B: FleetBackend + ?Sized>(&mut self, backend: &mut B) -> Vec<FleetEvent> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return vec![self.set_status("nothing selected")];
        }

        let mut events = Vec::new();
        let mut failed = 0;
        for id in &ids {
            match backend.delete_vehicle(*id) {
                Ok(()) => {
                    self.store.remove(*id);
                    events.push(FleetEvent::VehicleDeleted(*id));
                }
                Err(error) => {
                    failed += 1;
                    warn!(%id, %error, "bulk delete failed for vehicle");
                }
            }
        }
        self.selection.clear();

        let deleted = ids.len() - failed;
        info!(deleted, failed, "bulk delete finished");
        events.push(FleetEvent::BulkDeleteFinished { deleted, failed });
        events.push(FleetEvent::SelectionChanged(0));
        events.push(self.set_status(&format!("deleted {deleted} of {} vehicles", ids.len())));
        events
    }

    fn set_search(&mut self, search: String) -> Vec<FleetEvent> {
        if search == self.search {
            return Vec::new();
        }
        self.search = search;
        self.selection.clear();
        vec![FleetEvent::SearchChanged, FleetEvent::SelectionChanged(0)]
    }

    fn open_editor(&mut self, id: VehicleId) -> Vec<FleetEvent> {
        match self.store.get(id) {
            Some(vehicle) => {
                self.session.open(vehicle);
                vec![FleetEvent::SessionChanged(self.session.state())]
            }
            None => {
                debug!(%id, "open editor for unknown vehicle ignored");
                Vec::new()
            }
        }
    }

    fn save<B: FleetBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        close_after: bool,
    ) -> Vec<FleetEvent> {
        let Some((id, draft)) = self.session.pending_update() else {
            return Vec::new();
        };
        if !self.session.is_dirty() {
            if close_after {
                self.session.close();
                return vec![FleetEvent::SessionChanged(SessionState::Closed)];
            }
            return vec![self.set_status("no changes to update")];
        }

        match backend.update_vehicle(id, &draft) {
            Ok(_) => {
                let saved = draft.into_vehicle(id);
                self.session.mark_saved(&saved);
                if !self.store.apply_update(id, &saved) {
                    debug!(%id, "updated vehicle is no longer in the store");
                }
                if close_after {
                    self.session.close();
                }
                info!(%id, "updated vehicle");
                vec![
                    FleetEvent::VehicleUpdated(id),
                    FleetEvent::SessionChanged(self.session.state()),
                    self.set_status(&format!("updated vehicle {id}")),
                ]
            }
            Err(error) => {
                self.session.keep_editing();
                let mut events = self.fail(&format!("update vehicle {id}"), &error);
                events.insert(0, FleetEvent::SessionChanged(self.session.state()));
                events
            }
        }
    }

    fn session_event(&self, changed: bool) -> Vec<FleetEvent> {
        if changed {
            vec![FleetEvent::SessionChanged(self.session.state())]
        } else {
            Vec::new()
        }
    }

    fn fail(&mut self, action: &str, error: &BackendError) -> Vec<FleetEvent> {
        warn!(%error, "{action} failed");
        let message = format!("{action} failed: {error}");
        vec![
            FleetEvent::OperationFailed(message.clone()),
            self.set_status(&message),
        ]
    }

    fn set_status(&mut self, message: &str) -> FleetEvent {
        self.status_line = Some(message.to_owned());
        FleetEvent::StatusUpdated(message.to_owned())
    }
}
