// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fleet_app::{
    FleetCommand, FleetEvent, FleetState, SessionState, Vehicle, VehicleField, VehicleId,
    VinGenerator,
};
use fleet_testkit::{BackendCall, FakeBackend};

fn vehicle(id: i64, vin: &str, brand: &str, model: &str, plate: &str) -> Vehicle {
    Vehicle {
        id: VehicleId::new(id),
        vin: vin.to_owned(),
        license_plate_number: plate.to_owned(),
        model_name: model.to_owned(),
        brand: brand.to_owned(),
        equipment: Vec::new(),
    }
}

fn toyota() -> Vehicle {
    vehicle(3, "JT2BF22K1W0123456", "Toyota", "Camry", "ABC-123")
}

fn loaded(backend: &mut FakeBackend) -> FleetState {
    let mut state = FleetState::with_vin_generator(VinGenerator::new(9));
    state.dispatch(backend, FleetCommand::Reload);
    backend.clear_calls();
    state
}

#[test]
fn adding_equipment_and_updating_writes_through() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    let mut state = loaded(&mut backend);
    let id = VehicleId::new(3);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(id));
    state.dispatch(&mut backend, FleetCommand::AddTag("GPS".to_owned()));
    state.dispatch(&mut backend, FleetCommand::AddTag("Sunroof".to_owned()));
    assert_eq!(state.session.state(), SessionState::OpenDirty);

    let events = state.dispatch(&mut backend, FleetCommand::Update);
    assert_eq!(events[0], FleetEvent::VehicleUpdated(id));

    let expected = vec!["GPS".to_owned(), "Sunroof".to_owned()];
    assert_eq!(
        backend.calls(),
        &[BackendCall::Update(
            id,
            fleet_app::VehicleDraft {
                equipment: expected.clone(),
                ..toyota().draft()
            }
        )]
    );
    assert_eq!(state.store.get(id).map(|v| v.equipment.clone()), Some(expected.clone()));
    assert_eq!(state.session.state(), SessionState::OpenClean);
    assert_eq!(
        state.session.snapshot().map(|v| v.equipment.clone()),
        Some(expected)
    );
}

#[test]
fn discarding_changes_leaves_store_and_server_untouched() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    let mut state = loaded(&mut backend);
    let id = VehicleId::new(3);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(id));
    state.dispatch(
        &mut backend,
        FleetCommand::EditField(VehicleField::Brand, "Honda".to_owned()),
    );
    let events = state.dispatch(&mut backend, FleetCommand::RequestClose);
    assert_eq!(
        events,
        vec![FleetEvent::SessionChanged(SessionState::ConfirmingDiscard)]
    );

    state.dispatch(&mut backend, FleetCommand::DiscardChanges);
    assert_eq!(state.session.state(), SessionState::Closed);
    assert_eq!(state.store.get(id).map(|v| v.brand.as_str()), Some("Toyota"));
    assert!(backend.calls().is_empty());
}

#[test]
fn save_and_close_from_prompt_persists_then_closes() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    let mut state = loaded(&mut backend);
    let id = VehicleId::new(3);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(id));
    state.dispatch(
        &mut backend,
        FleetCommand::EditField(VehicleField::ModelName, "Corolla".to_owned()),
    );
    state.dispatch(&mut backend, FleetCommand::RequestClose);
    state.dispatch(&mut backend, FleetCommand::SaveAndClose);

    assert_eq!(state.session.state(), SessionState::Closed);
    assert_eq!(
        state.store.get(id).map(|v| v.model_name.as_str()),
        Some("Corolla")
    );
    assert_eq!(
        backend.get(id).map(|v| v.model_name.as_str()),
        Some("Corolla")
    );
}

#[test]
fn keep_editing_returns_to_dirty_session() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    let mut state = loaded(&mut backend);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(VehicleId::new(3)));
    state.dispatch(
        &mut backend,
        FleetCommand::EditField(VehicleField::Vin, "NEWVIN00000000000".to_owned()),
    );
    state.dispatch(&mut backend, FleetCommand::RequestClose);
    state.dispatch(&mut backend, FleetCommand::KeepEditing);

    assert_eq!(state.session.state(), SessionState::OpenDirty);
    assert_eq!(
        state.session.working().map(|v| v.vin.as_str()),
        Some("NEWVIN00000000000")
    );
}

#[test]
fn failed_update_keeps_session_dirty_and_store_unchanged() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    backend.failing_updates.insert(VehicleId::new(3));
    let mut state = loaded(&mut backend);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(VehicleId::new(3)));
    state.dispatch(&mut backend, FleetCommand::AddTag("GPS".to_owned()));
    let events = state.dispatch(&mut backend, FleetCommand::Update);

    assert!(events
        .iter()
        .any(|event| matches!(event, FleetEvent::OperationFailed(_))));
    assert_eq!(state.session.state(), SessionState::OpenDirty);
    assert!(
        state
            .store
            .get(VehicleId::new(3))
            .is_some_and(|v| v.equipment.is_empty())
    );
    assert!(state.status_line.as_deref().is_some_and(|s| s.contains("500")));
}

#[test]
fn bulk_delete_removes_selected_and_clears_selection() {
    let mut backend = FakeBackend::new(vec![
        vehicle(1, "AAA00000000000001", "Audi", "A4", "P-1"),
        vehicle(2, "AAA00000000000002", "BMW", "X1", "P-2"),
        vehicle(3, "AAA00000000000003", "Kia", "Rio", "P-3"),
    ]);
    let mut state = loaded(&mut backend);

    state.dispatch(&mut backend, FleetCommand::ToggleRow(VehicleId::new(1)));
    state.dispatch(&mut backend, FleetCommand::ToggleRow(VehicleId::new(3)));
    let events = state.dispatch(&mut backend, FleetCommand::DeleteSelection);

    assert_eq!(
        backend.calls(),
        &[
            BackendCall::Delete(VehicleId::new(1)),
            BackendCall::Delete(VehicleId::new(3)),
        ]
    );
    assert!(events.contains(&FleetEvent::BulkDeleteFinished {
        deleted: 2,
        failed: 0
    }));
    let remaining: Vec<_> = state.store.vehicles().iter().map(|v| v.id.get()).collect();
    assert_eq!(remaining, vec![2]);
    assert!(state.selection.is_empty());
}

#[test]
fn bulk_delete_is_not_atomic() {
    let mut backend = FakeBackend::new(vec![
        vehicle(1, "AAA00000000000001", "Audi", "A4", "P-1"),
        vehicle(2, "AAA00000000000002", "BMW", "X1", "P-2"),
    ]);
    backend.failing_deletes.insert(VehicleId::new(2));
    let mut state = loaded(&mut backend);

    state.dispatch(&mut backend, FleetCommand::ToggleAllVisible);
    let events = state.dispatch(&mut backend, FleetCommand::DeleteSelection);

    assert!(events.contains(&FleetEvent::BulkDeleteFinished {
        deleted: 1,
        failed: 1
    }));
    let remaining: Vec<_> = state.store.vehicles().iter().map(|v| v.id.get()).collect();
    assert_eq!(remaining, vec![2]);
    assert!(state.selection.is_empty());
    assert_eq!(state.status_line.as_deref(), Some("deleted 1 of 2 vehicles"));
}

#[test]
fn bulk_delete_keeps_row_whose_delete_is_not_found() {
    let mut backend = FakeBackend::new(vec![
        vehicle(1, "AAA00000000000001", "Audi", "A4", "P-1"),
        vehicle(2, "AAA00000000000002", "BMW", "X1", "P-2"),
        vehicle(5, "AAA00000000000005", "Kia", "Rio", "P-5"),
    ]);
    let mut state = loaded(&mut backend);
    // Someone else already removed 2 on the server.
    backend.vehicles.retain(|v| v.id != VehicleId::new(2));

    state.dispatch(&mut backend, FleetCommand::ToggleAllVisible);
    assert_eq!(state.selection.len(), 3);
    state.dispatch(&mut backend, FleetCommand::DeleteSelection);

    let remaining: Vec<_> = state.store.vehicles().iter().map(|v| v.id.get()).collect();
    assert_eq!(remaining, vec![2]);
    assert!(state.selection.is_empty());
}

#[test]
fn stale_update_for_deleted_row_is_ignored() {
    let mut backend = FakeBackend::new(vec![toyota()]);
    let mut state = loaded(&mut backend);
    let id = VehicleId::new(3);

    state.dispatch(&mut backend, FleetCommand::OpenEditor(id));
    state.dispatch(
        &mut backend,
        FleetCommand::EditField(VehicleField::Brand, "Lexus".to_owned()),
    );
    // Row removed locally while the editor still holds its copy.
    state.store.remove(id);

    state.dispatch(&mut backend, FleetCommand::Update);
    assert!(state.store.is_empty());
    assert_eq!(state.session.state(), SessionState::OpenClean);
}

#[test]
fn search_then_select_all_only_touches_visible_rows() {
    let mut backend = FakeBackend::new(vec![
        vehicle(1, "ABC123DEF45678901", "Toyota", "Camry", "P-1"),
        vehicle(2, "XYZ999QRS45678901", "Honda", "Civic", "P-2"),
    ]);
    let mut state = loaded(&mut backend);

    state.dispatch(&mut backend, FleetCommand::SetSearch("abc".to_owned()));
    assert_eq!(state.visible_ids(), vec![VehicleId::new(1)]);

    state.dispatch(&mut backend, FleetCommand::ToggleAllVisible);
    assert_eq!(state.selection.ids(), vec![VehicleId::new(1)]);

    state.dispatch(&mut backend, FleetCommand::ToggleAllVisible);
    assert!(state.selection.is_empty());
}

#[test]
fn create_then_delete_round_trip() {
    let mut backend = FakeBackend::new(Vec::new());
    let mut state = loaded(&mut backend);

    let events = state.dispatch(&mut backend, FleetCommand::CreateVehicle);
    let Some(FleetEvent::VehicleCreated(id)) = events.first().cloned() else {
        panic!("expected create event, got {events:?}");
    };
    assert_eq!(state.store.len(), 1);
    assert_eq!(backend.vehicles.len(), 1);

    state.dispatch(&mut backend, FleetCommand::DeleteVehicle(id));
    assert!(state.store.is_empty());
    assert!(backend.vehicles.is_empty());
}

#[test]
fn reload_drops_selection_for_vanished_rows() {
    let mut backend = FakeBackend::seeded(5, 4);
    let mut state = loaded(&mut backend);
    state.dispatch(&mut backend, FleetCommand::ToggleAllVisible);
    backend.vehicles.retain(|v| v.id != VehicleId::new(2));

    state.dispatch(&mut backend, FleetCommand::Reload);
    assert_eq!(state.store.len(), 3);
    assert_eq!(
        state.selection.ids(),
        vec![VehicleId::new(1), VehicleId::new(3), VehicleId::new(4)]
    );
}

#[test]
fn offline_backend_reports_actionable_status() {
    let mut backend = FakeBackend::seeded(5, 2);
    let mut state = loaded(&mut backend);
    backend.offline = true;

    state.dispatch(&mut backend, FleetCommand::CreateVehicle);
    assert_eq!(state.store.len(), 2);
    let status = state.status_line.clone().unwrap_or_default();
    assert!(status.contains("cannot reach"), "status {status}");
}
