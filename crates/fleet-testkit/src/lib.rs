// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use fleet_app::{
    BackendError, FleetBackend, Vehicle, VehicleDraft, VehicleId, VinGenerator,
};

const BRANDS: [&str; 10] = [
    "Audi",
    "BMW",
    "Ford",
    "Honda",
    "Kia",
    "Mercedes",
    "Peugeot",
    "Skoda",
    "Toyota",
    "Volvo",
];

const MODELS: [&str; 12] = [
    "Astra", "Camry", "Civic", "Corolla", "Focus", "Golf", "Octavia", "Passat", "Polo", "Sportage",
    "Transit", "XC60",
];

const EQUIPMENT: [&str; 10] = [
    "GPS",
    "Sunroof",
    "Tow bar",
    "Heated seats",
    "Roof rack",
    "Dash cam",
    "Winter tires",
    "Parking sensors",
    "Cruise control",
    "First aid kit",
];

const PLATE_LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible fleet data for tests and demos.
#[derive(Debug, Clone)]
pub struct FleetFaker {
    rng: DeterministicRng,
    vins: VinGenerator,
}

impl FleetFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            vins: VinGenerator::new(normalized),
        }
    }

    pub fn draft(&mut self) -> VehicleDraft {
        let tag_count = self.rng.int_n(4);
        let mut equipment = Vec::with_capacity(tag_count);
        for _ in 0..tag_count {
            equipment.push(self.pick(&EQUIPMENT).to_owned());
        }
        VehicleDraft {
            vin: self.vins.generate(),
            license_plate_number: self.license_plate(),
            model_name: self.pick(&MODELS).to_owned(),
            brand: self.pick(&BRANDS).to_owned(),
            equipment,
        }
    }

    pub fn vehicle(&mut self, id: i64) -> Vehicle {
        self.draft().into_vehicle(VehicleId::new(id))
    }

    /// Vehicles with ids `1..=count`.
    pub fn fleet(&mut self, count: usize) -> Vec<Vehicle> {
        (1..=count as i64).map(|id| self.vehicle(id)).collect()
    }

    fn license_plate(&mut self) -> String {
        let letters: String = (0..3)
            .map(|_| char::from(PLATE_LETTERS[self.rng.int_n(PLATE_LETTERS.len())]))
            .collect();
        format!("{letters}-{:03}", self.rng.int_n(1_000))
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    List,
    Get(VehicleId),
    Create(VehicleDraft),
    Update(VehicleId, VehicleDraft),
    Delete(VehicleId),
}

/// In-memory server stand-in. Ids are assigned sequentially after the
/// highest seeded id. Individual operations can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub vehicles: Vec<Vehicle>,
    pub offline: bool,
    pub failing_deletes: BTreeSet<VehicleId>,
    pub failing_updates: BTreeSet<VehicleId>,
    calls: Vec<BackendCall>,
    next_id: i64,
}

impl FakeBackend {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        let next_id = vehicles.iter().map(|vehicle| vehicle.id.get()).max().unwrap_or(0);
        Self {
            vehicles,
            next_id,
            ..Self::default()
        }
    }

    pub fn seeded(seed: u64, count: usize) -> Self {
        Self::new(FleetFaker::new(seed).fleet(count))
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::Transport {
                base_url: "http://fleet.test/api/vehicles".to_owned(),
                message: "connection refused".to_owned(),
            });
        }
        Ok(())
    }
}

impl FleetBackend for FakeBackend {
    fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, BackendError> {
        self.calls.push(BackendCall::List);
        self.check_online()?;
        Ok(self.vehicles.clone())
    }

    fn get_vehicle(&mut self, id: VehicleId) -> Result<Vehicle, BackendError> {
        self.calls.push(BackendCall::Get(id));
        self.check_online()?;
        self.get(id).cloned().ok_or(BackendError::NotFound(id))
    }

    fn create_vehicle(&mut self, draft: &VehicleDraft) -> Result<Vehicle, BackendError> {
        self.calls.push(BackendCall::Create(draft.clone()));
        self.check_online()?;
        self.next_id += 1;
        let vehicle = draft.clone().into_vehicle(VehicleId::new(self.next_id));
        self.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    fn update_vehicle(
        &mut self,
        id: VehicleId,
        draft: &VehicleDraft,
    ) -> Result<Vehicle, BackendError> {
        self.calls.push(BackendCall::Update(id, draft.clone()));
        self.check_online()?;
        if self.failing_updates.contains(&id) {
            return Err(BackendError::Status {
                status: 500,
                message: "update rejected".to_owned(),
            });
        }
        let updated = draft.clone().into_vehicle(id);
        match self.vehicles.iter_mut().find(|vehicle| vehicle.id == id) {
            Some(existing) => {
                *existing = updated.clone();
                Ok(updated)
            }
            None => Err(BackendError::NotFound(id)),
        }
    }

    fn delete_vehicle(&mut self, id: VehicleId) -> Result<(), BackendError> {
        self.calls.push(BackendCall::Delete(id));
        self.check_online()?;
        if self.failing_deletes.contains(&id) {
            return Err(BackendError::Status {
                status: 500,
                message: "delete rejected".to_owned(),
            });
        }
        let before = self.vehicles.len();
        self.vehicles.retain(|vehicle| vehicle.id != id);
        if self.vehicles.len() == before {
            return Err(BackendError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendCall, FakeBackend, FleetFaker};
    use fleet_app::{BackendError, FleetBackend, VehicleDraft, VehicleId};

    #[test]
    fn new_deterministic_seed() {
        let mut left = FleetFaker::new(42);
        let mut right = FleetFaker::new(42);
        assert_eq!(left.fleet(5), right.fleet(5));
    }

    #[test]
    fn fleet_has_sequential_ids_and_valid_fields() {
        let vehicles = FleetFaker::new(3).fleet(20);
        for (index, vehicle) in vehicles.iter().enumerate() {
            assert_eq!(vehicle.id, VehicleId::new(index as i64 + 1));
            assert_eq!(vehicle.vin.len(), 17);
            assert!(!vehicle.brand.is_empty());
            assert!(!vehicle.model_name.is_empty());
            assert_eq!(vehicle.license_plate_number.len(), 7);
            assert!(vehicle.equipment.len() <= 3);
        }
    }

    #[test]
    fn create_assigns_ids_after_seeded_rows() {
        let mut backend = FakeBackend::seeded(1, 3);
        let created = backend
            .create_vehicle(&VehicleDraft::placeholder("VIN"))
            .expect("create");
        assert_eq!(created.id, VehicleId::new(4));
        assert_eq!(backend.vehicles.len(), 4);
    }

    #[test]
    fn delete_of_missing_vehicle_is_not_found() {
        let mut backend = FakeBackend::seeded(1, 2);
        backend.delete_vehicle(VehicleId::new(2)).expect("delete");
        let err = backend
            .delete_vehicle(VehicleId::new(2))
            .expect_err("second delete");
        assert!(err.is_not_found());
    }

    #[test]
    fn offline_backend_fails_every_call_and_records_it() {
        let mut backend = FakeBackend::seeded(1, 2);
        backend.offline = true;

        let err = backend.list_vehicles().expect_err("offline");
        assert!(matches!(err, BackendError::Transport { .. }));
        assert_eq!(backend.calls(), &[BackendCall::List]);
    }

    #[test]
    fn failing_delete_leaves_row_in_place() {
        let mut backend = FakeBackend::seeded(1, 2);
        backend.failing_deletes.insert(VehicleId::new(1));
        assert!(backend.delete_vehicle(VehicleId::new(1)).is_err());
        assert!(backend.get(VehicleId::new(1)).is_some());
    }
}
