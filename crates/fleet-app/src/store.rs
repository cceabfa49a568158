// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Vehicle, VehicleId};

/// In-memory copy of the server's vehicle list, kept in insertion order.
///
/// Callers only mutate it after the server has confirmed the matching
/// request. Mutations that target an id no longer present are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VehicleStore {
    vehicles: Vec<Vehicle>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole set with a fresh fetch. No merge with prior
    /// contents.
    pub fn replace_all(&mut self, vehicles: Vec<Vehicle>) {
        self.vehicles = vehicles;
    }

    pub fn add(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }

    /// Returns false when `id` is not in the store.
    pub fn apply_update(&mut self, id: VehicleId, updated: &Vehicle) -> bool {
        match self.vehicles.iter_mut().find(|vehicle| vehicle.id == id) {
            Some(existing) => {
                existing.assign_fields(updated);
                true
            }
            None => false,
        }
    }

    /// Returns false when `id` is not in the store.
    pub fn remove(&mut self, id: VehicleId) -> bool {
        let before = self.vehicles.len();
        self.vehicles.retain(|vehicle| vehicle.id != id);
        self.vehicles.len() != before
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.id == id)
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.get(id).is_some()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
