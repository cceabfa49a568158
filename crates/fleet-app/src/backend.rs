// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{Vehicle, VehicleDraft, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("vehicle {0} not found")]
    NotFound(VehicleId),
    #[error("cannot reach {base_url} -- start the fleet server or fix [server].base_url ({message})")]
    Transport { base_url: String, message: String },
    #[error("server error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("{operation} returned status {status}; expected {expected}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        expected: u16,
    },
    #[error("decode {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// The CRUD surface of the vehicle server. Every call is one
/// request/response exchange; implementations never retry.
pub trait FleetBackend {
    fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, BackendError>;
    fn get_vehicle(&mut self, id: VehicleId) -> Result<Vehicle, BackendError>;
    fn create_vehicle(&mut self, draft: &VehicleDraft) -> Result<Vehicle, BackendError>;
    fn update_vehicle(
        &mut self,
        id: VehicleId,
        draft: &VehicleDraft,
    ) -> Result<Vehicle, BackendError>;
    fn delete_vehicle(&mut self, id: VehicleId) -> Result<(), BackendError>;
}
