// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::VehicleId;

pub const PLACEHOLDER_TEXT: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vin: String,
    pub license_plate_number: String,
    pub model_name: String,
    pub brand: String,
    pub equipment: Vec<String>,
}

/// Every field of a vehicle except its server-assigned id. This is what
/// create and update requests carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub vin: String,
    pub license_plate_number: String,
    pub model_name: String,
    pub brand: String,
    pub equipment: Vec<String>,
}

impl VehicleDraft {
    pub fn placeholder(vin: impl Into<String>) -> Self {
        Self {
            vin: vin.into(),
            license_plate_number: PLACEHOLDER_TEXT.to_owned(),
            model_name: PLACEHOLDER_TEXT.to_owned(),
            brand: PLACEHOLDER_TEXT.to_owned(),
            equipment: Vec::new(),
        }
    }

    pub fn into_vehicle(self, id: VehicleId) -> Vehicle {
        Vehicle {
            id,
            vin: self.vin,
            license_plate_number: self.license_plate_number,
            model_name: self.model_name,
            brand: self.brand,
            equipment: self.equipment,
        }
    }
}

impl Vehicle {
    pub fn draft(&self) -> VehicleDraft {
        VehicleDraft {
            vin: self.vin.clone(),
            license_plate_number: self.license_plate_number.clone(),
            model_name: self.model_name.clone(),
            brand: self.brand.clone(),
            equipment: self.equipment.clone(),
        }
    }

    /// Copies every field except `id` from `other`.
    pub fn assign_fields(&mut self, other: &Vehicle) {
        self.vin.clone_from(&other.vin);
        self.license_plate_number
            .clone_from(&other.license_plate_number);
        self.model_name.clone_from(&other.model_name);
        self.brand.clone_from(&other.brand);
        self.equipment.clone_from(&other.equipment);
    }

    pub fn field(&self, field: VehicleField) -> &str {
        match field {
            VehicleField::Brand => &self.brand,
            VehicleField::ModelName => &self.model_name,
            VehicleField::Vin => &self.vin,
            VehicleField::LicensePlateNumber => &self.license_plate_number,
        }
    }

    pub fn set_field(&mut self, field: VehicleField, value: String) {
        match field {
            VehicleField::Brand => self.brand = value,
            VehicleField::ModelName => self.model_name = value,
            VehicleField::Vin => self.vin = value,
            VehicleField::LicensePlateNumber => self.license_plate_number = value,
        }
    }

    pub fn equipment_text(&self) -> String {
        encode_equipment(&self.equipment)
    }
}

/// Text fields editable in the details form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleField {
    Brand,
    ModelName,
    Vin,
    LicensePlateNumber,
}

impl VehicleField {
    pub const ALL: [Self; 4] = [
        Self::Brand,
        Self::ModelName,
        Self::Vin,
        Self::LicensePlateNumber,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::ModelName => "model name",
            Self::Vin => "VIN",
            Self::LicensePlateNumber => "license plate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Vin,
    Brand,
    ModelName,
    LicensePlateNumber,
}

impl SortKey {
    pub const ALL: [Self; 4] = [
        Self::Vin,
        Self::Brand,
        Self::ModelName,
        Self::LicensePlateNumber,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Vin => "VIN",
            Self::Brand => "brand",
            Self::ModelName => "model name",
            Self::LicensePlateNumber => "license plate",
        }
    }

    pub fn value(self, vehicle: &Vehicle) -> &str {
        match self {
            Self::Vin => &vehicle.vin,
            Self::Brand => &vehicle.brand,
            Self::ModelName => &vehicle.model_name,
            Self::LicensePlateNumber => &vehicle.license_plate_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Walks asc -> desc -> next key asc, ending with no sort after the
    /// last key's descending step.
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        let Some(current) = current else {
            return Some(Self::asc(SortKey::ALL[0]));
        };
        if current.direction == SortDirection::Asc {
            return Some(Self::desc(current.key));
        }
        let index = SortKey::ALL
            .iter()
            .position(|key| *key == current.key)
            .unwrap_or(0);
        SortKey::ALL.get(index + 1).copied().map(Self::asc)
    }
}

/// Serializes equipment to the JSON array text the backend stores.
pub fn encode_equipment(equipment: &[String]) -> String {
    serde_json::Value::from(equipment.to_vec()).to_string()
}

pub fn decode_equipment(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn equipment_summary(equipment: &[String]) -> String {
    match equipment.len() {
        0 => PLACEHOLDER_TEXT.to_owned(),
        count => format!("{count} features"),
    }
}
