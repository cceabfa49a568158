// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{SortDirection, SortSpec, Vehicle};

/// Case-insensitive substring match over VIN, license plate, model name,
/// brand and the serialized equipment text. An empty search matches
/// everything.
pub fn matches_search(vehicle: &Vehicle, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    [
        vehicle.vin.as_str(),
        vehicle.license_plate_number.as_str(),
        vehicle.model_name.as_str(),
        vehicle.brand.as_str(),
    ]
    .into_iter()
    .any(|field| field.to_lowercase().contains(&needle))
        || vehicle.equipment_text().to_lowercase().contains(&needle)
}

pub fn filter_vehicles<'a>(vehicles: &'a [Vehicle], search: &str) -> Vec<&'a Vehicle> {
    vehicles
        .iter()
        .filter(|vehicle| matches_search(vehicle, search))
        .collect()
}

/// Stable sort, so equal keys keep store order.
pub fn sort_vehicles(rows: &mut [&Vehicle], sort: Option<SortSpec>) {
    let Some(spec) = sort else {
        return;
    };
    rows.sort_by(|left, right| {
        let ordering = compare_text(spec.key.value(left), spec.key.value(right));
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn visible_vehicles<'a>(
    vehicles: &'a [Vehicle],
    search: &str,
    sort: Option<SortSpec>,
) -> Vec<&'a Vehicle> {
    let mut rows = filter_vehicles(vehicles, search);
    sort_vehicles(&mut rows, sort);
    rows
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}
