// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use fleet_app::{
    BackendError, FleetBackend, Vehicle, VehicleDraft, VehicleId, decode_equipment,
    encode_equipment,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the vehicle REST resource rooted at `base_url`
/// (for example `http://localhost:5000/api/vehicles`).
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("server.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?}",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks that the server answers its greeting route.
    pub fn ping(&self) -> Result<()> {
        let response = self.send("ping", self.http.get(self.url("hello")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body).into());
        }
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Vehicle>, BackendError> {
        let response = self.send("list", self.http.get(self.url("all")))?;
        let response = expect_status(response, "list vehicles", StatusCode::OK, None)?;
        let wire: Vec<WireVehicle> = read_json(response, "vehicle list")?;
        wire.into_iter().map(WireVehicle::into_vehicle).collect()
    }

    pub fn get(&self, id: VehicleId) -> Result<Vehicle, BackendError> {
        let response = self.send("get", self.http.get(self.url(&format!("get/{id}"))))?;
        let response = expect_status(response, "get vehicle", StatusCode::OK, Some(id))?;
        read_json::<WireVehicle>(response, "vehicle")?.into_vehicle()
    }

    /// Sends the draft and returns the created row with its assigned id.
    /// Only `201 Created` counts as success.
    pub fn create(&self, draft: &VehicleDraft) -> Result<Vehicle, BackendError> {
        let body = WireDraft::from(draft);
        let response = self.send("create", self.http.post(self.url("create")).json(&body))?;
        let response = expect_status(response, "create vehicle", StatusCode::CREATED, None)?;
        read_json::<WireVehicle>(response, "created vehicle")?.into_vehicle()
    }

    pub fn update(&self, id: VehicleId, draft: &VehicleDraft) -> Result<Vehicle, BackendError> {
        let body = WireDraft::from(draft);
        let request = self.http.put(self.url(&format!("update/{id}"))).json(&body);
        let response = self.send("update", request)?;
        let response = expect_status(response, "update vehicle", StatusCode::OK, Some(id))?;
        read_json::<WireVehicle>(response, "updated vehicle")?.into_vehicle()
    }

    /// Only `204 No Content` counts as success.
    pub fn delete(&self, id: VehicleId) -> Result<(), BackendError> {
        let request = self.http.delete(self.url(&format!("delete/{id}")));
        let response = self.send("delete", request)?;
        expect_status(response, "delete vehicle", StatusCode::NO_CONTENT, Some(id))?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, &error))?;
        debug!(operation, status = response.status().as_u16(), "fleet server responded");
        Ok(response)
    }
}

impl FleetBackend for Client {
    fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, BackendError> {
        self.list()
    }

    fn get_vehicle(&mut self, id: VehicleId) -> Result<Vehicle, BackendError> {
        self.get(id)
    }

    fn create_vehicle(&mut self, draft: &VehicleDraft) -> Result<Vehicle, BackendError> {
        self.create(draft)
    }

    fn update_vehicle(
        &mut self,
        id: VehicleId,
        draft: &VehicleDraft,
    ) -> Result<Vehicle, BackendError> {
        self.update(id, draft)
    }

    fn delete_vehicle(&mut self, id: VehicleId) -> Result<(), BackendError> {
        self.delete(id)
    }
}

/// Passes the response through when it carries `expected`. A 404 for an
/// id-addressed route becomes [`BackendError::NotFound`]; other 2xx codes
/// are reported as unexpected.
fn expect_status(
    response: Response,
    operation: &'static str,
    expected: StatusCode,
    id: Option<VehicleId>,
) -> Result<Response, BackendError> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return Err(BackendError::NotFound(id));
    }
    if status.is_success() {
        return Err(BackendError::UnexpectedStatus {
            operation,
            status: status.as_u16(),
            expected: expected.as_u16(),
        });
    }
    let body = response.text().unwrap_or_default();
    Err(clean_error_response(status, &body))
}

fn read_json<T: DeserializeOwned>(response: Response, what: &'static str) -> Result<T, BackendError> {
    let body = response.text().map_err(|error| BackendError::Decode {
        what,
        message: error.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|error| BackendError::Decode {
        what,
        message: error.to_string(),
    })
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> BackendError {
    BackendError::Transport {
        base_url: base_url.to_owned(),
        message: error.to_string(),
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> BackendError {
    if let Ok(parsed) = serde_json::from_str::<ProblemDetails>(body)
        && let Some(title) = parsed.title
        && !title.is_empty()
    {
        return BackendError::Status {
            status: status.as_u16(),
            message: title,
        };
    }

    let trimmed = body.trim();
    let message = if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        trimmed.to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_owned()
    };
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

/// ASP.NET style error body; only the title is surfaced.
#[derive(Debug, Deserialize)]
struct ProblemDetails {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireVehicle {
    id: i64,
    #[serde(default)]
    vin: Option<String>,
    #[serde(default)]
    license_plate_number: Option<String>,
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default, alias = "equipment")]
    vehicle_equipment: Option<String>,
}

impl WireVehicle {
    fn into_vehicle(self) -> Result<Vehicle, BackendError> {
        let equipment = match self.vehicle_equipment.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(raw) => decode_equipment(raw).map_err(|error| BackendError::Decode {
                what: "vehicle equipment",
                message: format!("vehicle {}: {error}", self.id),
            })?,
        };
        Ok(Vehicle {
            id: VehicleId::new(self.id),
            vin: self.vin.unwrap_or_default(),
            license_plate_number: self.license_plate_number.unwrap_or_default(),
            model_name: self.model_name.unwrap_or_default(),
            brand: self.brand.unwrap_or_default(),
            equipment,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDraft<'a> {
    vin: &'a str,
    license_plate_number: &'a str,
    model_name: &'a str,
    brand: &'a str,
    vehicle_equipment: String,
}

impl<'a> From<&'a VehicleDraft> for WireDraft<'a> {
    fn from(draft: &'a VehicleDraft) -> Self {
        Self {
            vin: &draft.vin,
            license_plate_number: &draft.license_plate_number,
            model_name: &draft.model_name,
            brand: &draft.brand,
            vehicle_equipment: encode_equipment(&draft.equipment),
        }
    }
}
