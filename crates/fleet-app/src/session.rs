// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{Vehicle, VehicleDraft, VehicleField, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Closed,
    OpenClean,
    OpenDirty,
    ConfirmingDiscard,
}

impl SessionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::OpenClean => "open",
            Self::OpenDirty => "unsaved changes",
            Self::ConfirmingDiscard => "confirm discard",
        }
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenEditor {
    working: Vehicle,
    snapshot: Vehicle,
    confirming_discard: bool,
}

/// Details-drawer editing of one vehicle at a time.
///
/// The working copy is a private clone of the store entry; it only flows
/// back to the store through a confirmed update. Clean versus dirty is
/// derived from comparing the working copy with the snapshot on every
/// read, so there is no flag to fall out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditSession {
    open: Option<OpenEditor>,
}

impl EditSession {
    pub fn state(&self) -> SessionState {
        match &self.open {
            None => SessionState::Closed,
            Some(editor) if editor.confirming_discard => SessionState::ConfirmingDiscard,
            Some(editor) if editor.working != editor.snapshot => SessionState::OpenDirty,
            Some(_) => SessionState::OpenClean,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.open
            .as_ref()
            .is_some_and(|editor| editor.working != editor.snapshot)
    }

    pub fn vehicle_id(&self) -> Option<VehicleId> {
        self.open.as_ref().map(|editor| editor.working.id)
    }

    pub fn working(&self) -> Option<&Vehicle> {
        self.open.as_ref().map(|editor| &editor.working)
    }

    pub fn snapshot(&self) -> Option<&Vehicle> {
        self.open.as_ref().map(|editor| &editor.snapshot)
    }

    /// Starts editing a copy of `vehicle`. Any previous session is
    /// replaced without a prompt.
    pub fn open(&mut self, vehicle: &Vehicle) {
        self.open = Some(OpenEditor {
            working: vehicle.clone(),
            snapshot: vehicle.clone(),
            confirming_discard: false,
        });
    }

    /// Returns false when no editable session is open.
    pub fn edit_field(&mut self, field: VehicleField, value: String) -> bool {
        match self.editable() {
            Some(editor) => {
                editor.working.set_field(field, value);
                true
            }
            None => false,
        }
    }

    /// Appends a tag; duplicates are kept. Blank values are rejected.
    pub fn add_tag(&mut self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        match self.editable() {
            Some(editor) => {
                editor.working.equipment.push(value.to_owned());
                true
            }
            None => false,
        }
    }

    /// Removes the first tag equal to `value`.
    pub fn remove_tag(&mut self, value: &str) -> bool {
        let Some(editor) = self.editable() else {
            return false;
        };
        match editor.working.equipment.iter().position(|tag| tag == value) {
            Some(index) => {
                editor.working.equipment.remove(index);
                true
            }
            None => false,
        }
    }

    /// Closes a clean session outright; a dirty one moves to the discard
    /// prompt instead.
    pub fn request_close(&mut self) -> SessionState {
        match self.state() {
            SessionState::OpenClean => self.open = None,
            SessionState::OpenDirty => {
                if let Some(editor) = self.open.as_mut() {
                    editor.confirming_discard = true;
                }
            }
            SessionState::Closed | SessionState::ConfirmingDiscard => {}
        }
        self.state()
    }

    pub fn keep_editing(&mut self) -> SessionState {
        if let Some(editor) = self.open.as_mut() {
            editor.confirming_discard = false;
        }
        self.state()
    }

    /// Reverts the working copy to the snapshot and closes.
    pub fn discard(&mut self) {
        if let Some(editor) = self.open.as_mut() {
            editor.working = editor.snapshot.clone();
        }
        self.open = None;
    }

    /// The id and body to send for an update, if a session is open.
    pub fn pending_update(&self) -> Option<(VehicleId, VehicleDraft)> {
        self.open
            .as_ref()
            .map(|editor| (editor.working.id, editor.working.draft()))
    }

    /// Records a confirmed save of `saved`: the snapshot becomes the
    /// working copy as it was sent. Edits made after `saved` was captured
    /// stay dirty.
    pub fn mark_saved(&mut self, saved: &Vehicle) {
        if let Some(editor) = self.open.as_mut()
            && editor.working.id == saved.id
        {
            editor.snapshot = saved.clone();
            editor.confirming_discard = false;
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    fn editable(&mut self) -> Option<&mut OpenEditor> {
        self.open
            .as_mut()
            .filter(|editor| !editor.confirming_discard)
    }
}
