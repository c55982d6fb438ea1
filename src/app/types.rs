// src/app/types.rs
use crate::error::Result;
use crate::metadata::FetchedMetadata;

// ---- controller state ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Busy, // a lookup is in flight
}

// ---- lookups ----
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchTarget {
    /// Populate the add/edit form; the catalog is not touched. `editing` and
    /// `title` are the form's edit slot and title when the lookup started.
    Form { editing: Option<usize>, title: String },
    /// Enrich an existing row. `title` is what the row held when the lookup started.
    Row { index: usize, title: String },
}

/// Sent back from the lookup worker.
pub struct FetchMsg {
    pub target: FetchTarget,
    pub result: Result<FetchedMetadata>,
}

// ---- status line ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

// ---- table ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    Edit(usize),
    Fetch(usize),
    Delete(usize),
    ToggleWatched(usize),
}

#[derive(Clone, Debug, Default)]
pub struct ViewFilter {
    pub unwatched_only: bool,
    pub search: String,
}
