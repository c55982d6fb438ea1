// src/app/controller.rs
//! Turns user actions into catalog and metadata calls.
//!
//! Every error ends up on the status line; the catalog stays as it was.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::form::MovieForm;
use super::types::{ControllerState, FetchMsg, FetchTarget, StatusKind, StatusLine, ViewFilter};
use crate::catalog::{Catalog, MovieRecord};
use crate::error::{Error, Result};
use crate::metadata::MetadataSource;

pub struct Controller {
    catalog: Catalog,
    fetcher: Arc<dyn MetadataSource>,

    pub form: MovieForm,
    pub filter: ViewFilter,
    editing: Option<usize>,
    status: Option<StatusLine>,

    // Some while a lookup is in flight; at most one at a time.
    fetch_rx: Option<Receiver<FetchMsg>>,
}

impl Controller {
    pub fn new(catalog: Catalog, fetcher: Arc<dyn MetadataSource>) -> Self {
        Self {
            catalog,
            fetcher,
            form: MovieForm::default(),
            filter: ViewFilter::default(),
            editing: None,
            status: None,
            fetch_rx: None,
        }
    }

    // ---- read side ----
    pub fn records(&self) -> &[MovieRecord] {
        self.catalog.records()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> ControllerState {
        if self.fetch_rx.is_some() {
            ControllerState::Busy
        } else {
            ControllerState::Idle
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state() == ControllerState::Busy
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// Catalog indices that pass the current filter, in catalog order.
    pub fn visible_rows(&self) -> Vec<usize> {
        let needle = self.filter.search.trim().to_lowercase();
        self.catalog
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| !(self.filter.unwatched_only && r.watched))
            .filter(|(_, r)| needle.is_empty() || r.title.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    // ---- status ----
    fn set_info<S: Into<String>>(&mut self, s: S) {
        let text = s.into();
        debug!("status: {text}");
        self.status = Some(StatusLine {
            kind: StatusKind::Info,
            text,
        });
    }

    fn set_error(&mut self, err: &Error) {
        warn!("action failed: {err}");
        self.status = Some(StatusLine {
            kind: StatusKind::Error,
            text: err.to_string(),
        });
    }

    fn report<T>(&mut self, res: Result<T>) -> Option<T> {
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                self.set_error(&e);
                None
            }
        }
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ---- form actions ----

    /// Add the form as a new movie, or save it over the row being edited.
    pub fn submit_form(&mut self) -> bool {
        let parsed = self.form.to_record();
        let Some(rec) = self.report(parsed) else {
            return false;
        };
        let label = rec.display_title();
        let res = match self.editing {
            Some(idx) => self.catalog.update(idx, rec),
            None => self.catalog.add(rec).map(|_| ()),
        };
        if self.report(res).is_none() {
            return false;
        }
        let verb = if self.editing.is_some() { "Updated" } else { "Added" };
        self.form.clear();
        self.editing = None;
        self.set_info(format!("{verb} {label}."));
        true
    }

    pub fn begin_edit(&mut self, index: usize) -> bool {
        let len = self.catalog.len();
        let Some(rec) = self.catalog.get(index) else {
            self.set_error(&Error::Index { index, len });
            return false;
        };
        let label = rec.display_title();
        self.form = MovieForm::from_record(rec);
        self.editing = Some(index);
        self.set_info(format!("Editing {label}."));
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form.clear();
    }

    // ---- row actions ----
    pub fn delete(&mut self, index: usize) -> bool {
        let res = self.catalog.remove(index);
        let Some(removed) = self.report(res) else {
            return false;
        };
        match self.editing {
            Some(e) if e == index => self.cancel_edit(),
            Some(e) if e > index => self.editing = Some(e - 1),
            _ => {}
        }
        self.set_info(format!("Deleted {}.", removed.display_title()));
        true
    }

    pub fn toggle_watched(&mut self, index: usize) -> bool {
        let res = self.catalog.toggle_watched(index);
        let Some(now) = self.report(res) else {
            return false;
        };
        if self.editing == Some(index) {
            self.form.watched = now;
        }
        true
    }

    /// Re-read the catalog file, discarding nothing on failure.
    pub fn reload(&mut self) -> bool {
        let res = self.catalog.reload();
        if self.report(res).is_none() {
            return false;
        }
        self.editing = None;
        self.set_info(format!(
            "Reloaded {} movie(s) from {}.",
            self.catalog.len(),
            self.catalog.location()
        ));
        true
    }

    // ---- lookups ----

    /// Start a lookup on a worker thread. Refused while another is in flight.
    pub fn request_fetch(&mut self, target: FetchTarget) -> bool {
        if self.is_busy() {
            self.set_info("A lookup is already running.");
            return false;
        }

        let title = match &target {
            FetchTarget::Form { title, .. } | FetchTarget::Row { title, .. } => {
                title.trim().to_string()
            }
        };
        if title.is_empty() {
            self.set_error(&Error::validation("Please enter a movie title first."));
            return false;
        }

        let (tx, rx) = mpsc::channel::<FetchMsg>();
        let fetcher = Arc::clone(&self.fetcher);
        let worker_title = title.clone();
        let spawned = std::thread::Builder::new()
            .name("metadata-fetch".into())
            .spawn(move || {
                let result = fetcher.fetch_by_title(&worker_title);
                let _ = tx.send(FetchMsg { target, result });
            });
        if let Err(e) = spawned {
            error!("failed to start lookup worker: {e}");
            self.set_error(&Error::network(format!("could not start lookup: {e}")));
            return false;
        }

        self.fetch_rx = Some(rx);
        self.set_info(format!("Looking up \"{title}\"…"));
        true
    }

    /// Look up the form's title; the result fills the form only if it is
    /// still on the same row and title when the reply arrives.
    pub fn request_form_fetch(&mut self) -> bool {
        let target = FetchTarget::Form {
            editing: self.editing,
            title: self.form.title.trim().to_string(),
        };
        self.request_fetch(target)
    }

    /// Look up the title currently held by row `index`.
    pub fn request_row_fetch(&mut self, index: usize) -> bool {
        let len = self.catalog.len();
        let Some(title) = self.catalog.get(index).map(|r| r.title.clone()) else {
            self.set_error(&Error::Index { index, len });
            return false;
        };
        self.request_fetch(FetchTarget::Row { index, title })
    }

    /// Apply a finished lookup, if any. Returns true when one was handled.
    pub fn poll_fetch(&mut self) -> bool {
        let Some(rx) = &self.fetch_rx else {
            return false;
        };
        match rx.try_recv() {
            Ok(msg) => {
                self.fetch_rx = None;
                self.apply_fetch(msg);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.fetch_rx = None;
                self.set_error(&Error::network("lookup worker stopped unexpectedly"));
                true
            }
        }
    }

    fn apply_fetch(&mut self, msg: FetchMsg) {
        let meta = match msg.result {
            Ok(m) => m,
            Err(e) => {
                self.set_error(&e);
                return;
            }
        };

        match msg.target {
            FetchTarget::Form { editing, title } => {
                if self.editing != editing || self.form.title.trim() != title {
                    info!("form moved on during lookup of `{title}`; dropping result");
                    self.set_error(&Error::validation(format!(
                        "The form changed while \"{title}\" was loading; nothing was filled in."
                    )));
                    return;
                }
                self.form.fill_from(&meta);
                let shown = self.form.title.clone();
                self.set_info(format!("Fetched details for \"{shown}\"."));
            }
            FetchTarget::Row { index, title } => {
                let Some(mut rec) = self
                    .catalog
                    .get(index)
                    .filter(|r| r.title == title)
                    .cloned()
                else {
                    info!("row {index} changed during lookup of `{title}`; dropping result");
                    self.set_error(&Error::validation(format!(
                        "\"{title}\" changed while its details were loading; nothing was updated."
                    )));
                    return;
                };
                meta.apply_to(&mut rec);
                let label = rec.display_title();
                let res = self.catalog.update(index, rec);
                if self.report(res).is_some() {
                    self.set_info(format!("Updated {label} from OMDb."));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CsvStore;
    use crate::metadata::FetchedMetadata;
    use crate::app::types::RowAction;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeSource(Box<dyn Fn(&str) -> Result<FetchedMetadata> + Send + Sync>);

    impl MetadataSource for FakeSource {
        fn fetch_by_title(&self, title: &str) -> Result<FetchedMetadata> {
            (self.0)(title)
        }
    }

    /// Holds every lookup until the test sends on the gate.
    struct GatedSource(Mutex<mpsc::Receiver<()>>);

    impl MetadataSource for GatedSource {
        fn fetch_by_title(&self, _title: &str) -> Result<FetchedMetadata> {
            let _ = self.0.lock().map(|rx| rx.recv());
            Ok(FetchedMetadata::default())
        }
    }

    fn dune_meta(_: &str) -> Result<FetchedMetadata> {
        Ok(FetchedMetadata {
            title: Some("Dune".into()),
            year: Some(2021),
            genre: Some("Action, Adventure, Drama".into()),
            rating: Some(8.0),
        })
    }

    fn controller_with(
        csv: &str,
        source: Arc<dyn MetadataSource>,
    ) -> (tempfile::TempDir, Controller) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, csv).unwrap();
        let catalog = Catalog::open(Box::new(CsvStore::new(path))).unwrap();
        (dir, Controller::new(catalog, source))
    }

    fn sample() -> &'static str {
        "title,year,genre,rating,watched\n\
         Inception,2010,Sci-Fi,8.8,true\n\
         dune,,,,false\n"
    }

    fn wait_for_fetch(ctrl: &mut Controller) {
        for _ in 0..500 {
            if ctrl.poll_fetch() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("lookup never finished");
    }

    fn last_status(ctrl: &Controller) -> StatusLine {
        ctrl.status().cloned().unwrap()
    }

    #[test]
    fn add_via_form_clears_it_and_persists() {
        let (dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        ctrl.form.title = "Heat".into();
        ctrl.form.year = "1995".into();
        assert!(ctrl.submit_form());
        assert_eq!(ctrl.form, MovieForm::default());
        assert_eq!(ctrl.records().len(), 3);
        let text = fs::read_to_string(dir.path().join("movies.csv")).unwrap();
        assert!(text.contains("Heat,1995,,,false"));
    }

    #[test]
    fn invalid_form_reports_and_keeps_catalog() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        ctrl.form.title = "Heat".into();
        ctrl.form.rating = "12".into();
        assert!(!ctrl.submit_form());
        assert_eq!(ctrl.records().len(), 2);
        assert_eq!(ctrl.form.title, "Heat");
        let st = last_status(&ctrl);
        assert_eq!(st.kind, StatusKind::Error);
        assert_eq!(st.text, "Rating must be <= 10.");
    }

    #[test]
    fn edit_round_trip() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert!(ctrl.begin_edit(0));
        assert_eq!(ctrl.form.title, "Inception");
        ctrl.form.rating = "9".into();
        assert!(ctrl.submit_form());
        assert_eq!(ctrl.editing(), None);
        assert_eq!(ctrl.records()[0].rating, Some(9.0));
        assert_eq!(ctrl.records().len(), 2);
    }

    #[test]
    fn delete_and_toggle_report_bad_rows() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert!(!ctrl.delete(7));
        assert_eq!(last_status(&ctrl).kind, StatusKind::Error);
        assert!(!ctrl.toggle_watched(2));
        assert!(ctrl.toggle_watched(1));
        assert!(ctrl.records()[1].watched);
        assert!(ctrl.delete(0));
        assert_eq!(ctrl.records().len(), 1);
    }

    #[test]
    fn delete_shifts_edit_target() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        ctrl.begin_edit(1);
        ctrl.delete(0);
        assert_eq!(ctrl.editing(), Some(0));
        ctrl.delete(0);
        assert_eq!(ctrl.editing(), None);
        assert_eq!(ctrl.form, MovieForm::default());
    }

    #[test]
    fn form_fetch_fills_fields_only() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        let before = ctrl.records().to_vec();
        ctrl.form.title = "dune".into();
        assert!(ctrl.request_form_fetch());
        assert_eq!(ctrl.state(), ControllerState::Busy);
        wait_for_fetch(&mut ctrl);
        assert_eq!(ctrl.state(), ControllerState::Idle);
        assert_eq!(ctrl.form.title, "Dune");
        assert_eq!(ctrl.form.year, "2021");
        assert_eq!(ctrl.form.rating, "8");
        assert_eq!(ctrl.records(), before.as_slice());
    }

    #[test]
    fn row_fetch_enriches_in_place() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert!(ctrl.request_row_fetch(1));
        wait_for_fetch(&mut ctrl);
        let rec = &ctrl.records()[1];
        assert_eq!(rec.title, "dune");
        assert_eq!(rec.year, Some(2021));
        assert_eq!(rec.rating, Some(8.0));
        assert!(!rec.watched);
    }

    #[test]
    fn not_found_leaves_catalog_untouched() {
        let (dir, mut ctrl) = controller_with(
            sample(),
            Arc::new(FakeSource(Box::new(|t: &str| -> Result<FetchedMetadata> {
                Err(Error::NotFound(t.to_string()))
            }))),
        );
        let path = dir.path().join("movies.csv");
        let before_mem = ctrl.records().to_vec();
        let before_disk = fs::read_to_string(&path).unwrap();

        assert!(ctrl.request_row_fetch(1));
        wait_for_fetch(&mut ctrl);

        assert_eq!(ctrl.records(), before_mem.as_slice());
        assert_eq!(fs::read_to_string(&path).unwrap(), before_disk);
        let st = last_status(&ctrl);
        assert_eq!(st.kind, StatusKind::Error);
        assert!(st.text.contains("not found"));
        assert_eq!(ctrl.state(), ControllerState::Idle);
    }

    #[test]
    fn config_error_is_surfaced() {
        let (_dir, mut ctrl) = controller_with(
            sample(),
            Arc::new(FakeSource(Box::new(|_: &str| -> Result<FetchedMetadata> {
                Err(Error::Config("no key".into()))
            }))),
        );
        ctrl.form.title = "Heat".into();
        ctrl.request_form_fetch();
        wait_for_fetch(&mut ctrl);
        assert_eq!(ctrl.form.title, "Heat");
        assert!(last_status(&ctrl).text.starts_with("Configuration error"));
    }

    #[test]
    fn only_one_lookup_in_flight() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (_dir, mut ctrl) =
            controller_with(sample(), Arc::new(GatedSource(Mutex::new(gate_rx))));
        ctrl.form.title = "Heat".into();
        assert!(ctrl.request_form_fetch());
        assert!(!ctrl.request_form_fetch());
        assert!(!ctrl.request_row_fetch(0));
        assert!(ctrl.is_busy());
        gate_tx.send(()).unwrap();
        wait_for_fetch(&mut ctrl);
        assert!(!ctrl.is_busy());
    }

    #[test]
    fn stale_row_result_is_dropped() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (_dir, mut ctrl) =
            controller_with(sample(), Arc::new(GatedSource(Mutex::new(gate_rx))));
        assert!(ctrl.request_row_fetch(1));
        ctrl.delete(0);
        gate_tx.send(()).unwrap();
        wait_for_fetch(&mut ctrl);
        assert_eq!(ctrl.records().len(), 1);
        assert_eq!(ctrl.records()[0].title, "dune");
        assert_eq!(ctrl.records()[0].year, None);
        assert_eq!(last_status(&ctrl).kind, StatusKind::Error);
    }

    #[test]
    fn form_result_is_dropped_after_switching_rows() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (_dir, mut ctrl) =
            controller_with(sample(), Arc::new(GatedSource(Mutex::new(gate_rx))));
        ctrl.form.title = "Heat".into();
        assert!(ctrl.request_form_fetch());
        assert!(ctrl.begin_edit(0));
        gate_tx.send(()).unwrap();
        wait_for_fetch(&mut ctrl);

        assert_eq!(ctrl.form.title, "Inception");
        assert_eq!(ctrl.form.year, "2010");
        assert_eq!(last_status(&ctrl).kind, StatusKind::Error);
        assert!(ctrl.submit_form());
        assert_eq!(ctrl.records()[0].title, "Inception");
        assert_eq!(ctrl.records()[0].year, Some(2010));
        assert_eq!(ctrl.records().len(), 2);
    }

    #[test]
    fn form_result_is_dropped_after_retyping_title() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (_dir, mut ctrl) =
            controller_with(sample(), Arc::new(GatedSource(Mutex::new(gate_rx))));
        ctrl.form.title = "Heat".into();
        ctrl.form.year = "1995".into();
        assert!(ctrl.request_form_fetch());
        ctrl.form.title = "Ronin".into();
        gate_tx.send(()).unwrap();
        wait_for_fetch(&mut ctrl);
        assert_eq!(ctrl.form.title, "Ronin");
        assert_eq!(ctrl.form.year, "1995");
        assert_eq!(last_status(&ctrl).kind, StatusKind::Error);
    }

    #[test]
    fn status_can_be_dismissed() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert!(!ctrl.delete(9));
        assert_eq!(last_status(&ctrl).kind, StatusKind::Error);
        ctrl.clear_status();
        assert_eq!(ctrl.status(), None);
    }

    #[test]
    fn empty_title_never_starts_lookup() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert!(!ctrl.request_form_fetch());
        assert!(!ctrl.is_busy());
        assert_eq!(last_status(&ctrl).text, "Please enter a movie title first.");
    }

    #[test]
    fn filters_project_indices() {
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        assert_eq!(ctrl.visible_rows(), vec![0, 1]);
        ctrl.filter.unwatched_only = true;
        assert_eq!(ctrl.visible_rows(), vec![1]);
        ctrl.filter.unwatched_only = false;
        ctrl.filter.search = "INCEP".into();
        assert_eq!(ctrl.visible_rows(), vec![0]);
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let (dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        fs::write(
            dir.path().join("movies.csv"),
            "title,year,genre,rating,watched\nAlien,1979,Horror,8.5,1\n",
        )
        .unwrap();
        assert!(ctrl.reload());
        assert_eq!(ctrl.records().len(), 1);

        fs::write(dir.path().join("movies.csv"), "title\n\"unterminated").unwrap();
        assert!(!ctrl.reload());
        assert_eq!(ctrl.records()[0].title, "Alien");
    }

    #[test]
    fn row_actions_are_plain_indices() {
        // RowAction carries catalog indices, not positions in the filtered view.
        let (_dir, mut ctrl) = controller_with(sample(), Arc::new(FakeSource(Box::new(dune_meta))));
        ctrl.filter.unwatched_only = true;
        let visible = ctrl.visible_rows();
        let action = RowAction::ToggleWatched(visible[0]);
        if let RowAction::ToggleWatched(i) = action {
            assert!(ctrl.toggle_watched(i));
        }
        assert!(ctrl.records()[1].watched);
    }
}
