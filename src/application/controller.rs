// Dashboard controller - Selection state and page flow for one session
use crate::application::rate_store::{RateStore, StoreError};
use crate::application::series_generator::{create_timeseries, hourly, GeneratorError, WaveParams};
use crate::domain::chart::{ChartData, ChartKind};
use crate::domain::dashboard::{
    DashboardView, MainPageView, PageView, PairManagerView, SelectionState,
};
use crate::domain::page::Page;
use crate::domain::pair::{is_valid_pair_name, Pair};
use crate::infrastructure::config::DashboardSettings;
use crate::infrastructure::csv_import::{read_series, ImportError};
use chrono::{DateTime, Local, Months, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use std::io::Read;
use std::sync::{Arc, LazyLock};

pub const DEMO_PAIR_NAME: &str = "XYZ/FKE";
const DEMO_PAIR_DESCRIPTION: &str = "Predefined test pair";

pub const MSG_PAIR_ADDED: &str = "Pair added";
pub const MSG_PAIR_NOT_ADDED: &str = "Pair not added";
pub const MSG_VALIDATION_ERROR: &str = "Data validation error";
const NO_VALUES_NOTICE: &str = "No values in selected pair";

static DEMO_START: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(2022, 1, 2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("demo start is a valid date")
});
static DEMO_END: LazyLock<NaiveDateTime> = LazyLock::new(|| {
    NaiveDate::from_ymd_opt(2022, 1, 7)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("demo end is a valid date")
});
static EPOCH: LazyLock<NaiveDateTime> = LazyLock::new(|| DateTime::<Utc>::UNIX_EPOCH.naive_utc());

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Choices made in the control panel. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionUpdate {
    pub pair: Option<String>,
    pub chart_kind: Option<ChartKind>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub page: Option<Page>,
}

pub struct DashboardController {
    store: Arc<dyn RateStore>,
    selection: SelectionState,
    message: Option<String>,
}

impl DashboardController {
    pub fn new(
        store: Arc<dyn RateStore>,
        settings: &DashboardSettings,
    ) -> Result<Self, ControllerError> {
        let now = Local::now().naive_local();
        Self::new_at(store, settings, now)
    }

    /// Selects the first stored pair (if any) and a window of
    /// `lookback_years` ending at `now`.
    pub fn new_at(
        store: Arc<dyn RateStore>,
        settings: &DashboardSettings,
        now: NaiveDateTime,
    ) -> Result<Self, ControllerError> {
        let start = now
            .checked_sub_months(Months::new(settings.lookback_years.saturating_mul(12)))
            .ok_or_else(|| {
                ControllerError::Validation(format!(
                    "lookback of {} years is out of range",
                    settings.lookback_years
                ))
            })?;

        let selected_pair = store.get_pairs()?.into_iter().next().map(|p| p.name);
        if selected_pair.is_none() {
            tracing::warn!("Store has no pairs; starting with nothing selected");
        }

        Ok(Self {
            store,
            selection: SelectionState {
                page: Page::Main,
                selected_pair,
                chart_kind: ChartKind::Line,
                start,
                end: now,
            },
            message: None,
        })
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true when the page actually changed.
    pub fn change_page(&mut self, page: Page) -> bool {
        let next = self.selection.page.transition(page);
        let changed = next != self.selection.page;
        if changed {
            tracing::debug!("Page {:?} -> {:?}", self.selection.page, next);
        }
        self.selection.page = next;
        changed
    }

    /// Applies control panel choices. Returns true when anything changed and
    /// the view has to be rebuilt.
    pub fn apply_selection(&mut self, update: SelectionUpdate) -> bool {
        let mut modified = false;

        if let Some(pair) = update.pair {
            if self.selection.selected_pair.as_deref() != Some(pair.as_str()) {
                self.selection.selected_pair = Some(pair);
                modified = true;
            }
        }
        if let Some(kind) = update.chart_kind {
            if self.selection.chart_kind != kind {
                self.selection.chart_kind = kind;
                modified = true;
            }
        }
        if let Some(start) = update.start {
            if self.selection.start != start {
                self.selection.start = start;
                modified = true;
            }
        }
        if let Some(end) = update.end {
            if self.selection.end != end {
                self.selection.end = end;
                modified = true;
            }
        }
        if let Some(page) = update.page {
            modified |= self.change_page(page);
        }

        modified
    }

    /// Seeds the demo pair if the store holds no pairs at all.
    pub fn seed_demo_if_empty<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool, ControllerError> {
        if !self.store.get_pairs()?.is_empty() {
            return Ok(false);
        }
        self.add_predefined_pair(rng)?;
        Ok(true)
    }

    /// Adds the demo pair with an hourly synthetic series over 2022-01-02..=2022-01-07.
    pub fn add_predefined_pair<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, ControllerError> {
        let series = create_timeseries(*DEMO_START, *DEMO_END, hourly(), &WaveParams::default(), rng)?;

        let inserted = self
            .store
            .add_pair_with_values(DEMO_PAIR_NAME, DEMO_PAIR_DESCRIPTION, &series)?;
        if self.selection.selected_pair.is_none() {
            self.selection.selected_pair = Some(DEMO_PAIR_NAME.to_string());
        }
        Ok(inserted)
    }

    /// Creates a pair from an uploaded `timestamp,value` table. The pair and
    /// its values are stored in one transaction.
    pub fn add_new_pair_from_csv<R: Read>(
        &mut self,
        file: Option<R>,
        name: &str,
        description: &str,
    ) -> Result<usize, ControllerError> {
        let Some(file) = file else {
            return Err(ControllerError::Validation("no file uploaded".to_string()));
        };
        if name.is_empty() {
            return Err(ControllerError::Validation("pair name is required".to_string()));
        }

        let series = read_series(file)?;
        let inserted = self.store.add_pair_with_values(name, description, &series)?;
        if self.selection.selected_pair.is_none() {
            self.selection.selected_pair = Some(name.to_string());
        }
        Ok(inserted)
    }

    /// Pair manager form submission. Sets the one-shot message and returns
    /// whether the pair was added.
    pub fn submit_new_pair<R: Read>(&mut self, file: Option<R>, name: &str, description: &str) -> bool {
        if file.is_none() || !is_valid_pair_name(name) {
            self.message = Some(MSG_VALIDATION_ERROR.to_string());
            return false;
        }

        match self.add_new_pair_from_csv(file, name, description) {
            Ok(count) => {
                tracing::info!("Imported pair {} with {} values", name, count);
                self.message = Some(MSG_PAIR_ADDED.to_string());
                true
            }
            Err(e) => {
                tracing::warn!("Import of pair {} failed: {}", name, e);
                self.message = Some(MSG_PAIR_NOT_ADDED.to_string());
                false
            }
        }
    }

    pub fn update_pair_description(&mut self, name: &str, description: &str) -> Result<(), ControllerError> {
        Ok(self.store.update_pair(name, description)?)
    }

    /// Deletes every value of the pair from the epoch to now, then the pair
    /// itself. Returns the number of values removed.
    pub fn delete_selected_pair(&mut self, name: &str) -> Result<usize, ControllerError> {
        let end = Local::now().naive_local();

        let deleted = self.store.delete_values(name, *EPOCH, end)?;
        self.store.delete_pair(name)?;

        if self.selection.selected_pair.as_deref() == Some(name) {
            self.selection.selected_pair = self.store.get_pairs()?.into_iter().next().map(|p| p.name);
        }
        Ok(deleted)
    }

    /// Builds the view for the current state. Re-queries the store every
    /// time and consumes the pending message.
    pub fn render(&mut self) -> Result<DashboardView, ControllerError> {
        let message = self.message.take();
        let pairs = self.store.get_pairs()?;

        let body = match self.selection.page {
            Page::Main => PageView::Main(self.main_page(&pairs)?),
            Page::PairManager => PageView::PairManager(PairManagerView {
                heading: "Currency Manager".to_string(),
                name_hint: "Add currency name in format ABC/DEF".to_string(),
                pairs: pairs.clone(),
            }),
        };

        Ok(DashboardView {
            title: "Rate Dashboard".to_string(),
            message,
            selection: self.selection.clone(),
            nav_target: self.selection.page.nav_target(),
            pairs,
            body,
        })
    }

    fn main_page(&self, pairs: &[Pair]) -> Result<MainPageView, ControllerError> {
        let kind = self.selection.chart_kind;
        let selected = self
            .selection
            .selected_pair
            .as_deref()
            .filter(|name| pairs.iter().any(|p| p.name == *name));

        let Some(name) = selected else {
            return Ok(MainPageView {
                heading: "Data visualization".to_string(),
                chart_kind_label: kind.label(),
                chart: None,
                notice: Some(NO_VALUES_NOTICE.to_string()),
            });
        };

        let values = self
            .store
            .get_values(name, self.selection.start, self.selection.end)?;
        let (chart, notice) = if values.is_empty() {
            (None, Some(NO_VALUES_NOTICE.to_string()))
        } else {
            (Some(ChartData::build(kind, &values)), None)
        };

        Ok(MainPageView {
            heading: format!("Data visualization of {}", name),
            chart_kind_label: kind.label(),
            chart,
            notice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate::Observation;
    use crate::infrastructure::sqlite_store::SqliteStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_fixed_dates() {
        assert_eq!(*DEMO_START, midnight(2022, 1, 2));
        assert_eq!(*DEMO_END, midnight(2022, 1, 7));
        assert_eq!(*EPOCH, midnight(1970, 1, 1));
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn store_with(pairs: &[&str]) -> Arc<SqliteStore> {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        for name in pairs {
            store.add_pair(name, "").unwrap();
        }
        store
    }

    fn controller(store: Arc<SqliteStore>) -> DashboardController {
        DashboardController::new_at(store, &DashboardSettings::default(), now()).unwrap()
    }

    const CSV: &str = "timestamp,value\n2024-01-01,1.10\n2024-01-02,1.12\n2024-01-03,1.09\n";

    #[test]
    fn test_initial_selection() {
        let ctrl = controller(store_with(&["EUR/USD", "GBP/USD"]));
        let sel = ctrl.selection();

        assert_eq!(sel.page, Page::Main);
        assert_eq!(sel.selected_pair.as_deref(), Some("EUR/USD"));
        assert_eq!(sel.chart_kind, ChartKind::Line);
        assert_eq!(sel.end, now());
        assert_eq!(
            sel.start,
            NaiveDate::from_ymd_opt(2019, 6, 15).unwrap().and_hms_opt(12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_empty_store_starts_without_selection() {
        let mut ctrl = controller(store_with(&[]));
        assert_eq!(ctrl.selection().selected_pair, None);

        let view = ctrl.render().unwrap();
        match view.body {
            PageView::Main(main) => {
                assert!(main.chart.is_none());
                assert_eq!(main.notice.as_deref(), Some(NO_VALUES_NOTICE));
            }
            other => panic!("expected main page, got {:?}", other),
        }
    }

    #[test]
    fn test_seed_demo_only_when_empty() {
        let store = store_with(&[]);
        let mut ctrl = controller(store.clone());
        let mut rng = StdRng::seed_from_u64(3);

        assert!(ctrl.seed_demo_if_empty(&mut rng).unwrap());
        assert_eq!(ctrl.selection().selected_pair.as_deref(), Some(DEMO_PAIR_NAME));
        assert!(!ctrl.seed_demo_if_empty(&mut rng).unwrap());

        let values = store
            .get_values(DEMO_PAIR_NAME, midnight(2022, 1, 1), midnight(2022, 1, 8))
            .unwrap();
        assert_eq!(values.len(), 5 * 24 + 1);
    }

    #[test]
    fn test_change_page_round_trip() {
        let mut ctrl = controller(store_with(&["EUR/USD"]));

        assert!(ctrl.change_page(Page::PairManager));
        assert_eq!(ctrl.selection().page, Page::PairManager);
        assert!(!ctrl.change_page(Page::PairManager));

        let view = ctrl.render().unwrap();
        assert_eq!(view.nav_target, Page::Main);
        assert!(matches!(view.body, PageView::PairManager(ref m) if m.pairs.len() == 1));

        assert!(ctrl.change_page(Page::Main));
    }

    #[test]
    fn test_apply_selection_reports_changes() {
        let mut ctrl = controller(store_with(&["EUR/USD", "GBP/USD"]));

        assert!(!ctrl.apply_selection(SelectionUpdate::default()));
        assert!(!ctrl.apply_selection(SelectionUpdate {
            pair: Some("EUR/USD".to_string()),
            chart_kind: Some(ChartKind::Line),
            ..Default::default()
        }));

        assert!(ctrl.apply_selection(SelectionUpdate {
            pair: Some("GBP/USD".to_string()),
            chart_kind: Some(ChartKind::Histogram),
            ..Default::default()
        }));
        assert_eq!(ctrl.selection().selected_pair.as_deref(), Some("GBP/USD"));
        assert_eq!(ctrl.selection().chart_kind, ChartKind::Histogram);

        assert!(ctrl.apply_selection(SelectionUpdate {
            page: Some(Page::PairManager),
            ..Default::default()
        }));
        assert_eq!(ctrl.selection().page, Page::PairManager);
    }

    #[test]
    fn test_submit_new_pair_messages_are_one_shot() {
        let store = store_with(&[]);
        let mut ctrl = controller(store.clone());

        assert!(ctrl.submit_new_pair(Some(CSV.as_bytes()), "EUR/USD", "Euro"));
        assert_eq!(ctrl.message(), Some(MSG_PAIR_ADDED));

        let view = ctrl.render().unwrap();
        assert_eq!(view.message.as_deref(), Some(MSG_PAIR_ADDED));
        assert_eq!(ctrl.render().unwrap().message, None);

        assert_eq!(
            store
                .get_values("EUR/USD", midnight(2024, 1, 1), midnight(2024, 1, 3))
                .unwrap()
                .len(),
            3
        );

        // duplicate name
        assert!(!ctrl.submit_new_pair(Some(CSV.as_bytes()), "EUR/USD", ""));
        assert_eq!(ctrl.message(), Some(MSG_PAIR_NOT_ADDED));
    }

    #[test]
    fn test_submit_new_pair_validation() {
        let mut ctrl = controller(store_with(&[]));

        assert!(!ctrl.submit_new_pair(Some(CSV.as_bytes()), "eurusd", ""));
        assert_eq!(ctrl.message(), Some(MSG_VALIDATION_ERROR));

        assert!(!ctrl.submit_new_pair(None::<&[u8]>, "EUR/USD", ""));
        assert_eq!(ctrl.message(), Some(MSG_VALIDATION_ERROR));
    }

    #[test]
    fn test_failed_import_leaves_no_pair() {
        let store = store_with(&[]);
        let mut ctrl = controller(store.clone());

        let bad = "timestamp,value\n2024-01-01,1.0\n2024-01-01,2.0\n";
        assert!(!ctrl.submit_new_pair(Some(bad.as_bytes()), "EUR/USD", ""));
        assert!(store.get_pairs().unwrap().is_empty());

        let value_only = "value\n1.0\n2.0\n";
        assert!(matches!(
            ctrl.add_new_pair_from_csv(Some(value_only.as_bytes()), "EUR/USD", ""),
            Err(ControllerError::Import(ImportError::MissingColumn("timestamp")))
        ));
        assert!(store.get_pairs().unwrap().is_empty());
    }

    #[test]
    fn test_add_new_pair_requires_file_and_name() {
        let mut ctrl = controller(store_with(&[]));
        assert!(matches!(
            ctrl.add_new_pair_from_csv(None::<&[u8]>, "EUR/USD", ""),
            Err(ControllerError::Validation(_))
        ));
        assert!(matches!(
            ctrl.add_new_pair_from_csv(Some(CSV.as_bytes()), "", ""),
            Err(ControllerError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_selected_pair_reselects() {
        let store = store_with(&["EUR/USD", "GBP/USD"]);
        store
            .add_values(
                "EUR/USD",
                &[
                    Observation::new(midnight(2024, 1, 1), 1.0),
                    Observation::new(midnight(2024, 1, 2), 1.1),
                ],
            )
            .unwrap();
        let mut ctrl = controller(store.clone());

        assert_eq!(ctrl.delete_selected_pair("EUR/USD").unwrap(), 2);
        assert_eq!(ctrl.selection().selected_pair.as_deref(), Some("GBP/USD"));
        assert!(matches!(
            store.get_values("EUR/USD", midnight(2024, 1, 1), midnight(2024, 1, 2)),
            Err(StoreError::NotFound(_))
        ));

        assert!(matches!(
            ctrl.delete_selected_pair("EUR/USD"),
            Err(ControllerError::Store(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn test_render_main_page_chart() {
        let store = store_with(&[]);
        let mut ctrl = controller(store.clone());
        ctrl.add_new_pair_from_csv(Some(CSV.as_bytes()), "EUR/USD", "").unwrap();
        ctrl.apply_selection(SelectionUpdate {
            pair: Some("EUR/USD".to_string()),
            ..Default::default()
        });

        match ctrl.render().unwrap().body {
            PageView::Main(main) => {
                assert_eq!(main.heading, "Data visualization of EUR/USD");
                assert!(matches!(main.chart, Some(ChartData::Line { ref points, .. }) if points.len() == 3));
            }
            other => panic!("expected main page, got {:?}", other),
        }

        ctrl.apply_selection(SelectionUpdate {
            chart_kind: Some(ChartKind::Histogram),
            ..Default::default()
        });
        match ctrl.render().unwrap().body {
            PageView::Main(main) => {
                assert_eq!(main.chart_kind_label, "HISTOGRAM");
                assert!(matches!(main.chart, Some(ChartData::Histogram { ref bins, .. }) if bins.len() == 3));
            }
            other => panic!("expected main page, got {:?}", other),
        }

        // Range outside the data
        ctrl.apply_selection(SelectionUpdate {
            start: Some(midnight(2010, 1, 1)),
            end: Some(midnight(2011, 1, 1)),
            ..Default::default()
        });
        match ctrl.render().unwrap().body {
            PageView::Main(main) => assert!(main.chart.is_none()),
            other => panic!("expected main page, got {:?}", other),
        }
    }

    #[test]
    fn test_update_pair_description() {
        let store = store_with(&["EUR/USD"]);
        let mut ctrl = controller(store.clone());

        ctrl.update_pair_description("EUR/USD", "Euro to US Dollar").unwrap();
        assert_eq!(store.get_pairs().unwrap()[0].description, "Euro to US Dollar");
        assert!(ctrl.update_pair_description("AAA/BBB", "x").is_err());
    }
}
