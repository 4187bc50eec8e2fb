// Dashboard view models handed to the hosting UI
use super::chart::{ChartData, ChartKind};
use super::page::Page;
use super::pair::Pair;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub page: Page,
    pub selected_pair: Option<String>,
    pub chart_kind: ChartKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub message: Option<String>,
    pub selection: SelectionState,
    pub nav_target: Page,
    pub pairs: Vec<Pair>,
    pub body: PageView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Main(MainPageView),
    PairManager(PairManagerView),
}

#[derive(Debug, Clone, Serialize)]
pub struct MainPageView {
    pub heading: String,
    pub chart_kind_label: &'static str,
    /// `None` when nothing is selected or the selected pair has no values in range.
    pub chart: Option<ChartData>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairManagerView {
    pub heading: String,
    pub name_hint: String,
    pub pairs: Vec<Pair>,
}
