//! Dashboard load state and its pure transitions.
//!
//! The controller never performs I/O. Each transition may hand back a
//! [`Command`]; whoever runs it reports the result as an [`Outcome`] carrying
//! the same [`Ticket`]. Only the most recently issued ticket is live, so a
//! slower, superseded response is dropped (last-requested-wins).

use serde::Serialize;
use shared::{
    domain::{ClientRecord, FiscalYear, MetricCard, YearData},
    error::RemoteError,
};
use tracing::{debug, warn};

use crate::metrics::compute_metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading(LoadingView),
    Loaded(Dashboard),
    Error {
        message: String,
    },
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Loaded(_) => "loaded",
            LoadState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingView {
    /// Years known so far; empty while the year list itself is loading.
    pub years: Vec<FiscalYear>,
    pub requested_year: Option<FiscalYear>,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Dashboard {
    pub years: Vec<FiscalYear>,
    /// `None` only when the server lists no fiscal years.
    pub selected_year: Option<FiscalYear>,
    pub clients: Vec<ClientRecord>,
    pub metrics: Vec<MetricCard>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListYears { ticket: Ticket },
    FetchYear { ticket: Ticket, year: FiscalYear },
}

impl Command {
    pub fn ticket(&self) -> Ticket {
        match self {
            Command::ListYears { ticket } | Command::FetchYear { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    YearsListed {
        ticket: Ticket,
        result: Result<Vec<FiscalYear>, RemoteError>,
    },
    YearLoaded {
        ticket: Ticket,
        result: Result<YearData, RemoteError>,
    },
}

impl Outcome {
    pub fn ticket(&self) -> Ticket {
        match self {
            Outcome::YearsListed { ticket, .. } | Outcome::YearLoaded { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Default)]
pub struct InsightsController {
    state: LoadState,
    issued: u64,
}

impl InsightsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// `Idle -> Loading`, asking for the year list. No-op in any other state.
    pub fn activate(&mut self) -> Option<Command> {
        if self.state != LoadState::Idle {
            debug!(state = self.state.label(), "activation ignored");
            return None;
        }
        let ticket = self.issue();
        self.state = LoadState::Loading(LoadingView {
            years: Vec::new(),
            requested_year: None,
            ticket,
        });
        Some(Command::ListYears { ticket })
    }

    /// Starts loading `year`, superseding any year fetch still in flight.
    ///
    /// Accepted from `Loaded`, or from `Loading` once the year list is known,
    /// and only for a year in that list.
    pub fn select_year(&mut self, year: FiscalYear) -> Option<Command> {
        let years = match &self.state {
            LoadState::Loaded(dashboard) => &dashboard.years,
            LoadState::Loading(view) if view.requested_year.is_some() => &view.years,
            other => {
                debug!(state = other.label(), %year, "year selection ignored");
                return None;
            }
        };
        if !years.contains(&year) {
            warn!(%year, "year selection ignored: not offered by the server");
            return None;
        }

        let years = years.clone();
        let ticket = self.issue();
        self.state = LoadState::Loading(LoadingView {
            years,
            requested_year: Some(year.clone()),
            ticket,
        });
        Some(Command::FetchYear { ticket, year })
    }

    /// Drops whatever is shown or in flight and starts over from `Idle`.
    pub fn reload(&mut self) -> Option<Command> {
        self.state = LoadState::Idle;
        self.activate()
    }

    pub fn apply(&mut self, outcome: Outcome) -> Option<Command> {
        let live = match &self.state {
            LoadState::Loading(view) => view.ticket,
            other => {
                debug!(state = other.label(), ticket = outcome.ticket().0, "outcome ignored");
                return None;
            }
        };
        if outcome.ticket() != live {
            debug!(
                ticket = outcome.ticket().0,
                live = live.0,
                "discarding superseded response"
            );
            return None;
        }

        match outcome {
            Outcome::YearsListed {
                result: Ok(years), ..
            } => match years.first().cloned() {
                Some(default_year) => {
                    let ticket = self.issue();
                    self.state = LoadState::Loading(LoadingView {
                        years,
                        requested_year: Some(default_year.clone()),
                        ticket,
                    });
                    Some(Command::FetchYear {
                        ticket,
                        year: default_year,
                    })
                }
                None => {
                    self.state = LoadState::Loaded(Dashboard::default());
                    None
                }
            },
            Outcome::YearLoaded {
                result: Ok(data), ..
            } => {
                let years = match &self.state {
                    LoadState::Loading(view) => view.years.clone(),
                    _ => Vec::new(),
                };
                let metrics = compute_metrics(&data.clients, &data.fiscal_year);
                self.state = LoadState::Loaded(Dashboard {
                    years,
                    selected_year: Some(data.fiscal_year),
                    clients: data.clients,
                    metrics,
                });
                None
            }
            Outcome::YearsListed { result: Err(err), .. }
            | Outcome::YearLoaded { result: Err(err), .. } => {
                warn!(error = %err, "insights load failed");
                self.state = LoadState::Error {
                    message: err.to_string(),
                };
                None
            }
        }
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
