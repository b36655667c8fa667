//! Async driver that runs controller commands against a remote source.

use std::sync::Arc;

use client_core::InsightsSource;
use shared::domain::FiscalYear;
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::controller::{Command, InsightsController, LoadState, Outcome};

/// Owns the dashboard state for one view and publishes every change.
///
/// The controller lock is held only for pure transitions, never while a
/// remote call is pending, so a year change can be issued while another
/// fetch is still in flight.
pub struct InsightsSession<S: InsightsSource + ?Sized> {
    source: Arc<S>,
    controller: Mutex<InsightsController>,
    updates: watch::Sender<LoadState>,
}

impl<S: InsightsSource + ?Sized> InsightsSession<S> {
    pub fn new(source: Arc<S>) -> Self {
        let (updates, _) = watch::channel(LoadState::Idle);
        Self {
            source,
            controller: Mutex::new(InsightsController::new()),
            updates,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.updates.subscribe()
    }

    pub async fn state(&self) -> LoadState {
        self.controller.lock().await.state().clone()
    }

    /// Lists the years and loads the default one.
    pub async fn activate(&self) -> LoadState {
        let command = self.transition(|controller| controller.activate()).await;
        self.drive(command).await
    }

    pub async fn select_year(&self, year: FiscalYear) -> LoadState {
        let command = self
            .transition(|controller| controller.select_year(year))
            .await;
        self.drive(command).await
    }

    pub async fn reload(&self) -> LoadState {
        let command = self.transition(|controller| controller.reload()).await;
        self.drive(command).await
    }

    async fn transition(
        &self,
        step: impl FnOnce(&mut InsightsController) -> Option<Command>,
    ) -> Option<Command> {
        let mut controller = self.controller.lock().await;
        let command = step(&mut *controller);
        let next = controller.state();
        self.updates.send_if_modified(|current| {
            if *current == *next {
                return false;
            }
            *current = next.clone();
            true
        });
        command
    }

    async fn drive(&self, mut command: Option<Command>) -> LoadState {
        while let Some(next) = command.take() {
            let outcome = self.execute(next).await;
            command = self
                .transition(|controller| controller.apply(outcome))
                .await;
        }
        self.state().await
    }

    async fn execute(&self, command: Command) -> Outcome {
        debug!(ticket = command.ticket().0, ?command, "running insights command");
        match command {
            Command::ListYears { ticket } => Outcome::YearsListed {
                ticket,
                result: self.source.list_available_years().await,
            },
            Command::FetchYear { ticket, year } => Outcome::YearLoaded {
                ticket,
                result: self.source.fetch_year_data(&year).await,
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
