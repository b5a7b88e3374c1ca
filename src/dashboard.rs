//! View controller switching between the grid and the lead forms.

use serde::{Deserialize, Serialize};

use crate::domain::types::LeadId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    #[default]
    Grid,
    Create,
    Edit(LeadId),
    /// No session; the user has to sign in again.
    Login,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    CreateRequested,
    EditRequested(LeadId),
    /// Create or update persisted.
    Saved,
    Cancelled,
    /// Validation blocked the submission.
    Rejected,
    CreateFailed,
    UpdateFailed,
    SessionEnded,
}

/// Current view plus the refresh counter handed to the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dashboard {
    view: View,
    refresh: u64,
}

impl Dashboard {
    /// Resumes the controller in `view` with the last known refresh counter.
    pub fn resume(view: View, refresh: u64) -> Self {
        Self { view, refresh }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn refresh(&self) -> u64 {
        self.refresh
    }

    /// Applies `event` and returns the view to show next.
    pub fn handle(&mut self, event: ViewEvent) -> View {
        let next = match (self.view, event) {
            (_, ViewEvent::SessionEnded) => View::Login,
            (View::Login, _) => View::Login,
            (_, ViewEvent::CreateRequested) => View::Create,
            (_, ViewEvent::EditRequested(id)) => View::Edit(id),
            (View::Create | View::Edit(_), ViewEvent::Saved) => {
                self.refresh = self.refresh.wrapping_add(1);
                View::Grid
            }
            (View::Create | View::Edit(_), ViewEvent::Cancelled) => View::Grid,
            (View::Create, ViewEvent::CreateFailed) => View::Create,
            (View::Edit(_), ViewEvent::UpdateFailed) => View::Grid,
            (view, event) => {
                log::debug!("Ignoring {event:?} in {view:?}");
                view
            }
        };
        self.view = next;
        next
    }
}
