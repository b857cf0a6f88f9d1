use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::{AnalysisResult, CapturedImage};
use crate::session::cancel::CancelToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTab {
    #[default]
    Dashboard,
    Meals,
    Tasks,
    Profile,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture is not open")]
    NotOpen,
    #[error("an analysis is already in progress")]
    AnalysisPending,
    #[error("analysis incomplete")]
    AnalysisIncomplete,
    #[error("capture was cancelled or replaced")]
    Stale,
}

/// Capture overlay. Orthogonal to the active tab.
#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    #[default]
    Closed,
    AwaitingPhoto {
        capture_id: Uuid,
        last_error: Option<String>,
    },
    Analyzing {
        capture_id: Uuid,
        image: CapturedImage,
        cancel: CancelToken,
    },
    Reviewing {
        capture_id: Uuid,
        image: CapturedImage,
        result: AnalysisResult,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    Closed,
    AwaitingPhoto,
    Analyzing,
    Reviewing,
}

impl CaptureState {
    pub fn capture_id(&self) -> Option<Uuid> {
        match self {
            CaptureState::Closed => None,
            CaptureState::AwaitingPhoto { capture_id, .. }
            | CaptureState::Analyzing { capture_id, .. }
            | CaptureState::Reviewing { capture_id, .. } => Some(*capture_id),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, CaptureState::Closed)
    }

    pub fn phase(&self) -> CapturePhase {
        match self {
            CaptureState::Closed => CapturePhase::Closed,
            CaptureState::AwaitingPhoto { .. } => CapturePhase::AwaitingPhoto,
            CaptureState::Analyzing { .. } => CapturePhase::Analyzing,
            CaptureState::Reviewing { .. } => CapturePhase::Reviewing,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match self {
            CaptureState::Reviewing { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            CaptureState::AwaitingPhoto { last_error, .. } => last_error.as_deref(),
            _ => None,
        }
    }

    /// Commit is only enabled once an analysis result is on screen.
    pub fn can_commit(&self) -> bool {
        matches!(self, CaptureState::Reviewing { .. })
    }
}

/// Tab selection plus capture overlay. Starts on the dashboard with capture closed.
#[derive(Debug, Default)]
pub struct ViewState {
    tab: AppTab,
    capture: CaptureState,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> AppTab {
        self.tab
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn select_tab(&mut self, tab: AppTab) {
        debug!(?tab, "tab selected");
        self.tab = tab;
    }

    /// Opens a capture, or returns the one already open.
    pub fn open_capture(&mut self) -> Uuid {
        if let Some(id) = self.capture.capture_id() {
            return id;
        }
        let capture_id = Uuid::new_v4();
        debug!(%capture_id, "capture opened");
        self.capture = CaptureState::AwaitingPhoto {
            capture_id,
            last_error: None,
        };
        capture_id
    }

    /// Moves to `Analyzing` and hands back the token the request must honour.
    pub fn begin_analysis(
        &mut self,
        image: CapturedImage,
    ) -> Result<(Uuid, CancelToken), CaptureError> {
        let capture_id = match &self.capture {
            CaptureState::Closed => return Err(CaptureError::NotOpen),
            CaptureState::Analyzing { .. } => return Err(CaptureError::AnalysisPending),
            CaptureState::AwaitingPhoto { capture_id, .. }
            | CaptureState::Reviewing { capture_id, .. } => *capture_id,
        };
        let cancel = CancelToken::new();
        self.capture = CaptureState::Analyzing {
            capture_id,
            image,
            cancel: cancel.clone(),
        };
        Ok((capture_id, cancel))
    }

    /// Applies an analysis outcome if it still belongs to the open capture.
    /// Outcomes for cancelled or replaced captures are dropped with `Stale`.
    pub fn finish_analysis(
        &mut self,
        capture_id: Uuid,
        outcome: Result<AnalysisResult, String>,
    ) -> Result<(), CaptureError> {
        let image = match &self.capture {
            CaptureState::Analyzing {
                capture_id: current,
                image,
                cancel,
            } if *current == capture_id && !cancel.is_cancelled() => image.clone(),
            _ => {
                debug!(%capture_id, "dropping analysis for stale capture");
                return Err(CaptureError::Stale);
            }
        };
        self.capture = match outcome {
            Ok(result) => CaptureState::Reviewing {
                capture_id,
                image,
                result,
            },
            Err(message) => CaptureState::AwaitingPhoto {
                capture_id,
                last_error: Some(message),
            },
        };
        Ok(())
    }

    /// Puts an analysis nobody is waiting on back to `AwaitingPhoto`.
    /// No-op unless `capture_id` is the one still analysing.
    pub fn abandon_analysis(&mut self, capture_id: Uuid) -> bool {
        match &self.capture {
            CaptureState::Analyzing {
                capture_id: current,
                cancel,
                ..
            } if *current == capture_id => {
                cancel.cancel();
                self.capture = CaptureState::AwaitingPhoto {
                    capture_id,
                    last_error: Some("analysis interrupted".into()),
                };
                true
            }
            _ => false,
        }
    }

    /// The photo and result a commit would record.
    pub fn reviewed(&self) -> Result<(&CapturedImage, &AnalysisResult), CaptureError> {
        match &self.capture {
            CaptureState::Reviewing { image, result, .. } => Ok((image, result)),
            CaptureState::Closed => Err(CaptureError::NotOpen),
            CaptureState::Analyzing { .. } => Err(CaptureError::AnalysisPending),
            CaptureState::AwaitingPhoto { .. } => Err(CaptureError::AnalysisIncomplete),
        }
    }

    /// Closes the overlay, discarding any result and cancelling an in-flight analysis.
    /// Returns whether a capture was open.
    pub fn cancel_capture(&mut self) -> bool {
        let previous = std::mem::take(&mut self.capture);
        if let CaptureState::Analyzing { cancel, .. } = &previous {
            cancel.cancel();
        }
        if let Some(capture_id) = previous.capture_id() {
            debug!(%capture_id, "capture cancelled");
        }
        previous.is_open()
    }

    pub(crate) fn close_capture(&mut self) {
        self.capture = CaptureState::Closed;
    }
}
