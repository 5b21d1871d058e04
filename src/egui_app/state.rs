//! Form and status state for the predictor UI, kept apart from rendering.

use egui::Color32;

use crate::ml::PredictionInput;
use crate::session::{PredictorSession, SessionError, SessionFailure, SessionState};

/// Message shown under the predict button or in place of the form.
#[derive(Clone, Debug, PartialEq)]
pub enum Banner {
    Estimate(String),
    Error { message: String, hint: Option<String> },
}

/// Overall phase of the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
    Failed,
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
}

impl StatusBarState {
    fn loading() -> Self {
        Self {
            text: "Training model...".into(),
            badge_label: "Loading".into(),
            badge_color: Color32::from_rgb(200, 160, 60),
        }
    }
}

/// Editable feature values plus the last outcome for one session.
#[derive(Clone, Debug)]
pub struct FormState {
    pub phase: FormPhase,
    pub input: Option<PredictionInput>,
    pub banner: Option<Banner>,
    pub status: StatusBarState,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            phase: FormPhase::Loading,
            input: None,
            banner: None,
            status: StatusBarState::loading(),
        }
    }
}

impl FormState {
    /// Bring the form in line with the session, training on first use.
    pub fn sync(&mut self, session: &mut PredictorSession) {
        if self.phase != FormPhase::Loading {
            return;
        }
        match session.blank_input() {
            Ok(input) => {
                self.status = ready_status(session, input.len());
                self.input = Some(input);
                self.phase = FormPhase::Ready;
            }
            Err(failure) => self.fail(failure),
        }
    }

    /// Run a prediction with the current values and record the outcome.
    pub fn submit(&mut self, session: &mut PredictorSession) {
        let Some(input) = self.input.as_ref() else {
            return;
        };
        let banner = match session.predict(input) {
            Ok(prediction) => Banner::Estimate(format!(
                "Estimated Price: {}",
                prediction.formatted()
            )),
            Err(SessionError::Unavailable(failure)) => {
                self.fail(failure);
                return;
            }
            Err(SessionError::Prediction(err)) => Banner::Error {
                message: format!("Error: {err}"),
                hint: None,
            },
        };
        self.banner = Some(banner);
    }

    pub fn reset_values(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.reset();
        }
        self.banner = None;
    }

    fn fail(&mut self, failure: SessionFailure) {
        self.status = StatusBarState {
            text: failure.message.clone(),
            badge_label: "Error".into(),
            badge_color: Color32::from_rgb(200, 60, 60),
        };
        self.banner = Some(Banner::Error {
            message: format!("Error: {}", failure.message),
            hint: Some(failure.hint),
        });
        self.input = None;
        self.phase = FormPhase::Failed;
    }
}

fn ready_status(session: &PredictorSession, features: usize) -> StatusBarState {
    let text = match session.state() {
        SessionState::Ready(pipeline) => format!(
            "{features} features trained on {} rows from {}",
            pipeline.rows,
            pipeline.source.display()
        ),
        _ => format!("{features} features"),
    };
    StatusBarState {
        text,
        badge_label: "Ready".into(),
        badge_color: Color32::from_rgb(60, 160, 90),
    }
}
