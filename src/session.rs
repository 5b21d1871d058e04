//! Per-session memoized predictor.
//!
//! A [`PredictorSession`] builds its model at most once. The first call to
//! [`PredictorSession::ensure_ready`] runs the configured [`ModelSource`];
//! every later call returns the cached result, including a cached failure.
//! Sessions never share state: each one in a [`SessionRegistry`] trains from
//! its own source.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::DataSettings;
use crate::error::EstimateError;
use crate::format::format_currency;
use crate::ml::PredictionInput;
use crate::pipeline::{TrainedPipeline, train_for_serving};

/// Identity of one interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Produces the trained pipeline a session serves from.
pub trait ModelSource {
    fn build(&self) -> Result<TrainedPipeline, EstimateError>;
}

/// Loads the configured CSV and fits on every row.
#[derive(Debug, Clone)]
pub struct CsvModelSource {
    data: DataSettings,
}

impl CsvModelSource {
    pub fn new(data: DataSettings) -> Self {
        Self { data }
    }
}

impl ModelSource for CsvModelSource {
    fn build(&self) -> Result<TrainedPipeline, EstimateError> {
        train_for_serving(&self.data)
    }
}

/// User-facing description of a failed model build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub message: String,
    pub hint: String,
}

impl From<&EstimateError> for SessionFailure {
    fn from(err: &EstimateError) -> Self {
        Self {
            message: err.to_string(),
            hint: err.remediation_hint(),
        }
    }
}

/// Lifecycle of a session's cached model.
#[derive(Debug, Clone)]
pub enum SessionState {
    Uninitialized,
    Ready(Arc<TrainedPipeline>),
    Predicting(Arc<TrainedPipeline>),
    Failed(SessionFailure),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}", .0.message)]
    Unavailable(SessionFailure),
    #[error(transparent)]
    Prediction(#[from] EstimateError),
}

/// Estimated price for one form submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    pub fn formatted(&self) -> String {
        format_currency(self.value)
    }
}

/// Lazily trained, memoized predictor for a single session.
pub struct PredictorSession {
    id: SessionId,
    source: Box<dyn ModelSource>,
    state: SessionState,
}

impl PredictorSession {
    pub fn new(source: Box<dyn ModelSource>) -> Self {
        Self {
            id: SessionId::new(),
            source,
            state: SessionState::Uninitialized,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Build the model on first use; afterwards return the cached outcome.
    pub fn ensure_ready(&mut self) -> Result<Arc<TrainedPipeline>, SessionFailure> {
        if let SessionState::Uninitialized = self.state {
            self.state = self.build_state();
        }
        match &self.state {
            SessionState::Ready(pipeline) | SessionState::Predicting(pipeline) => {
                Ok(Arc::clone(pipeline))
            }
            SessionState::Failed(failure) => Err(failure.clone()),
            SessionState::Uninitialized => Err(SessionFailure {
                message: "Model has not been built".to_string(),
                hint: "Restart the session.".to_string(),
            }),
        }
    }

    fn build_state(&self) -> SessionState {
        match self.source.build() {
            Ok(pipeline) => {
                info!(
                    "Session {} ready: {} features from {} rows of {}",
                    self.id,
                    pipeline.feature_names().len(),
                    pipeline.rows,
                    pipeline.source.display()
                );
                SessionState::Ready(Arc::new(pipeline))
            }
            Err(err) => {
                error!("Session {} failed to build model: {err}", self.id);
                SessionState::Failed(SessionFailure::from(&err))
            }
        }
    }

    /// Fresh form input for this session's features.
    pub fn blank_input(&mut self) -> Result<PredictionInput, SessionFailure> {
        let pipeline = self.ensure_ready()?;
        Ok(PredictionInput::for_features(pipeline.feature_names()))
    }

    /// Predict one row with the cached model.
    pub fn predict(&mut self, input: &PredictionInput) -> Result<Prediction, SessionError> {
        let pipeline = self.ensure_ready().map_err(SessionError::Unavailable)?;
        self.state = SessionState::Predicting(Arc::clone(&pipeline));
        let result = pipeline.model.predict_input(input);
        self.state = SessionState::Ready(pipeline);
        let value = result?;
        info!("Session {} predicted {}", self.id, format_currency(value));
        Ok(Prediction { value })
    }
}

/// Independent sessions keyed by identity.
pub struct SessionRegistry {
    factory: Box<dyn Fn() -> Box<dyn ModelSource>>,
    sessions: HashMap<SessionId, PredictorSession>,
}

impl SessionRegistry {
    pub fn new(factory: impl Fn() -> Box<dyn ModelSource> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            sessions: HashMap::new(),
        }
    }

    /// Registry whose sessions read the configured CSV.
    pub fn for_data(data: DataSettings) -> Self {
        Self::new(move || -> Box<dyn ModelSource> {
            Box::new(CsvModelSource::new(data.clone()))
        })
    }

    pub fn open(&mut self) -> SessionId {
        let session = PredictorSession::new((self.factory)());
        let id = session.id();
        self.sessions.insert(id, session);
        id
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut PredictorSession> {
        self.sessions.get_mut(&id)
    }

    /// Drop a session and its cached model.
    pub fn close(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Replace a session with a fresh, untrained one.
    pub fn restart(&mut self, id: SessionId) -> SessionId {
        self.close(id);
        self.open()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
