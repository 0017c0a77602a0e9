//! Request routing, handlers and error mapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use ecourban_core::{ErrorKind, ForecastError, WINDOW_SIZE};

use crate::http::{Request, Response};
use crate::state::AppState;

const ALLOWED_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub last_24_values: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_energy: f64,
}

/// Errors a handler can answer with. The message becomes `detail`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Unprocessable(_) => 422,
            ApiError::BadRequest(_) => 400,
            ApiError::Internal(_) => 500,
            ApiError::NotFound => 404,
            ApiError::MethodNotAllowed => 405,
        }
    }

    pub fn into_response(self) -> Response {
        Response::detail(self.status(), &self.to_string())
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match err.kind() {
            ErrorKind::InputSize => ApiError::BadRequest(format!(
                "You must provide exactly {WINDOW_SIZE} values in 'last_24_values'."
            )),
            ErrorKind::ArtifactMissing => ApiError::Internal(err.to_string()),
            ErrorKind::Unexpected => ApiError::Internal(format!("Prediction failed: {err}")),
        }
    }
}

fn root() -> Response {
    Response::json(
        200,
        &serde_json::json!({ "message": "Energy Forecasting API is running." }),
    )
}

async fn predict_energy(state: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let payload: PredictRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    if payload.last_24_values.len() != WINDOW_SIZE {
        return Err(ForecastError::InputSize {
            expected: WINDOW_SIZE,
            actual: payload.last_24_values.len(),
        }
        .into());
    }

    let store = state.store.clone();
    let values = payload.last_24_values;
    let predicted = tokio::task::spawn_blocking(move || store.predict(&values))
        .await
        .map_err(|e| ApiError::Internal(format!("Prediction failed: {e}")))??;

    Ok(Response::json(
        200,
        &PredictResponse {
            predicted_energy: predicted,
        },
    ))
}

fn preflight(req: &Request) -> Response {
    let mut resp = Response::empty(204)
        .with_header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .with_header("Access-Control-Max-Age", "600");
    if let Some(headers) = req.header("access-control-request-headers") {
        resp = resp.with_header("Access-Control-Allow-Headers", headers);
    }
    resp
}

fn apply_cors(state: &AppState, req: &Request, resp: Response) -> Response {
    match req.header("origin") {
        Some(origin) if state.origin_allowed(origin) => resp
            .with_header("Access-Control-Allow-Origin", origin)
            .with_header("Access-Control-Allow-Credentials", "true")
            .with_header("Vary", "Origin"),
        _ => resp,
    }
}

/// Dispatch one request.
pub async fn handle(state: &AppState, req: Request) -> Response {
    let result = match (req.method.as_str(), req.path.as_str()) {
        ("OPTIONS", _) => Ok(preflight(&req)),
        ("GET", "/") => Ok(root()),
        ("POST", "/predict-energy") => predict_energy(state, &req.body).await,
        (_, "/") | (_, "/predict-energy") => Err(ApiError::MethodNotAllowed),
        _ => Err(ApiError::NotFound),
    };

    let resp = match result {
        Ok(resp) => resp,
        Err(err) => {
            match err.status() {
                500 => error!(path = %req.path, "{err}"),
                400 | 422 => warn!(path = %req.path, "{err}"),
                _ => {}
            }
            err.into_response()
        }
    };
    info!(method = %req.method, path = %req.path, status = resp.status, "request handled");
    apply_cors(state, &req, resp)
}
