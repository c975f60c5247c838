//! Line-delimited JSON-RPC over stdio
//!
//! Each input line is one request; each request produces exactly one response
//! line. A bad request is answered with an error line and the loop continues.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlscout_analyzer::QueryAdvisor;
use sqlscout_core::{PlanEngine, ScoutError};
use std::io::{BufRead, Write};

const JSONRPC_VERSION: &str = "2.0";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const SERVER_ERROR: i64 = -32000;

#[derive(Debug, Deserialize)]
struct Request {
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadParams {
    #[serde(default)]
    schema: String,
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    query: String,
}

#[derive(Debug, Deserialize)]
struct OptimizeParams {
    query: String,
    #[serde(default)]
    create_index: Option<String>,
}

/// Serves requests from `input` until end of input
pub fn serve<E, R, W>(advisor: &QueryAdvisor, engine: &E, input: R, mut output: W) -> anyhow::Result<()>
where
    E: PlanEngine + ?Sized,
    R: BufRead,
    W: Write,
{
    tracing::info!(engine = engine.engine_name(), "serving JSON-RPC on stdio");
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(advisor, engine, &line);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}

fn handle_line<E: PlanEngine + ?Sized>(advisor: &QueryAdvisor, engine: &E, line: &str) -> Response {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "malformed JSON-RPC line");
            return Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}"));
        }
    };

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: Request = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Response::error(id, INVALID_REQUEST, format!("Invalid request: {e}"));
        }
    };

    tracing::debug!(method = %request.method, "handling request");
    match dispatch(advisor, engine, &request.method, request.params) {
        Ok(result) => Response::result(id, result),
        Err(e) => {
            tracing::warn!(method = %request.method, error = %e, "request failed");
            Response::error(id, error_code(&e), e.to_string())
        }
    }
}

fn dispatch<E: PlanEngine + ?Sized>(
    advisor: &QueryAdvisor,
    engine: &E,
    method: &str,
    params: Value,
) -> Result<Value, ScoutError> {
    match method {
        "sql.load" => {
            let params: LoadParams = parse_params(params)?;
            engine.load_schema(&params.schema)?;
            Ok(serde_json::json!({"ok": true}))
        }
        "sql.explain" => {
            let params: QueryParams = parse_params(params)?;
            Ok(serde_json::to_value(engine.explain_plan(&params.query)?)?)
        }
        "sql.diagnose" => {
            let params: QueryParams = parse_params(params)?;
            Ok(serde_json::to_value(advisor.diagnose(&params.query))?)
        }
        "sql.optimize" => {
            let params: OptimizeParams = parse_params(params)?;
            let report =
                advisor.optimize(engine, &params.query, params.create_index.as_deref())?;
            Ok(serde_json::to_value(report)?)
        }
        other => Err(ScoutError::UnsupportedMethod(other.to_string())),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ScoutError> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        params => params,
    };
    serde_json::from_value(params).map_err(|e| ScoutError::InvalidParams(e.to_string()))
}

fn error_code(error: &ScoutError) -> i64 {
    match error {
        ScoutError::UnsupportedMethod(_) => METHOD_NOT_FOUND,
        ScoutError::InvalidParams(_) => INVALID_PARAMS,
        ScoutError::Engine(_) | ScoutError::Configuration(_) | ScoutError::Serialization(_) => {
            SERVER_ERROR
        }
    }
}
