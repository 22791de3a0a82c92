//! RPC method handlers.
//!
//! Every method is a pure decode/render over its params; the handler holds
//! nothing but immutable configuration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use crate::console;
use crate::context::AppContext;
use crate::core::{self, JobStatus, JobType, SizeBase, models, render};
use crate::error::{ConsoleError, DecodeError};

use super::protocol::{CONSOLE_ERROR, Request, Response};

pub struct MethodHandler {
    ctx: AppContext,
    start_time: Instant,
}

fn parse_params<T: DeserializeOwned>(id: &Value, params: Value) -> Result<T, Response> {
    serde_json::from_value(params).map_err(|e| Response::invalid_params(id.clone(), e.to_string()))
}

/// Render methods take the console response either as the params object
/// itself or wrapped as `{"response": ...}`.
fn console_response(params: Value) -> Value {
    match params {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("response") => {
            map.remove("response").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn console_failure(id: Value, error: ConsoleError) -> Response {
    match error {
        ConsoleError::Remote { code, message } => {
            Response::error_with_data(id, CONSOLE_ERROR, message, code)
        }
        other => Response::invalid_params(id, other.to_string()),
    }
}

impl MethodHandler {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            start_time: Instant::now(),
        }
    }

    pub fn handle(&self, request: Request) -> Response {
        let id = request.id.clone().unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);

        debug!(method = %request.method, "Dispatching request");

        let result = match request.method.as_str() {
            "daemon.status" => Ok(self.daemon_status(id.clone())),
            "status.classify" => self.status_classify(&id, params),
            "actions.get" => self.actions_get(&id, params),
            "mode.decode" => self.mode_decode(&id, params),
            "format.size" => self.format_size(&id, params),
            "jobs.render" => self.jobs_render(&id, params),
            "volumes.render" => self.volumes_render(&id, params),
            "files.render" => self.files_render(&id, params),
            _ => Ok(Response::method_not_found(id.clone(), &request.method)),
        };

        result.unwrap_or_else(|response| response)
    }

    fn daemon_status(&self, id: Value) -> Response {
        #[derive(Serialize)]
        struct DaemonStatus {
            version: &'static str,
            uptime_secs: u64,
            rpc_bind: String,
            labels: core::LabelOptions,
            file_size_base: SizeBase,
        }

        Response::success(
            id,
            DaemonStatus {
                version: env!("CARGO_PKG_VERSION"),
                uptime_secs: self.start_time.elapsed().as_secs(),
                rpc_bind: self.ctx.config.rpc_bind.to_string(),
                labels: self.ctx.config.label_options(),
                file_size_base: self.ctx.config.file_size_base,
            },
        )
    }

    fn status_classify(&self, id: &Value, params: Value) -> Result<Response, Response> {
        #[derive(Deserialize)]
        struct Params {
            status: String,
        }

        let params: Params = parse_params(id, params)?;
        let code = models::code(&params.status, "jobstatus")
            .map_err(|e| Response::invalid_params(id.clone(), e.to_string()))?;

        let info = JobStatus::from_code(code).classify(&self.ctx.config.label_options());
        Ok(Response::success(id.clone(), info))
    }

    fn actions_get(&self, id: &Value, params: Value) -> Result<Response, Response> {
        #[derive(Deserialize)]
        struct Params {
            status: String,
            #[serde(rename = "type")]
            job_type: String,
        }

        let params: Params = parse_params(id, params)?;
        let invalid = |e: DecodeError| Response::invalid_params(id.clone(), e.to_string());
        let status = models::code(&params.status, "jobstatus").map_err(invalid)?;
        let job_type = models::code(&params.job_type, "type").map_err(invalid)?;

        let actions = core::available_actions(status.into(), JobType::from_code(job_type));
        Ok(Response::success(id.clone(), actions))
    }

    fn mode_decode(&self, id: &Value, params: Value) -> Result<Response, Response> {
        #[derive(Deserialize)]
        struct Params {
            mode: i64,
        }

        let params: Params = parse_params(id, params)?;
        let permissions = core::decode_mode(params.mode)
            .map_err(|e| Response::invalid_params(id.clone(), e.to_string()))?;
        Ok(Response::success(id.clone(), permissions))
    }

    fn format_size(&self, id: &Value, params: Value) -> Result<Response, Response> {
        #[derive(Deserialize)]
        struct Params {
            bytes: u64,
            #[serde(default)]
            binary: bool,
        }

        let params: Params = parse_params(id, params)?;
        let base = if params.binary {
            SizeBase::Binary
        } else {
            SizeBase::Decimal
        };
        Ok(Response::success(id.clone(), base.format(params.bytes)))
    }

    fn jobs_render(&self, id: &Value, params: Value) -> Result<Response, Response> {
        let jobs = console::jobs(console_response(params))
            .map_err(|e| console_failure(id.clone(), e))?;
        let views = render::render_jobs(&jobs, &self.ctx.render_options());
        Ok(Response::success(id.clone(), views))
    }

    fn volumes_render(&self, id: &Value, params: Value) -> Result<Response, Response> {
        let volumes = console::volumes(console_response(params))
            .map_err(|e| console_failure(id.clone(), e))?;
        let views = render::render_volumes(&volumes, &self.ctx.render_options());
        Ok(Response::success(id.clone(), views))
    }

    fn files_render(&self, id: &Value, params: Value) -> Result<Response, Response> {
        let nodes = console::file_nodes(console_response(params))
            .map_err(|e| console_failure(id.clone(), e))?;
        let views = render::render_file_nodes(&nodes, &self.ctx.render_options());
        Ok(Response::success(id.clone(), views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::rpc::protocol::{INVALID_PARAMS, METHOD_NOT_FOUND};
    use serde_json::json;

    fn handler() -> MethodHandler {
        MethodHandler::new(AppContext::new(AppConfig::default()).unwrap())
    }

    fn call(method: &str, params: Value) -> Response {
        handler().handle(Request::new(method, Some(params), json!(1)))
    }

    #[test]
    fn test_status_classify() {
        let resp = call("status.classify", json!({"status": "W"}));
        let result = resp.result.unwrap();

        assert_eq!(result["category"], "Warning");
        assert_eq!(result["tooltip"], "Terminated normally with warnings");
        assert_eq!(resp.id, json!(1));
    }

    #[test]
    fn test_actions_get() {
        let resp = call("actions.get", json!({"status": "q", "type": "B"}));
        assert_eq!(resp.result.unwrap(), json!(["Details", "Cancel"]));
    }

    #[test]
    fn test_mode_decode() {
        let resp = call("mode.decode", json!({"mode": 16877}));
        assert_eq!(resp.result.unwrap(), json!("drwxr-xr-x"));

        let resp = call("mode.decode", json!({"mode": 0}));
        assert_eq!(resp.result.unwrap(), Value::Null);

        let resp = call("mode.decode", json!({"mode": -1}));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_format_size() {
        let resp = call("format.size", json!({"bytes": 1536, "binary": true}));
        assert_eq!(resp.result.unwrap(), json!("1.50 KiB"));

        let resp = call("format.size", json!({"bytes": -5}));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_jobs_render() {
        let resp = call(
            "jobs.render",
            json!({"jsonrpc": "2.0", "id": null, "result": {"jobs": [
                {"jobid": "3", "client": "db-fd", "jobstatus": "R", "type": "R", "level": " "}
            ]}}),
        );
        let result = resp.result.unwrap();

        assert_eq!(result[0]["jobid"], "3");
        assert_eq!(result[0]["job_type"], "Restore");
        assert_eq!(result[0]["actions"], json!(["Details", "Cancel"]));
    }

    #[test]
    fn test_files_render_wrapped_response() {
        let resp = call(
            "files.render",
            json!({"response": {"jsonrpc": "2.0", "id": null, "result": {"files": [
                {"name": "motd", "type": "F", "stat": {"mode": 33188, "size": 12}}
            ]}}}),
        );
        let result = resp.result.unwrap();

        assert_eq!(result[0]["name"], "motd");
        assert_eq!(result[0]["permissions"], "-rw-r--r--");
    }

    #[test]
    fn console_error_is_forwarded() {
        let resp = call(
            "volumes.render",
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": 1, "message": "no catalog"}}),
        );
        let error = resp.error.unwrap();

        assert_eq!(error.code, CONSOLE_ERROR);
        assert_eq!(error.message, "no catalog");
    }

    #[test]
    fn unknown_method() {
        let resp = call("jobs.rerun", json!({}));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn bad_status_code() {
        let resp = call("status.classify", json!({"status": "TW"}));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }
}
