//! Raw management API requests.

use keenetic_core::{Command as CoreCommand, CommandResult, Controller, Method};

use crate::cli::{GlobalOpts, RequestArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn parse_method(raw: &str) -> Result<Method, CliError> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        other => Err(CliError::Validation {
            field: "method".into(),
            reason: format!("unsupported HTTP method '{other}'"),
        }),
    }
}

/// `/rci/show/version`, `rci/show/version` and `show/version` all name the
/// same endpoint.
fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('/');
    if trimmed.starts_with("rci/")
        || trimmed.starts_with("ci/")
        || trimmed == "auth"
        || trimmed.ends_with(".js")
    {
        format!("/{trimmed}")
    } else {
        format!("/rci/{trimmed}")
    }
}

pub async fn handle(controller: &Controller, args: RequestArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let method = parse_method(&args.method)?;
    let body = match (args.data, args.from_file) {
        (Some(raw), _) => Some(util::parse_json(&raw, "data")?),
        (None, Some(path)) => Some(util::read_json_file(&path)?),
        (None, None) => None,
    };

    let result = controller
        .execute(CoreCommand::RawRequest {
            method,
            endpoint: normalize_endpoint(&args.endpoint),
            body,
        })
        .await?;

    if let CommandResult::Response(value) = result {
        let out = output::render_single(
            &global.output,
            &value,
            |v| serde_json::to_string_pretty(v).unwrap_or_default(),
            ToString::to_string,
        )?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
