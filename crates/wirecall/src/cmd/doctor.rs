use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_transport_check(),
        temp_dir_writable_check(),
        frame_limit_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput {
        schema_id: "https://schemas.wirecall.dev/cli/v1/doctor-report.schema.json",
        checks,
        overall,
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("wirecall doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<22} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_transport_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult {
            name: "platform_transport".to_string(),
            status: CheckStatus::Pass,
            detail: "Unix domain sockets available".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "platform_transport".to_string(),
            status: CheckStatus::Fail,
            detail: "no local socket transport on this platform".to_string(),
        }
    }
}

fn temp_dir_writable_check() -> CheckResult {
    #[cfg(unix)]
    {
        use wirecall_transport::SocketListener;

        let dir = std::path::PathBuf::from(format!(
            "/tmp/wirecall-doctor-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        let _ = std::fs::create_dir_all(&dir);
        let sock = dir.join("doctor.sock");
        let result = SocketListener::bind(&sock);
        let status = match &result {
            Ok(_) => CheckResult {
                name: "temp_dir_writable".to_string(),
                status: CheckStatus::Pass,
                detail: "/tmp socket bind succeeded".to_string(),
            },
            Err(err) => CheckResult {
                name: "temp_dir_writable".to_string(),
                status: CheckStatus::Fail,
                detail: format!("/tmp socket bind failed: {err}"),
            },
        };
        drop(result);
        let _ = std::fs::remove_dir_all(&dir);
        status
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "temp_dir_writable".to_string(),
            status: CheckStatus::Skip,
            detail: "temp socket check not implemented on this platform".to_string(),
        }
    }
}

fn frame_limit_check() -> CheckResult {
    CheckResult {
        name: "frame_limit".to_string(),
        status: CheckStatus::Info,
        detail: format!(
            "default max payload {} bytes",
            wirecall_transport::DEFAULT_MAX_PAYLOAD
        ),
    }
}
