use std::process::ExitCode;

use sms_motion::AppError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match sms_motion::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Calibration(e)) => {
            tracing::error!("SMSLib failed to calibrate: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
