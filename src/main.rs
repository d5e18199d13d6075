use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match salon_booking::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {}", e);
            eprintln!("salon-booking: {}", e);
            ExitCode::FAILURE
        }
    }
}
