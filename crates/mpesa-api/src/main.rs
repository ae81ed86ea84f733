//! # mpesa-stk
//!
//! STK push service for the M-Pesa Daraja API.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export CONSUMER_KEY=...
//! export CONSUMER_SECRET=...
//! export INITIATOR_NAME=...
//! export INITIATOR_PASSWORD=...
//! export BUSINESS_SHORTCODE=174379
//! export SECURITY_CREDENTIAL=...
//! export PASS_KEY=...
//!
//! # Run the server
//! mpesa-stk
//! ```

use mpesa_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());
    if let Some(phone) = &state.config.default_phone_number {
        info!("Default payer: {}", phone);
    }

    let app = routes::create_router(state);

    info!("Server running on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("STK push: POST http://{}/api/stkpush", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  M-Pesa STK Push
  ━━━━━━━━━━━━━━━━
  Daraja push payment service
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
