use activity_report::config::Settings;
use activity_report::github::GitHubClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing (logging); stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "activity_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Failed to read .env file: {}", e);
        }
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}. Exiting.", e);
            std::process::exit(1);
        }
    };

    let result = activity_report::run(&settings, |config| {
        GitHubClient::new(config.github_token.clone(), config.max_github_api_pages)
    })
    .await;

    let (config, report) = match result {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("{}. Exiting.", e);
            std::process::exit(1);
        }
    };

    match report.render(config.report_format) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            tracing::error!("Failed to render report: {}. Exiting.", e);
            std::process::exit(1);
        }
    }
}
