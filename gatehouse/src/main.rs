use clap::Parser;
use gatehouse::{
    app_state, http::setup_http_server, init_telemetry, settings::config::Settings, stop_flag,
};
use tokio::time::sleep;
use tracing::info;

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Role-based access control decisions with per-user overrides")]
#[clap(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Show current configuration and exit
    Config,
    /// Start the gatehouse server (default)
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env.local wins, dotenvy never overrides variables that are already set
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Config => {
            let app_state = app_state::AppState::new_for_config_only().await?;
            println!("{:#?}", &app_state.settings);
            return Ok(());
        }
        Commands::Run => {}
    }

    let mut handles = vec![];

    // Telemetry first so that store loading and seeding are logged
    let settings = Settings::new()?;
    init_telemetry::init_telemetry_and_tracing(&settings.telemetry, settings.debug)?;

    let stop_flag = stop_flag::StopFlag::new();
    stop_flag::register_signal_handler(&stop_flag);
    let app_state = app_state::AppState::with_settings(settings, stop_flag).await?;

    {
        let handle =
            setup_http_server(app_state.clone(), &app_state.settings.api.bind_address).await?;
        handles.push(handle);
    }

    sleep(std::time::Duration::from_millis(100)).await;

    loop {
        // Remove and await completed handles
        handles.retain(|handle| !handle.is_finished());

        if handles.is_empty() {
            info!("All tasks are done");
            break;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    }

    Ok(())
}
