use colored::Colorize;
use rulesctl_shim::colors;
use rulesctl_shim::launcher::{self, LAUNCH_FAILURE_CODE, LaunchRequest};
use rulesctl_shim::{InstallationManager, Invocation, ReleaseConfig, ShimError};
use std::ffi::OsString;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr; stdout is reserved for the proxied binary
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    colors::init_colors();

    let config = ReleaseConfig::from_env();

    let code = match Invocation::from_args(std::env::args_os().skip(1)) {
        Invocation::Install => install(config).await,
        Invocation::Proxy(args) => proxy(&config, args).await,
    };

    std::process::exit(code);
}

async fn install(config: ReleaseConfig) -> i32 {
    let version = config.version.clone();
    let result = match InstallationManager::new(config) {
        Ok(manager) => manager.install().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(installed) => {
            eprintln!(
                "{} Installed rulesctl {} to {}",
                colors::success_mark(),
                version.bold(),
                installed.path.display()
            );
            0
        }
        Err(e) => {
            report(&e);
            LAUNCH_FAILURE_CODE
        }
    }
}

async fn proxy(config: &ReleaseConfig, args: Vec<OsString>) -> i32 {
    let request = match LaunchRequest::for_host(config, args) {
        Ok(request) => request,
        Err(e) => {
            report(&e);
            return LAUNCH_FAILURE_CODE;
        }
    };

    match launcher::launch(&request).await {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            LAUNCH_FAILURE_CODE
        }
    }
}

fn report(error: &ShimError) {
    eprintln!("{} {}", colors::error_label(), error);
}
