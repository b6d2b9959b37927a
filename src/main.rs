use clap::{Parser, Subcommand};

use rentbuy::api::{self, ProjectArgs, SolveArgs, build_assumptions, build_solve_config};
use rentbuy::core::{run_projection, solve_goal};
use rentbuy::error::{AppError, AppResult};
use rentbuy::report::{render_projection, render_solve};

#[derive(Parser, Debug)]
#[command(
    name = "rentbuy",
    about = "Rent vs. buy projection: cumulative costs, portfolio, equity and breakeven year"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a year-by-year projection.
    Project {
        #[command(flatten)]
        args: ProjectArgs,
        #[arg(long, help = "Print the projection as JSON instead of a table")]
        json: bool,
    },
    /// Solve for the rent or appreciation at which buying breaks even.
    Solve {
        #[command(flatten)]
        args: SolveArgs,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> AppResult<()> {
    match command {
        Command::Serve { port } => api::run_http_server(port).await,
        Command::Project { args, json } => {
            let projection = run_projection(&build_assumptions(&args));
            if json {
                let body = serde_json::to_string_pretty(&projection).map_err(AppError::Render)?;
                println!("{body}");
            } else {
                print!("{}", render_projection(&projection));
            }
            Ok(())
        }
        Command::Solve { args } => {
            let (assumptions, config) = build_solve_config(&args);
            let result = solve_goal(&assumptions, config)?;
            print!("{}", render_solve(&result));
            Ok(())
        }
    }
}
