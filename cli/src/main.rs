use chess_client::{AuthScheme, ClientConfig, ClientError, Session, SessionClient, TeamColor};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "chess-cli", about = "Chess server account and game CLI")]
struct Cli {
    /// Overrides `CHESS_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Token printed by an earlier `login` or `register`.
    #[arg(long, env = "CHESS_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Send `Authorization: Bearer <token>`; overrides `CHESS_AUTH_SCHEME`.
    #[arg(long, default_value_t = false)]
    bearer: bool,

    /// Overrides `CHESS_REQUEST_TIMEOUT_SECS`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Log session transitions to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and print the issued token.
    Register {
        username: String,
        password: String,
        email: String,
    },
    /// Log in and print the issued token.
    Login {
        username: String,
        password: String,
    },
    Logout,
    Game(GameCommand),
}

#[derive(Args, Debug)]
struct GameCommand {
    #[command(subcommand)]
    command: GameSubcommand,
}

#[derive(Subcommand, Debug)]
enum GameSubcommand {
    List,
    Create {
        name: String,
    },
    Join {
        game_id: i32,
        /// `white` or `black`.
        color: TeamColor,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let client = build_client(&cli, ClientConfig::from_env()?)?;
    match cli.command {
        Command::Register { username, password, email } => {
            let session = client.register(&username, &password, &email).await?;
            print_session(&session)
        }
        Command::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            print_session(&session)
        }
        Command::Logout => {
            client.logout().await?;
            eprintln!("logged out");
            Ok(())
        }
        Command::Game(game) => run_game(&client, game).await,
    }
}

/// Apply the flags that were given on top of the environment config.
fn apply_flags(cli: &Cli, mut config: ClientConfig) -> ClientConfig {
    if let Some(base_url) = &cli.base_url {
        config.base_url = ClientConfig::new(base_url.as_str()).base_url;
    }
    if let Some(request_secs) = cli.timeout_secs {
        config.timeouts.request_secs = request_secs;
    }
    if cli.bearer {
        config.auth_scheme = AuthScheme::Bearer;
    }
    config
}

fn build_client(cli: &Cli, env_config: ClientConfig) -> Result<SessionClient, CliError> {
    let config = apply_flags(cli, env_config);
    tracing::debug!(base_url = %config.base_url, scheme = ?config.auth_scheme, "client configured");

    let client = SessionClient::new(config)?;
    Ok(match &cli.auth_token {
        Some(token) => client.with_auth_token(token.as_str()),
        None => client,
    })
}

async fn run_game(client: &SessionClient, game: GameCommand) -> Result<(), CliError> {
    match game.command {
        GameSubcommand::List => {
            let games = client.list_games().await?;
            print_json(&serde_json::to_value(games)?)
        }
        GameSubcommand::Create { name } => {
            let game_id = client.create_game(&name).await?;
            print_json(&serde_json::json!({ "gameID": game_id }))
        }
        GameSubcommand::Join { game_id, color } => {
            client.join_game(game_id, color).await?;
            eprintln!("joined game {game_id} as {color}");
            Ok(())
        }
    }
}

fn print_session(session: &Session) -> Result<(), CliError> {
    print_json(&session_json(session))
}

fn session_json(session: &Session) -> Value {
    serde_json::json!({
        "baseUrl": session.base_url(),
        "authToken": session.auth_token(),
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
