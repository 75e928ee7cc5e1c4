mod config;
mod error;

use clap::{Parser, Subcommand};
use monzo_oauth::{Account, AuthorizedClient, Pot, Transaction, UserAggregate};

use crate::error::{CliError, Result};

#[derive(Parser, Debug)]
#[command(name = "monzo_cli")]
#[command(about = "Authorize against Monzo and inspect accounts, pots and transactions")]
struct Cli {
    #[command(flatten)]
    config: config::ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the URL the user must visit to authorize this client.
    AuthLink {
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange the code from the redirect for credentials.
    Exchange {
        code: String,
    },
    /// Trade the stored refresh token for a new access token.
    Refresh,
    /// List accounts.
    Accounts,
    /// List pots.
    Pots,
    /// Balance of one account, or the total over accounts and pots.
    Balance {
        #[arg(long)]
        account_id: Option<String>,
    },
    /// List the transactions of an account.
    Transactions {
        #[arg(long)]
        account_id: String,
        /// Expand merchant details.
        #[arg(long)]
        expand: bool,
    },
    /// Show one transaction.
    Transaction {
        id: String,
    },
    /// Raw authenticated GET; options as `key=value`.
    Query {
        path: String,
        #[arg(long = "option", short = 'o')]
        options: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "monzo_cli={level},monzo_oauth={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let client = settings.client()?;
    run(cli.command, &client).await
}

async fn run(command: Command, client: &AuthorizedClient) -> Result<()> {
    if needs_authorization(&command) && !client.authorized() {
        tracing::warn!("not authorized yet: run `auth-link` then `exchange <code>`");
    } else if client.is_expired() {
        tracing::warn!("access token expired: run `refresh`");
    }

    match command {
        Command::AuthLink { state } => {
            let url = match state {
                Some(state) => client.get_auth_link_with_state(&state),
                None => client.get_auth_link(),
            };
            println!("{url}");
        }
        Command::Exchange { code } => {
            let credentials = client.exchange_code(&code).await?;
            println!(
                "authorized, token expires at {}",
                credentials
                    .token_expiry
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
        Command::Refresh => {
            client.refresh_credentials().await?;
            println!("access token refreshed");
        }
        Command::Accounts => {
            let user = UserAggregate::new(client);
            for account in user.get_accounts().await? {
                let closed = if account.closed { " (closed)" } else { "" };
                println!(
                    "{}  {}  opened {}{closed}",
                    account.id,
                    account.description,
                    account.created.date_naive()
                );
            }
        }
        Command::Pots => {
            let user = UserAggregate::new(client);
            for pot in user.get_pots().await? {
                print_pot(pot);
            }
        }
        Command::Balance { account_id } => match account_id {
            Some(id) => {
                let account = Account::fetch(client, &id).await?;
                println!("balance:     {}", account.balance().await?);
                println!("spent today: {}", account.spent_today().await?);
            }
            None => {
                let user = UserAggregate::new(client);
                println!("total: {}", user.get_total_balance().await?);
            }
        },
        Command::Transactions { account_id, expand } => {
            let account = Account::fetch(client, &account_id).await?;
            if expand {
                for tx in account.transactions_expanded().await? {
                    print_transaction(&tx);
                }
            } else {
                for tx in account.transactions().await? {
                    print_transaction(tx);
                }
            }
        }
        Command::Transaction { id } => {
            let tx = Transaction::fetch(client, &id).await?;
            print_transaction(&tx);
            if !tx.notes.is_empty() {
                println!("  notes: {}", tx.notes);
            }
        }
        Command::Query { path, options } => {
            let options = parse_options(&options)?;
            let pairs: Vec<(&str, &str)> = options
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            let value = client.query(&path, &pairs).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn needs_authorization(command: &Command) -> bool {
    !matches!(command, Command::AuthLink { .. } | Command::Exchange { .. })
}

fn parse_options(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|option| {
            option
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| CliError::Usage(format!("expected key=value, got {option:?}")))
        })
        .collect()
}

fn print_pot(pot: &Pot) {
    let deleted = if pot.deleted { " (deleted)" } else { "" };
    println!("{}  {}  {}{deleted}", pot.id, pot.name, pot.balance());
}

fn print_transaction(tx: &Transaction) {
    let status = if tx.settled { "settled" } else { "pending" };
    let merchant = tx.merchant_name().unwrap_or(&tx.description);
    println!(
        "{}  {}  {:>14}  {status:<7}  {merchant}",
        tx.id,
        tx.created.format("%Y-%m-%d %H:%M"),
        tx.amount().to_string()
    );
}
