use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};

use jobnet::sim::{ContractCall, Simulator, Tx};

#[derive(Parser)]
#[command(
    name = "jobnet-cli",
    version,
    about = "Drive the reputation-gated job network against a local chain file"
)]
struct Cli {
    /// Chain state file; created by `init`.
    #[arg(long, global = true, default_value = "jobnet.chain.json")]
    chain: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a fresh chain file.
    Init,
    /// Register a profile for the caller address.
    CreateProfile {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        username: String,
        /// Repeat for each skill tag.
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    /// Post a job as an employer with an existing profile.
    PostJob {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        budget: u64,
        #[arg(long)]
        required_reputation: u64,
        #[arg(long = "skill")]
        required_skills: Vec<String>,
        /// Block height after which applications close.
        #[arg(long)]
        deadline: u64,
    },
    /// Apply to an open job.
    Apply {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        job: u64,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long)]
        budget: u64,
        /// Estimated duration in days.
        #[arg(long)]
        duration: u64,
    },
    /// Assign an open job to a freelancer (employer only).
    Assign {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        job: u64,
        #[arg(long)]
        freelancer: String,
    },
    /// Mark an assigned job completed and award the freelancer (employer only).
    Complete {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        job: u64,
    },
    /// Show a profile.
    Profile { address: String },
    /// Show a job posting.
    Job { id: u64 },
    /// List applications for a job.
    Applications { job: u64 },
    /// Print the full snapshot with its state root.
    Snapshot,
    /// Advance the chain height without transactions.
    MineEmpty {
        #[arg(default_value_t = 1)]
        count: u64,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("chain file {path} not found; run `jobnet-cli init` first")]
    ChainMissing { path: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn load_chain(path: &Path) -> Result<Simulator, CliError> {
    if !path.exists() {
        return Err(CliError::ChainMissing {
            path: path.display().to_string(),
        });
    }
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn save_chain(path: &Path, sim: &Simulator) -> Result<(), CliError> {
    fs::write(path, serde_json::to_vec_pretty(sim)?)?;
    Ok(())
}

/// Mine a one-transaction block, print its receipt, persist the chain.
fn submit(path: &Path, sender: String, call: ContractCall) -> Result<(), CliError> {
    let mut sim = load_chain(path)?;
    let block = sim.mine_block(vec![Tx { sender, call }]);
    println!("{}", serde_json::to_string_pretty(&block.receipts[0])?);
    save_chain(path, &sim)?;
    if !block.receipts[0].result.is_ok() {
        exit(1);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let chain = cli.chain.as_path();
    match cli.command {
        Command::Init => {
            save_chain(chain, &Simulator::new())?;
            println!("initialized chain at {}", chain.display());
            Ok(())
        }
        Command::CreateProfile {
            caller,
            username,
            skills,
        } => submit(
            chain,
            caller,
            ContractCall::CreateUserProfile { username, skills },
        ),
        Command::PostJob {
            caller,
            title,
            description,
            budget,
            required_reputation,
            required_skills,
            deadline,
        } => submit(
            chain,
            caller,
            ContractCall::PostJob {
                title,
                description,
                budget,
                required_reputation,
                required_skills,
                deadline,
            },
        ),
        Command::Apply {
            caller,
            job,
            message,
            budget,
            duration,
        } => submit(
            chain,
            caller,
            ContractCall::ApplyForJob {
                job_id: job,
                cover_message: message,
                proposed_budget: budget,
                estimated_duration: duration,
            },
        ),
        Command::Assign {
            caller,
            job,
            freelancer,
        } => submit(
            chain,
            caller,
            ContractCall::AssignJob {
                job_id: job,
                freelancer,
            },
        ),
        Command::Complete { caller, job } => {
            submit(chain, caller, ContractCall::CompleteJob { job_id: job })
        }
        Command::Profile { address } => {
            let sim = load_chain(chain)?;
            match sim.network().get_user_profile(&address) {
                Some(profile) => print_json(profile),
                None => {
                    eprintln!("no profile for {address}");
                    exit(1);
                }
            }
        }
        Command::Job { id } => {
            let sim = load_chain(chain)?;
            match sim.network().get_job(id) {
                Some(job) => print_json(job),
                None => {
                    eprintln!("no job {id}");
                    exit(1);
                }
            }
        }
        Command::Applications { job } => {
            let sim = load_chain(chain)?;
            print_json(&sim.network().applications_for_job(job))
        }
        Command::Snapshot => {
            let sim = load_chain(chain)?;
            print_json(&sim.snapshot())
        }
        Command::MineEmpty { count } => {
            let mut sim = load_chain(chain)?;
            sim.mine_empty_blocks(count);
            save_chain(chain, &sim)?;
            println!("height = {}", sim.height());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        exit(1);
    }
}
