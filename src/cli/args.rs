use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "weighin", version, author, about = "A calm terminal companion for daily weight tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Start a session
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Record a weight (replaces any earlier entry for the same day)
    Record {
        /// Weight value
        weight: f64,
        /// Day of the measurement, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// kg or lb
        #[arg(long, default_value = "kg")]
        unit: String,
    },
    /// Show or set the target weight
    Target {
        /// New target in kg
        weight: Option<f64>,
    },
    /// View or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Profile wizard (nickname, gender, birth year, height, target)
    Setup {
        /// Run again even if already completed
        #[arg(long)]
        reset: bool,
    },
    /// Chart one week of weights
    Week {
        /// Weeks back from the current one
        #[arg(long, default_value_t = 0)]
        back: usize,
    },
    /// Show progress toward the target, BMI and the ideal range
    Progress,
    /// Export a weekly text summary to stdout
    Export,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Print the profile
    Show,
    /// Update one or more fields
    Set {
        #[arg(long)]
        nickname: Option<String>,
        /// male or female
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        birth_year: Option<i32>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
    },
}
