use crate::export::ReportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rTimeclock
#[derive(Parser)]
#[command(
    name = "rtimeclock",
    version = env!("CARGO_PKG_VERSION"),
    about = "A time clock CLI: clock in/out, breaks and remote work per user and day, stored in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this user (overrides `user` in the configuration)
    #[arg(global = true, long = "user", short = 'u')]
    pub user: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            requires = "edit_config",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Manage companies
    Company {
        #[command(subcommand)]
        action: CompanyCommand,
    },

    /// Manage departments
    Dept {
        #[command(subcommand)]
        action: DeptCommand,
    },

    /// Record a clock action for today
    Clock {
        /// clock-in, clock-out, break-start, break-end, remote-start or remote-end
        action: String,

        #[arg(long = "notes", short = 'n', help = "Optional note stored with the event")]
        notes: Option<String>,
    },

    /// Show the current clock status
    Status {
        #[arg(long = "json", help = "Print the status as JSON")]
        json: bool,

        #[arg(
            long = "watch",
            short = 'w',
            conflicts_with = "json",
            help = "Keep the elapsed time on screen, refreshed periodically"
        )]
        watch: bool,
    },

    /// Daily totals of work, break and remote time
    Report {
        #[arg(
            long,
            short,
            value_name = "PERIOD",
            help = "YYYY, YYYY-MM, YYYY-MM-DD or START:END (default: today)"
        )]
        period: Option<String>,

        #[arg(long = "for", value_name = "USER", help = "Report on another user")]
        for_user: Option<String>,

        #[arg(long, short = 'e', help = "List the individual events")]
        events: bool,

        #[arg(long, value_enum, help = "Output format (default from config)")]
        format: Option<ReportFormat>,

        #[arg(long, value_name = "FILE", help = "Write the report to FILE instead of stdout")]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user (the first user needs no --user)
    Add {
        name: String,

        #[arg(long, help = "superadmin, owner, admin or user")]
        role: String,
    },

    /// List the users you can see
    List,

    /// Assign a user to a department
    Assign {
        name: String,

        #[arg(long = "dept", help = "Department id")]
        dept: i64,
    },

    /// Remove a user from a department
    Unassign {
        name: String,

        #[arg(long = "dept", help = "Department id")]
        dept: i64,
    },

    /// Re-enable a deactivated user
    Activate { name: String },

    /// Prevent a user from opening sessions
    Deactivate { name: String },
}

#[derive(Subcommand)]
pub enum CompanyCommand {
    /// Create a company
    Add {
        name: String,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long, value_name = "USER", help = "Owner of the company (Superadmin only)")]
        owner: Option<String>,
    },

    /// List the companies you can see
    List,

    /// Change the name or industry of a company
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        industry: Option<String>,
    },

    /// Delete a company whose users are all inactive (Superadmin only)
    Delete { id: i64 },

    /// List the users of a company
    Members { id: i64 },
}

#[derive(Subcommand)]
pub enum DeptCommand {
    /// Create a department
    Add {
        name: String,

        #[arg(long = "company", help = "Company id")]
        company: i64,
    },

    /// List departments
    List {
        #[arg(long = "company", help = "Only this company")]
        company: Option<i64>,
    },

    /// Rename a department
    Edit {
        id: i64,

        #[arg(long)]
        name: String,
    },

    /// Delete a department and its user assignments
    Delete { id: i64 },

    /// List the users of a department
    Members { id: i64 },
}
