//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// BrewMaster SIGB - Brewery inventory and point-of-sale backend
#[derive(Parser, Debug)]
#[command(name = "brewmaster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create the first administrator account
    CreateAdmin(CreateAdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "4000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the create-admin command
#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    /// Chilean RUT, e.g. 12.345.678-5
    #[arg(long)]
    pub rut: String,

    #[arg(long)]
    pub nombre: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "ADMIN_PASSWORD")]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["brewmaster", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert!(!args.host.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_create_admin_args() {
        let cli = Cli::try_parse_from([
            "brewmaster",
            "create-admin",
            "--rut",
            "12.345.678-5",
            "--nombre",
            "Admin",
            "--email",
            "admin@brewmaster.cl",
            "--password",
            "secreto123",
        ])
        .unwrap();
        match cli.command {
            Commands::CreateAdmin(args) => {
                assert_eq!(args.rut, "12.345.678-5");
                assert_eq!(args.email, "admin@brewmaster.cl");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
