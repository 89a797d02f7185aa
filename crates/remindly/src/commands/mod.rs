//! Command handlers, one module per subcommand.

pub mod auth_state;
pub mod config_cmd;
pub mod discover;
pub mod info;
pub mod run;
pub mod signout;
pub mod status;
mod util;

use crate::cli::{Cli, Command, CompletionsArgs};
use crate::config::Context;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Run(_) => run::handle(ctx).await,
        Command::Discover => discover::handle(ctx).await,
        Command::Status(args) => status::handle(&args, ctx).await,
        Command::Info => info::handle(ctx),
        Command::AuthState => auth_state::handle(ctx),
        Command::Signout => signout::handle(ctx),
        Command::Config(args) => config_cmd::handle(args, ctx),
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }
    }
}

fn completions(args: &CompletionsArgs) {
    use clap::CommandFactory;

    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "remindly", &mut std::io::stdout());
}
