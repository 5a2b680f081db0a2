mod commands;
mod terminal;

use commands::CommandLine;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose)?;

    commands::scan::scan(&commands).await
}
