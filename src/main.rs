use factorioctl::args::{Cli, Cmd};
use factorioctl::config::Config;
use factorioctl::error::FatalError;
use factorioctl::manager::ServerManager;
use factorioctl::rcon::RconClient;
use factorioctl::server::StackServer;
use factorioctl::stack::CloudFormation;
use factorioctl::state::ServerState;

fn main() -> std::process::ExitCode {
    let cli: Cli = clap::Parser::parse();
    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprint!("Error: {}", factorioctl::util::aggregate_error_tree(&err, 2));
            std::process::ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), FatalError> {
    let config: Config = Config::load(cli.config.as_deref())?;
    let level: log::LevelFilter = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level
    };
    let _logger: log4rs::Handle = factorioctl::logging::init_logger(level)?;

    let stack: CloudFormation = CloudFormation::connect(config.region.clone())?;
    let server: StackServer<CloudFormation> =
        StackServer::with_launch_arguments(stack, config.stack_name.clone(), config.launch_arguments.clone());
    let mut manager: ServerManager<StackServer<CloudFormation>> = ServerManager::new(server);
    if let Some(console) = config.console {
        log::debug!("RCON configured at {}", console.endpoint);
        let client: RconClient = RconClient::new(console.endpoint, console.timeout);
        manager.set_console_configuration(Box::new(client), console.password);
    }

    match cli.cmd {
        Cmd::State => {
            let state: ServerState = manager.state();
            if cli.json {
                println!("{}", serde_json::json!({ "state": state }));
            } else {
                println!("{state}");
            }
        }
        Cmd::Start => {
            manager.start()?;
            log::info!("Start requested for stack {}", config.stack_name);
        }
        Cmd::Stop => {
            manager.stop()?;
            log::info!("Stop requested for stack {}", config.stack_name);
        }
        Cmd::Players => {
            let players: Vec<String> = manager.players()?;
            if cli.json {
                println!("{}", serde_json::json!({ "players": players }));
            } else {
                for player in &players {
                    println!("{player}");
                }
            }
        }
    }

    return Ok(());
}
