//! devctl - a command-line tool for driving simulated devices.
//!
//! Usage:
//!   devctl install <app-path>      Install an application bundle
//!   devctl uninstall <bundle-id>   Remove an installed application
//!   devctl launch <bundle-id>      Launch an installed application
//!   devctl terminate <bundle-id>   Terminate a running application
//!   devctl record start <file>     Start recording the screen
//!   devctl record stop             Stop the active recording
//!   devctl stream [--fps N]        Stream frames to stdout
//!   devctl describe                Describe the target

use clap::{Parser, Subcommand};
use devctl::{
    Action, ActionPerformer, Command, Configuration, EventName, EventPhase, EventReporter,
    HelpRunner, HumanReporter, JsonReporter, OutputFormat, OutputOptions, OutputSink,
    ProcessDriver, RecordAction, Runner, SimulatedDevice, StderrSink, StdoutSink, StreamConfig,
    StreamFormat, TargetUdid,
};
use std::path::PathBuf;
use std::sync::Arc;

/// devctl - drive a simulated device from the command line
#[derive(Parser)]
#[command(name = "devctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Report events as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Print the resolved actions instead of executing them
    #[arg(long, global = true)]
    print: bool,

    /// Report the configuration before executing
    #[arg(short, long, global = true)]
    verbose: bool,

    /// UDID of the target device; a fresh simulated device otherwise
    #[arg(long, global = true, value_name = "UDID")]
    udid: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install an application bundle
    Install {
        /// Path to the application bundle
        #[arg(value_name = "APP_PATH")]
        app_path: PathBuf,
    },

    /// Remove an installed application
    Uninstall {
        /// Bundle identifier of the application
        #[arg(value_name = "BUNDLE_ID")]
        bundle_id: String,
    },

    /// Launch an installed application
    Launch {
        /// Bundle identifier of the application
        #[arg(value_name = "BUNDLE_ID")]
        bundle_id: String,
    },

    /// Terminate a running application
    Terminate {
        /// Bundle identifier of the application
        #[arg(value_name = "BUNDLE_ID")]
        bundle_id: String,
    },

    /// Control screen recording
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },

    /// Stream frames from the target
    Stream {
        /// Pixel format of the stream
        #[arg(long, default_value = "bgra")]
        format: String,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Describe the target
    Describe,
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Start recording to a file
    Start {
        /// Destination file for the recording
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Stop the active recording
    Stop,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Parse failures surface through the help path, not as a
            // command result.
            let to_stderr = err.use_stderr();
            let sink: Arc<dyn OutputSink> = if to_stderr {
                Arc::new(StderrSink)
            } else {
                Arc::new(StdoutSink)
            };
            Runner::Help(HelpRunner::new(sink, err.render().to_string().trim_end()))
                .run()
                .await;
            std::process::exit(if to_stderr { 2 } else { 0 });
        }
    };

    let code = execute(cli).await;
    std::process::exit(code);
}

async fn execute(cli: Cli) -> i32 {
    let action = match resolve_action(cli.command) {
        Ok(action) => action,
        Err(message) => {
            StderrSink.write_line(&message);
            return devctl::EXIT_FAILURE;
        }
    };

    let configuration = Configuration {
        output: OutputOptions {
            format: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Human
            },
            verbose: cli.verbose,
        },
        udid: cli.udid.map(TargetUdid::new),
        print_only: cli.print,
    };

    let target = match &configuration.udid {
        Some(udid) => SimulatedDevice::new(udid.clone()),
        None => SimulatedDevice::create(),
    };

    let sink = Arc::new(StdoutSink);
    let reporter: Arc<dyn EventReporter> = match configuration.output.format {
        OutputFormat::Human => Arc::new(HumanReporter::stdio()),
        OutputFormat::Json => Arc::new(JsonReporter::new(sink.clone())),
    };

    if configuration.output.verbose {
        reporter.report(EventName::Config, EventPhase::Discrete, &configuration.subject());
    }

    let command = Command::new(vec![action], configuration.clone());
    let performer = ActionPerformer::new(Arc::new(target), reporter, sink, configuration);
    ProcessDriver::new(performer).run(&command).await
}

fn resolve_action(command: Commands) -> Result<Action, String> {
    let action = match command {
        Commands::Install { app_path } => Action::Install { path: app_path },
        Commands::Uninstall { bundle_id } => Action::Uninstall {
            bundle_id: bundle_id.into(),
        },
        Commands::Launch { bundle_id } => Action::Launch {
            bundle_id: bundle_id.into(),
        },
        Commands::Terminate { bundle_id } => Action::Terminate {
            bundle_id: bundle_id.into(),
        },
        Commands::Record { action } => match action {
            RecordCommands::Start { file } => Action::Record(RecordAction::Start(file)),
            RecordCommands::Stop => Action::Record(RecordAction::Stop),
        },
        Commands::Stream { format, fps } => {
            let format: StreamFormat = format.parse()?;
            Action::Stream(StreamConfig { format, fps })
        }
        Commands::Describe => Action::Describe,
    };
    Ok(action)
}
