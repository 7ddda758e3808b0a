// partsim: memory partitioning simulator with a terminal UI

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{backend::CrosstermBackend, Terminal};

use partsim::allocator::{DynamicOptions, Mode};
use partsim::memory::MemorySpace;
use partsim::simulation::Simulation;
use partsim::ui::logger::EventLogger;
use partsim::ui::App;

/// Settings taken from the command line
struct CliOptions {
    mode: Mode,
    dynamic: DynamicOptions,
    log_level: LevelFilter,
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} [options]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --mode <static|dynamic>     Initial partitioning mode (default: dynamic)");
    eprintln!("  --fit <first|best|worst>    Fit algorithm for dynamic mode (default: first)");
    eprintln!("  --no-coalesce               Keep free neighbours separate after deallocation");
    eprintln!("  --log-level <level>         error, warn, info, debug or trace (default: info)");
    eprintln!("  -h, --help                  Show this message");
}

fn parse_args(args: &[String]) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions {
        mode: Mode::Dynamic,
        dynamic: DynamicOptions::default(),
        log_level: LevelFilter::Info,
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .ok_or_else(|| format!("missing value for {}", flag))
        };
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--mode" => options.mode = value("--mode")?.parse()?,
            "--fit" => options.dynamic.fit = value("--fit")?.parse()?,
            "--no-coalesce" => options.dynamic.coalesce = false,
            "--log-level" => {
                let level = value("--log-level")?;
                options.log_level = level
                    .parse()
                    .map_err(|_| format!("unknown log level '{}'", level))?;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
    }

    Ok(Some(options))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("partsim");

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage(program_name);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(program_name);
            std::process::exit(1);
        }
    };

    EventLogger::init(options.log_level).map_err(|e| e.to_string())?;

    let simulation = Simulation::new(MemorySpace::default(), options.mode, options.dynamic)?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(simulation);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
