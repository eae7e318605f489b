//! chorda - a modal key-chord menu.
//!
//! Compiles a `.wks`-style source into a chord tree and dispatches
//! keystrokes against it. Graphical frontends live out of tree; this binary
//! covers compilation, transpilation, and `--press` resolution.

mod default_chords;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chorda_api::{Color, ColorRole, MenuConfig, MenuPosition, MenuStatus};
use chorda_kernel::chord::ChordTree;
use chorda_kernel::menu::Menu;
use chorda_kernel::{compile, transpiler};
use tracing::{debug, error, warn};

const EX_OK: u8 = 0;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

const USAGE: &str = "\
usage: chorda [options]

Options:
    -h, --help                 Display help message and exit.
    -v, --version              Display version number and exit.
    -D, --debug                Print debug information.
    -t, --top                  Position menu at top of screen.
    -b, --bottom               Position menu at bottom of screen.
    -s, --script               Read menu source from stdin.
    -d, --delimiter STRING     Set delimiter to STRING.
    -m, --max-cols NUM         Set maximum columns to NUM.
    -k, --press KEY(s)         Press KEY(s) before displaying the menu.
    -p, --parse FILE           Parse FILE and print precompiled chords to stdout.
    -c, --chords FILE          Use FILE for chords rather than the builtins.
    --win-width NUM            Set menu width to NUM.
    --win-height NUM           Accepted for compatibility; height follows content.
    --border-width NUM         Set border width to NUM.
    --fg COLOR                 Set menu foreground to COLOR, i.e. '#AABBCC'.
    --bg COLOR                 Set menu background to COLOR, i.e. '#AABBCC'.
    --bd COLOR                 Set menu border to COLOR, i.e. '#AABBCC'.
    --shell STRING             Set shell to STRING, i.e. '/bin/sh'.
    --font STRING              Set font to STRING.
";

/// Parsed command-line options; `None` means "leave the config alone".
#[derive(Default)]
struct Cli {
    debug: bool,
    position: Option<MenuPosition>,
    script: bool,
    delimiter: Option<String>,
    max_cols: Option<u32>,
    press: Option<String>,
    parse: Option<PathBuf>,
    chords: Option<PathBuf>,
    menu_width: Option<i32>,
    border_width: Option<u32>,
    foreground: Option<String>,
    background: Option<String>,
    border: Option<String>,
    shell: Option<String>,
    font: Option<String>,
}

fn main() -> ExitCode {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(message) => {
            eprint!("{USAGE}");
            eprintln!("[ERROR] {message}");
            return ExitCode::FAILURE;
        }
    };

    let filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(run(cli))
}

fn run(cli: Cli) -> u8 {
    if let Some(path) = cli.parse.clone() {
        return transpile(&cli, &path);
    }
    if cli.script {
        return run_script(&cli);
    }
    if let Some(path) = cli.chords.clone() {
        return run_chords_file(&cli, &path);
    }
    run_builtins(&cli)
}

fn parse_args() -> std::result::Result<Cli, String> {
    let mut cli = Cli::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value_for = |name: &str| {
            args.next()
                .ok_or_else(|| format!("'{name}' requires an argument but none given."))
        };

        match arg.as_str() {
            "-h" | "--help" => {
                eprint!("{USAGE}");
                std::process::exit(0);
            }
            "-v" | "--version" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-D" | "--debug" => cli.debug = true,
            "-t" | "--top" => cli.position = Some(MenuPosition::Top),
            "-b" | "--bottom" => cli.position = Some(MenuPosition::Bottom),
            "-s" | "--script" => cli.script = true,

            "-d" | "--delimiter" => cli.delimiter = Some(value_for(&arg)?),
            "-m" | "--max-cols" => cli.max_cols = Some(parse_num(&value_for(&arg)?)?),
            "-k" | "--press" => cli.press = Some(value_for(&arg)?),
            "-p" | "--parse" => cli.parse = Some(PathBuf::from(value_for(&arg)?)),
            "-c" | "--chords" => cli.chords = Some(PathBuf::from(value_for(&arg)?)),

            "--win-width" => cli.menu_width = Some(parse_num(&value_for(&arg)?)?),
            "--win-height" => {
                /* logging is not up yet while args are parsed */
                let _ = value_for(&arg)?;
                eprintln!("[WARNING] --win-height is ignored; menu height follows the row count.");
            }
            "--border-width" => cli.border_width = Some(parse_num(&value_for(&arg)?)?),
            "--fg" => cli.foreground = Some(value_for(&arg)?),
            "--bg" => cli.background = Some(value_for(&arg)?),
            "--bd" => cli.border = Some(value_for(&arg)?),
            "--shell" => cli.shell = Some(value_for(&arg)?),
            "--font" => cli.font = Some(value_for(&arg)?),

            other => return Err(format!("Unrecognized option: '{other}'.")),
        }
    }

    Ok(cli)
}

fn parse_num<T: std::str::FromStr>(text: &str) -> std::result::Result<T, String> {
    text.parse()
        .map_err(|_| format!("Could not convert '{text}' into a number."))
}

/// Fold command-line overrides into the config. Source directives run later
/// during compilation, so a directive wins over its command-line twin.
fn apply_cli(cli: &Cli, config: &mut MenuConfig) {
    config.debug |= cli.debug;
    if let Some(position) = cli.position {
        config.position = position;
    }
    if let Some(delimiter) = &cli.delimiter {
        config.delimiter = delimiter.clone();
    }
    if let Some(max_cols) = cli.max_cols {
        config.max_cols = max_cols;
    }
    if let Some(menu_width) = cli.menu_width {
        config.menu_width = menu_width;
    }
    if let Some(border_width) = cli.border_width {
        config.border_width = border_width;
    }
    if let Some(shell) = &cli.shell {
        config.shell = shell.clone();
    }
    if let Some(font) = &cli.font {
        config.font = font.clone();
    }

    let mut apply_color = |text: &Option<String>, roles: &[ColorRole]| {
        if let Some(text) = text {
            match Color::parse(text) {
                Ok(color) => {
                    for role in roles {
                        config.colors.set(*role, color);
                    }
                }
                Err(err) => warn!("{err}"),
            }
        }
    };
    apply_color(
        &cli.foreground,
        &[
            ColorRole::Key,
            ColorRole::Delimiter,
            ColorRole::Prefix,
            ColorRole::Chord,
            ColorRole::Title,
            ColorRole::Goto,
        ],
    );
    apply_color(&cli.background, &[ColorRole::Background]);
    apply_color(&cli.border, &[ColorRole::Border]);
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Could not read file '{}'.", path.display()))
}

/// `--parse FILE`: compile and print the precompiled-chords module.
fn transpile(cli: &Cli, path: &Path) -> u8 {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            error!("{err:#}");
            return EX_IOERR;
        }
    };

    let mut config = MenuConfig::default();
    apply_cli(cli, &mut config);

    match compile(&source, Some(path), &mut config) {
        Ok(compilation) => {
            print!("{}", transpiler::emit(&compilation.tree, &config));
            EX_OK
        }
        Err(err) => {
            error!("{err}");
            EX_DATAERR
        }
    }
}

/// `--script`: read the menu source from stdin.
fn run_script(cli: &Cli) -> u8 {
    let mut source = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut source) {
        error!("Could not read script from stdin: {err}.");
        return EX_IOERR;
    }

    let mut config = MenuConfig::default();
    apply_cli(cli, &mut config);

    match compile(&source, None, &mut config) {
        Ok(compilation) => run_menu(cli, config, &compilation.tree),
        Err(err) => {
            error!("{err}");
            EX_DATAERR
        }
    }
}

/// `--chords FILE`: compile FILE and run it.
fn run_chords_file(cli: &Cli, path: &Path) -> u8 {
    let source = match read_file(path) {
        Ok(source) => source,
        Err(err) => {
            error!("{err:#}");
            return EX_IOERR;
        }
    };

    let mut config = MenuConfig::default();
    apply_cli(cli, &mut config);

    match compile(&source, Some(path), &mut config) {
        Ok(compilation) => run_menu(cli, config, &compilation.tree),
        Err(err) => {
            error!("{err}");
            EX_DATAERR
        }
    }
}

/// Default mode: run the chords compiled into the binary.
fn run_builtins(cli: &Cli) -> u8 {
    let mut config = default_chords::menu_config();
    apply_cli(cli, &mut config);
    let tree = default_chords::builtin_key_chords();
    run_menu(cli, config, &tree)
}

fn run_menu(cli: &Cli, config: MenuConfig, tree: &ChordTree) -> u8 {
    let mut menu = Menu::new(config, tree);

    if let Some(keys) = &cli.press {
        match menu.press_keys(keys) {
            MenuStatus::ExitOk => {
                debug!("successfully pressed keys: '{keys}'");
                return EX_OK;
            }
            MenuStatus::ExitSoftware => return EX_DATAERR,
            MenuStatus::Running | MenuStatus::Damaged => {}
        }
    }

    display_menu(&menu)
}

/// Hand off to a windowing backend. None are compiled into this build; the
/// Wayland and X11 frontends link against `chorda-kernel` out of tree.
fn display_menu(menu: &Menu) -> u8 {
    if std::env::var_os("WAYLAND_DISPLAY").is_some()
        || std::env::var_os("WAYLAND_SOCKET").is_some()
    {
        debug!("wayland session detected");
    }

    let view = menu.view();
    debug!(
        cells = view.cells.len(),
        rows = view.rows,
        cols = view.cols,
        "menu ready to display"
    );

    error!("No display backend available in this build; use --press or --parse.");
    EX_SOFTWARE
}
