use std::env;
use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use osh::Interpreter;

#[derive(FromArgs)]
/// A small interactive shell front end.
struct Options {
    /// directory to use as the shell home; defaults to the working directory
    /// the shell was started from
    #[argh(option)]
    home: Option<PathBuf>,
}

fn main() -> Result<()> {
    let options: Options = argh::from_env();
    let home = options.home.or_else(|| env::current_dir().ok());
    Interpreter::new(home).repl()
}
