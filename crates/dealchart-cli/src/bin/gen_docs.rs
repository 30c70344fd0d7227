//! Binary that emits command-line options markdown to stdout.
//!
//! The output is meant to replace `docs/command-line-options.md`.

fn main() {
    print!("{}", dealchart_cli::render_options_markdown());
}
