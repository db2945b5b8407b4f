use crate::*;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

#[cfg(feature = "bin")]
pub mod bin {
    use super::*;
    use clap::Parser;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    #[derive(Debug, Parser)]
    #[command(version, about = env!("CARGO_PKG_DESCRIPTION"))]
    struct Args {
        /// Prints extra information after every premise: `truths` or `stats`
        #[clap(long, default_value_t = RunMode::Normal)]
        show: RunMode,
        /// Keeps accumulating premises after a contradiction instead of freezing the facts
        #[clap(long)]
        independent_premises: bool,
        /// Only prints the final verdict of each proof
        #[clap(long)]
        no_messages: bool,
        /// The proof files to check. Reads statements from stdin when empty
        inputs: Vec<PathBuf>,
    }

    /// Start the command-line interface.
    ///
    /// Exits with 0 when every proof is valid, 1 when one is invalid and 2 when
    /// a file cannot be read or parsed.
    pub fn cli(mut config: VerifierConfig) -> ExitCode {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .format_timestamp(None)
            .format_target(false)
            .parse_default_env()
            .init();

        let args = Args::parse();
        if args.independent_premises {
            config.freeze_on_contradiction = false;
        }
        let mut report = TextReport::new(io::stdout().lock(), args.show);
        if args.no_messages {
            report.disable_messages();
        }

        if args.inputs.is_empty() {
            log::info!("Welcome to proofcheck! (version {})", env!("CARGO_PKG_VERSION"));
            let mut verifier = Verifier::new(config);
            return match verifier.repl_with(io::stdin(), &mut report) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::from(1),
                Err(err) => {
                    log::error!("{err}");
                    ExitCode::from(2)
                }
            };
        }

        let mut all_valid = true;
        for input in &args.inputs {
            let mut verifier = Verifier::new(config.clone());
            match check_file(&mut verifier, input, &mut report) {
                Ok(valid) => all_valid &= valid,
                Err(err) => {
                    log::error!("{err}");
                    return ExitCode::from(2);
                }
            }
        }

        if all_valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }

    fn check_file(
        verifier: &mut Verifier,
        input: &Path,
        report: &mut dyn EventHandler,
    ) -> Result<bool, Error> {
        let program = std::fs::read_to_string(input)
            .map_err(|err| Error::IoError(input.to_path_buf(), err))?;
        log::info!("Checking {}", input.display());
        let statements = parse_program(Some(input.to_string_lossy().into_owned()), &program)?;
        verifier.run_program(&statements, report)
    }
}

impl Verifier {
    /// Reads statements from `input` and checks each one as soon as it is complete.
    ///
    /// A statement may continue over several lines. An empty line forces the
    /// pending text to be checked, reporting a parse error if it is malformed.
    /// The final verdict is reported at the end of the input.
    pub fn repl_with<R>(&mut self, input: R, handler: &mut dyn EventHandler) -> Result<bool, Error>
    where
        R: Read,
    {
        let mut cmd_buffer = String::new();

        for line in BufReader::new(input).lines() {
            let line_str = line.map_err(|err| Error::IoError(PathBuf::from("<stdin>"), err))?;
            let blank = line_str.trim().is_empty();
            cmd_buffer.push_str(&line_str);
            cmd_buffer.push('\n');
            if cmd_buffer.trim().is_empty() {
                cmd_buffer.clear();
                continue;
            }
            match parse_program(None, &cmd_buffer) {
                Ok(statements) => {
                    for statement in &statements {
                        self.run_statement_with(statement, handler)?;
                    }
                    cmd_buffer.clear();
                }
                Err(err) if blank => {
                    log::error!("{err}");
                    cmd_buffer.clear();
                }
                // the statement may continue on the next line
                Err(_) => {}
            }
        }

        if !cmd_buffer.trim().is_empty() {
            match parse_program(None, &cmd_buffer) {
                Ok(statements) => {
                    for statement in &statements {
                        self.run_statement_with(statement, handler)?;
                    }
                }
                Err(err) => log::error!("{err}"),
            }
        }

        handler.handle_event(&self.verdict())?;
        Ok(self.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> (bool, String) {
        let mut verifier = Verifier::default();
        let mut report = TextReport::new(Vec::new(), RunMode::Normal);
        let valid = verifier.repl_with(input.as_bytes(), &mut report).unwrap();
        (valid, String::from_utf8(report.into_inner()).unwrap())
    }

    #[test]
    fn test_repl() {
        let (valid, out) = session("P[1] p\nC[1] p\n");
        assert!(valid);
        assert_eq!(
            out,
            "P1. p\n\tThis entails\t[p].\nC1. p\n\tC1 is correct.\nThe proof is valid.\n"
        );

        let (valid, out) = session("\n\n\n");
        assert!(valid);
        assert_eq!(out, "The proof is valid.\n");
    }

    #[test]
    fn repl_statement_spanning_lines() {
        let (valid, out) = session("P[1] p &\n  q\nC[1] q");
        assert!(valid);
        assert!(out.starts_with("P1. (p & q)\n"));
        assert!(out.contains("C1 is correct."));
    }

    #[test]
    fn repl_discards_malformed_text_on_blank_line() {
        let (valid, out) = session("P[1] p & &\n\nC[1] r\n");
        assert!(!valid);
        assert!(!out.contains("P1."));
        assert!(out.contains("C1 has not been shown."));
        assert!(out.ends_with("The proof is invalid.\n"));
    }
}
