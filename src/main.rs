use std::process::ExitCode;

use proofcheck::VerifierConfig;

fn main() -> ExitCode {
    proofcheck::cli(VerifierConfig::default())
}
