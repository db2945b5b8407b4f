use std::path::PathBuf;

use hashbrown::HashSet;
use libtest_mimic::Trial;
use proofcheck::*;

#[derive(Clone)]
struct Run {
    path: PathBuf,
    freeze_on_contradiction: bool,
}

impl Run {
    fn run(&self) {
        let _ = env_logger::builder().is_test(true).try_init();
        let program = std::fs::read_to_string(&self.path)
            .unwrap_or_else(|err| panic!("Couldn't read {:?}: {:?}", self.path, err));

        let mut verifier = Verifier::new(VerifierConfig {
            freeze_on_contradiction: self.freeze_on_contradiction,
        });
        let events = verifier
            .parse_and_run_program(self.path.to_str().map(String::from), &program)
            .unwrap_or_else(|err| panic!("Top level error: {err}"));
        for event in &events {
            log::info!("  {}", event);
        }

        let valid = events
            .last()
            .map(|event| *event == Event::FinalVerdict { valid: true })
            .unwrap_or(false);
        if self.should_fail() && valid {
            panic!(
                "Proof should have been invalid! Instead, logged:\n{}",
                events
                    .iter()
                    .map(|event| event.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        if !self.should_fail() && !valid {
            let failures = events
                .iter()
                .filter(|event| event.is_failure())
                .map(|event| event.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            panic!("Proof should have been valid!\n{failures}");
        }
    }

    fn into_trial(self) -> Trial {
        let name = self.name().to_string();
        Trial::test(name, move || {
            self.run();
            Ok(())
        })
    }

    fn name(&self) -> impl std::fmt::Display + '_ {
        struct Wrapper<'a>(&'a Run);
        impl std::fmt::Display for Wrapper<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.0.should_fail() {
                    write!(f, "invalid/")?;
                }
                let stem = self.0.path.file_stem().unwrap();
                let stem_str = stem.to_string_lossy().replace(['.', '-', ' '], "_");
                write!(f, "{stem_str}")?;
                if !self.0.freeze_on_contradiction {
                    write!(f, "_independent")?;
                }
                Ok(())
            }
        }
        Wrapper(self)
    }

    fn should_fail(&self) -> bool {
        self.path.parent().unwrap().ends_with("invalid")
    }
}

fn generate_tests(glob: &str) -> Vec<Trial> {
    let mut trials = vec![];
    let mut push_trial = |run: Run| trials.push(run.into_trial());

    for entry in glob::glob(glob).unwrap() {
        let run = Run {
            path: entry.unwrap().clone(),
            freeze_on_contradiction: true,
        };
        // the verdict does not depend on whether facts freeze after a contradiction
        push_trial(Run {
            freeze_on_contradiction: false,
            ..run.clone()
        });
        push_trial(run);
    }

    trials
}

fn main() {
    let args = libtest_mimic::Arguments::from_args();
    let tests = generate_tests("tests/proofs/**/*.proof");
    // ensure all the tests have unique names
    let mut names = HashSet::new();
    for test in &tests {
        let name = test.name().to_string();
        if !names.insert(name.clone()) {
            panic!("Duplicate test name: {}", name);
        }
    }
    libtest_mimic::run(&args, tests).exit();
}
