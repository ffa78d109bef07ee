use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::targets::{default_targets, Target};

#[derive(Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Targets named on the command line, in order.
    pub targets: Vec<Target>,
    pub localhost: bool,
    pub no_color: bool,
    pub increment_sequence: bool,
}

impl ProbeArgs {
    /// Hosts to probe: the given targets or the built-in server list,
    /// with localhost first when requested.
    pub fn targets(&self) -> Vec<Target> {
        let mut targets = Vec::new();
        if self.localhost {
            targets.push(Target::localhost());
        }
        if self.targets.is_empty() {
            targets.extend(default_targets());
        } else {
            targets.extend(self.targets.iter().cloned());
        }
        targets
    }
}

pub fn build_cli() -> Command {
    Command::new("echoprobe")
        .version("0.1.0")
        .about("Measure ICMP echo latency and loss to a list of hosts")
        .arg(
            Arg::new("targets")
                .help("Hosts to probe as LABEL=HOST or HOST (default: one server per continent)")
                .value_name("TARGET")
                .num_args(0..)
                .index(1)
                .value_parser(|s: &str| s.parse::<Target>()),
        )
        .arg(
            Arg::new("localhost")
                .long("localhost")
                .help("Probe 127.0.0.1 before the other targets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("increment_sequence")
                .long("increment-sequence")
                .help("Number echo requests 1, 2, 3... instead of sending sequence 1 every time")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
}

pub fn args_from_matches(matches: &ArgMatches) -> ProbeArgs {
    ProbeArgs {
        targets: matches
            .get_many::<Target>("targets")
            .map(|targets| targets.cloned().collect())
            .unwrap_or_default(),
        localhost: matches.get_flag("localhost"),
        no_color: matches.get_flag("no_color"),
        increment_sequence: matches.get_flag("increment_sequence"),
    }
}

pub fn parse_args() -> ProbeArgs {
    args_from_matches(&build_cli().get_matches())
}
