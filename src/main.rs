mod cli;
mod console;
mod dns;
mod icmp;
mod session;
mod stats;
mod targets;
mod utils;

use console::ConsoleReporter;
use icmp::{ErrorTable, RawSocketProber};
use session::{SequencePolicy, SessionConfig, SessionDriver};

#[tokio::main]
async fn main() {
    // Enable debug logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    }

    let args = cli::parse_args();
    if args.no_color {
        colored::control::set_override(false);
    }

    // A raw socket is needed for every probe, so find out up front
    if let Err(e) = icmp::check_raw_socket_privileges() {
        utils::exit_with_error(&e.to_string(), 1);
    }

    let mut config = SessionConfig::default();
    if args.increment_sequence {
        config.sequence = SequencePolicy::Incrementing;
    }

    let errors = ErrorTable::icmpv4();
    let driver = SessionDriver::new(config, &errors, utils::process_identifier());
    log::debug!("Using echo identifier {}", driver.identifier());

    let mut prober = RawSocketProber;
    let mut reporter = ConsoleReporter::new();

    println!("\n{}\n", console::SEPARATOR);

    // Hosts are probed strictly one after another
    for target in args.targets() {
        let address = match dns::resolve_ipv4(&target.host).await {
            Ok(address) => address,
            Err(e) => {
                utils::print_warning(&format!("skipping {}: {:#}", target, e));
                continue;
            }
        };

        match driver.run(&target, address, &mut prober, &mut reporter).await {
            Ok(session) => log::debug!(
                "{} [{}] done: {} of {} probes answered within {:?}",
                session.target,
                session.address,
                session.outcomes.iter().filter(|o| o.latency_ms().is_some()).count(),
                session.probe_count,
                session.timeout
            ),
            Err(e) => utils::exit_with_error(&e.to_string(), 1),
        }
    }
}
