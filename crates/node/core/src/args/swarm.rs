//! Swarm CLI arguments.

use clap::Args;
use flock_node_api::Transport;

/// Swarm size, transport and timing.
#[derive(Debug, Args, Clone, Default, PartialEq, Eq)]
#[command(next_help_heading = "Swarm")]
pub struct SwarmArgs {
    /// Number of nodes to start, seed included [default: 10].
    #[arg(short = 'n', long, value_name = "COUNT", allow_negative_numbers = true)]
    pub nodes: Option<i64>,

    /// Transport every node listens on [default: tcp].
    #[arg(short = 't', long, value_enum, ignore_case = true, value_name = "TRANSPORT")]
    pub transport: Option<Transport>,

    /// Port of the seed node; node i listens on base + i [default: 23333].
    #[arg(long = "base-port", value_name = "PORT")]
    pub base_port: Option<u16>,

    /// Pause before each join attempt, in microseconds [default: 112358].
    #[arg(long = "join.delay-us", value_name = "MICROS")]
    pub join_delay_us: Option<u64>,

    /// Base stabilization interval handed to every node, in milliseconds [default: 233].
    #[arg(long = "stabilize-interval-ms", value_name = "MILLIS")]
    pub stabilize_interval_ms: Option<u64>,

    /// Give up waiting for nodes to stop after this many seconds [default: wait forever].
    #[arg(long = "shutdown.timeout-secs", value_name = "SECS")]
    pub shutdown_timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct CommandParser {
        #[command(flatten)]
        swarm: SwarmArgs,
    }

    #[test]
    fn test_no_flags_override_nothing() {
        let args = CommandParser::parse_from(["flock"]).swarm;
        assert_eq!(args, SwarmArgs::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CommandParser::parse_from([
            "flock",
            "-n",
            "3",
            "-t",
            "KCP",
            "--base-port",
            "40000",
            "--join.delay-us",
            "0",
            "--shutdown.timeout-secs",
            "5",
        ])
        .swarm;

        assert_eq!(args.nodes, Some(3));
        assert_eq!(args.transport, Some(Transport::Kcp));
        assert_eq!(args.base_port, Some(40000));
        assert_eq!(args.join_delay_us, Some(0));
        assert_eq!(args.stabilize_interval_ms, None);
        assert_eq!(args.shutdown_timeout_secs, Some(5));
    }

    #[test]
    fn test_negative_node_count_is_parsed() {
        let args = CommandParser::parse_from(["flock", "--nodes", "-1"]).swarm;
        assert_eq!(args.nodes, Some(-1));
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        assert!(CommandParser::try_parse_from(["flock", "-t", "quic"]).is_err());
    }
}
