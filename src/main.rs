// ABOUTME: Command-line SMPP connectivity tester: bind, enquire_link, unbind, then report a verdict
// ABOUTME: Maps CLI flags onto a SessionConfig and turns session errors into likely causes

use argh::FromArgs;
use smpp_tester::client::{BindCredentials, BindSession, SessionConfig, SmppError};
use smpp_tester::connection::TransportError;
use smpp_tester::datatypes::BindMode;
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Check that an SMPP v3.4 server is reachable and accepts a set of credentials
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the hostname or IP address of the SMSC
    #[argh(option)]
    host: String,

    /// the port to use when connecting to the SMSC (typically 2775)
    #[argh(option, short = 'p')]
    port: u16,

    /// the system_id to bind with
    #[argh(option, short = 'u')]
    username: String,

    /// the password to bind with
    #[argh(option, short = 'w')]
    password: String,

    /// connect timeout in milliseconds (default: 30000)
    #[argh(option, short = 't', default = "30000")]
    timeout: u64,

    /// bind mode: transmitter, receiver or transceiver (default: transceiver)
    #[argh(option, short = 'm', default = "BindMode::Transceiver")]
    mode: BindMode,

    /// milliseconds to wait for a reply to unbind (default: 1000)
    #[argh(option, default = "1000")]
    unbind_grace: u64,

    /// seconds to keep a bound session open before unbinding (default: 5)
    #[argh(option, default = "5")]
    hold: u64,
}

impl CliArgs {
    fn session_config(&self) -> Result<SessionConfig, String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("port must be a number between 1 and 65535".to_string());
        }
        if self.username.is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        if self.timeout == 0 {
            return Err("timeout must be a positive number of milliseconds".to_string());
        }

        let credentials = BindCredentials::new(self.mode, &self.username, &self.password);
        Ok(SessionConfig::new(&self.host, self.port, credentials)
            .with_connect_timeout(Duration::from_millis(self.timeout))
            .with_unbind_grace(Duration::from_millis(self.unbind_grace)))
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Bound and the heartbeat was answered
    Success,
    /// Bound, but the heartbeat failed
    PartialSuccess,
    /// Never bound
    Failure,
}

impl Verdict {
    fn exit_code(self) -> ExitCode {
        match self {
            Verdict::Success => ExitCode::SUCCESS,
            Verdict::PartialSuccess | Verdict::Failure => ExitCode::FAILURE,
        }
    }
}

/// Likely explanations for a failed bind, most specific first
fn possible_causes(err: &SmppError, mode: BindMode) -> Vec<String> {
    let causes: &[&str] = match err {
        SmppError::Transport {
            source: TransportError::ConnectTimeout { .. },
            ..
        } => &[
            "The server is not responding",
            "Network latency issues",
            "Firewall silently dropping the connection",
            "Try increasing the timeout value",
        ],
        SmppError::Transport {
            source: TransportError::ConnectFailed { .. },
            ..
        } => &[
            "The server is not running",
            "Incorrect host or port",
            "Host name does not resolve",
            "Network/firewall issues",
        ],
        SmppError::Transport { .. } => &[
            "Server closed the connection during the bind",
            "Server may not accept connections from this address",
            "The port may not be an SMPP service",
        ],
        SmppError::Application { .. } => &[
            "Invalid username or password",
            "Account not permitted to use this bind mode",
            "Account already bound the maximum number of times",
        ],
        SmppError::Protocol { .. } => &[
            "Server requires different SMPP version or parameters",
            "The port may not be an SMPP service",
        ],
        SmppError::InvalidState { .. } => &[],
    };

    let mut causes: Vec<String> = causes.iter().map(|c| c.to_string()).collect();
    if matches!(err, SmppError::Protocol { .. } | SmppError::Application { .. }) {
        causes.push(format!("Server does not support bind as {mode}"));
    }
    causes
}

fn print_parameters(config: &SessionConfig) {
    println!("Connection Parameters:");
    println!("  Host: {}", config.host);
    println!("  Port: {}", config.port);
    println!("  Username: {}", config.credentials.system_id);
    println!("  Password: {}", config.credentials.masked_password());
    println!("  Bind mode: {}", config.mode());
    println!("  Timeout: {} ms", config.connect_timeout.as_millis());
    println!();
}

async fn run(config: SessionConfig, hold: Duration) -> Verdict {
    let mode = config.mode();
    let mut session = BindSession::new(config);

    println!("=== SMPP Connection Test ===");
    println!();
    println!("Connecting and binding as {mode}...");

    let verdict = match session.connect().await {
        Ok(()) => {
            match session.smsc_system_id() {
                Some(id) if !id.is_empty() => println!("✓ SMPP bind successful (SMSC system_id: {id})"),
                _ => println!("✓ SMPP bind successful"),
            }
            println!();
            println!("Testing connection with enquire_link...");

            let verdict = match session.test_connection().await {
                Ok(()) => {
                    println!("✓ Connection test successful!");
                    println!();
                    println!("=== TEST RESULT: SUCCESS ===");
                    println!("Your SMPP server is reachable and accepting connections.");
                    Verdict::Success
                }
                Err(e) => {
                    println!("✗ Connection test failed: {e}");
                    println!();
                    println!("=== TEST RESULT: PARTIAL SUCCESS ===");
                    println!("SMPP bind succeeded but enquire_link failed.");
                    println!("The server may not be fully functional.");
                    Verdict::PartialSuccess
                }
            };

            if !hold.is_zero() {
                println!();
                println!("Keeping connection alive for {} seconds...", hold.as_secs());
                tokio::time::sleep(hold).await;
            }
            verdict
        }
        Err(e) => {
            println!("✗ SMPP connection failed: {e}");
            if let Some(code) = e.status_code() {
                println!("  Status 0x{code:08X}: {}", e.description());
            }
            println!();
            println!("=== TEST RESULT: FAILURE ===");
            if e.is_unreachable() {
                println!("Could not reach the SMPP server.");
            } else {
                println!("Reached the SMPP server but could not bind.");
            }

            let causes = possible_causes(&e, mode);
            if !causes.is_empty() {
                println!();
                println!("Possible causes:");
                for cause in causes {
                    println!("- {cause}");
                }
            }
            Verdict::Failure
        }
    };

    session.disconnect().await;
    verdict
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install log subscriber: {e}");
    }

    println!("SMPP Connectivity Tester v{}", env!("CARGO_PKG_VERSION"));
    println!("==============================");
    println!();

    let config = match cli_args.session_config() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    print_parameters(&config);
    run(config, Duration::from_secs(cli_args.hold))
        .await
        .exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smpp_tester::client::Phase;
    use smpp_tester::datatypes::CommandStatus;

    fn args(extra: &[&str]) -> CliArgs {
        let mut all = vec!["--host", "smsc.local", "-p", "2775", "-u", "tester", "-w", "secret"];
        all.extend_from_slice(extra);
        CliArgs::from_args(&["smpp-tester"], &all).unwrap()
    }

    #[test]
    fn defaults_match_original_tool() {
        let config = args(&[]).session_config().unwrap();
        assert_eq!(config.connect_timeout, Duration::from_millis(30_000));
        assert_eq!(config.unbind_grace, Duration::from_millis(1_000));
        assert_eq!(config.mode(), BindMode::Transceiver);
        assert_eq!(config.credentials.masked_password(), "******");
    }

    #[test]
    fn mode_and_timeout_flags() {
        let config = args(&["-m", "tx", "-t", "1500"]).session_config().unwrap();
        assert_eq!(config.mode(), BindMode::Transmitter);
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(args(&["-t", "0"]).session_config().is_err());

        let mut bad_port = args(&[]);
        bad_port.port = 0;
        assert!(bad_port.session_config().is_err());

        let mut empty_user = args(&[]);
        empty_user.username.clear();
        assert!(empty_user.session_config().is_err());
    }

    #[test]
    fn unknown_mode_fails_to_parse() {
        let all = ["--host", "h", "-p", "1", "-u", "u", "-w", "w", "-m", "sender"];
        assert!(CliArgs::from_args(&["smpp-tester"], &all).is_err());
    }

    #[test]
    fn causes_follow_error_class() {
        let timeout = SmppError::Transport {
            phase: Phase::Connect,
            source: TransportError::ConnectTimeout {
                peer: "h:1".into(),
                timeout: Duration::from_millis(10),
            },
        };
        let causes = possible_causes(&timeout, BindMode::Transceiver);
        assert!(causes.iter().any(|c| c.contains("timeout")));

        let rejected = SmppError::Application {
            phase: Phase::Bind,
            status: CommandStatus::InvalidPassword,
        };
        let causes = possible_causes(&rejected, BindMode::Receiver);
        assert_eq!(causes[0], "Invalid username or password");
        assert!(causes.iter().any(|c| c.contains("receiver")));
    }

    #[test]
    fn only_full_success_exits_zero() {
        let code = |v: Verdict| format!("{:?}", v.exit_code());
        assert_eq!(code(Verdict::Success), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(code(Verdict::PartialSuccess), format!("{:?}", ExitCode::FAILURE));
        assert_eq!(code(Verdict::Failure), format!("{:?}", ExitCode::FAILURE));
    }
}
