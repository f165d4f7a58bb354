use std::io::{BufRead, Write};

use clap::Subcommand;
use mediremind_core::auth::{
    hash_pin, validate_pin, AuthGate, AuthRequest, AuthStatus, NoBiometrics, PinAuthenticator,
    PinSource,
};
use mediremind_core::{AuthOutcome, CollaboratorError, Config, NavigationSignal};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Choose the unlock PIN (4-8 digits)
    SetPin {
        /// New PIN; read from stdin when omitted
        pin: Option<String>,
        /// Current PIN, required when one is already set
        #[arg(long)]
        current: Option<String>,
    },
    /// Run the lock screen and report whether access is granted
    Unlock {
        /// PIN to try once without prompting
        #[arg(long)]
        pin: Option<String>,
        /// Print the final gate snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show whether a PIN is configured
    Status,
}

/// Reads a PIN line from stdin. An empty line or EOF cancels.
struct TerminalPin;

impl PinSource for TerminalPin {
    fn read_pin(&self, request: &AuthRequest) -> Result<Option<String>, CollaboratorError> {
        let io_err = |e: std::io::Error| CollaboratorError::new("terminal", e.to_string());
        let mut stderr = std::io::stderr();
        write!(stderr, "{} (empty line to cancel): ", request.prompt).map_err(io_err)?;
        stderr.flush().map_err(io_err)?;

        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line).map_err(io_err)?;
        let pin = line.trim();
        Ok((n > 0 && !pin.is_empty()).then(|| pin.to_string()))
    }
}

/// Supplies a PIN given on the command line.
struct ArgumentPin(String);

impl PinSource for ArgumentPin {
    fn read_pin(&self, _request: &AuthRequest) -> Result<Option<String>, CollaboratorError> {
        Ok(Some(self.0.clone()))
    }
}

fn read_line_from_stdin(prompt: &str) -> Result<String, std::io::Error> {
    eprint!("{prompt}: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn run(action: AuthAction) -> CmdResult {
    match action {
        AuthAction::SetPin { pin, current } => {
            let mut config = Config::load()?;
            if let Some(existing) = config.auth.pin_sha256.as_deref() {
                let current = match current {
                    Some(c) => c,
                    None => read_line_from_stdin("Current PIN")?,
                };
                if hash_pin(&current) != existing {
                    return Err("current PIN does not match".into());
                }
            }
            let pin = match pin {
                Some(p) => p,
                None => read_line_from_stdin("New PIN")?,
            };
            validate_pin(&pin)?;
            config.auth.pin_sha256 = Some(hash_pin(&pin));
            config.save()?;
            println!("PIN updated");
        }
        AuthAction::Unlock { pin, json } => {
            let config = Config::load()?;
            if config.auth.pin_sha256.is_none() {
                return Err("no PIN configured; run `mediremind auth set-pin` first".into());
            }
            let runtime = tokio::runtime::Builder::new_current_thread().build()?;
            let gate = match pin {
                Some(pin) => runtime.block_on(unlock(&config, ArgumentPin(pin), 1)),
                None => runtime.block_on(unlock(&config, TerminalPin, config.auth.max_attempts)),
            };

            if json {
                print_json(&gate.snapshot())?;
            }
            match gate.navigation() {
                NavigationSignal::Proceed => {
                    if !json {
                        println!("unlocked");
                    }
                }
                NavigationSignal::Stay => {
                    let message = gate.error_message().unwrap_or("authentication failed");
                    return Err(message.to_string().into());
                }
            }
        }
        AuthAction::Status => {
            let config = Config::load()?;
            let status = if config.auth.pin_sha256.is_some() {
                "PIN configured"
            } else {
                "no PIN configured"
            };
            println!("{status}");
        }
    }
    Ok(())
}

/// Drive one lock-screen session, retrying retryable failures up to
/// `max_tries` attempts.
async fn unlock<S: PinSource>(config: &Config, source: S, max_tries: u32) -> AuthGate {
    let mut gate = AuthGate::new(config.auth.labels());
    gate.probe(&NoBiometrics).await;
    let authenticator = PinAuthenticator::new(
        config.auth.pin_sha256.clone(),
        config.auth.max_attempts,
        source,
    );

    for _ in 0..max_tries.max(1) {
        gate.authenticate(&authenticator).await;
        match (gate.status(), gate.last_outcome()) {
            (AuthStatus::Succeeded, _) => break,
            (AuthStatus::Failed, Some(outcome)) if outcome.allows_biometric_retry() => {
                if outcome == AuthOutcome::UserCancelled {
                    break;
                }
                if let Some(message) = gate.error_message() {
                    eprintln!("{message}");
                }
            }
            _ => break,
        }
    }
    gate
}
