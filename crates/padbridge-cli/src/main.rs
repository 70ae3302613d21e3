use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod gamepads;
mod haptics;
mod shutdown;

use crate::shutdown::ShutdownSignal;

#[derive(Parser)]
#[command(name = "padbridge")]
#[command(about = "Bridges local gamepads into a game runtime's memory")]
struct Args {
    /// Executable name of the runtime to attach to.
    #[arg(short, long, default_value = "pico8")]
    target: String,

    /// Milliseconds between frame exchanges.
    #[arg(long, default_value_t = 16)]
    frame_interval_ms: u64,

    /// Milliseconds between connection scans and liveness checks.
    #[arg(long, default_value_t = 1000)]
    scan_interval_ms: u64,

    /// Ignore rumble commands from the runtime.
    #[arg(long)]
    no_rumble: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("padbridge_core=info".parse()?)
                .add_directive("padbridge_cli=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let shutdown = Arc::new(ShutdownSignal::new());
    let handler_signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || handler_signal.trigger())?;

    info!("padbridge starting, looking for `{}`...", args.target);
    run(&args, &shutdown)
}

#[cfg(target_os = "macos")]
fn run(args: &Args, shutdown: &ShutdownSignal) -> Result<()> {
    use std::time::{Duration, Instant};

    use padbridge_core::{SystemBridge, log_poll_event};

    use crate::gamepads::GamepadRegistry;
    use crate::haptics::RumbleDriver;

    let mut gamepads = GamepadRegistry::new()?;
    let mut rumble = RumbleDriver::new(!args.no_rumble);
    let mut bridge = SystemBridge::system(&args.target);

    let frame_interval = Duration::from_millis(args.frame_interval_ms);
    let scan_interval = Duration::from_millis(args.scan_interval_ms);
    let mut last_scan: Option<Instant> = None;

    loop {
        // Slow tick: connect, or verify the runtime is still there.
        if last_scan.is_none_or(|at| at.elapsed() >= scan_interval) {
            last_scan = Some(Instant::now());
            let event = bridge.poll();
            log_poll_event(&event);
            if matches!(event, padbridge_core::PollEvent::Lost(_)) {
                rumble.stop_all();
                gamepads.reset();
            }
        }

        // Fast tick: pump local devices, exchange one frame.
        for slot in gamepads.pump() {
            rumble.stop(slot);
        }
        if let Some((_, commands)) = bridge.frame(&gamepads.states()) {
            gamepads.drive_rumble(&mut rumble, &commands);
        }

        if shutdown.wait(frame_interval) {
            break;
        }
    }

    rumble.stop_all();
    bridge.disconnect();
    info!("shut down");
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn run(_args: &Args, _shutdown: &ShutdownSignal) -> Result<()> {
    anyhow::bail!("no address-space backend for this platform")
}
