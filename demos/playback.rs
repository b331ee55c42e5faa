//! Playback walkthrough.
//!
//! Builds the standard decode graph, plays it, prints the discovered streams
//! and jumps from 10s to 20s once. The simulated source plays ten times
//! faster than real time so the trailer ends in a few seconds.
//!
//! Run with: cargo run --example playback [URI]

use playctl::config::ControllerConfig;
use playctl::controller::{PlaybackController, RunOutcome};
use playctl::elements::{DEFAULT_URI, MediaInfo, UriDecodeBin, playback_pipeline};
use playctl::error::Result;
use playctl::pipeline::ElementFactory;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("playctl=info,warn")
        .init();

    let uri = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_URI.to_string());

    println!("playctl playback");
    println!("================\n");
    println!("URI: {uri}\n");

    // Initialize before creating any element.
    let framework = playctl::init();

    let mut factory = ElementFactory::with_builtins();
    factory.register("uridecodebin", |_| {
        Ok(Box::new(
            UriDecodeBin::new()
                .with_media(MediaInfo::sintel_trailer())
                .with_speed(10.0),
        ))
    });

    let pipeline = playback_pipeline(&factory, &uri)?;
    let mut controller =
        PlaybackController::new(framework, pipeline, ControllerConfig::tutorial())?;

    controller.play()?;

    let shutdown = controller.shutdown_handle();
    let mut printed = false;
    let outcome = loop {
        if let Some(outcome) = controller.step() {
            break outcome;
        }
        if !printed && !controller.stream_info().is_empty() && controller.is_playing() {
            println!("{}", controller.stream_info());
            printed = true;
        }
        // A player would hook this to Ctrl-C or a close button.
        if controller.position().is_some_and(|p| p.secs() >= 60) {
            shutdown.request();
        }
    };

    match outcome {
        RunOutcome::Eos => println!("End-Of-Stream reached."),
        RunOutcome::Error {
            source,
            message,
            debug,
        } => {
            eprintln!("Error received from element {source}: {message}");
            eprintln!("Debugging information: {}", debug.as_deref().unwrap_or("none"));
        }
        RunOutcome::Shutdown => println!("Stopped."),
    }

    controller.shutdown()?;
    Ok(())
}
