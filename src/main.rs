use clap::Parser;
use midiwire::{
    builder,
    cli::{validate_device, Args},
    exchange::{DeviceIdentity, Exchange, ExchangeEvent, ExchangeOutcome, ResponseDescriptor},
    message::{ManufacturerId, Message, DEVICE_ANY},
    state::DeviceState,
    transport::{self, FrameSource, MidirInput, MidirOutput},
    Result,
};
use std::time::Duration;

fn main() {
    initialize_logging();
    let args = Args::parse();
    let devices = transport::list_devices();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    if let Some(device_name) = &args.bind_to_device {
        if let Err(error_msg) = validate_device(device_name, &devices) {
            log::error!("{}", error_msg);
            eprintln!("{}", error_msg);
            std::process::exit(1);
        }
    }

    let outcome = if args.identity_query {
        run_identity_query(&args)
    } else if let Some(device_name) = &args.bind_to_device {
        run_monitor(device_name)
    } else {
        eprintln!("Nothing to do: pass --device-list, --bind-to-device or --identity-query");
        return;
    };

    if let Err(e) = outcome {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn initialize_logging() {
    midiwire::logging::init_logger().expect("Logger initialization failed");
    log::info!("Application starting");
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

/// Passive monitor: decode every inbound frame, fold it into the device
/// state, and print its description
fn run_monitor(device_name: &str) -> Result<()> {
    let mut input = MidirInput::open(device_name)?;
    let frames = input.subscribe()?;
    let mut device = DeviceState::new();

    println!("Monitoring '{}'. Press Ctrl+C to exit...", device_name);
    for frame in frames.iter() {
        match Message::new(frame.bytes, frame.timestamp) {
            Ok(msg) => {
                device.handle(&msg);
                println!("{}", msg.describe());
            }
            Err(e) => log::warn!("dropping inbound frame: {}", e),
        }
    }
    Ok(())
}

/// One-shot handshake: send a universal identity request and wait for the
/// general-information reply
fn run_identity_query(args: &Args) -> Result<()> {
    let input_name = args
        .bind_to_device
        .as_deref()
        .ok_or("identity query needs --bind-to-device for the reply")?;
    let output_name = args.midi_output.as_deref().unwrap_or(input_name);

    let input = MidirInput::open(input_name)?;
    let output = MidirOutput::open(output_name)?;

    let identity = DeviceIdentity {
        manufacturer: ManufacturerId::Standard(builder::NON_REALTIME),
        device: DEVICE_ANY,
    };
    let event = ExchangeEvent {
        request: builder::identity_request(DEVICE_ANY),
        expects: vec![ResponseDescriptor {
            manufacturer: None,
            device: None,
            header: Some(vec![0x06, 0x02]),
        }],
    };

    let mut exchange = Exchange::new(identity, Box::new(output), Box::new(input), vec![event]);
    exchange.set_timeout(Duration::from_millis(args.timeout_ms));

    let done = exchange.start()?;
    match done.recv() {
        Ok(ExchangeOutcome::Completed(responses)) => {
            for msg in responses {
                println!("{}", msg.describe());
            }
            Ok(())
        }
        Ok(ExchangeOutcome::Failed { error, .. }) => Err(error),
        Err(_) => Err("exchange worker exited without an outcome".into()),
    }
}
