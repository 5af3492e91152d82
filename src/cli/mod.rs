use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// Bind to a specific MIDI input device and monitor its channel state
    #[arg(long)]
    pub bind_to_device: Option<String>,

    /// MIDI output device used for outbound requests
    #[arg(long)]
    pub midi_output: Option<String>,

    /// Send a device-identity query and print the reply
    #[arg(long)]
    pub identity_query: bool,

    /// Exchange timeout in milliseconds
    #[arg(long, default_value_t = 200)]
    pub timeout_ms: u64,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
