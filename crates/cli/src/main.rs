use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rtpaac::{AudioConfig, Decoder};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rtpaac",
    about = "Inspect MPEG-4 audio configs and RTP mpeg4-generic packets"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a hex config blob (the SDP `config=` value)
    Config {
        /// e.g. 1190
        hex: String,
    },
    /// Encode a config blob and print it as hex
    MakeConfig {
        #[arg(long, default_value_t = 2)]
        object_type: u8,
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,
        #[arg(long, default_value_t = 2)]
        channels: u8,
    },
    /// Depacketize hex-encoded RTP packets through one decoder, in order
    Depacketize {
        #[arg(long, short, default_value_t = 48_000)]
        clock_rate: u32,
        packets: Vec<String>,
    },
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Config { hex } => {
            let c = AudioConfig::decode_hex(&hex).map_err(|e| e.to_string())?;
            println!(
                "object type {}, {} Hz, {} channels",
                c.object_type, c.sample_rate, c.channel_count
            );
        }
        Command::MakeConfig {
            object_type,
            sample_rate,
            channels,
        } => {
            let c = AudioConfig {
                object_type,
                sample_rate,
                channel_count: channels,
            };
            println!("{}", c.encode_hex().map_err(|e| e.to_string())?);
        }
        Command::Depacketize {
            clock_rate,
            packets,
        } => {
            let mut decoder = Decoder::new(clock_rate).map_err(|e| e.to_string())?;
            for (n, p) in packets.iter().enumerate() {
                let raw = hex::decode(p.trim()).map_err(|e| format!("packet {n}: {e}"))?;
                match decoder.decode(&raw) {
                    Ok(aus) => {
                        for au in aus {
                            println!(
                                "packet {n}: {:>12.6}s {:>5} bytes",
                                au.timestamp.as_secs_f64(),
                                au.payload.len()
                            );
                        }
                    }
                    Err(e) => eprintln!("packet {n}: dropped: {e}"),
                }
            }
            if decoder.lost_packets() > 0 {
                println!("{} packets lost", decoder.lost_packets());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
