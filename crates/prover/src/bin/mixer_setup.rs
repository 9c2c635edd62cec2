//! Generate withdraw circuit keys for a pool.
//!
//! Writes `withdraw_h{height}.pk` / `.vk` and a JSON file with the
//! hex-encoded verifying key into the output directory.

use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use mixer_prover::{setup_withdraw, withdraw_constraint_count, WithdrawKeys};

#[derive(Debug, Parser)]
#[command(name = "mixer-setup", about = "Generate withdraw circuit keys")]
struct Args {
    /// Merkle tree height the keys are generated for
    #[arg(long, env = "MIXER_HEIGHT", default_value_t = mixer_core::DEFAULT_HEIGHT)]
    height: u32,

    /// Directory to write the keys to
    #[arg(long, env = "MIXER_KEYS_DIR", default_value = "keys")]
    out_dir: PathBuf,

    /// Seed for a reproducible setup. Without it, OS entropy is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Overwrite keys that already exist
    #[arg(long)]
    force: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.height > mixer_core::MAX_HEIGHT {
        return Err(format!("height must be at most {}", mixer_core::MAX_HEIGHT).into());
    }
    if WithdrawKeys::exist_in(&args.out_dir, args.height) && !args.force {
        return Err(format!(
            "keys for height {} already exist in {:?} (use --force to overwrite)",
            args.height, args.out_dir
        )
        .into());
    }

    let constraints = withdraw_constraint_count(args.height)?;
    println!(
        "Withdraw circuit (height {}): {} constraints",
        args.height, constraints
    );

    let mut rng = match args.seed {
        Some(seed) => {
            println!("WARNING: seeded setup, do not use these keys in production");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    println!("Running trusted setup (this may take a while)...");
    let keys = setup_withdraw(args.height, &mut rng)?;
    keys.save_to_directory(&args.out_dir)?;

    let vk = keys.pair.serialize_vk()?;
    println!("Withdraw VK ({} bytes):", vk.len());
    println!("0x{}\n", hex::encode(&vk));

    let json = serde_json::json!({
        "height": args.height,
        "constraints": constraints,
        "withdraw_vk": format!("0x{}", hex::encode(&vk)),
    });
    let json_path = args
        .out_dir
        .join(format!("verifying_key_h{}.json", args.height));
    std::fs::write(&json_path, serde_json::to_string_pretty(&json)?)?;

    println!("Keys saved to {:?}", args.out_dir);
    Ok(())
}
