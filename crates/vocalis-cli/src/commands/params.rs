//! Parameter listing command.

use clap::Args;
use vocalis_agc::{PARAMETERS, ParamKey, ParamUnit};

#[derive(Args)]
pub struct ParamsArgs {
    /// Show only this parameter
    key: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    match args.key.as_deref() {
        Some(key) => {
            let Some(param) = ParamKey::from_key(key) else {
                anyhow::bail!("Unknown parameter '{key}'. Run 'vocalis params' for the full list.");
            };
            let desc = param.descriptor();
            println!("{}", desc.key);
            println!("  {}", desc.description);
            println!("  default: {}", desc.format(desc.default));
            println!("  range:   {}", range_text(desc.unit, desc.min, desc.max));
        }
        None => {
            println!("AGC Parameters");
            println!("==============\n");
            println!("  {:<12} {:>10}  {:<22} {}", "KEY", "DEFAULT", "RANGE", "DESCRIPTION");
            for desc in &PARAMETERS {
                println!(
                    "  {:<12} {:>10}  {:<22} {}",
                    desc.key,
                    desc.format(desc.default),
                    range_text(desc.unit, desc.min, desc.max),
                    desc.description
                );
            }
            println!("\nSet with: vocalis process in.wav out.wav --param key=value");
        }
    }
    Ok(())
}

fn range_text(unit: ParamUnit, min: f32, max: f32) -> String {
    match unit {
        ParamUnit::Flag => "0 | 1".to_string(),
        _ => format!("{min} .. {max}{}", unit.suffix()),
    }
}
