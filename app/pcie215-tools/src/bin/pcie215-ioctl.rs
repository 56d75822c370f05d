use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use irq_wait::TriggerMask;
use log::info;
use pcie215::lines;
use pcie215_tools::{open, setup};

/// Configures interrupt generation of the PCIe-215.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("action").required(true).multiple(true).args(["irq", "triggers", "list"])))]
struct Cli {
    /// Enable (1) or disable (0) interrupt generation
    #[arg(short = 'i', long, value_parser = clap::value_parser!(u8).range(0..=1))]
    irq: Option<u8>,
    /// Trigger lines to enable, e.g. 0x5 for PPI X C0 and PPI Y C0
    #[arg(short = 'a', long)]
    triggers: Option<TriggerMask>,
    /// Print the trigger line bits and exit
    #[arg(short, long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = setup()?;

    if args.list {
        for (name, line) in lines::ALL {
            println!("{:>6}  {name}", line.to_string());
        }
        return Ok(());
    }

    let path = config.device.path.display();
    let mut handle = open(&config).with_context(|| format!("Err, can't open [{path}]"))?;

    if let Some(mask) = args.triggers {
        handle
            .set_trigger_mask(mask)
            .with_context(|| format!("Err, can't set triggers {mask} on [{path}]"))?;
        info!("triggers = {mask}");
    }

    if let Some(irq) = args.irq {
        handle
            .set_interrupt_enable(irq == 1)
            .with_context(|| format!("Err, can't set irq enable {irq} on [{path}]"))?;
        info!("irq enable = {irq}");
    }

    println!("OK");
    Ok(())
}
