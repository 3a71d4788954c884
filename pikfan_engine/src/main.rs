#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** pikfan **
//! Headless run of the mob simulation: loads content, runs a number of ticks, prints a summary.

use std::collections::BTreeMap;
use std::env;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use pikfan_engine::{Fx, MobCategory, PIKFAN_VERSION, load_world};

const DEFAULT_TICKS: u64 = 300;

fn main() -> Result<()> {
    env_logger::init();
    let ticks = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("tick count must be a whole number, got '{arg}'"))?,
        None => DEFAULT_TICKS,
    };

    info!("Start: loading pikfan world...");
    let mut world = load_world().context("while loading World")?;
    info!("World loaded successfully.");

    println!(
        "{} v{} - area '{}'",
        "PIKFAN".bright_yellow().bold(),
        PIKFAN_VERSION,
        world.area_name.bright_blue()
    );

    let mut particles: u64 = 0;
    let mut sounds: u64 = 0;
    for _ in 0..ticks {
        world.step();
        for entry in world.drain_fx() {
            match entry.fx {
                Fx::Particles { count, .. } => particles += u64::from(count),
                Fx::Sound { .. } => sounds += 1,
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let seconds = f64::from(world.config.dt()) * ticks as f64;
    println!("simulated {} ticks ({seconds:.1}s)", ticks.to_string().bold());

    let mut census: BTreeMap<String, usize> = BTreeMap::new();
    for mob in &world.mobs {
        *census.entry(format!("{:?}", mob.category)).or_default() += 1;
    }
    println!("{}", "mobs in the area:".underline());
    for (category, count) in &census {
        println!("  {category:<10} {}", count.to_string().bright_green());
    }

    let in_party = world
        .current_leader_idx()
        .and_then(|l| world.mobs[l].party.as_ref())
        .map_or(0, |p| p.len());
    let pikmin = world.pikmin_count();
    let buried = world
        .mobs
        .iter()
        .filter(|m| m.category == MobCategory::Pikmin && m.activity.is_buried())
        .count();
    println!(
        "pikmin: {} in the field, {} buried, {} following the leader",
        pikmin.to_string().bright_green(),
        buried,
        in_party
    );
    for (pikmin_type, stored) in &world.pikmin_in_onions {
        println!("  {} stored in the '{pikmin_type}' Onion", stored.to_string().bright_cyan());
    }
    println!(
        "treasure collected: {}",
        world.ship_collected.to_string().bright_yellow()
    );
    println!("fx: {particles} particles, {sounds} sounds");
    Ok(())
}
