//! Preview: interactive shell for fetching messages and rendering templates.
//!
//! Usage: preview --data <dir> [--config <path>] [--seed <n>]
//!
//! Commands:
//!   at <YYYY-MM-DD> <HH:MM>           : set the UTC instant
//!   now                               : use the current UTC instant
//!   place <lat> <lon> <region> <hhmm> : set position, region and offset
//!   playa <on|off>                    : toggle on-playa routing
//!   fetch                             : select one message
//!   bulk <n>                          : select n messages with image stats
//!   markup <template>                 : run one template through the passes
//!   context                           : show the current context
//!   seed <n>                          : reseed the router
//!   help                              : list commands
//!   quit                              : exit

use chrono::{NaiveDateTime, Utc};
use rustc_hash::FxHashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use subjective_time::core::router::{MessageRouter, RouterError};
use subjective_time::schema::context::Context;
use subjective_time::schema::message::{MessageResult, DEFAULT_LINE_WIDTH};

/// Black Rock City, the default place.
const PLAYA: (f64, f64, u32, i32) = (40.786, -119.206, 452, -700);

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut data_root: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" if i + 1 < args.len() => {
                i += 1;
                data_root = Some(PathBuf::from(&args[i]));
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(PathBuf::from(&args[i]));
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(data_root) = data_root else {
        eprintln!("ERROR: --data is required");
        print_usage();
        std::process::exit(1);
    };

    let mut router = match build_router(&data_root, config_path.as_ref(), seed) {
        Ok(router) => router,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let (lat, lon, region, offset) = PLAYA;
    let mut ctx = Context::from_utc(Utc::now().naive_utc(), offset, lat, lon, region);
    let mut on_playa = true;

    println!("Data root: {}", data_root.display());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "at" => {
                if parts.len() < 3 {
                    println!("Usage: at <YYYY-MM-DD> <HH:MM>");
                    continue;
                }
                let stamp = format!("{} {}", parts[1], parts[2]);
                match NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M") {
                    Ok(utc) => {
                        ctx = Context::from_utc(utc, ctx.utc_offset, ctx.latitude, ctx.longitude, ctx.region);
                        print_context(&ctx, on_playa);
                    }
                    Err(e) => println!("Invalid time '{}': {}", stamp, e),
                }
            }
            "now" => {
                ctx = Context::from_utc(
                    Utc::now().naive_utc(),
                    ctx.utc_offset,
                    ctx.latitude,
                    ctx.longitude,
                    ctx.region,
                );
                print_context(&ctx, on_playa);
            }
            "place" => {
                if parts.len() < 5 {
                    println!("Usage: place <lat> <lon> <region> <hhmm>");
                    continue;
                }
                let parsed = (
                    parts[1].parse::<f64>(),
                    parts[2].parse::<f64>(),
                    parts[3].parse::<u32>(),
                    parts[4].parse::<i32>(),
                );
                match parsed {
                    (Ok(lat), Ok(lon), Ok(region), Ok(offset)) => {
                        ctx = Context::from_utc(ctx.utc, offset, lat, lon, region);
                        print_context(&ctx, on_playa);
                    }
                    _ => println!("Invalid place: {}", parts[1..].join(" ")),
                }
            }
            "playa" => match parts.get(1).copied() {
                Some("on") => on_playa = true,
                Some("off") => on_playa = false,
                _ => println!("Usage: playa <on|off> (currently {})", on_off(on_playa)),
            },
            "fetch" => {
                let result = router.select(&ctx, on_playa);
                print_result(&result);
            }
            "bulk" => {
                let count: usize = match parts.get(1).map(|s| s.parse()) {
                    Some(Ok(n)) if n > 0 => n,
                    _ => {
                        println!("Usage: bulk <n>");
                        continue;
                    }
                };
                run_bulk(&mut router, &ctx, on_playa, count);
            }
            "markup" => {
                let template = line[cmd.len()..].trim();
                if template.is_empty() {
                    println!("Usage: markup <template>");
                    continue;
                }
                let text = router.render(template, &ctx);
                if text.is_empty() {
                    println!("(rejected)");
                } else {
                    println!("{}", text);
                }
            }
            "context" | "ctx" => {
                print_context(&ctx, on_playa);
            }
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => match build_router(&data_root, config_path.as_ref(), s) {
                        Ok(r) => {
                            seed = s;
                            router = r;
                            println!("Seed set to {}", seed);
                        }
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(_) => {
                        println!("Invalid seed: {}", parts[1]);
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn build_router(
    data_root: &PathBuf,
    config_path: Option<&PathBuf>,
    seed: u64,
) -> Result<MessageRouter, RouterError> {
    let mut builder = MessageRouter::builder().data_root(data_root).seed(seed);
    if let Some(path) = config_path {
        builder = builder.config_path(path);
    }
    builder.build()
}

fn run_bulk(router: &mut MessageRouter, ctx: &Context, on_playa: bool, count: usize) {
    let mut images: FxHashMap<String, usize> = FxHashMap::default();
    let mut empty = 0;
    let mut attributed = 0;
    for _ in 0..count {
        let result = router.select(ctx, on_playa);
        if result.is_empty() {
            empty += 1;
            continue;
        }
        if result.attribution_id > 0 {
            attributed += 1;
        }
        let key = result.image_key.clone().unwrap_or_else(|| "---".to_string());
        *images.entry(key).or_insert(0) += 1;
        print_result(&result);
    }

    let mut counts: Vec<(String, usize)> = images.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("\n--- Bulk Stats ---");
    println!("Messages: {}  Empty: {}  Attributed: {}", count - empty, empty, attributed);
    for (key, n) in counts {
        println!("  {}: {}", key, n);
    }
    println!("--- End ---\n");
}

fn print_result(result: &MessageResult) {
    if result.is_empty() {
        println!("[     ][   ] (nothing)");
        return;
    }
    let attribution = if result.attribution_id > 0 {
        format!("{:05}", result.attribution_id)
    } else {
        "     ".to_string()
    };
    let image = result.image_key.as_deref().unwrap_or("   ");
    println!("[{}][{}] {}", attribution, image, result.text);
    for line in result.lines(DEFAULT_LINE_WIDTH) {
        println!("    | {}", line);
    }
}

fn print_context(ctx: &Context, on_playa: bool) {
    println!("UTC:    {}", ctx.utc.format("%Y-%m-%d %H:%M"));
    println!("Local:  {} (offset {})", ctx.local.format("%Y-%m-%d %H:%M"), ctx.utc_offset);
    println!("Place:  {:.3}, {:.3} region {}", ctx.latitude, ctx.longitude, ctx.region);
    println!("Season: {}  Playa: {}", ctx.season().name(), on_off(on_playa));
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn print_usage() {
    println!("Usage: preview --data <dir> [--config <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  at <YYYY-MM-DD> <HH:MM>            set the UTC instant");
    println!("  now                                use the current UTC instant");
    println!("  place <lat> <lon> <region> <hhmm>  set position, region and offset");
    println!("  playa <on|off>                     toggle on-playa routing");
    println!("  fetch                              select one message");
    println!("  bulk <n>                           select n messages with image stats");
    println!("  markup <template>                  run one template through the passes");
    println!("  context                            show the current context");
    println!("  seed <n>                           reseed the router");
    println!("  help                               list commands");
    println!("  quit                               exit");
}
