use std::{env, error, fs, path::PathBuf, process};

use emu::bus::WordMemory;
use emu::cpu::arm7tdmi::{Arm7tdmi, SIZE_OF_ARM_INSTRUCTION};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

struct Args {
    image: PathBuf,
    steps: Option<usize>,
    log_file: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut image = None;
    let mut steps = None;
    let mut log_file = None;

    while let Some(arg) = args.next() {
        if arg == "--log-file" {
            let path = args.next().ok_or("--log-file needs a path")?;
            log_file = Some(PathBuf::from(path));
        } else if image.is_none() {
            image = Some(PathBuf::from(arg));
        } else if steps.is_none() {
            let count = arg
                .parse::<usize>()
                .map_err(|e| format!("invalid step count {arg}: {e}"))?;
            steps = Some(count);
        } else {
            return Err(format!("unexpected argument {arg}"));
        }
    }

    Ok(Args {
        image: image.ok_or("usage: armdp <image> [steps] [--log-file <path>]")?,
        steps,
        log_file,
    })
}

/// Installs the fmt subscriber, mirrored to `log_file` when given.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging(log_file: Option<&PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).with_filter(filter());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path.file_name().map_or_else(|| "armdp.log".into(), ToOwned::to_owned);
            let appender = tracing_appender::rolling::never(
                directory.map_or_else(|| PathBuf::from("."), PathBuf::from),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

fn print_state(cpu: &Arm7tdmi) {
    for (index, value) in cpu.registers.to_vec().into_iter().enumerate() {
        let separator = if index % 4 == 3 { "\n" } else { "  " };
        print!("R{index:<2} = 0x{value:08X}{separator}");
    }
    println!("CPSR = 0x{:08X} [{}]", cpu.cpsr.raw(), cpu.cpsr);
}

fn run(args: &Args) -> Result<(), Box<dyn error::Error>> {
    let data = fs::read(&args.image)?;
    let image_len = u32::try_from(data.len())?;
    let mut memory = WordMemory::load(data);
    let mut cpu = Arm7tdmi::new();

    tracing::info!("loaded {} ({image_len} bytes)", args.image.display());

    let limit = args
        .steps
        .unwrap_or_else(|| (image_len / SIZE_OF_ARM_INSTRUCTION) as usize);
    let mut executed = 0;

    while executed < limit && cpu.fetch_address() < image_len {
        if let Err(e) = cpu.step(&mut memory) {
            print_state(&cpu);
            return Err(e.into());
        }
        cpu.registers.advance_program_counter(SIZE_OF_ARM_INSTRUCTION);
        executed += 1;
    }

    tracing::info!("executed {executed} instructions");
    print_state(&cpu);

    Ok(())
}

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let _guard = init_logging(args.log_file.as_ref());

    if let Err(e) = run(&args) {
        tracing::error!("{e}");
        process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(ToString::to_string))
    }

    #[test]
    fn parse_image_steps_and_log_file() {
        let parsed = args(&["prog.bin", "10", "--log-file", "out/trace.log"]).unwrap();
        assert_eq!(parsed.image, PathBuf::from("prog.bin"));
        assert_eq!(parsed.steps, Some(10));
        assert_eq!(parsed.log_file, Some(PathBuf::from("out/trace.log")));
    }

    #[test]
    fn image_is_required() {
        assert!(args(&[]).is_err());
        assert!(args(&["--log-file"]).is_err());
        assert!(args(&["prog.bin", "ten"]).is_err());
        assert!(args(&["prog.bin", "1", "2"]).is_err());
    }
}
