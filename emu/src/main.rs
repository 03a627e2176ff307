use clap::Parser;
use color_print::cprintln;

use m68arch::ObjectImage;
use m68emu::hooks::{dump::Dump, trace::Trace, Hook};
use m68emu::{sim::DEFAULT_DUMP_LENGTH, Error, Simulator};

#[derive(Parser, Debug)]
#[clap(
    name = "M6800 Emulator",
    version = "v0.1.0",
    about = "Instruction-set simulator for the 6800/6801/6811 family"
)]
struct Args {
    /// Maximum number of instructions
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// Print every executed instruction
    #[arg(long)]
    trace: bool,

    /// YAML file of PCs to dump registers/memory at
    #[arg(short, long)]
    dump_cfg: Option<String>,

    /// Dump registers after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Memory range to print at exit, as START:LEN (hex START allowed with $ or 0x)
    #[arg(short, long)]
    memory: Option<String>,

    /// Object file (YAML) or assembly source (.asm)
    #[arg(default_value = "main.obj.yaml")]
    input_file: String,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        cprintln!("<red,bold>error</>: {}", e);
        std::process::exit(1);
    }
}

fn read(path: &str) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Open {
        path: path.to_string(),
        source,
    })
}

/// Object image from a YAML object file, or by assembling a `.asm` source.
fn load(path: &str) -> Result<ObjectImage, Error> {
    let text = read(path)?;
    if !path.to_lowercase().ends_with(".asm") {
        return serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
            path: path.to_string(),
            source,
        });
    }
    let assembly = m68asm::assemble(&text);
    let lines: Vec<&str> = text.lines().collect();
    for diag in &assembly.errors {
        diag.print_diag(&lines, path);
    }
    if !assembly.success {
        return Err(Error::Assemble(path.to_string()));
    }
    Ok(assembly.image())
}

/// `START:LEN` with each part in assembler number syntax.
fn parse_range(text: &str) -> Result<(u16, usize), Error> {
    let labels = m68asm::label::Labels::new();
    let bad = || Error::Range(text.to_string());
    let (start, len) = text.split_once(':').ok_or_else(bad)?;
    let start = m68asm::number::parse_number(start, &labels).map_err(|_| bad())?;
    let len = m68asm::number::parse_number(len, &labels).map_err(|_| bad())?;
    Ok((start, len as usize))
}

fn run(args: Args) -> Result<(), Error> {
    println!("M6800 Emulator");

    println!("+-----------------------------------------------+");
    println!("| Emulate: {:<36} |", args.input_file);
    if let Some(fname) = &args.dump_cfg {
        println!("|  - Dump: {:<36} |", fname);
    }
    if args.trace {
        println!("|  - Trace: {:<35} |", "on");
    }
    println!("+-----------------------------------------------+");

    let range = args.memory.as_deref().map(parse_range).transpose()?;

    // ------------------------------------------------------------------------
    // Initialize simulator
    let image = load(&args.input_file)?;
    let mut sim = Simulator::new();
    sim.load_image(&image);

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let mut hooks: Vec<Box<dyn Hook>> = vec![
        Box::new(Trace::arg(args.trace)),
        Box::new(Dump::arg(args.dump_cfg, args.dump_all)?),
    ];
    sim.map_state(|state| hooks.iter_mut().fold(state, |state, hook| hook.init(state)));

    // ------------------------------------------------------------------------
    // Main loop
    for time in 0..args.tmax.unwrap_or(u64::MAX) {
        let Some((addr, inst)) = sim.exec() else {
            break;
        };
        sim.map_state(|state| {
            hooks
                .iter_mut()
                .fold(state, |state, hook| hook.exec(time, addr, &inst, state))
        });
    }

    // ------------------------------------------------------------------------
    // Exit
    println!("=================================================");
    let snap = sim.get_state();
    match &snap.halt {
        Some(reason) => cprintln!("<y>Halted</>: {}", reason),
        None => cprintln!("<y>Stopped</> after instruction limit"),
    }
    println!("Instructions: {}", snap.instruction_count);
    let r = snap.registers;
    println!(
        "A={:02X} B={:02X} X={:04X} Y={:04X} SP={:04X} PC={:04X} CC={:02X}",
        r.a, r.b, r.x, r.y, r.sp, r.pc, r.cc
    );
    if let Some((start, len)) = range {
        print!("{}", sim.memory_dump(Some(start), len));
    } else if args.dump_all {
        print!("{}", sim.memory_dump(None, DEFAULT_DUMP_LENGTH));
    }
    Ok(())
}
