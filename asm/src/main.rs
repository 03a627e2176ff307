use color_print::{cformat, cprintln};
use m68asm::{util, Assembler, Error};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "main.asm")]
    input: String,

    /// Output object file (YAML)
    #[clap(short, long, default_value = "main.obj.yaml")]
    output: String,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,

    /// Print hex object code
    #[clap(long)]
    hex: bool,

    /// Print instruction reference and exit
    #[clap(long)]
    reference: bool,
}

fn main() {
    use clap::Parser;
    let args = Args::parse();

    if args.reference {
        println!("{}", m68arch::reference::instruction_reference());
        return;
    }

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            cprintln!("<red,bold>error</>: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the source has errors.
fn run(args: &Args) -> Result<bool, Error> {
    println!("M6800 Assembler");

    println!("1. Read File");
    println!("  < {}", args.input);
    let source = std::fs::read_to_string(&args.input).map_err(|e| Error::read_file(&args.input, e))?;
    let lines: Vec<&str> = source.lines().collect();

    println!("2. Assemble");
    let assembly = Assembler::new().assemble(&source);
    for msg in &assembly.messages {
        println!("  {}", msg);
    }
    for diag in &assembly.errors {
        diag.print_diag(&lines, &args.input);
    }

    if args.dump {
        util::print_dump(&args.input, &source, &assembly);
    }

    if !assembly.success {
        cprintln!(
            "<red,bold>{} error(s)</>, no output written",
            assembly.errors.len()
        );
        return Ok(false);
    }

    if args.hex {
        println!("{}", assembly.object_code());
    }

    println!("3. Write Object");
    println!("  > {}", args.output);
    let yaml = serde_yaml::to_string(&assembly.image())
        .map_err(|e| Error::write_file(&args.output, e))?;
    std::fs::write(&args.output, yaml).map_err(|e| Error::write_file(&args.output, e))?;
    println!(
        "{}",
        cformat!(
            "  <g>{} bytes</> at ${:04X}",
            assembly.image().len(),
            assembly.origin
        )
    );
    Ok(true)
}
