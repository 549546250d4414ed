//! Command-line interface (CLI) for the lprolog parser.
//!
//! Parses source units with the pervasive baseline loaded and prints the
//! flat declarations, the structured program, a single goal, or a string
//! constant extracted from the units.

use clap::{Args as ClapArgs, Parser as ClapParser, Subcommand};
use lprolog_ast::structured::{self, Block};
use lprolog_ast::{Arena, Decl, structure};
use lprolog_parser::{
    FsLoader, ParseError, ParserConfig, SyntaxVariant, extract_literal, init, parse_goal,
    parse_program,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    options: Options,
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct Options {
    /// Search path for accumulated units (repeatable)
    #[arg(short = 'I', long = "include", global = true)]
    paths: Vec<PathBuf>,
    /// Working directory for unit lookup
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,
    /// Accept the legacy surface syntax
    #[arg(long, global = true)]
    legacy: bool,
    /// Report bootstrap progress at info level
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints the flat declarations of the units
    Parse { files: Vec<String> },
    /// Prints the structured program of the units
    Structure { files: Vec<String> },
    /// Parses a single goal
    Goal { text: String },
    /// Prints the string constant `name` defined in the units
    Extract { name: String, files: Vec<String> },
}

fn main() -> Result<ExitCode, ParseError> {
    env_logger::init();

    let args = Args::parse();
    let config = ParserConfig {
        verbose: args.options.verbose,
        syntax: if args.options.legacy {
            SyntaxVariant::Legacy
        } else {
            SyntaxVariant::Standard
        },
    };
    let mut arena = Arena::new();
    init(&mut arena, &config)?;
    let mut loader = FsLoader::new(
        args.options.cwd.unwrap_or_else(|| PathBuf::from(".")),
        args.options.paths,
    );

    match args.command {
        Commands::Parse { files } => {
            let program = parse_program(&mut arena, &mut loader, &files)?;
            print_decls(&arena, &program, 0);
        }
        Commands::Structure { files } => {
            let program = parse_program(&mut arena, &mut loader, &files)?;
            let program = structure(program)?;
            print_structured(&arena, &program, 0);
        }
        Commands::Goal { text } => {
            let goal = parse_goal(&mut arena, "<goal>", &text)?;
            println!("{} .", goal.term.display(&arena));
        }
        Commands::Extract { name, files } => {
            let program = parse_program(&mut arena, &mut loader, &files)?;
            match extract_literal(&arena, &program, &name) {
                Some(s) => println!("{s}"),
                None => {
                    eprintln!("{name}: not found");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_decls(arena: &Arena, decls: &[Decl], depth: usize) {
    let pad = "  ".repeat(depth);
    for decl in decls {
        match decl {
            Decl::Clause(c) => println!("{pad}{} .", c.body.display(arena)),
            Decl::Type(ts) => {
                for t in ts {
                    println!("{pad}type {} {} .", arena.show(t.name), t.ty.display(arena));
                }
            }
            Decl::Macro(m) => println!("{pad}macro {} := {} .", arena.show(m.name), m.body.display(arena)),
            Decl::Accumulated(loc, parts) => {
                for (digest, decls) in parts {
                    println!("{pad}% accumulated at {loc} ({digest})");
                    print_decls(arena, decls, depth + 1);
                }
            }
            Decl::Ignored(_) => {}
            other => println!("{pad}{other:?}"),
        }
    }
}

fn print_structured(arena: &Arena, program: &structured::Program, depth: usize) {
    let pad = "  ".repeat(depth);
    for m in &program.macros {
        println!("{pad}macro {} := {} .", arena.show(m.name), m.body.display(arena));
    }
    for t in &program.types {
        println!("{pad}type {} {} .", arena.show(t.name), t.ty.display(arena));
    }
    for block in &program.body {
        match block {
            Block::Clauses(cs) => {
                for c in cs {
                    println!("{pad}{} .", c.body.display(arena));
                }
            }
            Block::Locals(names, p) => {
                let names: Vec<&str> = names.iter().map(|&s| arena.show(s)).collect();
                println!("{pad}{{ local {}", names.join(", "));
                print_structured(arena, p, depth + 1);
                println!("{pad}}}");
            }
            Block::Namespace(name, p) => {
                println!("{pad}namespace {} {{", arena.show(*name));
                print_structured(arena, p, depth + 1);
                println!("{pad}}}");
            }
            Block::Shorten(shorthands, p) => {
                for s in shorthands {
                    println!("{pad}% shorten {} to {}", arena.show(s.full_name), arena.show(s.short_name));
                }
                print_structured(arena, p, depth + 1);
            }
            Block::Constraints(names, rules, p) => {
                let names: Vec<&str> = names.iter().map(|&s| arena.show(s)).collect();
                println!("{pad}constraint {} {{ % {} rules", names.join(" "), rules.len());
                print_structured(arena, p, depth + 1);
                println!("{pad}}}");
            }
        }
    }
}
