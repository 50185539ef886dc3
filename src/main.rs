mod catalog;
mod game;
mod note;
mod parser;
mod playback;
mod synth;
mod ui;

use clap::{Parser, Subcommand};

use catalog::Category;

#[derive(Parser)]
#[command(name = "clisimon", about = "Simon-style musical memory game in the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the game
    Play {
        /// Song bank to start with
        #[arg(long, value_enum, default_value = "children")]
        category: Category,
    },

    /// List the songs in a bank
    Songs {
        /// Song bank to list
        #[arg(long, value_enum, default_value = "children")]
        category: Category,
    },

    /// Parse a song's melody and display its notes
    Show {
        /// Song name, as printed by `songs`
        song: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Play { category } => {
            if let Err(e) = ui::run(category) {
                eprintln!("Game error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Songs { category } => {
            println!("{}:", category.label());
            for name in catalog::songs(category) {
                println!("  {}", name);
            }
        }
        Command::Show { song } => {
            let Some(melody) = catalog::melody_string(&song) else {
                eprintln!("Unknown song: {}", song);
                std::process::exit(1);
            };
            print_melody(&song, melody);
        }
    }
}

fn print_melody(song: &str, melody: &str) {
    let notes = parser::parse_melody(melody);
    println!("{} - {} notes", song, notes.len());
    println!();
    for (i, n) in notes.iter().enumerate() {
        println!(
            "  {:>3}  {:?}{}  pad {}  {:>4} ms  {:.1} Hz",
            i + 1,
            n.pitch,
            n.duration.symbol(),
            n.pitch.pad(),
            n.duration.millis(),
            n.pitch.to_freq()
        );
    }
}
